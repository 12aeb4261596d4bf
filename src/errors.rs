use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("token has been revoked")]
    RevokedToken,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("token already expired")]
    AlreadyExpired,

    #[error("no route for path")]
    RouteNotFound,

    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("shared store unavailable: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match &self {
            AppError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "missing bearer token".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::FORBIDDEN,
                "invalid_token",
                "invalid or expired token".to_string(),
            ),
            AppError::RevokedToken => (
                StatusCode::FORBIDDEN,
                "revoked_token",
                "token has been revoked".to_string(),
            ),
            AppError::RateLimitExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limit_exceeded",
                "rate limit exceeded".to_string(),
            ),
            AppError::AlreadyExpired => (
                StatusCode::BAD_REQUEST,
                "already_expired",
                "token already expired".to_string(),
            ),
            AppError::RouteNotFound => (
                StatusCode::NOT_FOUND,
                "route_not_found",
                "no route for path".to_string(),
            ),
            AppError::Upstream(e) => (StatusCode::BAD_GATEWAY, "upstream_unavailable", e.clone()),
            AppError::Store(e) => {
                tracing::error!("shared store error: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    "shared store unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "code": code,
            }
        }));

        let mut response = (status, body).into_response();

        if matches!(self, AppError::RateLimitExceeded) {
            response
                .headers_mut()
                .insert("retry-after", axum::http::HeaderValue::from_static("60"));
        }

        response
    }
}
