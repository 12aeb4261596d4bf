use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::middleware::{auth, rate_limit};
use crate::proxy::transform;
use crate::revocation;
use crate::AppState;

/// Body of a logout request. The token to revoke may also come from the
/// Authorization header.
#[derive(Deserialize)]
struct LogoutRequest {
    token: Option<String>,
}

/// The admission pipeline. Every request that is not a health check passes
/// through here in fixed order: rate limit → auth → proxy. Each stage
/// short-circuits with its own error; no stage runs before the previous one
/// has admitted the request.
#[tracing::instrument(skip_all, fields(method = %method, path = %uri.path()))]
pub async fn gateway_handler(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let path = uri.path().to_string();

    // -- stage 1: rate limit --
    let client = rate_limit::client_key(&headers, peer.map(|c| c.0));
    rate_limit::check(state.store.as_ref(), &client, &state.config).await?;

    // -- stage 2: conditional auth --
    let now = chrono::Utc::now().timestamp();
    let claims = auth::authorize(
        &state.routes,
        &state.verifier,
        state.store.as_ref(),
        &path,
        &headers,
        now,
    )
    .await?;

    if let Some(ref claims) = claims {
        tracing::debug!(sub = %claims.sub, "request authenticated");
    }

    // Logout terminates at the gateway: the blacklist it writes is the same
    // store the auth stage reads on every protected request.
    if method == Method::POST && path == "/auth/logout" {
        return logout(&state, &headers, &body, now).await;
    }

    // -- stage 3: route + proxy --
    let rule = state
        .routes
        .match_route(&path)
        .ok_or(AppError::RouteNotFound)?;

    let target = transform::upstream_url(&rule.upstream, &rule.prefix, &uri);
    let reqwest_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid method: {}", e)))?;

    let upstream_resp = state
        .upstream
        .forward(
            reqwest_method,
            &target,
            transform::request_headers(&headers),
            body,
        )
        .await?;

    relay(upstream_resp).await
}

/// Relays an upstream response verbatim: status, headers and body pass
/// through so the caller can tell a service problem from a gateway problem.
async fn relay(upstream: reqwest::Response) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid upstream status: {}", e)))?;
    let headers = transform::response_headers(upstream.headers());
    let body = upstream
        .bytes()
        .await
        .map_err(|e| AppError::Upstream(format!("upstream body read failed: {}", e)))?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Registers a revocation for the submitted token. The token comes from the
/// JSON body (`{"token": ...}`), falling back to the bearer header that
/// already passed the auth stage.
async fn logout(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
    now: i64,
) -> Result<Response, AppError> {
    let body_token = serde_json::from_slice::<LogoutRequest>(body)
        .ok()
        .and_then(|req| req.token);

    let token = match body_token.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => auth::bearer_token(headers)
            .ok_or(AppError::MissingToken)?
            .to_string(),
    };

    revocation::register(state.store.as_ref(), &state.verifier, &token, now).await?;

    Ok(Json(json!({ "message": "logged out" })).into_response())
}
