//! API gateway — request-admission pipeline.
//!
//! Every inbound request passes three stages in fixed order: Redis-backed
//! rate limiting, conditional JWT authentication with a revocation check,
//! and reverse proxying to the matched backend service. The router is also
//! exported for integration tests in `tests/`.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

pub mod config;
pub mod errors;
pub mod middleware;
pub mod proxy;
pub mod revocation;
pub mod routes;
pub mod store;
pub mod token;

/// Shared application state passed to the pipeline handler.
pub struct AppState {
    pub config: config::Config,
    pub store: Arc<dyn store::SharedStore>,
    pub verifier: token::TokenVerifier,
    pub routes: routes::RouteTable,
    pub upstream: proxy::upstream::UpstreamClient,
}

/// Assembles the gateway router: the health check bypasses the pipeline,
/// everything else falls through to the three-stage handler.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(proxy::handler::gateway_handler)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "api gateway running" }))
}

/// Injects a unique X-Request-Id into every response so clients can
/// correlate errors with gateway logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}
