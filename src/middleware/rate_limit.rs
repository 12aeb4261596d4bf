//! Stage 1 of the admission pipeline: fixed-window rate limiting.
//!
//! Counters live in the shared store so every gateway instance enforces one
//! logical limit per client. This stage runs before any auth work: a client
//! over its cap never costs us a signature verification or a proxy call.

use std::net::SocketAddr;

use axum::http::HeaderMap;

use crate::config::Config;
use crate::errors::AppError;
use crate::store::SharedStore;

/// Derives the rate-limit key for a client: first hop of `X-Forwarded-For`
/// when present, otherwise the peer address.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Increments the client's counter and rejects once it passes the cap.
///
/// On a store failure the configured policy applies: fail-closed (default)
/// rejects the request, fail-open admits it with a warning. Silently skipping
/// the check is never an option.
pub async fn check(
    store: &dyn SharedStore,
    client: &str,
    cfg: &Config,
) -> Result<(), AppError> {
    let window = cfg.rate_limit_window_secs;
    let key = format!("rate:{}:{}", client, window);

    match store.increment(&key, window).await {
        Ok(count) if count > cfg.rate_limit_max => {
            tracing::debug!(client = %client, count, max = cfg.rate_limit_max, "rate limit exceeded");
            Err(AppError::RateLimitExceeded)
        }
        Ok(_) => Ok(()),
        Err(e) if cfg.rate_limit_fail_open => {
            tracing::warn!(client = %client, "rate-limit store unreachable, admitting (fail-open): {}", e);
            Ok(())
        }
        Err(e) => Err(AppError::Store(e.to_string())),
    }
}
