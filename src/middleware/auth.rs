//! Stage 2 of the admission pipeline: conditional authentication.
//!
//! Paths on the public allow-list pass through untouched. Everything else
//! needs a bearer token: signature and expiry are verified first, then the
//! revocation blacklist is consulted. The order is fixed — revoking an
//! already-invalid token is meaningless, but revocation must override a token
//! that is still cryptographically valid.

use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::revocation;
use crate::routes::RouteTable;
use crate::store::SharedStore;
use crate::token::{Claims, TokenVerifier};

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Decides admission for `path` and, when authentication is required,
/// verifies and returns the token's claims.
///
/// `Ok(None)` means the path is public. The happy path reads the store once
/// (revocation lookup) and mutates nothing.
pub async fn authorize(
    routes: &RouteTable,
    verifier: &TokenVerifier,
    store: &dyn SharedStore,
    path: &str,
    headers: &HeaderMap,
    now: i64,
) -> Result<Option<Claims>, AppError> {
    if routes.is_public(path) {
        return Ok(None);
    }

    let token = bearer_token(headers).ok_or(AppError::MissingToken)?;

    let claims = verifier
        .verify(token, now)
        .map_err(|_| AppError::InvalidToken)?;

    if revocation::is_revoked(store, token).await? {
        return Err(AppError::RevokedToken);
    }

    Ok(Some(claims))
}
