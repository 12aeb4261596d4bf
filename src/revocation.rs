//! Token revocation (logout blacklist).
//!
//! Revoked tokens are keyed by the exact token string under `blacklist:` with
//! a TTL equal to the token's remaining lifetime, so an entry never outlives
//! the token it revokes.

use crate::errors::AppError;
use crate::store::SharedStore;
use crate::token::{TokenError, TokenVerifier};

const BLACKLIST_PREFIX: &str = "blacklist:";

fn blacklist_key(token: &str) -> String {
    format!("{}{}", BLACKLIST_PREFIX, token)
}

/// Registers a revocation for a token submitted at logout.
///
/// The token is verified first: a forged or malformed token is rejected, and
/// a token that is already expired needs no entry (`AlreadyExpired`).
/// Returns the TTL of the written entry in seconds.
pub async fn register(
    store: &dyn SharedStore,
    verifier: &TokenVerifier,
    token: &str,
    now: i64,
) -> Result<u64, AppError> {
    let claims = verifier.verify(token, now).map_err(|e| match e {
        TokenError::Expired => AppError::AlreadyExpired,
        TokenError::BadToken => AppError::InvalidToken,
    })?;

    // verify() guarantees exp > now here
    let ttl = (claims.exp - now) as u64;
    store
        .set_ex(&blacklist_key(token), "revoked", ttl)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

    tracing::info!(sub = %claims.sub, ttl_secs = ttl, "token revoked");
    Ok(ttl)
}

/// Looks up whether a token has been revoked. Store failures surface as
/// errors rather than being treated as "not revoked".
pub async fn is_revoked(store: &dyn SharedStore, token: &str) -> Result<bool, AppError> {
    let marker = store
        .get(&blacklist_key(token))
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;
    Ok(marker.is_some())
}
