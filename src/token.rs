//! Bearer-token signing and verification.
//!
//! Verification is purely cryptographic and structural: no network or store
//! access, so it can be unit-tested without infrastructure. Expiry is checked
//! against a caller-supplied clock with zero leeway.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Decoded token claims. Custom claims issued by the auth service
/// (e.g. `userId`, `username`) are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    /// Expiry, epoch seconds. The token is invalid at and after this instant.
    pub exp: i64,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed or has a bad signature")]
    BadToken,
    #[error("token is expired")]
    Expired,
}

#[derive(Clone)]
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs claims with the shared secret (HS256). The auth service issues
    /// tokens the same way, which is what makes gateway-side verification work.
    pub fn sign(&self, claims: &Claims) -> anyhow::Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Verifies signature and structure, then checks expiry against `now`
    /// (epoch seconds). A token with `exp <= now` is expired, even by one
    /// second.
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp must be present but is checked below against the caller's clock,
        // without the library's default leeway.
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::BadToken)?;

        if data.claims.exp <= now {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(sub: &str, iat: i64, exp: i64) -> Claims {
        Claims {
            sub: sub.into(),
            iat,
            exp,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn roundtrips_subject_and_custom_claims() {
        let verifier = TokenVerifier::new("secret");
        let mut original = claims("u1", 1_000, 2_000);
        original
            .extra
            .insert("userId".into(), json!(42));
        original
            .extra
            .insert("username".into(), json!("u1"));

        let token = verifier.sign(&original).unwrap();
        let decoded = verifier.verify(&token, 1_500).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn rejects_expired_even_by_one_second() {
        let verifier = TokenVerifier::new("secret");
        let token = verifier.sign(&claims("u1", 0, 1_000)).unwrap();
        assert_eq!(verifier.verify(&token, 1_001), Err(TokenError::Expired));
    }

    #[test]
    fn rejects_expiry_at_current_time() {
        let verifier = TokenVerifier::new("secret");
        let token = verifier.sign(&claims("u1", 0, 1_000)).unwrap();
        assert_eq!(verifier.verify(&token, 1_000), Err(TokenError::Expired));
    }

    #[test]
    fn accepts_one_second_before_expiry() {
        let verifier = TokenVerifier::new("secret");
        let token = verifier.sign(&claims("u1", 0, 1_000)).unwrap();
        assert!(verifier.verify(&token, 999).is_ok());
    }

    #[test]
    fn rejects_wrong_secret() {
        let signer = TokenVerifier::new("secret-a");
        let verifier = TokenVerifier::new("secret-b");
        let token = signer.sign(&claims("u1", 0, i64::MAX)).unwrap();
        assert_eq!(verifier.verify(&token, 0), Err(TokenError::BadToken));
    }

    #[test]
    fn rejects_malformed_token() {
        let verifier = TokenVerifier::new("secret");
        assert_eq!(verifier.verify("not-a-jwt", 0), Err(TokenError::BadToken));
        assert_eq!(verifier.verify("", 0), Err(TokenError::BadToken));
        assert_eq!(
            verifier.verify("a.b.c.d", 0),
            Err(TokenError::BadToken)
        );
    }

    #[test]
    fn rejects_tampered_payload() {
        let verifier = TokenVerifier::new("secret");
        let token = verifier.sign(&claims("u1", 0, i64::MAX)).unwrap();

        // Swap the payload segment for a forged one; the signature no longer matches.
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.eyJzdWIiOiJhZG1pbiJ9.{}", parts[0], parts[2]);
        assert_eq!(verifier.verify(&forged, 0), Err(TokenError::BadToken));
    }
}
