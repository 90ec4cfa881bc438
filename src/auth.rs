//! Bearer credential verification
//!
//! Tokens have the shape `user_id.signature` where the signature is
//! hex-encoded HMAC-SHA256 over the user id, keyed by a shared secret.
//! The session subsystem that mints these tokens is outside this service.

use crate::config::AuthConfig;
use crate::error::{AnalysisError, Result};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Verifies bearer tokens and yields the caller identity
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Option<Vec<u8>>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config
                .shared_secret
                .as_ref()
                .map(|s| s.expose_secret().as_bytes().to_vec()),
        }
    }

    /// Verify an `Authorization` header value and return the caller's
    /// user id. Missing header, bad shape, or a bad signature all map to
    /// the same 401.
    pub fn verify(&self, auth_header: Option<&str>) -> Result<Uuid> {
        let secret = self.secret.as_ref().ok_or(AnalysisError::Unauthorized)?;

        let header = auth_header.ok_or(AnalysisError::Unauthorized)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AnalysisError::Unauthorized)?;

        let (user_part, sig_part) = token
            .split_once('.')
            .ok_or(AnalysisError::Unauthorized)?;

        let user_id =
            Uuid::parse_str(user_part).map_err(|_| AnalysisError::Unauthorized)?;

        let expected = hex::decode(sig_part).map_err(|_| AnalysisError::Unauthorized)?;

        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| AnalysisError::Internal(e.to_string()))?;
        mac.update(user_part.as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| AnalysisError::Unauthorized)?;

        Ok(user_id)
    }

    /// Mint a token for a user id. Used by tests and local tooling.
    pub fn mint(&self, user_id: Uuid) -> Result<String> {
        let secret = self.secret.as_ref().ok_or(AnalysisError::Unauthorized)?;

        let user_part = user_id.to_string();
        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| AnalysisError::Internal(e.to_string()))?;
        mac.update(user_part.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", user_part, sig))
    }
}
