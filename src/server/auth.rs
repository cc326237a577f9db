//! Shared-secret authentication extractor.
//!
//! Callers present the secret in the `X-CS-Secret` header. When no secret is
//! configured every request is accepted and a warning is logged.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::GatewayError;
use crate::server::state::AppState;

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "x-cs-secret";

/// Authorized request marker. Extracting this checks the shared secret.
pub struct Authorized;

impl FromRequestParts<Arc<AppState>> for Authorized {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.shared_secret.as_deref() else {
            tracing::warn!("CS_SHARED_SECRET not set; accepting any caller");
            return Ok(Self);
        };

        let provided = parts
            .headers
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        match provided {
            Some(secret) if secrets_match(secret.as_bytes(), expected.as_bytes()) => Ok(Self),
            _ => Err(GatewayError::Unauthorized),
        }
    }
}

/// Compare without short-circuiting on the first differing byte.
fn secrets_match(provided: &[u8], expected: &[u8]) -> bool {
    provided.len() == expected.len()
        && provided
            .iter()
            .zip(expected)
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match(b"s3cret", b"s3cret"));
        assert!(!secrets_match(b"s3cret", b"s3creT"));
        assert!(!secrets_match(b"s3cre", b"s3cret"));
        assert!(!secrets_match(b"", b"s3cret"));
    }
}
