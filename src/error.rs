//! Error types for the capture gateway.

use thiserror::Error;

/// Errors raised while handling a capture.
///
/// Provider failures (transcription, embedding) are always caught where they
/// happen and downgraded to an absent result; the remaining variants end the
/// request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required credential or setting is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Shared secret mismatch.
    #[error("unauthorized")]
    Unauthorized,

    /// Upload with a content type the endpoint does not accept.
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Upload larger than the configured limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Malformed request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Transcription or embedding provider failure.
    #[error("provider error: {0}")]
    Provider(String),

    /// The generative model endpoint answered with an error status.
    #[error("upstream model error: {0}")]
    Upstream(String),

    /// The generative model produced no text.
    #[error("empty response from generative model")]
    EmptyResponse,

    /// No JSON object could be recovered from the model output.
    #[error("failed to parse model response as JSON: {0}")]
    Parse(String),

    /// HTTP client error.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_validation_message() {
        let err = GatewayError::UnsupportedMediaType("image must be of type image/*".to_string());
        assert_eq!(err.to_string(), "image must be of type image/*");
    }
}
