//! Credential-based provider availability.
//!
//! Computed once from configuration and handed to each provider at
//! construction; providers never look at the environment themselves.

use crate::config::GatewayConfig;

/// Which transcription providers have credentials configured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProviderAvailability {
    /// Cloud Speech: a service-account key path is set.
    pub cloud_speech: bool,
    /// Gemini: `GOOGLE_API_KEY` is set.
    pub gemini: bool,
    /// Whisper: `OPENAI_API_KEY` is set.
    pub whisper: bool,
}

impl ProviderAvailability {
    /// Inspect configuration only; no I/O.
    #[must_use]
    pub const fn probe(config: &GatewayConfig) -> Self {
        Self {
            cloud_speech: config.google_application_credentials.is_some(),
            gemini: config.google_api_key.is_some(),
            whisper: config.openai_api_key.is_some(),
        }
    }
}
