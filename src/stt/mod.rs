//! Speech-to-text provider chain.
//!
//! Providers are tried in a fixed order:
//! 1. Google Cloud Speech-to-Text (service-account credentials)
//! 2. Gemini transcription (API key)
//! 3. OpenAI Whisper (API key)
//!
//! The first non-empty transcript wins. Failures and empty transcripts both
//! fall through to the next provider; when none produces text the chain
//! returns `None`, which callers treat as "transcription skipped".

pub mod availability;
pub mod cloud_speech;
pub mod gemini_stt;
pub mod whisper;

pub use availability::ProviderAvailability;
pub use cloud_speech::CloudSpeechProvider;
pub use gemini_stt::GeminiTranscriber;
pub use whisper::WhisperProvider;

use std::sync::Arc;

use async_trait::async_trait;

use crate::capture::MediaRef;
use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::llm::GenerativeModel;

/// A speech-to-text backend.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Cheap, side-effect-free check that credentials are in place.
    fn is_available(&self) -> bool;

    /// Transcribe an audio file.
    ///
    /// `Ok(None)` means the provider ran but found no speech.
    ///
    /// # Errors
    /// Returns an error if the provider call fails.
    async fn transcribe(&self, audio: &MediaRef) -> GatewayResult<Option<String>>;
}

/// Ordered transcription fallback.
#[derive(Clone)]
pub struct TranscriptionChain {
    providers: Vec<Arc<dyn TranscriptionProvider>>,
}

impl TranscriptionChain {
    /// Build the production chain in its fixed priority order.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(
        config: &GatewayConfig,
        model: Arc<dyn GenerativeModel>,
    ) -> GatewayResult<Self> {
        let availability = ProviderAvailability::probe(config);
        let chain = Self::with_providers(vec![
            Arc::new(CloudSpeechProvider::from_config(config, availability.cloud_speech)?),
            Arc::new(GeminiTranscriber::from_config(config, model, availability.gemini)),
            Arc::new(WhisperProvider::from_config(config, availability.whisper)?),
        ]);

        tracing::info!(
            providers = ?chain.available_providers(),
            "Transcription providers ready"
        );
        Ok(chain)
    }

    /// Build a chain over explicit providers, tried in the given order.
    #[must_use]
    pub fn with_providers(providers: Vec<Arc<dyn TranscriptionProvider>>) -> Self {
        Self { providers }
    }

    /// Names of the providers that would currently be tried.
    #[must_use]
    pub fn available_providers(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.name())
            .collect()
    }

    /// Transcribe audio with the first provider that yields text.
    pub async fn transcribe(&self, audio: &MediaRef) -> Option<String> {
        for provider in &self.providers {
            let name = provider.name();
            if !provider.is_available() {
                tracing::debug!(provider = name, "Transcription provider unavailable; skipping");
                continue;
            }

            match provider.transcribe(audio).await {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    tracing::info!(provider = name, chars = text.len(), "Transcription completed");
                    return Some(text.trim().to_string());
                }
                Ok(_) => {
                    tracing::info!(provider = name, "Provider returned no speech; trying next");
                }
                Err(e) => {
                    tracing::warn!(provider = name, error = %e, "Transcription provider failed; trying next");
                }
            }
        }

        tracing::info!("STT is disabled or produced no transcript; skipping transcription");
        None
    }
}
