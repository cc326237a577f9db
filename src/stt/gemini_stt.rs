//! Transcription through the Gemini generative model.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capture::MediaRef;
use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::llm::{GenerativeModel, ModelPart};
use crate::stt::TranscriptionProvider;

/// Gemini-backed transcriber.
pub struct GeminiTranscriber {
    model: Arc<dyn GenerativeModel>,
    model_name: String,
    language_code: String,
    enabled: bool,
}

impl GeminiTranscriber {
    /// Create a transcriber over an existing model handle.
    #[must_use]
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        model_name: impl Into<String>,
        language_code: impl Into<String>,
        enabled: bool,
    ) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            language_code: language_code.into(),
            enabled,
        }
    }

    /// Create a transcriber from configuration.
    #[must_use]
    pub fn from_config(
        config: &GatewayConfig,
        model: Arc<dyn GenerativeModel>,
        enabled: bool,
    ) -> Self {
        Self::new(
            model,
            &config.gemini_stt_model,
            &config.stt_language_code,
            enabled,
        )
    }

    fn prompt(&self) -> String {
        format!(
            "Transcribe the audio to plain text. Language hint: {}. \
             Return only the transcription text without timestamps or extra formatting.",
            self.language_code
        )
    }
}

#[async_trait]
impl TranscriptionProvider for GeminiTranscriber {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn transcribe(&self, audio: &MediaRef) -> GatewayResult<Option<String>> {
        let data = tokio::fs::read(&audio.path).await?;
        let parts = vec![
            ModelPart::text(self.prompt()),
            ModelPart::inline(audio.mime_type.clone(), data),
        ];

        let text = self.model.generate(&self.model_name, parts).await?;
        Ok(text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }
}
