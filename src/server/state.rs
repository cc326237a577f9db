//! Application state shared across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::llm::{GeminiClient, GenerativeModel};
use crate::stt::TranscriptionChain;

/// Shared, read-only application state.
pub struct AppState {
    /// Analysis orchestrator.
    pub analyzer: Analyzer,
    /// Speech-to-text fallback chain.
    pub transcriber: TranscriptionChain,
    /// Expected `X-CS-Secret` value; `None` accepts every caller.
    pub shared_secret: Option<String>,
    /// Per-file upload limit in MiB.
    pub max_upload_mb: u64,
    /// Directory for request-scoped temporary files.
    pub tmp_dir: PathBuf,
}

impl AppState {
    /// Build the production state from configuration.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be created.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Arc<Self>> {
        let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::from_config(config)?);
        let analyzer = Analyzer::new(model.clone(), &config.gemini_model);
        let transcriber = TranscriptionChain::from_config(config, model)?;

        if config.google_api_key.is_none() {
            tracing::warn!("GOOGLE_API_KEY is not set; analysis requests will fail");
        }

        Ok(Arc::new(Self {
            analyzer,
            transcriber,
            shared_secret: config.shared_secret.clone(),
            max_upload_mb: config.max_upload_mb,
            tmp_dir: config.tmp_dir.clone(),
        }))
    }

    /// Per-file upload limit in bytes.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}
