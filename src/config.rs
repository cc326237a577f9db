//! Gateway configuration loaded from the environment.

use std::path::PathBuf;

use url::Url;

use crate::error::{GatewayError, GatewayResult};

/// Default Gemini analysis model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
/// Default embeddings model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default Cloud Speech REST base URL.
pub const DEFAULT_SPEECH_BASE_URL: &str = "https://speech.googleapis.com/v1";
/// Default OpenAI REST base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default Whisper model.
pub const DEFAULT_WHISPER_MODEL: &str = "whisper-1";
/// Default per-file upload limit in MiB.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 25;
/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration for the gateway.
///
/// Built once at startup and shared read-only with every request. Providers
/// derive their availability from it instead of probing the environment.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Gemini API key (analysis, embeddings, transcription fallback).
    pub google_api_key: Option<String>,
    /// Gemini model used for analysis.
    pub gemini_model: String,
    /// Gemini model used for transcription.
    pub gemini_stt_model: String,
    /// Embeddings model.
    pub embedding_model: String,
    /// Gemini REST base URL.
    pub gemini_base_url: String,
    /// Path to a Google service-account key file.
    pub google_application_credentials: Option<PathBuf>,
    /// Cloud Speech REST base URL.
    pub speech_base_url: String,
    /// Language hint for speech-to-text.
    pub stt_language_code: String,
    /// Cloud Speech recognition model.
    pub stt_model: String,
    /// OpenAI API key for Whisper.
    pub openai_api_key: Option<String>,
    /// OpenAI REST base URL.
    pub openai_base_url: String,
    /// Whisper model name.
    pub whisper_model: String,
    /// Shared secret expected in `X-CS-Secret`; `None` disables the check.
    pub shared_secret: Option<String>,
    /// Per-file upload limit in MiB.
    pub max_upload_mb: u64,
    /// Directory for request-scoped temporary files.
    pub tmp_dir: PathBuf,
    /// Default log level when `RUST_LOG` is not set.
    pub log_level: String,
    /// Listen port.
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_stt_model: DEFAULT_GEMINI_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            google_application_credentials: None,
            speech_base_url: DEFAULT_SPEECH_BASE_URL.to_string(),
            stt_language_code: "en-US".to_string(),
            stt_model: "default".to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            whisper_model: DEFAULT_WHISPER_MODEL.to_string(),
            shared_secret: None,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            tmp_dir: PathBuf::from("/data/tmp"),
            log_level: "info".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Unparsable numbers fall back to defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let gemini_model = get("GEMINI_MODEL").unwrap_or(defaults.gemini_model);
        let gemini_stt_model = get("GEMINI_STT_MODEL").unwrap_or_else(|| gemini_model.clone());

        Self {
            google_api_key: get("GOOGLE_API_KEY"),
            gemini_stt_model,
            gemini_model,
            embedding_model: get("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            google_application_credentials: get("GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from),
            speech_base_url: get("SPEECH_BASE_URL").unwrap_or(defaults.speech_base_url),
            stt_language_code: get("STT_LANGUAGE_CODE").unwrap_or(defaults.stt_language_code),
            stt_model: get("STT_MODEL").unwrap_or(defaults.stt_model),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            whisper_model: get("WHISPER_MODEL").unwrap_or(defaults.whisper_model),
            shared_secret: get("CS_SHARED_SECRET"),
            max_upload_mb: get("MAX_UPLOAD_MB")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_mb),
            tmp_dir: get("TMP_DIR").map_or(defaults.tmp_dir, PathBuf::from),
            log_level: get("LOG_LEVEL")
                .map_or(defaults.log_level, |level| level.to_ascii_lowercase()),
            port: get("CS_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.max_upload_mb == 0 {
            return Err(GatewayError::Config(
                "MAX_UPLOAD_MB must be > 0".to_string(),
            ));
        }

        for base_url in [
            &self.gemini_base_url,
            &self.speech_base_url,
            &self.openai_base_url,
        ] {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}
