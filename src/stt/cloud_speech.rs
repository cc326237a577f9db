//! Google Cloud Speech-to-Text over REST.
//!
//! Authenticates with a service-account key: a signed RS256 JWT is exchanged
//! for an OAuth access token, which is cached until shortly before expiry.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::capture::MediaRef;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::stt::TranscriptionProvider;

const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Refresh a cached token this many seconds before it expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Service-account key file fields we need.
#[derive(Deserialize)]
struct KeyFile {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

/// Loaded service-account credentials.
struct ServiceAccount {
    client_email: String,
    token_uri: String,
    key: EncodingKey,
}

impl ServiceAccount {
    fn load(path: &Path) -> GatewayResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: KeyFile = serde_json::from_str(&raw)?;
        let key = EncodingKey::from_rsa_pem(file.private_key.as_bytes())
            .map_err(|e| GatewayError::Config(format!("invalid service-account key: {e}")))?;
        Ok(Self {
            client_email: file.client_email,
            token_uri: file
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            key,
        })
    }

    fn assertion(&self, now: i64) -> GatewayResult<String> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| GatewayError::Config(format!("cannot sign token request: {e}")))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct CachedToken {
    value: String,
    expires_at: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    language_code: &'a str,
    enable_automatic_punctuation: bool,
    model: &'a str,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

impl RecognizeResponse {
    /// Top alternative of every result, joined by spaces.
    fn transcript(self) -> Option<String> {
        let joined = self
            .results
            .into_iter()
            .filter_map(|r| r.alternatives.into_iter().next())
            .map(|a| a.transcript)
            .collect::<Vec<_>>()
            .join(" ");
        let joined = joined.trim();
        (!joined.is_empty()).then(|| joined.to_string())
    }
}

/// Cloud Speech provider.
pub struct CloudSpeechProvider {
    client: reqwest::Client,
    account: Option<ServiceAccount>,
    base_url: String,
    language_code: String,
    model: String,
    token: Mutex<Option<CachedToken>>,
}

impl CloudSpeechProvider {
    /// Create a provider.
    ///
    /// The key file is read once here. A missing or unreadable key leaves the
    /// provider unavailable rather than failing startup.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        credentials: Option<&Path>,
        base_url: impl Into<String>,
        language_code: impl Into<String>,
        model: impl Into<String>,
    ) -> GatewayResult<Self> {
        let account = credentials.and_then(|path| match ServiceAccount::load(path) {
            Ok(account) => Some(account),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot load Cloud Speech credentials; provider disabled"
                );
                None
            }
        });

        Ok(Self {
            client: reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            account,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language_code: language_code.into(),
            model: model.into(),
            token: Mutex::new(None),
        })
    }

    /// Create a provider from configuration; the key file is only read when
    /// `enabled`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig, enabled: bool) -> GatewayResult<Self> {
        Self::new(
            config
                .google_application_credentials
                .as_deref()
                .filter(|_| enabled),
            &config.speech_base_url,
            &config.stt_language_code,
            &config.stt_model,
        )
    }

    /// The lock only guards the cache; it is never held across the exchange.
    async fn access_token(&self, account: &ServiceAccount) -> GatewayResult<String> {
        let now = chrono::Utc::now().timestamp();
        let cached = self
            .token
            .lock()
            .await
            .as_ref()
            .filter(|t| t.expires_at > now)
            .map(|t| t.value.clone());
        if let Some(value) = cached {
            return Ok(value);
        }

        let assertion = account.assertion(now)?;
        let response = self
            .client
            .post(&account.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream(format!(
                "token exchange failed with status {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        *self.token.lock().await = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + lifetime - EXPIRY_MARGIN_SECS,
        });
        Ok(token.access_token)
    }
}

#[async_trait]
impl TranscriptionProvider for CloudSpeechProvider {
    fn name(&self) -> &'static str {
        "cloud_speech"
    }

    fn is_available(&self) -> bool {
        self.account.is_some()
    }

    async fn transcribe(&self, audio: &MediaRef) -> GatewayResult<Option<String>> {
        let Some(account) = &self.account else {
            return Ok(None);
        };

        let data = tokio::fs::read(&audio.path).await?;
        let token = self.access_token(account).await?;
        let request = RecognizeRequest {
            config: RecognitionConfig {
                language_code: &self.language_code,
                enable_automatic_punctuation: true,
                model: &self.model,
            },
            audio: RecognitionAudio {
                content: BASE64.encode(data),
            },
        };

        let response = self
            .client
            .post(format!("{}/speech:recognize", self.base_url))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GatewayError::Upstream(format!("status {status}: {body}")));
        }

        let body: RecognizeResponse = response.json().await?;
        Ok(body.transcript())
    }
}
