//! OpenAI Whisper transcription.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::capture::MediaRef;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::stt::TranscriptionProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Whisper API client.
pub struct WhisperProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: Option<String>,
}

impl WhisperProvider {
    /// Create a provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> GatewayResult<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Create a provider from configuration; the API key is ignored unless
    /// `enabled`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig, enabled: bool) -> GatewayResult<Self> {
        Self::new(
            config.openai_api_key.clone().filter(|_| enabled),
            &config.openai_base_url,
            &config.whisper_model,
        )
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperProvider {
    fn name(&self) -> &'static str {
        "whisper"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn transcribe(&self, audio: &MediaRef) -> GatewayResult<Option<String>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let data = tokio::fs::read(&audio.path).await?;
        let file_name = audio
            .path
            .file_name()
            .map_or_else(|| "audio".to_string(), |n| n.to_string_lossy().into_owned());
        let file_part = multipart::Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", file_part);

        tracing::debug!(model = %self.model, "Sending audio to Whisper API");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GatewayError::Upstream(format!("status {status}: {body}")));
        }

        let body: TranscriptionResponse = response.json().await?;
        Ok(body
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn audio_file(dir: &tempfile::TempDir) -> MediaRef {
        let path = dir.path().join("cs-abc.m4a");
        std::fs::write(&path, b"fake-audio").unwrap();
        MediaRef::new(path, "audio/mp4")
    }

    fn provider(server: &MockServer, key: Option<&str>) -> WhisperProvider {
        WhisperProvider::new(key.map(str::to_string), server.uri(), "whisper-1")
            .unwrap()
    }

    #[tokio::test]
    async fn test_transcribes_with_bearer_key() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": " hi there "})))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server, Some("sk-test"))
            .transcribe(&audio_file(&dir))
            .await;
        assert_eq!(text.ok().flatten().as_deref(), Some("hi there"));
    }

    #[tokio::test]
    async fn test_error_status_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let result = provider(&server, Some("sk-test"))
            .transcribe(&audio_file(&dir))
            .await;
        assert!(matches!(result, Err(GatewayError::Upstream(msg)) if msg.contains("bad key")));
    }

    #[tokio::test]
    async fn test_empty_text_is_no_speech() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": ""})))
            .mount(&server)
            .await;

        let result = provider(&server, Some("sk-test"))
            .transcribe(&audio_file(&dir))
            .await;
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_unavailable_without_key() {
        let provider = WhisperProvider::new(None, "http://localhost", "whisper-1")
            .unwrap();
        assert!(!provider.is_available());
    }
}
