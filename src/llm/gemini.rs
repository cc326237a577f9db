//! Gemini REST client for generation and embeddings.
//!
//! Uses `models/{model}:generateContent` and `models/{model}:embedContent`
//! with the API key sent in the `x-goog-api-key` header.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::llm::{GenerativeModel, ModelFuture, ModelPart};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client shared by every request.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    embedding_model: String,
}

impl GeminiClient {
    /// Create a client.
    ///
    /// A missing API key is not an error here; calls fail with
    /// [`GatewayError::Config`] instead.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> GatewayResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            embedding_model: embedding_model.into(),
        })
    }

    /// Create a client from gateway configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        Self::new(
            config.google_api_key.clone(),
            &config.gemini_base_url,
            &config.embedding_model,
        )
    }

    fn api_key(&self) -> GatewayResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| GatewayError::Config("GOOGLE_API_KEY is not set".to_string()))
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/{}:{method}", self.base_url, model_path(model))
    }

    async fn post_json<B: Serialize + Sync>(&self, url: &str, body: &B) -> GatewayResult<Value> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, self.api_key()?)
            .json(body)
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

        Ok(response.json().await?)
    }

    async fn generate_content(
        &self,
        model: &str,
        parts: Vec<ModelPart>,
    ) -> GatewayResult<Option<String>> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: parts.iter().map(RequestPart::from).collect(),
            }],
        };

        tracing::debug!(model, parts = parts.len(), "Sending generateContent request");
        let body = self
            .post_json(&self.endpoint(model, "generateContent"), &request)
            .await?;
        let response: GenerateResponse = serde_json::from_value(body)?;
        Ok(response.text())
    }

    async fn embed_content(&self, text: &str) -> GatewayResult<Vec<f64>> {
        let request = EmbedRequest {
            model: model_path(&self.embedding_model),
            content: EmbedContent {
                parts: vec![TextPart { text }],
            },
        };

        let body = self
            .post_json(&self.endpoint(&self.embedding_model, "embedContent"), &request)
            .await?;
        parse_embedding(&body)
    }
}

impl GenerativeModel for GeminiClient {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        parts: Vec<ModelPart>,
    ) -> ModelFuture<'a, GatewayResult<Option<String>>> {
        Box::pin(self.generate_content(model, parts))
    }

    fn embed<'a>(&'a self, text: &'a str) -> ModelFuture<'a, GatewayResult<Vec<f64>>> {
        Box::pin(self.embed_content(text))
    }
}

/// Qualify a model name with the `models/` prefix.
fn model_path(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

/// Read an embedding vector out of the known response shapes.
fn parse_embedding(body: &Value) -> GatewayResult<Vec<f64>> {
    let embedding = body.get("embedding").unwrap_or(body);
    let values = embedding
        .get("values")
        .or_else(|| embedding.is_array().then_some(embedding))
        .and_then(Value::as_array)
        .ok_or_else(|| GatewayError::Provider("embedding response has no values".to_string()))?;

    values
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| GatewayError::Provider(format!("non-numeric embedding value: {v}")))
        })
        .collect()
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: String,
}

impl<'a> From<&'a ModelPart> for RequestPart<'a> {
    fn from(part: &'a ModelPart) -> Self {
        match part {
            ModelPart::Text(text) => Self::Text { text },
            ModelPart::InlineData { mime_type, data } => Self::Inline {
                inline_data: InlineData {
                    mime_type,
                    data: BASE64.encode(data),
                },
            },
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: EmbedContent<'a>,
}

#[derive(Serialize)]
struct EmbedContent<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if any.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}
