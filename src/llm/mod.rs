//! Generative and embedding model seam.
//!
//! The analyzer and the Gemini transcription fallback only see the
//! [`GenerativeModel`] trait; [`GeminiClient`] is the production
//! implementation over the Gemini REST API.

pub mod gemini;

pub use gemini::GeminiClient;

use futures::future::BoxFuture;

use crate::error::GatewayResult;

/// Boxed future type for model operations.
pub type ModelFuture<'a, T> = BoxFuture<'a, T>;

/// One part of a multimodal model request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelPart {
    /// Instruction or context text.
    Text(String),
    /// Raw binary payload sent inline.
    InlineData {
        /// MIME type of `data`.
        mime_type: String,
        /// Raw bytes.
        data: Vec<u8>,
    },
}

impl ModelPart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create an inline binary part.
    #[must_use]
    pub fn inline(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self::InlineData {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// Trait abstraction over the external generative and embeddings models.
pub trait GenerativeModel: Send + Sync {
    /// Run a generation with the given parts, in order.
    ///
    /// Returns `None` when the model answered without any text.
    ///
    /// # Errors
    /// Returns an error if credentials are missing or the request fails.
    fn generate<'a>(
        &'a self,
        model: &'a str,
        parts: Vec<ModelPart>,
    ) -> ModelFuture<'a, GatewayResult<Option<String>>>;

    /// Embed a single text.
    ///
    /// # Errors
    /// Returns an error if credentials are missing, the request fails or the
    /// response has an unexpected shape.
    fn embed<'a>(&'a self, text: &'a str) -> ModelFuture<'a, GatewayResult<Vec<f64>>>;
}
