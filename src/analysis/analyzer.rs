//! Analysis orchestration: prompt, model call, JSON recovery, coercion.

use std::sync::Arc;

use crate::analysis::coerce::coerce;
use crate::analysis::json_extract::extract_json;
use crate::analysis::prompt::build_prompt;
use crate::capture::{AnalysisContext, MemoryResult};
use crate::error::{GatewayError, GatewayResult};
use crate::llm::{GenerativeModel, ModelPart};

/// Turns a capture into a [`MemoryResult`] with the generative model.
#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn GenerativeModel>,
    model_name: String,
}

impl Analyzer {
    /// Create an analyzer over a generative model.
    #[must_use]
    pub fn new(model: Arc<dyn GenerativeModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    /// Analyze a capture.
    ///
    /// The returned record has no embedding or transcript; the caller adds
    /// them.
    ///
    /// # Errors
    /// Returns [`GatewayError::EmptyResponse`] when the model yields no text,
    /// [`GatewayError::Parse`] when no JSON object can be recovered, and any
    /// model or image read error.
    pub async fn analyze(&self, context: &AnalysisContext) -> GatewayResult<MemoryResult> {
        let prompt = build_prompt(
            &context.note,
            &context.transcript,
            context.now_utc.as_deref(),
            &context.existing_collections,
        );

        let mut parts = vec![ModelPart::Text(prompt)];
        if let Some(image) = &context.image {
            let data = tokio::fs::read(&image.path).await?;
            parts.push(ModelPart::inline(image.mime_type.clone(), data));
        }

        tracing::info!(
            model = %self.model_name,
            has_image = context.image.is_some(),
            note_len = context.note.len(),
            stt_len = context.transcript.len(),
            "Invoking generative analysis"
        );

        let text = self
            .model
            .generate(&self.model_name, parts)
            .await?
            .filter(|text| !text.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)?;

        let payload = extract_json(&text)?;
        Ok(coerce(&payload))
    }

    /// Embed text, returning an empty vector on any failure.
    pub async fn embed_text(&self, text: &str) -> Vec<f64> {
        match self.model.embed(text).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::error!(error = %e, "embed_text failed; returning empty embedding");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::capture::{MediaRef, Reminder};
    use crate::testing::ScriptedModel;

    use super::*;

    fn analyzer(model: &Arc<ScriptedModel>) -> Analyzer {
        Analyzer::new(model.clone(), "gemini-test")
    }

    #[tokio::test]
    async fn test_note_only_capture() {
        let model = Arc::new(ScriptedModel::replying(
            r###"{"title": "Buy Milk", "summary": "## Errand\n\n- Buy **milk** tomorrow at 5pm.", "todos": ["Buy milk"], "reminders": [{"event": "Buy milk", "datetime": "2024-01-02T17:00:00Z"}], "urls": [], "collections": ["Groceries"]}"###,
        ));
        let context = AnalysisContext {
            note: "Buy milk tomorrow at 5pm".to_string(),
            now_utc: Some("2024-01-01T00:00:00Z".to_string()),
            ..AnalysisContext::default()
        };

        let result = analyzer(&model).analyze(&context).await.unwrap();
        assert!(result.summary.to_lowercase().contains("milk"));
        assert_eq!(result.todos, vec!["Buy milk"]);
        assert_eq!(
            result.reminders,
            vec![Reminder {
                event: "Buy milk".to_string(),
                datetime: "2024-01-02T17:00:00Z".to_string(),
            }]
        );

        let calls = model.generate_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "gemini-test");
        assert_eq!(calls[0].1.len(), 1);
        let ModelPart::Text(prompt) = &calls[0].1[0] else {
            panic!("first part must be the prompt text");
        };
        assert!(prompt.contains("User note: Buy milk tomorrow at 5pm"));
        assert!(prompt.contains("Current datetime (UTC): 2024-01-01T00:00:00Z."));
    }

    #[tokio::test]
    async fn test_image_part_follows_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [1_u8, 2, 3]).unwrap();

        let model = Arc::new(ScriptedModel::replying(r#"{"title": "Photo"}"#));
        let context = AnalysisContext {
            image: Some(MediaRef::new(&path, "image/png")),
            ..AnalysisContext::default()
        };

        let result = analyzer(&model).analyze(&context).await;
        assert_eq!(result.map(|r| r.title).ok().as_deref(), Some("Photo"));

        let calls = model.generate_calls();
        assert_eq!(calls[0].1.len(), 2);
        assert!(matches!(calls[0].1[0], ModelPart::Text(_)));
        assert_eq!(calls[0].1[1], ModelPart::inline("image/png", vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_fenced_response_matches_plain() {
        let body = r#"{"title": "Trip", "todos": "Pack bags"}"#;
        let plain = analyzer(&Arc::new(ScriptedModel::replying(body)))
            .analyze(&AnalysisContext::default())
            .await;
        let fenced = analyzer(&Arc::new(ScriptedModel::replying(&format!(
            "```json\n{body}\n```"
        ))))
        .analyze(&AnalysisContext::default())
        .await;

        assert!(plain.is_ok());
        assert_eq!(plain.ok(), fenced.ok());
    }

    #[tokio::test]
    async fn test_empty_response_is_error() {
        for reply in [None, Some("   ")] {
            let model = Arc::new(ScriptedModel::with_reply(reply.map(str::to_string)));
            let result = analyzer(&model).analyze(&AnalysisContext::default()).await;
            assert!(matches!(result, Err(GatewayError::EmptyResponse)));
        }
    }

    #[tokio::test]
    async fn test_unparsable_response_is_error() {
        let model = Arc::new(ScriptedModel::replying("I could not do that."));
        let result = analyzer(&model).analyze(&AnalysisContext::default()).await;
        assert!(matches!(result, Err(GatewayError::Parse(_))));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = Arc::new(ScriptedModel::failing_generate());
        let result = analyzer(&model).analyze(&AnalysisContext::default()).await;
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[tokio::test]
    async fn test_embed_failure_yields_empty_vector() {
        let model = Arc::new(ScriptedModel::replying("{}").with_embedding_error());
        assert!(analyzer(&model).embed_text("hello").await.is_empty());

        let model = Arc::new(ScriptedModel::replying("{}").with_embedding(vec![0.25, 0.5]));
        assert_eq!(analyzer(&model).embed_text("hello").await, vec![0.25, 0.5]);
        assert_eq!(model.embed_calls(), vec!["hello".to_string()]);
    }
}
