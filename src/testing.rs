//! In-process fakes shared by unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::capture::MediaRef;
use crate::error::{GatewayError, GatewayResult};
use crate::llm::{GenerativeModel, ModelFuture, ModelPart};
use crate::stt::TranscriptionProvider;

/// Generative model returning canned answers and recording its calls.
pub struct ScriptedModel {
    reply: Option<String>,
    fail_generate: bool,
    embedding: Result<Vec<f64>, String>,
    generate_calls: Mutex<Vec<(String, Vec<ModelPart>)>>,
    embed_calls: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn with_reply(reply: Option<String>) -> Self {
        Self {
            reply,
            fail_generate: false,
            embedding: Ok(vec![0.1, 0.2, 0.3]),
            generate_calls: Mutex::new(Vec::new()),
            embed_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self::with_reply(Some(reply.to_string()))
    }

    pub fn failing_generate() -> Self {
        Self {
            fail_generate: true,
            ..Self::with_reply(None)
        }
    }

    pub fn with_embedding(mut self, vector: Vec<f64>) -> Self {
        self.embedding = Ok(vector);
        self
    }

    pub fn with_embedding_error(mut self) -> Self {
        self.embedding = Err("embedding backend exploded".to_string());
        self
    }

    pub fn generate_calls(&self) -> Vec<(String, Vec<ModelPart>)> {
        self.generate_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap()
    }

    pub fn embed_calls(&self) -> Vec<String> {
        self.embed_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap()
    }
}

impl GenerativeModel for ScriptedModel {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        parts: Vec<ModelPart>,
    ) -> ModelFuture<'a, GatewayResult<Option<String>>> {
        Box::pin(async move {
            if let Ok(mut calls) = self.generate_calls.lock() {
                calls.push((model.to_string(), parts));
            }
            if self.fail_generate {
                return Err(GatewayError::Config("GOOGLE_API_KEY is not set".to_string()));
            }
            Ok(self.reply.clone())
        })
    }

    fn embed<'a>(&'a self, text: &'a str) -> ModelFuture<'a, GatewayResult<Vec<f64>>> {
        Box::pin(async move {
            if let Ok(mut calls) = self.embed_calls.lock() {
                calls.push(text.to_string());
            }
            self.embedding.clone().map_err(GatewayError::Provider)
        })
    }
}

/// What a [`FakeProvider`] does when invoked.
#[derive(Clone, Debug)]
pub enum FakeOutcome {
    /// Return this transcript.
    Text(&'static str),
    /// Return no transcript.
    Nothing,
    /// Fail with a provider error.
    Fail,
}

/// Transcription provider with a fixed availability and outcome.
pub struct FakeProvider {
    name: &'static str,
    available: bool,
    outcome: FakeOutcome,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub const fn new(name: &'static str, available: bool, outcome: FakeOutcome) -> Self {
        Self {
            name,
            available,
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionProvider for FakeProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn transcribe(&self, _audio: &MediaRef) -> GatewayResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            FakeOutcome::Text(text) => Ok(Some((*text).to_string())),
            FakeOutcome::Nothing => Ok(None),
            FakeOutcome::Fail => Err(GatewayError::Provider(format!("{} is down", self.name))),
        }
    }
}
