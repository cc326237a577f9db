//! HTTP routes for the capture gateway.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::auth::Authorized;
use super::process::process_capture;
use super::state::AppState;

/// Headroom for multipart framing and text fields on top of two files.
const BODY_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Per-file limits are enforced while reading the form; this only bounds
    // the whole body (image + audio + fields).
    let body_limit = state
        .max_upload_bytes()
        .saturating_mul(2)
        .saturating_add(BODY_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health_check))
        .route("/process", post(process_capture))
        .route("/embed", post(embed))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Embedding request.
#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    /// Text to embed.
    #[serde(default)]
    pub text: String,
}

/// Embedding response.
#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    /// Embedding vector; empty when the text is blank or embedding failed.
    pub embedding: Vec<f64>,
}

/// Embed raw text.
async fn embed(
    _auth: Authorized,
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmbedRequest>,
) -> Json<EmbedResponse> {
    let text = request.text.trim();
    let embedding = if text.is_empty() {
        Vec::new()
    } else {
        state.analyzer.embed_text(text).await
    };
    Json(EmbedResponse { embedding })
}
