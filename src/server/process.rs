//! `POST /process`: analyze one capture.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use tracing::Instrument;
use uuid::Uuid;

use crate::capture::{AnalysisContext, MemoryResult};
use crate::error::GatewayResult;
use crate::server::auth::Authorized;
use crate::server::state::AppState;
use crate::server::uploads::{AUDIO_FALLBACK_SUFFIX, CaptureForm, IMAGE_FALLBACK_SUFFIX, TempUpload};

/// Handle a multipart capture.
///
/// # Errors
/// Returns an error for rejected uploads and failed analysis. Transcription
/// and embedding failures only degrade the result.
pub async fn process_capture(
    _auth: Authorized,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> GatewayResult<Json<MemoryResult>> {
    let request_id = Uuid::new_v4();
    run_capture(&state, multipart)
        .instrument(tracing::info_span!("process", %request_id))
        .await
        .map(Json)
}

async fn run_capture(state: &AppState, multipart: Multipart) -> GatewayResult<MemoryResult> {
    let form = CaptureForm::read(multipart, state.max_upload_mb).await?;
    tracing::info!(
        has_image = form.image.is_some(),
        has_audio = form.audio.is_some(),
        "Capture received"
    );

    // Guards live until the end of this function and delete their files on
    // every return path.
    let image = match form.image {
        Some(upload) => Some(TempUpload::persist(&state.tmp_dir, upload, IMAGE_FALLBACK_SUFFIX).await?),
        None => None,
    };
    let audio = match form.audio {
        Some(upload) => Some(TempUpload::persist(&state.tmp_dir, upload, AUDIO_FALLBACK_SUFFIX).await?),
        None => None,
    };

    let transcript = match &audio {
        Some(audio) => state.transcriber.transcribe(&audio.media()).await,
        None => None,
    };

    let context = AnalysisContext {
        image: image.as_ref().map(TempUpload::media),
        note: form.note_text.as_deref().unwrap_or_default().trim().to_string(),
        transcript: transcript.as_deref().unwrap_or_default().trim().to_string(),
        now_utc: form.now_utc.filter(|now| !now.trim().is_empty()),
        existing_collections: form.existing_collections.unwrap_or_default(),
    };

    let mut result = state.analyzer.analyze(&context).await?;

    let embedding_input = result.embedding_input(&context.note, &context.transcript);
    let embedding = if embedding_input.is_empty() {
        Vec::new()
    } else {
        state.analyzer.embed_text(&embedding_input).await
    };

    result.embedding = Some(embedding);
    result.transcript = transcript;
    Ok(result)
}
