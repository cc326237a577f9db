//! Multipart capture form reading and request-scoped temp files.

use std::io::Write as _;
use std::path::Path;

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use tempfile::NamedTempFile;

use crate::capture::MediaRef;
use crate::capture::media::{detect_mime, is_image, suffix_for};
use crate::error::{GatewayError, GatewayResult};

/// Temp-file suffix for images of unknown type.
pub const IMAGE_FALLBACK_SUFFIX: &str = ".bin";
/// Temp-file suffix for audio of unknown type.
pub const AUDIO_FALLBACK_SUFFIX: &str = ".wav";

/// An uploaded file held in memory.
#[derive(Debug)]
pub struct UploadedFile {
    /// File bytes.
    pub data: Vec<u8>,
    /// Declared content type.
    pub content_type: Option<String>,
}

/// Fields of a `/process` request.
#[derive(Debug, Default)]
pub struct CaptureForm {
    /// Optional photo.
    pub image: Option<UploadedFile>,
    /// Optional voice note.
    pub audio: Option<UploadedFile>,
    /// Optional typed note.
    pub note_text: Option<String>,
    /// Optional caller-supplied "now".
    pub now_utc: Option<String>,
    /// Optional existing collections, free text.
    pub existing_collections: Option<String>,
}

impl CaptureForm {
    /// Read every field of the multipart body.
    ///
    /// Nothing touches the disk here, so a rejected request leaves no files
    /// behind.
    ///
    /// # Errors
    /// Returns [`GatewayError::UnsupportedMediaType`] for a non-image `image`
    /// field, [`GatewayError::PayloadTooLarge`] as soon as a file exceeds
    /// `max_upload_mb`, and [`GatewayError::BadRequest`] for a malformed body.
    pub async fn read(mut multipart: Multipart, max_upload_mb: u64) -> GatewayResult<Self> {
        let max_bytes =
            usize::try_from(max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX);
        let mut form = Self::default();

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let content_type = field.content_type().map(str::to_string);
                    if !is_image(content_type.as_deref()) {
                        tracing::warn!(content_type = ?content_type, "Rejected non-image upload");
                        return Err(GatewayError::UnsupportedMediaType(
                            "image must be of type image/*".to_string(),
                        ));
                    }
                    let data = read_limited(&mut field, "image", max_bytes, max_upload_mb).await?;
                    form.image = Some(UploadedFile { data, content_type });
                }
                "audio" => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = read_limited(&mut field, "audio", max_bytes, max_upload_mb).await?;
                    form.audio = Some(UploadedFile { data, content_type });
                }
                "note_text" => form.note_text = Some(field.text().await.map_err(multipart_error)?),
                "now_utc" => form.now_utc = Some(field.text().await.map_err(multipart_error)?),
                "existing_collections" => {
                    form.existing_collections = Some(field.text().await.map_err(multipart_error)?);
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

/// Read a file field, failing once it grows past `max_bytes`.
async fn read_limited(
    field: &mut Field<'_>,
    name: &str,
    max_bytes: usize,
    max_upload_mb: u64,
) -> GatewayResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len().saturating_add(chunk.len()) > max_bytes {
            tracing::warn!(field = name, limit_mb = max_upload_mb, "Upload too large");
            return Err(GatewayError::PayloadTooLarge(format!(
                "{name} too large; max {max_upload_mb} MB"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn multipart_error(error: MultipartError) -> GatewayError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge(error.body_text())
    } else {
        GatewayError::BadRequest(error.body_text())
    }
}

/// An upload persisted to a uniquely named temp file.
///
/// The file is removed when the guard drops; removal errors are ignored.
pub struct TempUpload {
    file: NamedTempFile,
    mime_type: String,
}

impl TempUpload {
    /// Write an upload into `dir`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub async fn persist(
        dir: &Path,
        upload: UploadedFile,
        fallback_suffix: &'static str,
    ) -> GatewayResult<Self> {
        let suffix = suffix_for(upload.content_type.as_deref(), fallback_suffix);
        let mime_type = detect_mime(&upload.data, upload.content_type.as_deref());
        let dir = dir.to_path_buf();
        let data = upload.data;

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("cs-")
                .suffix(suffix)
                .tempfile_in(&dir)?;
            file.write_all(&data)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| GatewayError::Io(std::io::Error::other(e)))??;

        Ok(Self { file, mime_type })
    }

    /// Path and detected MIME type of the persisted file.
    #[must_use]
    pub fn media(&self) -> MediaRef {
        MediaRef::new(self.file.path(), self.mime_type.clone())
    }
}
