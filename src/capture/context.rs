//! Per-request analysis inputs.

use std::path::PathBuf;

/// A media file on disk together with its detected MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaRef {
    /// Location of the bytes.
    pub path: PathBuf,
    /// Detected MIME type.
    pub mime_type: String,
}

impl MediaRef {
    /// Create a media reference.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Inputs of one analysis call.
///
/// Built by the request handler, consumed once by the analyzer and dropped
/// with the request.
#[derive(Clone, Debug, Default)]
pub struct AnalysisContext {
    /// Optional photo.
    pub image: Option<MediaRef>,
    /// Typed note.
    pub note: String,
    /// Voice transcript.
    pub transcript: String,
    /// Caller-supplied "now" reference, used verbatim.
    pub now_utc: Option<String>,
    /// Existing collections as free text, one or more per line.
    pub existing_collections: String,
}
