//! MIME helpers for uploaded media.

/// MIME type used when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Detect the MIME type of uploaded bytes.
///
/// Magic bytes win; otherwise the declared content type is used when it looks
/// like a real type, else `application/octet-stream`.
#[must_use]
pub fn detect_mime(data: &[u8], declared: Option<&str>) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    declared
        .map(essence)
        .filter(|mime| mime.contains('/') && *mime != OCTET_STREAM)
        .map_or_else(|| OCTET_STREAM.to_string(), str::to_string)
}

/// File suffix (with leading dot) for a content type.
///
/// Returns `fallback` for unknown or missing types.
#[must_use]
pub fn suffix_for(content_type: Option<&str>, fallback: &'static str) -> &'static str {
    let Some(content_type) = content_type else {
        return fallback;
    };

    match essence(content_type).to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/heic" => ".heic",
        "image/heif" => ".heif",
        "image/bmp" => ".bmp",
        "image/tiff" => ".tiff",
        "audio/wav" | "audio/x-wav" | "audio/wave" => ".wav",
        "audio/mpeg" | "audio/mp3" => ".mp3",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => ".m4a",
        "audio/aac" => ".aac",
        "audio/ogg" | "audio/opus" => ".ogg",
        "audio/webm" => ".webm",
        "audio/flac" | "audio/x-flac" => ".flac",
        "audio/3gpp" => ".3gp",
        "audio/amr" => ".amr",
        _ => fallback,
    }
}

/// Whether a declared content type is an image type.
#[must_use]
pub fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.trim_start().starts_with("image/"))
}

/// Strip parameters such as `; charset=...` from a content type.
fn essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}
