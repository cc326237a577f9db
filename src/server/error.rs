//! HTTP mapping for [`GatewayError`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::GatewayError;

impl GatewayError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Provider(_) | Self::Upstream(_) | Self::EmptyResponse | Self::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Config(_) | Self::Parse(_) | Self::Json(_) | Self::Io(_) | Self::Url(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
