use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::service::ServiceError;

/// HTTP-facing error: a status code plus a `{"error": ...}` body. Store
/// failures are logged and reported as an opaque 500.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::MissingField(_) | ServiceError::Validation(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            ServiceError::Unauthorized => {
                ApiError::new(StatusCode::FORBIDDEN, "Unauthorized")
            }
            ServiceError::Store(e) => {
                error!(error = %e, "store failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
