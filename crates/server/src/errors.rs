use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::ModelError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

pub const NOT_FOUND_MESSAGE: &str = "Pokemon not found";
pub const INVALID_PATCH_MESSAGE: &str = "Invalid update payload";
pub const INVALID_BODY_MESSAGE: &str = "Invalid JSON body";

/// Error answered to HTTP clients as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.message}))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(_) => ApiError::not_found(),
            ServiceError::Model(ModelError::Validation(msg)) => ApiError::bad_request(msg),
            ServiceError::Model(ModelError::InvalidPatch(_)) => {
                ApiError::bad_request(INVALID_PATCH_MESSAGE)
            }
            ServiceError::Storage(msg) => {
                error!(error = %msg, "catalog storage failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("catalog load failed: {0}")]
    Catalog(#[from] ServiceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
