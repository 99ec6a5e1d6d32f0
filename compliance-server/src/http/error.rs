//! Mapping of engine errors onto HTTP responses

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use compliance_training::TrainingError;
use serde::{Deserialize, Serialize};

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}

/// Handler error wrapping a [`TrainingError`]
#[derive(Debug)]
pub struct ApiError(pub TrainingError);

impl From<TrainingError> for ApiError {
    fn from(err: TrainingError) -> Self {
        Self(err)
    }
}

/// Undecodable request bodies are validation failures
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(TrainingError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self.0 {
            TrainingError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            TrainingError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            TrainingError::Persistence(err) => {
                // Storage detail stays in the logs
                tracing::error!(error = %err, "training store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
