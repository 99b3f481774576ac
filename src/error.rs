use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ndarray::ShapeError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("{0}")]
    Validation(String),

    #[error("Model is unavailable")]
    ModelUnavailable,

    #[error("Model not found at path: {0}")]
    ModelNotFound(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    #[error("Shape error: {0}")]
    ShapeError(#[from] ShapeError),

    #[error("Inference task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl InferenceError {
    pub fn url_required() -> Self {
        InferenceError::Validation("URL is required".to_string())
    }

    /// Short label used for the error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::Validation(_) => "validation",
            InferenceError::ModelUnavailable => "model_unavailable",
            InferenceError::ModelNotFound(_) => "model_not_found",
            InferenceError::InvalidModel(_) => "invalid_model",
            InferenceError::OrtError(_) => "runtime",
            InferenceError::ShapeError(_) => "shape",
            InferenceError::TaskFailed(_) => "task",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            InferenceError::Validation(_) => StatusCode::BAD_REQUEST,
            InferenceError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for InferenceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            InferenceError::Validation(_) | InferenceError::ModelUnavailable => self.to_string(),
            _ => {
                tracing::error!(error = %self, "Inference failed");
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
