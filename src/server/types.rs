use crate::model::predictor::{Predictor, Verdict};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared Application State
///
/// Built once at startup and never mutated afterwards. `model` is `None` when the
/// model could not be provisioned or loaded.
#[derive(Clone, Default)]
pub struct AppState {
    pub model: Option<Arc<dyn Predictor>>,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn Predictor>>) -> Self {
        Self { model }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }
}

// --- DTOs (Data Transfer Objects) ---

#[derive(Deserialize, Debug)]
pub struct PredictRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct PredictResponse {
    pub url: String,
    pub prediction: Verdict,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}
