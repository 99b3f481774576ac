use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

use crate::error::InferenceError;
use crate::model::predictor::{Predictor, Verdict};
use crate::preprocessing::url::extract_features;
use crate::server::types::*;

pub const HOME_MESSAGE: &str = "Phishing Detection API is Running!";

pub async fn home() -> &'static str {
    HOME_MESSAGE
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model_loaded = state.model_loaded();
    Json(HealthResponse {
        status: if model_loaded { "ok" } else { "degraded" },
        model_loaded,
    })
}

/// Classifies a single URL against the bound model.
///
/// Input is validated before model availability, so an empty URL is a validation
/// error even while the service is degraded.
pub fn classify_url(
    model: Option<&dyn Predictor>,
    url: Option<&str>,
) -> Result<Verdict, InferenceError> {
    let url = url
        .filter(|url| !url.is_empty())
        .ok_or_else(InferenceError::url_required)?;
    let model = model.ok_or(InferenceError::ModelUnavailable)?;

    let row = extract_features(url).to_row()?;
    let labels = model.predict(row.view())?;

    Ok(Verdict::from_label(labels.first().copied()))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, InferenceError> {
    let start = Instant::now();
    let result = match payload {
        Ok(Json(request)) => classify_request(state, request).await,
        Err(rejection) => Err(InferenceError::Validation(rejection.body_text())),
    };

    match result {
        Ok((url, verdict)) => {
            histogram!("phishguard_inference_duration_seconds")
                .record(start.elapsed().as_secs_f64());
            counter!("phishguard_predictions_total", "prediction" => verdict.as_str())
                .increment(1);
            tracing::debug!(url = %url, prediction = verdict.as_str(), "Classified URL");

            Ok(Json(PredictResponse {
                url,
                prediction: verdict,
            }))
        }
        Err(e) => {
            counter!("phishguard_prediction_errors_total", "kind" => e.kind()).increment(1);
            Err(e)
        }
    }
}

/// Runs the session on the blocking pool so waiting on the model lock never stalls a
/// runtime worker.
async fn classify_request(
    state: Arc<AppState>,
    request: PredictRequest,
) -> Result<(String, Verdict), InferenceError> {
    let url = request.url.unwrap_or_default();
    tokio::task::spawn_blocking(move || {
        let verdict = classify_url(state.model.as_deref(), Some(url.as_str()))?;
        Ok((url, verdict))
    })
    .await?
}
