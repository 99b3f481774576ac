use crate::server::{handlers, types::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

pub fn create_router(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health_check))
        .route("/predict", post(handlers::predict))
        .route(
            "/metrics",
            get(move || std::future::ready(metrics_handle.render())),
        )
        .with_state(state)
}
