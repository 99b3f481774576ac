use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Installs the global Prometheus recorder and returns the handle `/metrics` renders from.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(
        "phishguard_predictions_total",
        "URLs classified, by prediction"
    );
    metrics::describe_counter!(
        "phishguard_prediction_errors_total",
        "Rejected or failed prediction requests, by kind"
    );
    metrics::describe_histogram!(
        "phishguard_inference_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent classifying a URL"
    );
    metrics::describe_counter!(
        "phishguard_model_downloads_total",
        "Model download attempts, by outcome"
    );

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::counter;

    #[test]
    fn test_tracing_setup_is_repeatable() {
        init_tracing();
        init_tracing();
        tracing::info!("Tracing initialized for test");
    }

    #[test]
    fn test_recorder_renders_recorded_metrics() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            counter!("phishguard_predictions_total", "prediction" => "Phishing").increment(2);
        });

        let output = handle.render();
        assert!(output.contains("phishguard_predictions_total"));
        assert!(output.contains("prediction=\"Phishing\""));
    }
}
