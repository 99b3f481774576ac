pub mod loader;
pub mod predictor;
pub mod provision;

use crate::config::ModelConfig;
use predictor::Predictor;
use provision::{FetchError, ModelProvisioner, Provisioned};
use std::path::Path;
use std::sync::Arc;

/// Provisions and loads the model once at startup.
///
/// Returns `None` when either step fails. The failure is logged here and the service runs
/// in degraded mode. An artifact downloaded by this call that then fails to load is removed,
/// so the next start fetches it again.
pub async fn bootstrap(config: &ModelConfig) -> Option<Arc<dyn Predictor>> {
    let path = Path::new(&config.path);

    let provisioned = match provision(config, path).await {
        Ok(provisioned) => provisioned,
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Failed to provision model");
            return None;
        }
    };

    loader::init_ort();
    let path_owned = path.to_path_buf();
    let intra_threads = config.intra_threads;
    let loaded =
        tokio::task::spawn_blocking(move || loader::load_model(&path_owned, intra_threads)).await;

    match loaded {
        Ok(Ok(model)) => Some(Arc::new(model) as Arc<dyn Predictor>),
        Ok(Err(e)) => {
            tracing::error!(error = %e, path = %path.display(), "Error loading model");
            if let Provisioned::Fetched { .. } = provisioned {
                discard_artifact(path).await;
            }
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Model loading task failed");
            None
        }
    }
}

async fn provision(config: &ModelConfig, path: &Path) -> Result<Provisioned, FetchError> {
    ModelProvisioner::new(config)?
        .ensure_model_present(path, config.remote_id.as_deref())
        .await
}

async fn discard_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::warn!(path = %path.display(), "Removed unusable downloaded model"),
        Err(e) => tracing::warn!(error = %e, path = %path.display(), "Failed to remove unusable model"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_without_model_or_remote_id() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelConfig {
            path: dir.path().join("model.onnx").display().to_string(),
            remote_id: None,
            ..ModelConfig::default()
        };

        assert!(bootstrap(&config).await.is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_keeps_corrupt_cached_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"not a model").unwrap();
        let config = ModelConfig {
            path: path.display().to_string(),
            ..ModelConfig::default()
        };

        assert!(bootstrap(&config).await.is_none());
        // Only freshly downloaded artifacts are discarded.
        assert!(path.exists());
    }
}
