use crate::error::InferenceError;
use crate::model::predictor::OnnxClassifier;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;

/// Output name skl2onnx gives to the predicted class.
const LABEL_OUTPUT_NAME: &str = "output_label";

/// Names the global ONNX Runtime environment. Sessions fall back to a default environment
/// when this is never called.
pub fn init_ort() {
    let _ = ort::init().with_name("phishguard").commit();
}

fn build_session(path: &Path, intra_threads: usize) -> ort::Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads.max(1))?
        .commit_from_file(path)?;
    Ok(session)
}

/// Loads a serialized classifier from disk.
///
/// # Arguments
/// * `model_path` - Path to the .onnx file
/// * `intra_threads` - Threads used within a single operator
pub fn load_model(
    model_path: impl AsRef<Path>,
    intra_threads: usize,
) -> Result<OnnxClassifier, InferenceError> {
    let path = model_path.as_ref();
    if !path.exists() {
        return Err(InferenceError::ModelNotFound(path.display().to_string()));
    }

    let session = build_session(path, intra_threads)?;

    let input_name = session
        .inputs
        .first()
        .map(|input| input.name.clone())
        .ok_or_else(|| InferenceError::InvalidModel("model declares no inputs".to_string()))?;

    let label_output = session
        .outputs
        .iter()
        .find(|output| output.name == LABEL_OUTPUT_NAME)
        .or_else(|| session.outputs.first())
        .map(|output| output.name.clone())
        .ok_or_else(|| InferenceError::InvalidModel("model declares no outputs".to_string()))?;

    tracing::info!(
        path = %path.display(),
        input = %input_name,
        output = %label_output,
        "Loaded model"
    );
    for (i, input) in session.inputs.iter().enumerate() {
        tracing::debug!(index = i, name = %input.name, input_type = ?input.input_type, "Model input");
    }

    Ok(OnnxClassifier::new(session, input_name, label_output))
}
