use crate::error::InferenceError;
use ndarray::ArrayView2;
use ort::{
    session::Session,
    value::{DynValue, Value},
};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// A loaded classifier. Implementations must be usable from many request tasks at once.
pub trait Predictor: Send + Sync {
    /// Predicts one numeric label per input row.
    fn predict(&self, rows: ArrayView2<'_, f32>) -> Result<Vec<i64>, InferenceError>;
}

/// Label returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Phishing,
    Legitimate,
}

impl Verdict {
    /// `1` means phishing. Anything else, including no output at all, is legitimate.
    pub fn from_label(label: Option<i64>) -> Self {
        match label {
            Some(1) => Verdict::Phishing,
            _ => Verdict::Legitimate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Phishing => "Phishing",
            Verdict::Legitimate => "Legitimate",
        }
    }
}

/// Classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so concurrent requests serialize on the mutex.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    label_output: String,
}

impl OnnxClassifier {
    pub fn new(session: Session, input_name: String, label_output: String) -> Self {
        Self {
            session: Mutex::new(session),
            input_name,
            label_output,
        }
    }
}

impl Predictor for OnnxClassifier {
    fn predict(&self, rows: ArrayView2<'_, f32>) -> Result<Vec<i64>, InferenceError> {
        let shape = rows.shape().to_vec();
        let data: Box<[f32]> = rows.iter().copied().collect();
        let input_value = Value::from_array((shape, data))?;

        // A panic mid-run leaves the session itself intact.
        let mut session_guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let outputs =
            session_guard.run(ort::inputs![self.input_name.as_str() => input_value])?;

        labels_from_output(&outputs[self.label_output.as_str()])
    }
}

/// skl2onnx emits int64 labels. Some converters emit float labels instead.
fn labels_from_output(output: &DynValue) -> Result<Vec<i64>, InferenceError> {
    if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
        return Ok(labels.to_vec());
    }
    let (_, labels) = output.try_extract_tensor::<f32>()?;
    Ok(labels.iter().copied().map(float_label).collect())
}

/// Whole numbers keep their value. Anything else is never a class, so it becomes `0`.
fn float_label(label: f32) -> i64 {
    if label.is_finite() && label.fract() == 0.0 {
        label as i64
    } else {
        0
    }
}
