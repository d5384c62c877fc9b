//! Classifier Implementations

use crate::InferenceError;
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

/// A trained model behind its predict interface.
///
/// Implementations are immutable once loaded and shared across requests.
pub trait Classifier: Send + Sync {
    /// Number of columns the model consumes
    fn input_width(&self) -> usize;

    /// Class probabilities for one feature vector
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Index of the largest value; ties resolve to the lowest index, NaN is skipped
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (idx, &v)| match best {
            Some((_, top)) if top >= v => best,
            _ => Some((idx, v)),
        })
        .map(|(idx, _)| idx)
}

/// Turn raw model output into class probabilities.
///
/// A single score is P(class 1). Scores that are not already a distribution
/// are passed through softmax.
fn to_probabilities(scores: Vec<f64>) -> Vec<f64> {
    if let [p] = scores[..] {
        let p = p.clamp(0.0, 1.0);
        return vec![1.0 - p, p];
    }

    let in_unit = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let total: f64 = scores.iter().sum();
    if in_unit && (total - 1.0).abs() < 1e-3 {
        return scores;
    }

    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// ONNX classifier executed with tract.
///
/// The model must take a single `f32` input of shape `[1, width]` and
/// produce class scores as its first output.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    input_width: usize,
}

impl OnnxClassifier {
    /// Load and optimize an ONNX model for the given input width.
    ///
    /// Fails when the model's own shapes disagree with the width.
    pub fn load(path: impl AsRef<Path>, input_width: usize) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!(path = %path.display(), input_width, "Loading ONNX model");

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, input_width]).into()))
            .and_then(|model| model.into_typed())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e}", path.display())))?;

        Self::from_typed(model, input_width)
    }

    /// Optimize an already typed model.
    ///
    /// Its first input must be an `f32` fact of shape `[1, input_width]`.
    pub fn from_typed(model: TypedModel, input_width: usize) -> Result<Self, InferenceError> {
        let load_failed = |e: TractError| InferenceError::ModelLoadError(e.to_string());

        let fact = model.input_fact(0).map_err(load_failed)?;
        if fact.datum_type != f32::datum_type() {
            return Err(InferenceError::ModelLoadError(format!(
                "expected f32 input, found {:?}",
                fact.datum_type
            )));
        }
        match fact.shape.as_concrete() {
            Some(&[1, actual]) if actual == input_width => {}
            Some(&[1, actual]) => {
                return Err(InferenceError::InvalidInputShape {
                    expected: input_width,
                    actual,
                })
            }
            _ => {
                return Err(InferenceError::ModelLoadError(format!(
                    "expected input shape [1, {input_width}], found {:?}",
                    fact.shape
                )))
            }
        }
        if model.outputs.is_empty() {
            return Err(InferenceError::ModelLoadError("model declares no outputs".into()));
        }

        let plan = model
            .into_optimized()
            .and_then(|model| model.into_runnable())
            .map_err(load_failed)?;

        info!(input_width, "Model loaded successfully");
        Ok(Self { plan, input_width })
    }
}

impl Classifier for OnnxClassifier {
    fn input_width(&self) -> usize {
        self.input_width
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if features.len() != self.input_width {
            return Err(InferenceError::InvalidInputShape {
                expected: self.input_width,
                actual: features.len(),
            });
        }

        let failed = |e: TractError| InferenceError::InferenceFailed(e.to_string());

        let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[1, self.input_width], &data).map_err(failed)?;
        let outputs = self.plan.run(tvec!(input.into())).map_err(failed)?;
        let scores = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".into()))?
            .to_array_view::<f32>()
            .map_err(failed)?
            .iter()
            .map(|&s| s as f64)
            .collect::<Vec<f64>>();

        debug!(classes = scores.len(), "ONNX inference completed");
        Ok(to_probabilities(scores))
    }
}

/// Fixed-output classifier for development and tests
#[derive(Debug, Clone)]
pub struct MockClassifier {
    input_width: usize,
    probabilities: Vec<f64>,
}

impl MockClassifier {
    /// Always return the given probabilities
    pub fn new(input_width: usize, probabilities: Vec<f64>) -> Self {
        Self {
            input_width,
            probabilities,
        }
    }

    /// Equal probability for every class
    pub fn uniform(input_width: usize, classes: usize) -> Self {
        let p = if classes == 0 { 0.0 } else { 1.0 / classes as f64 };
        Self::new(input_width, vec![p; classes])
    }
}

impl Classifier for MockClassifier {
    fn input_width(&self) -> usize {
        self.input_width
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if features.len() != self.input_width {
            return Err(InferenceError::InvalidInputShape {
                expected: self.input_width,
                actual: features.len(),
            });
        }
        Ok(self.probabilities.clone())
    }
}
