//! Inference Engine Implementation

use crate::model::{argmax, Classifier, MockClassifier};
use crate::profile::ModelProfile;
use crate::InferenceError;
use feature_engine::{
    EncodedVector, FeatureSchema, RawInput, ReferenceStats, ScaleOutcome, Scaler, ValidationError,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Prediction result from inference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Profile that produced the prediction
    pub model: String,
    /// Index of the predicted class in model output order
    pub class_index: usize,
    pub code: String,
    pub label: String,
    pub description: String,
    /// Probability of the predicted class (0.0 to 1.0)
    pub confidence: f64,
    /// Probabilities for each class
    pub probabilities: Vec<f64>,
    /// Timestamp when prediction was made
    pub timestamp_ms: u64,
}

/// Result of inference operation
#[derive(Debug, Clone, Serialize)]
pub struct InferenceResult {
    pub prediction: Prediction,
    /// Inference latency in milliseconds
    pub latency_ms: u64,
}

/// Owned context for one model: schema, classifier and reference stats.
///
/// Built once at startup and read-only afterwards, so a shared reference
/// can serve concurrent requests.
pub struct InferenceEngine {
    profile: ModelProfile,
    classifier: Box<dyn Classifier>,
    stats: ReferenceStats,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("profile", &self.profile.name)
            .field("input_width", &self.classifier.input_width())
            .field("reference_columns", &self.stats.len())
            .finish()
    }
}

impl InferenceEngine {
    /// Assemble an engine, failing if the schema does not produce the
    /// vector width the classifier consumes
    pub fn init(
        profile: ModelProfile,
        classifier: Box<dyn Classifier>,
        stats: ReferenceStats,
    ) -> Result<Self, InferenceError> {
        profile.schema.ensure_width(classifier.input_width())?;

        if stats.is_empty() {
            warn!(model = %profile.name, "No reference statistics, vectors will not be scaled");
        }

        info!(
            model = %profile.name,
            columns = profile.schema.width(),
            classes = profile.classes.len(),
            scaling = ?profile.model_scaling,
            "Inference engine ready"
        );

        Ok(Self {
            profile,
            classifier,
            stats,
        })
    }

    /// Engine backed by a uniform mock classifier
    pub fn mock(profile: ModelProfile, stats: ReferenceStats) -> Result<Self, InferenceError> {
        info!(model = %profile.name, "Creating mock inference engine");
        let classifier = MockClassifier::uniform(profile.schema.width(), profile.classes.len());
        Self::init(profile, Box::new(classifier), stats)
    }

    pub fn profile(&self) -> &ModelProfile {
        &self.profile
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.profile.schema
    }

    pub fn stats(&self) -> &ReferenceStats {
        &self.stats
    }

    /// Validate and encode a form into the unscaled model vector
    pub fn encode(&self, raw: &RawInput) -> Result<EncodedVector, ValidationError> {
        self.profile.schema.encode(raw)
    }

    /// Encode a form and apply the scaling the model was trained with
    pub fn model_input(&self, raw: &RawInput) -> Result<EncodedVector, ValidationError> {
        let encoded = self.encode(raw)?;
        Ok(Scaler::new(&self.stats, self.profile.model_scaling)
            .apply(&encoded)
            .vector)
    }

    /// Encode a form and min-max scale it against the reference dataset,
    /// for charting next to the population
    pub fn chart_values(&self, raw: &RawInput) -> Result<ScaleOutcome, ValidationError> {
        let encoded = self.encode(raw)?;
        Ok(Scaler::min_max(&self.stats).apply(&encoded))
    }

    /// Run the full pipeline: encode, scale, classify
    pub fn predict(&self, raw: &RawInput) -> Result<InferenceResult, InferenceError> {
        let start = std::time::Instant::now();

        let input = self.model_input(raw)?;
        let probabilities = self.classifier.predict_proba(input.values())?;

        if probabilities.len() != self.profile.classes.len() {
            return Err(InferenceError::ClassCountMismatch {
                model: self.profile.name.clone(),
                expected: self.profile.classes.len(),
                actual: probabilities.len(),
            });
        }

        let class_index = argmax(&probabilities)
            .ok_or_else(|| InferenceError::InferenceFailed("model returned no class scores".into()))?;
        let class = &self.profile.classes[class_index];

        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let prediction = Prediction {
            model: self.profile.name.clone(),
            class_index,
            code: class.code.clone(),
            label: class.name.clone(),
            description: class.description.clone(),
            confidence: probabilities[class_index],
            probabilities,
            timestamp_ms,
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(model = %self.profile.name, class = %prediction.code, latency_ms, "Inference completed");

        Ok(InferenceResult {
            prediction,
            latency_ms,
        })
    }
}
