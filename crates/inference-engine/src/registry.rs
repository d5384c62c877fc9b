//! Model Registry
//!
//! Builds one [`InferenceEngine`] per configured model at startup.

use crate::engine::InferenceEngine;
use crate::model::{Classifier, MockClassifier, OnnxClassifier};
use crate::profile::{ClassLabel, ModelProfile};
use crate::InferenceError;
use feature_engine::{FeatureSchema, NormalizationMethod, ReferenceStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Configuration of one served model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Name the model is served under
    pub name: String,
    /// Built-in profile; defaults to `name`
    #[serde(default)]
    pub profile: Option<String>,
    /// JSON schema file replacing the built-in form
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
    /// Class labels; required with `schema_path`, overrides built-ins otherwise
    #[serde(default)]
    pub classes: Vec<ClassLabel>,
    /// Override of the scaling applied before the model
    #[serde(default)]
    pub scaling: Option<NormalizationMethod>,
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// CSV reference dataset for scaling and chart values
    #[serde(default)]
    pub reference_data: Option<PathBuf>,
    /// Dataset columns left out of the statistics (ids, targets)
    #[serde(default)]
    pub reference_exclude: Vec<String>,
    /// Serve a uniform mock classifier instead of an ONNX model
    #[serde(default)]
    pub mock: bool,
}

impl ModelConfig {
    /// Mock-backed config for a built-in profile
    pub fn mock(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mock: true,
            ..Default::default()
        }
    }

    fn resolve_profile(&self) -> Result<ModelProfile, InferenceError> {
        let mut profile = match &self.schema_path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    InferenceError::ModelLoadError(format!("{}: {e}", path.display()))
                })?;
                let schema: FeatureSchema = serde_json::from_str(&text).map_err(|e| {
                    InferenceError::ModelLoadError(format!("{}: {e}", path.display()))
                })?;
                if self.classes.is_empty() {
                    return Err(InferenceError::ModelLoadError(format!(
                        "model {} uses a custom schema but declares no classes",
                        self.name
                    )));
                }
                let title = schema.name().to_string();
                ModelProfile::new(&self.name, &title, schema, self.classes.clone())
            }
            None => {
                let key = self.profile.as_deref().unwrap_or(&self.name);
                let mut profile = ModelProfile::builtin(key)?;
                profile.name = self.name.clone();
                if !self.classes.is_empty() {
                    profile.classes = self.classes.clone();
                }
                profile
            }
        };

        if let Some(method) = self.scaling {
            profile.model_scaling = method;
        }
        Ok(profile)
    }

    /// Build the engine this config describes
    pub fn build(&self) -> Result<InferenceEngine, InferenceError> {
        let mut profile = self.resolve_profile()?;

        let stats = match &self.reference_data {
            Some(path) => {
                let exclude: Vec<&str> = self.reference_exclude.iter().map(String::as_str).collect();
                ReferenceStats::load_or_empty(path, &exclude)
            }
            None => ReferenceStats::new(),
        };
        profile.schema = profile.schema.with_reference_defaults(&stats);

        let width = profile.schema.width();
        let classifier: Box<dyn Classifier> = match (&self.model_path, self.mock) {
            (_, true) => Box::new(MockClassifier::uniform(width, profile.classes.len())),
            (Some(path), false) => Box::new(OnnxClassifier::load(path, width)?),
            (None, false) => {
                return Err(InferenceError::ModelLoadError(format!(
                    "model {} has no model_path and mock is disabled",
                    self.name
                )))
            }
        };

        InferenceEngine::init(profile, classifier, stats)
    }
}

/// Engines by served name, immutable after load
#[derive(Debug, Default)]
pub struct ModelRegistry {
    engines: BTreeMap<String, InferenceEngine>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every configured model; any failure aborts startup
    pub fn load(configs: &[ModelConfig]) -> Result<Self, InferenceError> {
        let mut registry = Self::new();
        for config in configs {
            registry.insert(&config.name, config.build()?);
        }
        info!(models = registry.len(), "Model registry loaded");
        Ok(registry)
    }

    pub fn insert(&mut self, name: &str, engine: InferenceEngine) {
        self.engines.insert(name.to_string(), engine);
    }

    pub fn get(&self, name: &str) -> Option<&InferenceEngine> {
        self.engines.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InferenceEngine)> {
        self.engines.iter().map(|(name, engine)| (name.as_str(), engine))
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
