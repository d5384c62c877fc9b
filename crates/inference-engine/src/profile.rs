//! Model Profiles
//!
//! A profile pairs a form schema with the classes its model predicts and
//! the scaling the model was trained with.

use crate::InferenceError;
use feature_engine::{catalog, FeatureSchema, NormalizationMethod};
use serde::{Deserialize, Serialize};

/// One output class of a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassLabel {
    /// Short code, e.g. "AD"
    pub code: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ClassLabel {
    pub fn new(code: &str, name: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Everything needed to turn a form into a diagnosis for one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelProfile {
    pub name: String,
    pub title: String,
    pub schema: FeatureSchema,
    /// Classes in model output order
    pub classes: Vec<ClassLabel>,
    /// Scaling applied to the vector before it reaches the model
    pub model_scaling: NormalizationMethod,
}

impl ModelProfile {
    /// Create a profile whose model consumes unscaled vectors
    pub fn new(name: &str, title: &str, schema: FeatureSchema, classes: Vec<ClassLabel>) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            schema,
            classes,
            model_scaling: NormalizationMethod::None,
        }
    }

    /// Set the scaling the model expects
    pub fn with_scaling(mut self, method: NormalizationMethod) -> Self {
        self.model_scaling = method;
        self
    }

    /// Class at a model output index
    pub fn class(&self, index: usize) -> Option<&ClassLabel> {
        self.classes.get(index)
    }

    /// Names of the built-in profiles
    pub fn builtin_names() -> &'static [&'static str] {
        catalog::names()
    }

    /// Look up a built-in profile
    pub fn builtin(name: &str) -> Result<Self, InferenceError> {
        let schema = catalog::by_name(name)
            .ok_or_else(|| InferenceError::UnknownProfile(name.to_string()))??;

        let profile = match name {
            "diabetes" => Self::new(
                name,
                "Diabetes Prediction",
                schema,
                vec![
                    ClassLabel::new("0", "Not diabetic", "The person is not diabetic"),
                    ClassLabel::new("1", "Diabetic", "The person is diabetic"),
                ],
            ),
            "heart" => Self::new(
                name,
                "Heart Disease Prediction",
                schema,
                vec![
                    ClassLabel::new("0", "No risk", "The person does not have a risk of heart disease"),
                    ClassLabel::new("1", "At risk", "The person has a risk of heart disease"),
                ],
            ),
            "liver" => Self::new(
                name,
                "Liver Disease Prediction",
                schema,
                vec![
                    ClassLabel::new("0", "No liver disease", "The person is not likely to have liver disease"),
                    ClassLabel::new("1", "Liver disease", "The person is likely to have liver disease"),
                ],
            ),
            "parkinsons" => Self::new(
                name,
                "Parkinson's Disease Prediction",
                schema,
                vec![
                    ClassLabel::new("0", "Healthy", "The person does not have Parkinson's disease"),
                    ClassLabel::new("1", "Parkinson's", "The person has Parkinson's disease"),
                ],
            ),
            "kidney" => Self::new(
                name,
                "Chronic Kidney Disease Prediction",
                schema,
                vec![
                    ClassLabel::new("0", "Not at risk", "You are not at risk of CKD."),
                    ClassLabel::new(
                        "1",
                        "At risk",
                        "You might be at risk of CKD. Check with your doctor.",
                    ),
                ],
            ),
            "alzheimer" => Self::new(
                name,
                "Alzheimer's Disease Prediction",
                schema,
                vec![
                    ClassLabel::new(
                        "AD",
                        "Alzheimer's Disease",
                        "The individual's data aligns with characteristics commonly associated \
                         with Alzheimer's disease, a progressive neurodegenerative disorder that \
                         affects memory and cognitive functions.",
                    ),
                    ClassLabel::new(
                        "CN",
                        "Cognitively Normal",
                        "The individual has normal cognitive functioning without significant \
                         impairments.",
                    ),
                    ClassLabel::new(
                        "LMCI",
                        "Late Mild Cognitive Impairment",
                        "The individual is in a stage of mild cognitive impairment that is \
                         progressing towards Alzheimer's disease.",
                    ),
                ],
            ),
            "breast_cancer" => Self::new(
                name,
                "Breast Cancer Prediction",
                schema,
                vec![
                    ClassLabel::new("0", "Benign", "The tumour is predicted to be benign"),
                    ClassLabel::new("1", "Malignant", "The tumour is predicted to be malignant"),
                ],
            )
            .with_scaling(NormalizationMethod::ZScore),
            other => return Err(InferenceError::UnknownProfile(other.to_string())),
        };

        Ok(profile)
    }
}
