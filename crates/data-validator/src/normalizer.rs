//! Scalar Normalization against Reference Statistics

use crate::error::ScalingDegenerate;
use serde::{Deserialize, Serialize};

/// Value emitted for columns that cannot be scaled
pub const NEUTRAL: f64 = 0.0;

/// Normalization method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMethod {
    /// Standard score using the reference mean and population std dev
    ZScore,
    /// Min-max normalization to [0, 1]
    MinMax,
    /// No normalization
    #[default]
    None,
}

/// Normalizer for a single column, built from its reference statistics
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    method: NormalizationMethod,
    /// Lower anchor (min, or mean for z-score)
    lower: f64,
    /// Upper anchor (max, or std dev for z-score)
    upper: f64,
}

impl Normalizer {
    /// Min-max normalizer over an observed [min, max] range
    pub fn min_max(min: f64, max: f64) -> Self {
        Self {
            method: NormalizationMethod::MinMax,
            lower: min,
            upper: max,
        }
    }

    /// Z-score normalizer from a mean and standard deviation
    pub fn z_score(mean: f64, std_dev: f64) -> Self {
        Self {
            method: NormalizationMethod::ZScore,
            lower: mean,
            upper: std_dev,
        }
    }

    /// Pass-through normalizer
    pub fn identity() -> Self {
        Self {
            method: NormalizationMethod::None,
            lower: 0.0,
            upper: 1.0,
        }
    }

    /// Method this normalizer applies
    pub fn method(&self) -> NormalizationMethod {
        self.method
    }

    /// Normalize a value.
    ///
    /// Values outside the reference range map outside [0, 1]; no clamping.
    pub fn normalize(&self, value: f64) -> Result<f64, ScalingDegenerate> {
        match self.method {
            NormalizationMethod::MinMax => {
                let range = self.upper - self.lower;
                if range == 0.0 || !range.is_finite() {
                    return Err(ScalingDegenerate {
                        lower: self.lower,
                        upper: self.upper,
                    });
                }
                Ok((value - self.lower) / range)
            }
            NormalizationMethod::ZScore => {
                if self.upper <= 0.0 || !self.upper.is_finite() {
                    return Err(ScalingDegenerate {
                        lower: self.lower,
                        upper: self.lower,
                    });
                }
                Ok((value - self.lower) / self.upper)
            }
            NormalizationMethod::None => Ok(value),
        }
    }
}
