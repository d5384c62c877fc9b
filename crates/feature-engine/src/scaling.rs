//! Reference-Statistics Scaling

use crate::features::EncodedVector;
use crate::schema::ColumnKind;
use crate::statistics::{ColumnStats, ReferenceStats};
use data_validator::{NormalizationMethod, Normalizer, NEUTRAL};
use tracing::warn;

/// Scaled vector plus the columns that could not be scaled
#[derive(Debug, Clone)]
pub struct ScaleOutcome {
    pub vector: EncodedVector,
    /// Zero-width reference range; emitted as the neutral value
    pub degenerate: Vec<String>,
    /// No reference statistics; passed through unscaled
    pub unscaled: Vec<String>,
}

/// Applies a normalization method to the numeric columns of a vector
pub struct Scaler<'a> {
    stats: &'a ReferenceStats,
    method: NormalizationMethod,
}

impl<'a> Scaler<'a> {
    /// Create a scaler over the given statistics
    pub fn new(stats: &'a ReferenceStats, method: NormalizationMethod) -> Self {
        Self { stats, method }
    }

    /// Min-max scaler
    pub fn min_max(stats: &'a ReferenceStats) -> Self {
        Self::new(stats, NormalizationMethod::MinMax)
    }

    /// Method this scaler applies
    pub fn method(&self) -> NormalizationMethod {
        self.method
    }

    fn normalizer(&self, stats: &ColumnStats) -> Normalizer {
        match self.method {
            NormalizationMethod::MinMax => Normalizer::min_max(stats.min, stats.max),
            NormalizationMethod::ZScore => Normalizer::z_score(stats.mean, stats.std_dev),
            NormalizationMethod::None => Normalizer::identity(),
        }
    }

    /// Scale every numeric column that has reference statistics.
    ///
    /// Indicator columns pass through untouched.
    pub fn apply(&self, vector: &EncodedVector) -> ScaleOutcome {
        let mut degenerate = Vec::new();
        let mut unscaled = Vec::new();

        if self.method == NormalizationMethod::None {
            return ScaleOutcome {
                vector: vector.clone(),
                degenerate,
                unscaled,
            };
        }

        let values = vector
            .iter()
            .map(|(column, value)| {
                if column.kind == ColumnKind::Indicator {
                    return value;
                }
                match self.stats.get(&column.name) {
                    Some(stats) => match self.normalizer(stats).normalize(value) {
                        Ok(scaled) => scaled,
                        Err(e) => {
                            warn!(column = %column.name, error = %e, "Unscalable column, using neutral value");
                            degenerate.push(column.name.clone());
                            NEUTRAL
                        }
                    },
                    None => {
                        unscaled.push(column.name.clone());
                        value
                    }
                }
            })
            .collect();

        if !unscaled.is_empty() {
            warn!(?unscaled, "No reference statistics, passing columns through unscaled");
        }

        ScaleOutcome {
            vector: EncodedVector::from_parts(values, vector.shared_columns()),
            degenerate,
            unscaled,
        }
    }
}

/// Min-max scale the numeric columns of a vector against reference stats
pub fn scale(vector: &EncodedVector, stats: &ReferenceStats) -> EncodedVector {
    Scaler::min_max(stats).apply(vector).vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{encode, RawInput};
    use crate::schema::{FeatureSchema, FieldSpec};
    use proptest::prelude::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(
            "scaled",
            vec![
                FieldSpec::numeric("age"),
                FieldSpec::categorical("gender", &["Male", "Female"]),
                FieldSpec::numeric("bmi"),
            ],
        )
        .unwrap()
    }

    fn stats() -> ReferenceStats {
        ReferenceStats::new()
            .with("age", ColumnStats::from_range(20.0, 80.0))
            .with("bmi", ColumnStats::from_range(10.0, 50.0))
    }

    fn vector(age: f64, bmi: f64) -> EncodedVector {
        let raw = RawInput::new()
            .with("age", age)
            .with("gender", "Female")
            .with("bmi", bmi);
        encode(&raw, &schema()).unwrap()
    }

    #[test]
    fn test_minmax_scaling() {
        let scaled = scale(&vector(50.0, 30.0), &stats());
        assert_eq!(scaled.values(), &[0.5, 0.0, 1.0, 0.5]);
        assert_eq!(scaled.column_names(), schema().column_names());
    }

    #[test]
    fn test_reference_endpoints() {
        assert_eq!(scale(&vector(20.0, 10.0), &stats()).values(), &[0.0, 0.0, 1.0, 0.0]);
        assert_eq!(scale(&vector(80.0, 50.0), &stats()).values(), &[1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_no_clamping() {
        let scaled = scale(&vector(140.0, 10.0), &stats());
        assert_eq!(scaled.values()[0], 2.0);
    }

    #[test]
    fn test_degenerate_column_is_neutral() {
        let stats = ReferenceStats::new()
            .with("age", ColumnStats::from_range(5.0, 5.0))
            .with("bmi", ColumnStats::from_range(10.0, 50.0));
        let outcome = Scaler::min_max(&stats).apply(&vector(5.0, 30.0));
        assert_eq!(outcome.vector.values()[0], 0.0);
        assert!(outcome.vector.values().iter().all(|v| v.is_finite()));
        assert_eq!(outcome.degenerate, vec!["age".to_string()]);
    }

    #[test]
    fn test_missing_stats_pass_through() {
        let outcome = Scaler::min_max(&ReferenceStats::new()).apply(&vector(50.0, 30.0));
        assert_eq!(outcome.vector.values(), &[50.0, 0.0, 1.0, 30.0]);
        assert_eq!(outcome.unscaled, vec!["age".to_string(), "bmi".to_string()]);
    }

    #[test]
    fn test_zscore_scaling() {
        let stats = ReferenceStats::new()
            .with("age", ColumnStats::compute(&[40.0, 60.0]).unwrap())
            .with("bmi", ColumnStats::compute(&[30.0, 30.0]).unwrap());
        let outcome = Scaler::new(&stats, NormalizationMethod::ZScore).apply(&vector(70.0, 30.0));
        assert_eq!(outcome.vector.values(), &[2.0, 0.0, 1.0, 0.0]);
        assert_eq!(outcome.degenerate, vec!["bmi".to_string()]);
    }

    #[test]
    fn test_none_method_is_identity() {
        let original = vector(50.0, 30.0);
        let outcome = Scaler::new(&stats(), NormalizationMethod::None).apply(&original);
        assert_eq!(outcome.vector, original);
    }

    proptest! {
        #[test]
        fn prop_indicators_never_scaled(age in 0.0f64..200.0, bmi in 0.0f64..100.0) {
            let scaled = scale(&vector(age, bmi), &stats());
            prop_assert_eq!(scaled.values()[1], 0.0);
            prop_assert_eq!(scaled.values()[2], 1.0);
        }

        #[test]
        fn prop_in_range_maps_to_unit(age in 20.0f64..=80.0, bmi in 10.0f64..=50.0) {
            let scaled = scale(&vector(age, bmi), &stats());
            for v in [scaled.values()[0], scaled.values()[3]] {
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
