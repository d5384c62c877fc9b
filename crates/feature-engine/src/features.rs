//! Feature Vector Assembly

use crate::schema::{Column, FeatureSchema, FieldKind, FieldSpec};
use data_validator::{
    coerce_number, match_category, match_choice, validate_range, RawValue, ValidationError,
    ValidationResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Raw field values of one form submission, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput {
    values: BTreeMap<String, RawValue>,
}

impl RawInput {
    /// Create an empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value
    pub fn insert(&mut self, name: &str, value: impl Into<RawValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Builder form of [`RawInput::insert`]
    pub fn with(mut self, name: &str, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of a field, treating blank text as absent
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name).filter(|v| !v.is_blank())
    }

    /// Number of supplied fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing was supplied
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Supplied field names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Fixed-order numeric vector ready for a model's predict call
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector {
    values: Vec<f64>,
    columns: Arc<[Column]>,
}

impl EncodedVector {
    pub(crate) fn from_parts(values: Vec<f64>, columns: Arc<[Column]>) -> Self {
        debug_assert_eq!(values.len(), columns.len());
        Self { values, columns }
    }

    /// Feature values in column order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Column descriptions, parallel to [`EncodedVector::values`]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn shared_columns(&self) -> Arc<[Column]> {
        Arc::clone(&self.columns)
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Value of a named column
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .map(|idx| self.values[idx])
    }

    /// (column, value) pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&Column, f64)> {
        self.columns.iter().zip(self.values.iter().copied())
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the vector has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take the values, dropping column metadata
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Encode raw input against a schema.
///
/// Numeric fields map 1:1; categorical fields expand to one indicator per
/// declared category; binary fields map to a single 0/1 column. Stops at the
/// first invalid field.
pub fn encode(raw: &RawInput, schema: &FeatureSchema) -> Result<EncodedVector, ValidationError> {
    let mut values = Vec::with_capacity(schema.width());
    for field in schema.fields() {
        encode_field(field, raw, &mut values)?;
    }

    let ignored: Vec<&str> = raw.keys().filter(|k| schema.field(k).is_none()).collect();
    if !ignored.is_empty() {
        debug!(schema = schema.name(), ?ignored, "Ignoring fields not in schema");
    }

    debug!(schema = schema.name(), width = values.len(), "Encoded feature vector");
    Ok(EncodedVector::from_parts(values, schema.shared_columns()))
}

fn encode_field(
    field: &FieldSpec,
    raw: &RawInput,
    out: &mut Vec<f64>,
) -> Result<(), ValidationError> {
    let name = field.name.as_str();
    let value = raw.get(name);

    match &field.kind {
        FieldKind::Numeric {
            bounds,
            default,
            choices,
        } => {
            let number = match (value, default) {
                (Some(v), _) => coerce_number(name, v)?,
                (None, Some(d)) => *d,
                (None, None) => return Err(ValidationError::MissingField(name.to_string())),
            };
            if let Some(b) = bounds {
                validate_range(name, number, *b)?;
            }
            if let Some(codes) = choices {
                match_choice(name, number, codes)?;
            }
            out.push(number);
        }
        FieldKind::Categorical { categories, .. } => {
            let v = value.ok_or_else(|| ValidationError::MissingField(name.to_string()))?;
            let selected = match_category(name, v, categories.as_slice())?;
            out.extend((0..categories.len()).map(|i| if i == selected { 1.0 } else { 0.0 }));
        }
        FieldKind::Binary { positive, negative } => {
            let v = value.ok_or_else(|| ValidationError::MissingField(name.to_string()))?;
            let selected = match_category(name, v, &[negative, positive])?;
            out.push(selected as f64);
        }
    }
    Ok(())
}

impl FeatureSchema {
    /// Encode raw input against this schema
    pub fn encode(&self, raw: &RawInput) -> Result<EncodedVector, ValidationError> {
        encode(raw, self)
    }

    /// Check every field, collecting all errors instead of stopping at the first
    pub fn validate(&self, raw: &RawInput) -> ValidationResult {
        let mut scratch = Vec::with_capacity(self.width());
        let errors = self
            .fields()
            .iter()
            .filter_map(|field| encode_field(field, raw, &mut scratch).err())
            .collect();
        ValidationResult::from_errors(errors, self.fields().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> FeatureSchema {
        FeatureSchema::new(
            "sample",
            vec![
                FieldSpec::numeric("age"),
                FieldSpec::categorical("gender", &["Male", "Female"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_example() {
        let raw = RawInput::new().with("age", 45.0).with("gender", "Female");
        let vector = encode(&raw, &sample()).unwrap();
        assert_eq!(vector.values(), &[45.0, 0.0, 1.0]);
        assert_eq!(vector.get("gender_Female"), Some(1.0));
    }

    #[test]
    fn test_unknown_category() {
        let raw = RawInput::new().with("age", 45.0).with("gender", "Other");
        let err = encode(&raw, &sample()).unwrap_err();
        assert_eq!(err.field(), "gender");
        assert!(matches!(err, ValidationError::UnknownCategory { .. }));
    }

    #[test]
    fn test_malformed_number() {
        let raw = RawInput::new().with("age", "abc").with("gender", "Male");
        let err = encode(&raw, &sample()).unwrap_err();
        assert_eq!(err.field(), "age");
        assert!(matches!(err, ValidationError::InvalidNumber { .. }));
    }

    #[test]
    fn test_numeric_text_is_coerced() {
        let raw = RawInput::new().with("age", " 61.5 ").with("gender", "Male");
        assert_eq!(encode(&raw, &sample()).unwrap().values(), &[61.5, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_field() {
        let raw = RawInput::new().with("gender", "Male");
        assert_eq!(
            encode(&raw, &sample()).unwrap_err(),
            ValidationError::MissingField("age".into())
        );

        let raw = RawInput::new().with("age", "").with("gender", "Male");
        assert_eq!(
            encode(&raw, &sample()).unwrap_err(),
            ValidationError::MissingField("age".into())
        );
    }

    #[test]
    fn test_default_fills_missing_numeric() {
        let schema = FeatureSchema::new(
            "defaults",
            vec![FieldSpec::numeric("education").at_least(0.0).with_default(12.0)],
        )
        .unwrap();
        assert_eq!(encode(&RawInput::new(), &schema).unwrap().values(), &[12.0]);
    }

    #[test]
    fn test_out_of_range() {
        let schema = FeatureSchema::new(
            "bounded",
            vec![FieldSpec::numeric("mmse").bounded(0.0, 30.0)],
        )
        .unwrap();
        let err = encode(&RawInput::new().with("mmse", 31.0), &schema).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_binary_field() {
        let schema = FeatureSchema::new(
            "liver",
            vec![FieldSpec::binary("Gender", "Male", "Female")],
        )
        .unwrap();
        let male = RawInput::new().with("Gender", "Male");
        assert_eq!(encode(&male, &schema).unwrap().values(), &[1.0]);
        let female = RawInput::new().with("Gender", "Female");
        assert_eq!(encode(&female, &schema).unwrap().values(), &[0.0]);
        assert!(encode(&RawInput::new().with("Gender", "x"), &schema).is_err());
    }

    #[test]
    fn test_coded_field_rejects_fractional_codes() {
        let schema = FeatureSchema::new(
            "coded",
            vec![FieldSpec::numeric("cp").coded(&[0.0, 1.0, 2.0, 3.0])],
        )
        .unwrap();
        assert_eq!(encode(&RawInput::new().with("cp", 2.0), &schema).unwrap().values(), &[2.0]);
        assert_eq!(encode(&RawInput::new().with("cp", "3"), &schema).unwrap().values(), &[3.0]);

        let err = encode(&RawInput::new().with("cp", 2.7), &schema).unwrap_err();
        assert_eq!(err.field(), "cp");
        assert!(matches!(err, ValidationError::InvalidChoice { .. }));
        assert!(matches!(
            encode(&RawInput::new().with("cp", 4.0), &schema),
            Err(ValidationError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_null_uses_default() {
        let schema = FeatureSchema::new(
            "defaults",
            vec![FieldSpec::numeric("su").coded(&[0.0, 1.0]).with_default(0.0)],
        )
        .unwrap();
        let raw: RawInput = serde_json::from_str(r#"{"su": null}"#).unwrap();
        assert_eq!(encode(&raw, &schema).unwrap().values(), &[0.0]);
    }

    #[test]
    fn test_bool_selects_binary_label() {
        let schema = FeatureSchema::new(
            "genotype",
            vec![FieldSpec::binary("imputed_genotype", "True", "False")],
        )
        .unwrap();
        let raw: RawInput = serde_json::from_str(r#"{"imputed_genotype": true}"#).unwrap();
        assert_eq!(encode(&raw, &schema).unwrap().values(), &[1.0]);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let raw = RawInput::new()
            .with("age", 30.0)
            .with("gender", "Male")
            .with("notes", "free text");
        assert_eq!(encode(&raw, &sample()).unwrap().len(), 3);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let raw = RawInput::new().with("age", "abc").with("gender", "Other");
        let result = sample().validate(&raw);
        assert!(!result.valid);
        assert_eq!(result.failed_fields(), vec!["age", "gender"]);
        assert_eq!(result.fields_checked, 2);

        let raw = RawInput::new().with("age", 3.0).with("gender", "Male");
        assert!(sample().validate(&raw).valid);
    }

    #[test]
    fn test_raw_input_from_json() {
        let raw: RawInput = serde_json::from_str(r#"{"age": 45, "gender": "Female"}"#).unwrap();
        assert_eq!(encode(&raw, &sample()).unwrap().values(), &[45.0, 0.0, 1.0]);
    }

    fn wide_schema() -> FeatureSchema {
        FeatureSchema::new(
            "wide",
            vec![
                FieldSpec::numeric("a"),
                FieldSpec::categorical("b", &["x", "y", "z"]),
                FieldSpec::numeric("c"),
                FieldSpec::categorical("d", &["p", "q"]),
                FieldSpec::binary("e", "yes", "no"),
            ],
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn prop_length_is_fixed(
            a in -1e6f64..1e6,
            c in -1e6f64..1e6,
            b in 0usize..3,
            d in 0usize..2,
            e in any::<bool>(),
        ) {
            let schema = wide_schema();
            let raw = RawInput::new()
                .with("a", a)
                .with("b", ["x", "y", "z"][b])
                .with("c", c)
                .with("d", ["p", "q"][d])
                .with("e", if e { "yes" } else { "no" });
            let vector = encode(&raw, &schema).unwrap();
            prop_assert_eq!(vector.len(), schema.width());
            prop_assert_eq!(vector.len(), 8);
        }

        #[test]
        fn prop_one_hot_position(b in 0usize..3, d in 0usize..2) {
            let schema = wide_schema();
            let raw = RawInput::new()
                .with("a", 1.0)
                .with("b", ["x", "y", "z"][b])
                .with("c", 2.0)
                .with("d", ["p", "q"][d])
                .with("e", "no");
            let values = encode(&raw, &schema).unwrap().into_values();

            let b_cols = &values[1..4];
            prop_assert_eq!(b_cols.iter().filter(|v| **v == 1.0).count(), 1);
            prop_assert_eq!(b_cols.iter().filter(|v| **v == 0.0).count(), 2);
            prop_assert_eq!(b_cols[b], 1.0);

            let d_cols = &values[5..7];
            prop_assert_eq!(d_cols.iter().sum::<f64>(), 1.0);
            prop_assert_eq!(d_cols[d], 1.0);
        }
    }
}
