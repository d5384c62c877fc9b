//! Feature Schema Definitions
//!
//! A [`FeatureSchema`] fixes the column order a trained model expects. The
//! order is declared once, when the schema is built, and never inferred from
//! the input being encoded.

use crate::statistics::ReferenceStats;
use crate::SchemaError;
use data_validator::Bounds;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// How a field is read and how many columns it expands to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// A single numeric column
    Numeric {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bounds: Option<Bounds>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
        /// Allowed codes for a select widget over numbers
        #[serde(default, skip_serializing_if = "Option::is_none")]
        choices: Option<Vec<f64>>,
    },
    /// One indicator column per category, in declared order
    Categorical {
        categories: Vec<String>,
        /// Column name prefix; `"<name>_"` when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
    },
    /// Two-label choice collapsed into one 0/1 column
    Binary { positive: String, negative: String },
}

/// One input field of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Display label for the form widget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Unbounded numeric field with no default
    pub fn numeric(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            kind: FieldKind::Numeric {
                bounds: None,
                default: None,
                choices: None,
            },
        }
    }

    /// Categorical field over the given labels
    pub fn categorical(name: &str, categories: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            kind: FieldKind::Categorical {
                categories: categories.iter().map(|c| c.to_string()).collect(),
                prefix: None,
            },
        }
    }

    /// Binary field: `positive` encodes as 1, `negative` as 0
    pub fn binary(name: &str, positive: &str, negative: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            kind: FieldKind::Binary {
                positive: positive.to_string(),
                negative: negative.to_string(),
            },
        }
    }

    /// Set the display label
    pub fn labelled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Closed bounds (numeric fields only)
    pub fn bounded(self, min: f64, max: f64) -> Self {
        self.with_bounds(Bounds::new(min, max))
    }

    /// Lower bound only (numeric fields only)
    pub fn at_least(self, min: f64) -> Self {
        self.with_bounds(Bounds::at_least(min))
    }

    /// Set bounds (numeric fields only)
    pub fn with_bounds(mut self, new_bounds: Bounds) -> Self {
        if let FieldKind::Numeric { bounds, .. } = &mut self.kind {
            *bounds = Some(new_bounds);
        }
        self
    }

    /// Value used when the field is absent (numeric fields only)
    pub fn with_default(mut self, value: f64) -> Self {
        if let FieldKind::Numeric { default, .. } = &mut self.kind {
            *default = Some(value);
        }
        self
    }

    /// Restrict to a fixed set of codes (numeric fields only)
    pub fn coded(mut self, codes: &[f64]) -> Self {
        if let FieldKind::Numeric { choices, .. } = &mut self.kind {
            *choices = Some(codes.to_vec());
        }
        self
    }

    /// Column name prefix (categorical fields only)
    pub fn with_prefix(mut self, value: &str) -> Self {
        if let FieldKind::Categorical { prefix, .. } = &mut self.kind {
            *prefix = Some(value.to_string());
        }
        self
    }

    /// Display label, falling back to the field name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Number of columns this field expands to
    pub fn width(&self) -> usize {
        match &self.kind {
            FieldKind::Numeric { .. } | FieldKind::Binary { .. } => 1,
            FieldKind::Categorical { categories, .. } => categories.len(),
        }
    }

    fn columns(&self) -> Vec<Column> {
        match &self.kind {
            FieldKind::Numeric { .. } => vec![Column {
                name: self.name.clone(),
                field: self.name.clone(),
                kind: ColumnKind::Numeric,
            }],
            FieldKind::Binary { .. } => vec![Column {
                name: self.name.clone(),
                field: self.name.clone(),
                kind: ColumnKind::Indicator,
            }],
            FieldKind::Categorical { categories, prefix } => {
                let prefix = prefix
                    .clone()
                    .unwrap_or_else(|| format!("{}_", self.name));
                categories
                    .iter()
                    .map(|category| Column {
                        name: format!("{prefix}{category}"),
                        field: self.name.clone(),
                        kind: ColumnKind::Indicator,
                    })
                    .collect()
            }
        }
    }

    fn check(&self) -> Result<(), SchemaError> {
        match &self.kind {
            FieldKind::Numeric {
                bounds,
                default,
                choices,
            } => {
                if let Some(b) = bounds {
                    if !b.is_ordered() {
                        return Err(SchemaError::InvalidBounds {
                            field: self.name.clone(),
                            min: b.min,
                            max: b.max,
                        });
                    }
                }
                if let Some(codes) = choices {
                    if codes.is_empty() {
                        return Err(SchemaError::EmptyChoices(self.name.clone()));
                    }
                    for &code in codes {
                        let inside = bounds.map_or(true, |b| b.contains(code));
                        if !code.is_finite() || !inside {
                            return Err(SchemaError::InvalidChoice {
                                field: self.name.clone(),
                                code,
                            });
                        }
                    }
                }
                if let Some(d) = *default {
                    let inside = bounds.map_or(true, |b| b.contains(d));
                    let allowed = choices.as_ref().map_or(true, |c| c.contains(&d));
                    if !d.is_finite() || !inside || !allowed {
                        return Err(SchemaError::DefaultOutOfRange {
                            field: self.name.clone(),
                            default: d,
                        });
                    }
                }
            }
            FieldKind::Categorical { categories, .. } => {
                if categories.is_empty() {
                    return Err(SchemaError::EmptyCategories(self.name.clone()));
                }
                let mut seen = HashSet::new();
                for category in categories {
                    if !seen.insert(category.as_str()) {
                        return Err(SchemaError::DuplicateCategory {
                            field: self.name.clone(),
                            category: category.clone(),
                        });
                    }
                }
            }
            FieldKind::Binary { positive, negative } => {
                if positive == negative {
                    return Err(SchemaError::AmbiguousBinary(self.name.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Kind of an expanded column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Numeric value, eligible for scaling
    Numeric,
    /// 0/1 indicator, never scaled
    Indicator,
}

/// One column of the expanded feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as the model was trained with it
    pub name: String,
    /// Field the column was expanded from
    pub field: String,
    pub kind: ColumnKind,
}

/// Ordered field list defining a model's input contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef", into = "SchemaDef")]
pub struct FeatureSchema {
    name: String,
    fields: Vec<FieldSpec>,
    columns: Arc<[Column]>,
}

#[derive(Serialize, Deserialize)]
struct SchemaDef {
    name: String,
    fields: Vec<FieldSpec>,
}

impl TryFrom<SchemaDef> for FeatureSchema {
    type Error = SchemaError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        FeatureSchema::new(&def.name, def.fields)
    }
}

impl From<FeatureSchema> for SchemaDef {
    fn from(schema: FeatureSchema) -> Self {
        SchemaDef {
            name: schema.name,
            fields: schema.fields,
        }
    }
}

impl FeatureSchema {
    /// Build and validate a schema
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty(name.to_string()));
        }

        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            field.check()?;
        }

        let columns: Vec<Column> = fields.iter().flat_map(FieldSpec::columns).collect();
        let mut column_names = HashSet::new();
        for column in &columns {
            if !column_names.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(Self {
            name: name.to_string(),
            fields,
            columns: columns.into(),
        })
    }

    /// Schema name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declared order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Expanded columns in model order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn shared_columns(&self) -> Arc<[Column]> {
        Arc::clone(&self.columns)
    }

    /// Expanded column names in model order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Length of every vector this schema encodes
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Fail fast when a model's input width disagrees with the schema
    pub fn ensure_width(&self, expected: usize) -> Result<(), SchemaError> {
        if self.width() == expected {
            Ok(())
        } else {
            Err(SchemaError::WidthMismatch {
                schema: self.name.clone(),
                expected,
                actual: self.width(),
            })
        }
    }

    /// Fill missing numeric defaults with the reference mean, kept inside bounds.
    /// Coded fields are skipped.
    pub fn with_reference_defaults(mut self, stats: &ReferenceStats) -> Self {
        for field in &mut self.fields {
            if let FieldKind::Numeric {
                bounds,
                default,
                choices,
            } = &mut field.kind
            {
                if default.is_some() || choices.is_some() {
                    continue;
                }
                if let Some(column) = stats.get(&field.name) {
                    let mean = match bounds {
                        Some(b) => column.mean.clamp(b.min, b.max),
                        None => column.mean,
                    };
                    *default = Some(mean);
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::ColumnStats;

    fn sample() -> FeatureSchema {
        FeatureSchema::new(
            "sample",
            vec![
                FieldSpec::numeric("age").bounded(0.0, 122.0),
                FieldSpec::categorical("gender", &["Male", "Female"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_width_and_columns() {
        let schema = sample();
        assert_eq!(schema.width(), 3);
        assert_eq!(schema.column_names(), vec!["age", "gender_Male", "gender_Female"]);
        assert_eq!(schema.columns()[1].kind, ColumnKind::Indicator);
        assert_eq!(schema.columns()[2].field, "gender");
    }

    #[test]
    fn test_prefix_override() {
        let schema = FeatureSchema::new(
            "alz",
            vec![FieldSpec::categorical("gender", &["Female", "Male"]).with_prefix("PTGENDER_")],
        )
        .unwrap();
        assert_eq!(schema.column_names(), vec!["PTGENDER_Female", "PTGENDER_Male"]);
    }

    #[test]
    fn test_binary_is_single_column() {
        let schema = FeatureSchema::new(
            "liver",
            vec![FieldSpec::binary("Gender", "Male", "Female")],
        )
        .unwrap();
        assert_eq!(schema.width(), 1);
        assert_eq!(schema.columns()[0].kind, ColumnKind::Indicator);
    }

    #[test]
    fn test_rejects_duplicate_field() {
        let err = FeatureSchema::new(
            "dup",
            vec![FieldSpec::numeric("age"), FieldSpec::numeric("age")],
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("age".into()));
    }

    #[test]
    fn test_rejects_bad_fields() {
        assert!(matches!(
            FeatureSchema::new("s", vec![FieldSpec::categorical("c", &[])]),
            Err(SchemaError::EmptyCategories(_))
        ));
        assert!(matches!(
            FeatureSchema::new("s", vec![FieldSpec::categorical("c", &["a", "a"])]),
            Err(SchemaError::DuplicateCategory { .. })
        ));
        assert!(matches!(
            FeatureSchema::new("s", vec![FieldSpec::numeric("n").bounded(5.0, 1.0)]),
            Err(SchemaError::InvalidBounds { .. })
        ));
        let n = FieldSpec::numeric("n").bounded(0.0, 1.0).with_default(2.0);
        assert!(matches!(
            FeatureSchema::new("s", vec![n]),
            Err(SchemaError::DefaultOutOfRange { .. })
        ));
        assert!(matches!(
            FeatureSchema::new("s", vec![FieldSpec::binary("b", "yes", "yes")]),
            Err(SchemaError::AmbiguousBinary(_))
        ));
        assert!(matches!(FeatureSchema::new("s", vec![]), Err(SchemaError::Empty(_))));
    }

    #[test]
    fn test_rejects_bad_codes() {
        assert!(matches!(
            FeatureSchema::new("s", vec![FieldSpec::numeric("cp").coded(&[])]),
            Err(SchemaError::EmptyChoices(_))
        ));
        let outside = FieldSpec::numeric("cp").bounded(0.0, 3.0).coded(&[0.0, 4.0]);
        assert_eq!(
            FeatureSchema::new("s", vec![outside]).unwrap_err(),
            SchemaError::InvalidChoice {
                field: "cp".into(),
                code: 4.0,
            }
        );
        let default = FieldSpec::numeric("al").coded(&[0.0, 1.0]).with_default(0.5);
        assert!(matches!(
            FeatureSchema::new("s", vec![default]),
            Err(SchemaError::DefaultOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_colliding_columns() {
        let err = FeatureSchema::new(
            "s",
            vec![
                FieldSpec::numeric("gender_Male"),
                FieldSpec::categorical("gender", &["Male", "Female"]),
            ],
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("gender_Male".into()));
    }

    #[test]
    fn test_ensure_width() {
        let schema = sample();
        assert!(schema.ensure_width(3).is_ok());
        assert_eq!(
            schema.ensure_width(4),
            Err(SchemaError::WidthMismatch {
                schema: "sample".into(),
                expected: 4,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_reference_defaults() {
        let mut stats = ReferenceStats::new();
        stats.insert("age", ColumnStats::compute(&[40.0, 60.0]).unwrap());
        let schema = sample().with_reference_defaults(&stats);
        match &schema.field("age").unwrap().kind {
            FieldKind::Numeric { default, .. } => assert_eq!(*default, Some(50.0)),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_json_definition() {
        let json = r#"{
            "name": "custom",
            "fields": [
                {"name": "age", "kind": "numeric", "bounds": {"min": 0, "max": 120}, "default": 40},
                {"name": "smoker", "kind": "binary", "positive": "yes", "negative": "no"},
                {"name": "site", "kind": "categorical", "categories": ["a", "b", "c"], "prefix": "SITE_"}
            ]
        }"#;
        let schema: FeatureSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.width(), 5);
        assert_eq!(schema.column_names()[2], "SITE_a");

        let round: FeatureSchema =
            serde_json::from_str(&serde_json::to_string(&schema).unwrap()).unwrap();
        assert_eq!(round, schema);
    }

    #[test]
    fn test_reference_defaults_skip_coded_fields() {
        let mut stats = ReferenceStats::new();
        stats.insert("sex", ColumnStats::compute(&[0.0, 1.0, 1.0]).unwrap());
        let schema = FeatureSchema::new("s", vec![FieldSpec::numeric("sex").coded(&[0.0, 1.0])])
            .unwrap()
            .with_reference_defaults(&stats);
        match &schema.field("sex").unwrap().kind {
            FieldKind::Numeric { default, .. } => assert_eq!(*default, None),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_json_coded_field() {
        let json = r#"{
            "name": "coded",
            "fields": [{"name": "cp", "kind": "numeric", "choices": [0, 1, 2, 3]}]
        }"#;
        let schema: FeatureSchema = serde_json::from_str(json).unwrap();
        assert_eq!(
            schema.field("cp").unwrap().kind,
            FieldKind::Numeric {
                bounds: None,
                default: None,
                choices: Some(vec![0.0, 1.0, 2.0, 3.0]),
            }
        );
    }

    #[test]
    fn test_json_definition_is_validated() {
        let json = r#"{
            "name": "bad",
            "fields": [{"name": "c", "kind": "categorical", "categories": []}]
        }"#;
        assert!(serde_json::from_str::<FeatureSchema>(json).is_err());
    }
}
