//! Reference Dataset Statistics

use crate::StatsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Summary of one numeric column of the reference dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Number of numeric observations
    pub count: usize,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl ColumnStats {
    /// Compute statistics from a slice of values; `None` when empty
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;

        let mean = values.iter().sum::<f64>() / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();

        Some(Self {
            count: values.len(),
            min,
            max,
            mean,
            std_dev,
        })
    }

    /// Stats known only by their range (midpoint mean, no spread)
    pub fn from_range(min: f64, max: f64) -> Self {
        Self {
            count: 0,
            min,
            max,
            mean: (min + max) / 2.0,
            std_dev: 0.0,
        }
    }
}

/// Per-column statistics of a reference dataset.
///
/// Loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceStats {
    columns: BTreeMap<String, ColumnStats>,
}

impl ReferenceStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Set statistics for a column
    pub fn insert(&mut self, column: &str, stats: ColumnStats) {
        self.columns.insert(column.to_string(), stats);
    }

    /// Builder form of [`ReferenceStats::insert`]
    pub fn with(mut self, column: &str, stats: ColumnStats) -> Self {
        self.insert(column, stats);
        self
    }

    /// Statistics for a column
    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.columns.get(column)
    }

    /// Column names with statistics
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if no column has statistics
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Compute statistics from a CSV dataset with a header row.
    ///
    /// Non-numeric cells are skipped; columns without a single numeric cell
    /// and columns named in `exclude` are left out.
    pub fn from_reader<R: io::Read>(reader: R, exclude: &[&str]) -> Result<Self, StatsError> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let mut samples: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
        let mut rows = 0usize;

        for result in reader.records() {
            let record = result?;
            rows += 1;
            for (idx, cell) in record.iter().enumerate() {
                if let Ok(value) = cell.trim().parse::<f64>() {
                    if value.is_finite() {
                        samples[idx].push(value);
                    }
                }
            }
        }

        let mut stats = Self::new();
        for (name, values) in headers.iter().zip(samples.iter()) {
            if exclude.contains(&name.as_str()) {
                continue;
            }
            match ColumnStats::compute(values) {
                Some(column) => stats.insert(name, column),
                None => debug!(column = %name, "Skipping non-numeric reference column"),
            }
        }

        if stats.is_empty() {
            return Err(StatsError::NoNumericColumns);
        }

        debug!(rows, columns = stats.len(), "Computed reference statistics");
        Ok(stats)
    }

    /// Compute statistics from a CSV file
    pub fn from_csv_path(path: impl AsRef<Path>, exclude: &[&str]) -> Result<Self, StatsError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(csv::Error::from)?;
        let stats = Self::from_reader(io::BufReader::new(file), exclude)?;
        info!(path = %path.display(), columns = stats.len(), "Loaded reference dataset");
        Ok(stats)
    }

    /// Load statistics, degrading to empty stats when the dataset is
    /// missing or malformed. Scaling then passes values through unscaled.
    pub fn load_or_empty(path: impl AsRef<Path>, exclude: &[&str]) -> Self {
        let path = path.as_ref();
        match Self::from_csv_path(path, exclude) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Reference dataset unavailable, scaling disabled");
                Self::new()
            }
        }
    }
}
