//! crates/diabetes_core/src/dataset.rs
//!
//! Loading the tabular training data and splitting it for evaluation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::domain::{FEATURE_COUNT, FEATURE_NAMES};
use crate::forest::Sample;

/// Column holding the 0/1 outcome.
pub const TARGET_COLUMN: &str = "Outcome";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset has no header row")]
    MissingHeader,
    #[error("dataset is missing the '{0}' column")]
    MissingColumn(String),
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: '{value}' in column '{column}' is not a number")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
    #[error("line {line}: outcome must be 0 or 1, got '{value}'")]
    InvalidOutcome { line: usize, value: String },
    #[error("cannot split {rows} rows with a test ratio of {ratio}")]
    SplitTooSmall { rows: usize, ratio: f64 },
}

/// Feature rows and their outcomes, column-aligned with `FEATURE_NAMES`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub samples: Vec<Sample>,
    pub labels: Vec<u8>,
}

impl Dataset {
    /// Parses comma-separated text with a header row. Feature columns are found by
    /// name, so their position in the file does not matter; extra columns are ignored.
    ///
    /// Fields are split on every comma. Surrounding quotes are stripped, but a quoted
    /// field that itself contains a comma is not supported and shows up as a
    /// `FieldCount` error. Numeric datasets like the Pima export never need this.
    pub fn from_csv(text: &str) -> Result<Self, DatasetError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (_, header) = lines.next().ok_or(DatasetError::MissingHeader)?;
        let columns: Vec<&str> = header.split(',').map(clean_field).collect();
        let position = |name: &str| {
            columns
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };
        let mut feature_columns = [0usize; FEATURE_COUNT];
        for (slot, name) in feature_columns.iter_mut().zip(FEATURE_NAMES) {
            *slot = position(name)?;
        }
        let target_column = position(TARGET_COLUMN)?;

        let mut dataset = Dataset::default();
        for (line, row) in lines {
            let fields: Vec<&str> = row.split(',').map(clean_field).collect();
            if fields.len() != columns.len() {
                return Err(DatasetError::FieldCount {
                    line,
                    expected: columns.len(),
                    found: fields.len(),
                });
            }

            let mut sample = [0.0; FEATURE_COUNT];
            for (value, &column) in sample.iter_mut().zip(&feature_columns) {
                *value = fields[column]
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| DatasetError::InvalidNumber {
                        line,
                        column: columns[column].to_string(),
                        value: fields[column].to_string(),
                    })?;
            }

            let outcome = fields[target_column];
            let label = match outcome.parse::<f64>() {
                Ok(v) if v == 0.0 => 0,
                Ok(v) if v == 1.0 => 1,
                _ => {
                    return Err(DatasetError::InvalidOutcome {
                        line,
                        value: outcome.to_string(),
                    })
                }
            };

            dataset.samples.push(sample);
            dataset.labels.push(label);
        }
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Shuffles with `seed` and returns `(train, test)`. The test side gets
    /// `ceil(len * test_ratio)` rows; both sides must end up non-empty.
    pub fn train_test_split(
        &self,
        test_ratio: f64,
        seed: u64,
    ) -> Result<(Dataset, Dataset), DatasetError> {
        let rows = self.len();
        let n_test = (rows as f64 * test_ratio).ceil() as usize;
        if !(test_ratio > 0.0 && test_ratio < 1.0) || n_test == 0 || n_test >= rows {
            return Err(DatasetError::SplitTooSmall {
                rows,
                ratio: test_ratio,
            });
        }

        let mut order: Vec<usize> = (0..rows).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        let (test_rows, train_rows) = order.split_at(n_test);
        Ok((self.select(train_rows), self.select(test_rows)))
    }

    fn select(&self, rows: &[usize]) -> Dataset {
        Dataset {
            samples: rows.iter().map(|&i| self.samples[i]).collect(),
            labels: rows.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

fn clean_field(field: &str) -> &str {
    field.trim().trim_matches('"')
}
