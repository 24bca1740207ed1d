//! Experiment configuration.

use std::path::PathBuf;
use std::str::FromStr;

use crate::census::{Column, POSITIVE_LABEL};
use crate::error::{BayesError, Result};
use crate::evaluate::Convention;

/// What to do with `?` fields before training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPolicy {
    #[default]
    Keep,
    /// Drop rows containing any unknown field, in both tables.
    Drop,
    /// Replace unknowns with the training table's most frequent value of
    /// the same column, in both tables.
    Impute,
}

impl FromStr for UnknownPolicy {
    type Err = BayesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(UnknownPolicy::Keep),
            "drop" => Ok(UnknownPolicy::Drop),
            "impute" => Ok(UnknownPolicy::Impute),
            other => Err(BayesError::InvalidParameter(format!(
                "unknown-value policy must be keep, drop or impute, got {other:?}"
            ))),
        }
    }
}

/// Integer division of one column, written `COLUMN=WIDTH` (e.g. `age=5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSpec {
    pub column: Column,
    pub width: i64,
}

impl FromStr for BucketSpec {
    type Err = BayesError;

    fn from_str(s: &str) -> Result<Self> {
        let (column, width) = s.split_once('=').ok_or_else(|| {
            BayesError::InvalidParameter(format!("expected COLUMN=WIDTH, got {s:?}"))
        })?;

        let width = width.trim().parse::<i64>().map_err(|_| {
            BayesError::InvalidParameter(format!("bucket width {width:?} is not an integer"))
        })?;

        Ok(BucketSpec {
            column: column.parse()?,
            width,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub delimiter: u8,
    /// Share of the training table to keep, 0..=100.
    pub percent: u32,
    pub seed: Option<u64>,
    pub unknowns: UnknownPolicy,
    pub buckets: Vec<BucketSpec>,
    /// Band capital-gain and capital-loss into none/low/high around the
    /// training mean.
    pub capital_bands: bool,
    /// Feature columns to keep, in order; the label is appended.
    pub features: Option<Vec<Column>>,
    pub positive_label: String,
    pub convention: Convention,
    pub parallel: bool,
    pub output: Option<PathBuf>,
    /// Count `?` fields per column of the raw files.
    pub unknown_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            train_path: PathBuf::from("adult.data"),
            test_path: PathBuf::from("adult.test"),
            delimiter: b',',
            percent: 100,
            seed: None,
            unknowns: UnknownPolicy::default(),
            buckets: Vec::new(),
            capital_bands: false,
            features: None,
            positive_label: POSITIVE_LABEL.to_string(),
            convention: Convention::default(),
            parallel: false,
            output: None,
            unknown_report: false,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.percent > 100 {
            return Err(BayesError::InvalidParameter(format!(
                "percent must be within 0..=100, got {}",
                self.percent
            )));
        }

        if let Some(spec) = self.buckets.iter().find(|spec| spec.width <= 0) {
            return Err(BayesError::InvalidParameter(format!(
                "bucket width for {} must be positive, got {}",
                spec.column, spec.width
            )));
        }

        if let Some(features) = &self.features {
            if features.is_empty() {
                return Err(BayesError::InvalidParameter(
                    "feature selection needs at least one column".to_string(),
                ));
            }
            if features.contains(&Column::label()) {
                return Err(BayesError::InvalidParameter(
                    "the label column cannot be selected as a feature".to_string(),
                ));
            }
        }

        if self.positive_label.is_empty() {
            return Err(BayesError::InvalidParameter(
                "positive label must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Raw column indices to project onto, label last.
    pub fn selected_columns(&self) -> Option<Vec<usize>> {
        self.features.as_ref().map(|features| {
            features
                .iter()
                .map(|column| column.index())
                .chain(std::iter::once(Column::label().index()))
                .collect()
        })
    }
}
