//! Error type shared by every stage of the pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BayesError>;

#[derive(Debug, Error)]
pub enum BayesError {
    /// The training table has no rows, so no label column can be inferred.
    #[error("training table is empty")]
    EmptyTable,

    /// A row whose width differs from the rest of its table, or from the
    /// schema the classifier was trained on.
    #[error("row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Rows need at least one feature column in front of the label.
    #[error("rows need at least 2 fields (features + label), found {found}")]
    TooNarrow { found: usize },

    #[error("column {column} is out of range for rows of width {width}")]
    UnknownColumn { column: usize, width: usize },

    #[error("a column selection must end with the label column")]
    LabelNotLast,

    #[error("row {row}, column {column}: {value:?} is not an integer")]
    NotNumeric {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Precision or recall with a zero denominator.
    #[error("{metric} is undefined: denominator is zero")]
    UndefinedMetric { metric: &'static str },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
