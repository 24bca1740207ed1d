//! Categorical Naive Bayes income-bracket classifier for the UCI Adult census
//! data.
//!
//! The core runs `Table` -> [`counts`] -> [`estimate`] -> [`bayes`] ->
//! [`evaluate`]; [`preprocess`] and [`pipeline`] produce the normalized
//! tables it consumes.

pub mod bayes;
pub mod census;
pub mod config;
pub mod counts;
pub mod error;
pub mod estimate;
pub mod evaluate;
pub mod pipeline;
pub mod preprocess;
pub mod table;

pub use bayes::{NaiveBayesClassifier, Prediction, Scores};
pub use config::PipelineConfig;
pub use counts::{ConditionalCounts, FrequencyCounts, LabelCounts};
pub use error::{BayesError, Result};
pub use estimate::{ConditionalDistribution, PriorDistribution};
pub use evaluate::{Confusion, Convention, Report};
pub use table::{Row, Table};
