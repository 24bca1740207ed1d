//! End-to-end experiment: read, preprocess, train, classify, evaluate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

use crate::bayes::{self, NaiveBayesClassifier, Prediction};
use crate::census::Column;
use crate::config::{PipelineConfig, UnknownPolicy};
use crate::counts::FrequencyCounts;
use crate::error::Result;
use crate::evaluate::{self, Report};
use crate::preprocess;
use crate::table::Table;

#[derive(Debug, Clone)]
pub struct Outcome {
    pub training_size: usize,
    pub predictions: Vec<Prediction>,
    pub report: Report,
    pub elapsed: Duration,
    /// Set when `unknown_report` is on.
    pub unknowns: Option<UnknownReport>,
}

/// `?` fields per column of the raw training and test files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReport {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl UnknownReport {
    pub fn new(train: &Table, test: &Table) -> Self {
        UnknownReport {
            train: preprocess::unknown_counts(train),
            test: preprocess::unknown_counts(test),
        }
    }

    /// `(column, train, test)` for every column with an unknown in either table.
    pub fn columns(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let width = self.train.len().max(self.test.len());
        (0..width)
            .map(|column| {
                (
                    column,
                    self.train.get(column).copied().unwrap_or(0),
                    self.test.get(column).copied().unwrap_or(0),
                )
            })
            .filter(|&(_, train, test)| train + test > 0)
    }
}

/// Apply the configured preprocessing to a training and a test table.
///
/// Steps run in a fixed order (sample, unknowns, buckets, capital bands,
/// feature selection) so every column reference uses the raw census layout.
/// Statistics that drive a transformation (modes, means) come from the
/// training table only. Sampling only touches the training table.
pub fn prepare<R: Rng + ?Sized>(
    train: &Table,
    test: &Table,
    config: &PipelineConfig,
    rng: &mut R,
) -> Result<(Table, Table)> {
    let mut train = preprocess::sample_percent(train, config.percent, rng);
    let mut test = test.clone();

    match config.unknowns {
        UnknownPolicy::Keep => {}
        UnknownPolicy::Drop => {
            train = preprocess::drop_unknown(&train);
            test = preprocess::drop_unknown(&test);
        }
        UnknownPolicy::Impute => {
            let unknowns = UnknownReport::new(&train, &test);
            for (column, _, _) in unknowns.columns() {
                if let Some(mode) = preprocess::column_mode(&train, column)? {
                    train = preprocess::impute(&train, column, &mode)?;
                    test = preprocess::impute(&test, column, &mode)?;
                }
            }
        }
    }

    for spec in &config.buckets {
        train = preprocess::bucket(&train, spec.column.index(), spec.width)?;
        test = preprocess::bucket(&test, spec.column.index(), spec.width)?;
    }

    if config.capital_bands {
        for column in [Column::CapitalGain.index(), Column::CapitalLoss.index()] {
            let mean = preprocess::column_mean(&train, column)?;
            train = preprocess::band_by_mean(&train, column, mean)?;
            test = preprocess::band_by_mean(&test, column, mean)?;
        }
    }

    if let Some(columns) = config.selected_columns() {
        train = preprocess::select_columns(&train, &columns)?;
        test = preprocess::select_columns(&test, &columns)?;
    }

    Ok((train, test))
}

/// Fit on `train`, classify `test` and evaluate against the positive label.
pub fn train_and_evaluate(
    train: &Table,
    test: &Table,
    config: &PipelineConfig,
) -> Result<(Vec<Prediction>, Report)> {
    let predictions = if config.parallel {
        let chunk_rows = (train.len() / rayon::current_num_threads()).max(1);
        NaiveBayesClassifier::from_counts(FrequencyCounts::count_parallel(train, chunk_rows)?)
            .predict_table_parallel(test)?
    } else {
        NaiveBayesClassifier::fit(train)?.predict_table(test)?
    };

    let report = evaluate::evaluate(&predictions, &config.positive_label, config.convention)?;
    Ok((predictions, report))
}

pub fn run(config: &PipelineConfig) -> Result<Outcome> {
    config.validate()?;
    let start = Instant::now();

    let raw_train = preprocess::read_file(&config.train_path, config.delimiter)?;
    let raw_test = preprocess::read_file(&config.test_path, config.delimiter)?;
    let unknowns = config
        .unknown_report
        .then(|| UnknownReport::new(&raw_train, &raw_test));

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (train, test) = prepare(&raw_train, &raw_test, config, &mut rng)?;

    let (predictions, report) = train_and_evaluate(&train, &test, config)?;

    if let Some(path) = &config.output {
        bayes::write_predictions(path, &predictions)?;
    }

    Ok(Outcome {
        training_size: train.len(),
        predictions,
        report,
        elapsed: start.elapsed(),
        unknowns,
    })
}
