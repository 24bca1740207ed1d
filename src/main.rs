use anyhow::{Context, Result};
use census_bayes::census::{Column, POSITIVE_LABEL};
use census_bayes::config::{BucketSpec, PipelineConfig, UnknownPolicy};
use census_bayes::{pipeline, Convention};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "census_bayes")]
#[command(about = "Naive Bayes income-bracket classifier for the UCI Adult census data")]
#[command(version)]
struct Cli {
    /// Training file
    #[arg(long, default_value = "adult.data")]
    train: PathBuf,

    /// Test file
    #[arg(long, default_value = "adult.test")]
    test: PathBuf,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Percentage of the training set to keep
    #[arg(long, default_value_t = 100)]
    percent: u32,

    /// Random seed for down-sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Feature columns to keep, by name or index (label is appended)
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<Column>>,

    /// Integer-divide a column, e.g. `age=5`
    #[arg(long = "bucket")]
    buckets: Vec<BucketSpec>,

    /// Band capital-gain/capital-loss into none/low/high around the training mean
    #[arg(long)]
    capital_bands: bool,

    /// Unknown-value handling: keep, drop or impute
    #[arg(long, default_value = "keep")]
    unknowns: UnknownPolicy,

    /// Label treated as the positive class
    #[arg(long, default_value = POSITIVE_LABEL)]
    positive: String,

    /// Book errors by guessed class instead of the census experiment convention
    #[arg(long)]
    standard_metrics: bool,

    /// Count and classify on the rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Write predictions as CSV (ID,Truth,Guess)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print how many unknown (`?`) fields each column of the raw files has
    #[arg(long)]
    unknown_report: bool,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let delimiter = u8::try_from(self.delimiter)
            .context("delimiter must be a single-byte character")?;

        Ok(PipelineConfig {
            train_path: self.train,
            test_path: self.test,
            delimiter,
            percent: self.percent,
            seed: self.seed,
            unknowns: self.unknowns,
            buckets: self.buckets,
            capital_bands: self.capital_bands,
            features: self.features,
            positive_label: self.positive,
            convention: if self.standard_metrics {
                Convention::Standard
            } else {
                Convention::Reference
            },
            parallel: self.parallel,
            output: self.output,
            unknown_report: self.unknown_report,
        })
    }
}

fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;

    let outcome = pipeline::run(&config).with_context(|| {
        format!(
            "experiment on {} / {} failed",
            config.train_path.display(),
            config.test_path.display()
        )
    })?;

    if let Some(unknowns) = &outcome.unknowns {
        for (column, train, test) in unknowns.columns() {
            let name = Column::ALL
                .get(column)
                .map_or_else(|| column.to_string(), |c| c.to_string());
            println!("# unknown {name}: train {train}, test {test}");
        }
    }

    println!("# training set: {}", outcome.training_size);
    println!("{}", outcome.report);
    println!("{}", "-".repeat(40));
    println!("elapsed: {:.3}s", outcome.elapsed.as_secs_f64());

    if let Some(path) = &config.output {
        println!("predictions written to {}", path.display());
    }

    Ok(())
}
