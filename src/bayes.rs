use indexmap::IndexMap;
use rayon::prelude::*;
use std::{io, path::Path};

use crate::counts::{FrequencyCounts, LabelCounts};
use crate::error::{BayesError, Result};
use crate::estimate::{ConditionalDistribution, PriorDistribution};
use crate::table::{Row, Table};

/// Posterior score per candidate label, in training label order.
pub type Scores = IndexMap<String, f64>;

/// Outcome of classifying one test row.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub truth: String,
    /// `None` when no label scored above zero.
    pub guess: Option<String>,
    pub scores: Scores,
}

impl Prediction {
    pub fn is_correct(&self) -> bool {
        self.guess.as_deref() == Some(self.truth.as_str())
    }
}

/// Categorical Naive Bayes over string-valued feature columns.
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier {
    label_counts: LabelCounts,
    prior: PriorDistribution,
    conditional: ConditionalDistribution,
}

impl NaiveBayesClassifier {
    /// Count and estimate from a training table whose last column is the label.
    pub fn fit(table: &Table) -> Result<Self> {
        Ok(Self::from_counts(FrequencyCounts::count(table)?))
    }

    pub fn from_counts(counts: FrequencyCounts) -> Self {
        let prior = PriorDistribution::estimate(&counts.labels);
        let conditional = ConditionalDistribution::estimate(&counts.conditional, &counts.labels);

        NaiveBayesClassifier {
            label_counts: counts.labels,
            prior,
            conditional,
        }
    }

    pub fn prior(&self) -> &PriorDistribution {
        &self.prior
    }

    pub fn conditional(&self) -> &ConditionalDistribution {
        &self.conditional
    }

    pub fn label_counts(&self) -> &LabelCounts {
        &self.label_counts
    }

    pub fn feature_count(&self) -> usize {
        self.conditional.feature_count()
    }

    /// Factor used for a value never seen under `label` in `column`:
    /// `1 / (count(label) + distinct values of (label, column))`, or `None`
    /// for a label not seen in training.
    pub fn smoothing_factor(&self, label: &str, column: usize) -> Option<f64> {
        let count = self.label_counts.get(label)?;
        let distinct = self.conditional.column(label, column).map_or(0, IndexMap::len);
        Some(1.0 / (count + distinct) as f64)
    }

    /// Prior times the product of every feature's conditional probability,
    /// for each label.
    pub fn scores<S: AsRef<str>>(&self, features: &[S]) -> Result<Scores> {
        if features.len() != self.feature_count() {
            return Err(BayesError::RaggedRow {
                row: 0,
                expected: self.feature_count() + 1,
                found: features.len() + 1,
            });
        }

        Ok(self
            .prior
            .iter()
            .map(|(label, prior)| {
                let score = features
                    .iter()
                    .enumerate()
                    .fold(prior, |acc, (column, value)| {
                        match self.conditional.get(label, column, value.as_ref()) {
                            Some(p) => acc * p,
                            // prior labels are exactly the trained labels
                            None => acc * self.smoothing_factor(label, column).unwrap_or(0.0),
                        }
                    });
                (label.to_string(), score)
            })
            .collect())
    }

    /// Pick the first label whose score is strictly greater than every score
    /// before it, starting from a maximum of zero. Later equal scores never
    /// replace the guess; zero or NaN scores never become it.
    pub fn guess(scores: &Scores) -> Option<&str> {
        let (best, _) = scores.iter().fold(
            (None, 0.0),
            |(best, best_score), (label, &score)| {
                if score > best_score {
                    (Some(label.as_str()), score)
                } else {
                    (best, best_score)
                }
            },
        );

        best
    }

    pub fn predict(&self, row: &Row) -> Result<Prediction> {
        let scores = self.scores(row.features())?;
        let guess = Self::guess(&scores).map(str::to_string);

        Ok(Prediction {
            truth: row.label().to_string(),
            guess,
            scores,
        })
    }

    pub fn predict_table(&self, table: &Table) -> Result<Vec<Prediction>> {
        table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| self.predict(row).map_err(|err| at_row(err, i)))
            .collect()
    }

    /// [`NaiveBayesClassifier::predict_table`] on the rayon pool; output order
    /// matches the table.
    pub fn predict_table_parallel(&self, table: &Table) -> Result<Vec<Prediction>> {
        table
            .rows()
            .par_iter()
            .enumerate()
            .map(|(i, row)| self.predict(row).map_err(|err| at_row(err, i)))
            .collect()
    }
}

fn at_row(err: BayesError, row: usize) -> BayesError {
    match err {
        BayesError::RaggedRow {
            expected, found, ..
        } => BayesError::RaggedRow {
            row,
            expected,
            found,
        },
        other => other,
    }
}

/// Writes predictions as `ID,Truth,Guess`, IDs starting at 1. Rows with no
/// guess get an empty `Guess` field.
pub fn write_predictions<P: AsRef<Path>>(path: P, predictions: &[Prediction]) -> Result<()> {
    let writer = csv::Writer::from_path(path)?;
    write_predictions_to(writer, predictions)
}

pub fn write_predictions_to<W: io::Write>(
    mut writer: csv::Writer<W>,
    predictions: &[Prediction],
) -> Result<()> {
    writer.write_record(["ID", "Truth", "Guess"])?;
    for (i, prediction) in predictions.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string().as_str(),
            prediction.truth.as_str(),
            prediction.guess.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scenario() -> NaiveBayesClassifier {
        let table =
            Table::from_slices(&[&["a", "x", "L1"], &["b", "x", "L1"], &["a", "y", "L2"]])
                .unwrap();
        NaiveBayesClassifier::fit(&table).unwrap()
    }

    #[test]
    fn guesses_most_likely_label() {
        let classifier = scenario();
        let scores = classifier.scores(&["a", "x"]).unwrap();

        assert_relative_eq!(scores["L1"], (2.0 / 3.0) * 0.5 * 1.0);
        // "x" never appears under L2: 1 / (1 row + 1 distinct value)
        assert_relative_eq!(scores["L2"], (1.0 / 3.0) * 1.0 * 0.5);
        assert_eq!(NaiveBayesClassifier::guess(&scores), Some("L1"));
    }

    #[test]
    fn smoothing_uses_label_count_plus_distinct_values() {
        let classifier = scenario();
        assert_eq!(classifier.smoothing_factor("L1", 0), Some(1.0 / (2.0 + 2.0)));
        assert_eq!(classifier.smoothing_factor("L1", 1), Some(1.0 / (2.0 + 1.0)));
        assert_eq!(classifier.smoothing_factor("L2", 1), Some(1.0 / (1.0 + 1.0)));
        assert_eq!(classifier.smoothing_factor("L3", 0), None);

        // both features unseen under L1
        let scores = classifier.scores(&["c", "z"]).unwrap();
        assert_eq!(scores["L1"], (2.0 / 3.0) * (1.0 / 4.0) * (1.0 / 3.0));
    }

    #[test]
    fn last_feature_column_contributes() {
        let classifier = scenario();
        let seen = classifier.scores(&["a", "y"]).unwrap();
        let unseen = classifier.scores(&["a", "w"]).unwrap();
        assert!(seen["L2"] > unseen["L2"]);
    }

    #[test]
    fn ties_keep_the_first_label() {
        let mut scores = Scores::new();
        scores.insert("first".to_string(), 0.25);
        scores.insert("second".to_string(), 0.25);
        assert_eq!(NaiveBayesClassifier::guess(&scores), Some("first"));

        let mut scores = Scores::new();
        scores.insert("low".to_string(), 0.1);
        scores.insert("high".to_string(), 0.3);
        scores.insert("tied".to_string(), 0.3);
        assert_eq!(NaiveBayesClassifier::guess(&scores), Some("high"));
    }

    #[test]
    fn zero_and_nan_scores_never_guess() {
        let mut scores = Scores::new();
        scores.insert("zero".to_string(), 0.0);
        scores.insert("nan".to_string(), f64::NAN);
        assert_eq!(NaiveBayesClassifier::guess(&scores), None);
    }

    #[test]
    fn underflow_gives_no_guess() {
        let mut rows = Vec::new();
        for i in 0..2 {
            let mut row: Vec<String> = (0..1100).map(|c| format!("{c}-{i}")).collect();
            row.push(format!("L{i}"));
            rows.push(row);
        }
        let classifier = NaiveBayesClassifier::fit(&Table::new(rows).unwrap()).unwrap();

        let mut test: Vec<String> = (0..1100).map(|_| "never".to_string()).collect();
        test.push("L0".to_string());
        let prediction = classifier.predict(&Row::new(test)).unwrap();

        assert!(prediction.scores.values().all(|&s| s == 0.0));
        assert_eq!(prediction.guess, None);
        assert!(!prediction.is_correct());
    }

    #[test]
    fn width_mismatch_is_an_error() {
        let classifier = scenario();
        assert!(matches!(
            classifier.scores(&["a"]),
            Err(BayesError::RaggedRow { .. })
        ));

        let test = Table::from_slices(&[&["a", "x", "L1"], &["a", "x", "y", "L2"]]);
        assert!(test.is_err());

        let narrow = Table::from_slices(&[&["a", "L1"]]).unwrap();
        match classifier.predict_table(&narrow) {
            Err(BayesError::RaggedRow {
                row,
                expected,
                found,
            }) => {
                assert_eq!(row, 0);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parallel_prediction_matches_sequential() {
        let classifier = scenario();
        let test = Table::from_slices(&[
            &["a", "x", "L1"],
            &["b", "y", "L2"],
            &["c", "z", "L1"],
            &["a", "y", "L2"],
        ])
        .unwrap();

        assert_eq!(
            classifier.predict_table(&test).unwrap(),
            classifier.predict_table_parallel(&test).unwrap()
        );
    }

    #[test]
    fn writes_one_line_per_prediction() {
        let classifier = scenario();
        let test = Table::from_slices(&[&["a", "x", "L1"], &["a", "y", "L2"]]).unwrap();
        let predictions = classifier.predict_table(&test).unwrap();

        let mut buffer = Vec::new();
        write_predictions_to(csv::Writer::from_writer(&mut buffer), &predictions).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "ID,Truth,Guess\n1,L1,L1\n2,L2,L2\n");
    }
}
