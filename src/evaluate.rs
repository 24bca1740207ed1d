//! Evaluator: precision and recall of the predictions for one positive class.

use std::fmt;

use crate::bayes::Prediction;
use crate::error::{BayesError, Result};

/// How mispredictions are booked.
///
/// `Reference` reproduces the census experiment logs: a wrong guess on a
/// positive row counts as a false positive and a wrong guess on a negative
/// row as a false negative. `Standard` books by the guessed class, the
/// textbook definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Convention {
    #[default]
    Reference,
    Standard,
}

/// Outcome counts over a prediction set. Rows without a guess count toward
/// `positives` / `negatives` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Confusion {
    pub positives: usize,
    pub negatives: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl Confusion {
    pub fn tally(predictions: &[Prediction], positive: &str, convention: Convention) -> Self {
        let mut confusion = Confusion::default();

        for prediction in predictions {
            let is_positive = prediction.truth == positive;
            if is_positive {
                confusion.positives += 1;
            } else {
                confusion.negatives += 1;
            }

            let Some(guess) = prediction.guess.as_deref() else {
                continue;
            };

            match convention {
                Convention::Reference => {
                    let correct = guess == prediction.truth;
                    match (is_positive, correct) {
                        (true, true) => confusion.true_positives += 1,
                        (true, false) => confusion.false_positives += 1,
                        (false, true) => confusion.true_negatives += 1,
                        (false, false) => confusion.false_negatives += 1,
                    }
                }
                Convention::Standard => match (is_positive, guess == positive) {
                    (true, true) => confusion.true_positives += 1,
                    (true, false) => confusion.false_negatives += 1,
                    (false, true) => confusion.false_positives += 1,
                    (false, false) => confusion.true_negatives += 1,
                },
            }
        }

        confusion
    }

    pub fn test_set_size(&self) -> usize {
        self.positives + self.negatives
    }

    /// `tp / (tp + fp)`.
    pub fn precision(&self) -> Result<f64> {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
            "precision",
        )
    }

    /// `tp / (tp + fn)`.
    pub fn recall(&self) -> Result<f64> {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
            "recall",
        )
    }
}

fn ratio(numerator: usize, denominator: usize, metric: &'static str) -> Result<f64> {
    if denominator == 0 {
        return Err(BayesError::UndefinedMetric { metric });
    }
    Ok(numerator as f64 / denominator as f64)
}

/// Figures printed at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub confusion: Confusion,
    pub test_set_size: usize,
    pub precision: f64,
    pub recall: f64,
}

impl Report {
    /// Fails with [`BayesError::UndefinedMetric`] if either metric is undefined.
    pub fn new(confusion: Confusion) -> Result<Self> {
        Ok(Report {
            confusion,
            test_set_size: confusion.test_set_size(),
            precision: confusion.precision()?,
            recall: confusion.recall()?,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# test set: {}", self.test_set_size)?;
        writeln!(f, "# precision: {}", self.precision)?;
        write!(f, "# recall: {}", self.recall)
    }
}

pub fn evaluate(predictions: &[Prediction], positive: &str, convention: Convention) -> Result<Report> {
    Report::new(Confusion::tally(predictions, positive, convention))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bayes::Scores;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn prediction(truth: &str, guess: Option<&str>) -> Prediction {
        Prediction {
            truth: truth.to_string(),
            guess: guess.map(str::to_string),
            scores: Scores::new(),
        }
    }

    fn sample() -> Vec<Prediction> {
        vec![
            prediction("<=50K", Some("<=50K")),
            prediction("<=50K", Some("<=50K")),
            prediction("<=50K", Some(">50K")),
            prediction("<=50K", None),
            prediction(">50K", Some(">50K")),
            prediction(">50K", Some("<=50K")),
            prediction(">50K", Some("<=50K")),
        ]
    }

    #[test]
    fn reference_books_errors_by_true_class() {
        let confusion = Confusion::tally(&sample(), "<=50K", Convention::Reference);
        assert_eq!(
            confusion,
            Confusion {
                positives: 4,
                negatives: 3,
                true_positives: 2,
                false_positives: 1,
                true_negatives: 1,
                false_negatives: 2,
            }
        );
        assert_eq!(confusion.test_set_size(), 7);
        assert_relative_eq!(confusion.precision().unwrap(), 2.0 / 3.0);
        assert_relative_eq!(confusion.recall().unwrap(), 2.0 / 4.0);
    }

    #[test]
    fn standard_books_errors_by_guessed_class() {
        let confusion = Confusion::tally(&sample(), "<=50K", Convention::Standard);
        assert_eq!(confusion.true_positives, 2);
        assert_eq!(confusion.false_positives, 2);
        assert_eq!(confusion.false_negatives, 1);
        assert_eq!(confusion.true_negatives, 1);
        assert_relative_eq!(confusion.precision().unwrap(), 2.0 / 4.0);
        assert_relative_eq!(confusion.recall().unwrap(), 2.0 / 3.0);
    }

    #[rstest]
    #[case(Convention::Reference)]
    #[case(Convention::Standard)]
    fn precision_without_hits_is_undefined(#[case] convention: Convention) {
        let predictions = vec![prediction("<=50K", None), prediction("<=50K", None)];
        let confusion = Confusion::tally(&predictions, "<=50K", convention);

        assert_eq!(confusion.positives, 2);
        assert_eq!(confusion.negatives, 0);
        assert!(matches!(
            confusion.precision(),
            Err(BayesError::UndefinedMetric {
                metric: "precision"
            })
        ));
        assert!(evaluate(&predictions, "<=50K", convention).is_err());
    }

    // every guess lands on the side that only feeds precision's denominator
    #[rstest]
    #[case(Convention::Reference, "<=50K", ">50K")]
    #[case(Convention::Standard, ">50K", "<=50K")]
    fn recall_without_hits_is_undefined(
        #[case] convention: Convention,
        #[case] truth: &str,
        #[case] guess: &str,
    ) {
        let predictions = vec![prediction(truth, Some(guess)), prediction(truth, Some(guess))];
        let confusion = Confusion::tally(&predictions, "<=50K", convention);

        assert_eq!(confusion.true_positives, 0);
        assert_eq!(confusion.false_positives, 2);
        assert_eq!(confusion.false_negatives, 0);
        assert_relative_eq!(confusion.precision().unwrap(), 0.0);
        assert!(matches!(
            confusion.recall(),
            Err(BayesError::UndefinedMetric { metric: "recall" })
        ));
        assert!(matches!(
            evaluate(&predictions, "<=50K", convention),
            Err(BayesError::UndefinedMetric { metric: "recall" })
        ));
    }

    #[test]
    fn report_prints_figures() {
        let report = evaluate(&sample(), "<=50K", Convention::Reference).unwrap();
        let text = report.to_string();
        assert!(text.starts_with("# test set: 7\n"));
        assert!(text.ends_with("# recall: 0.5"));
    }
}
