//! Probability Estimator: turns frequency counts into priors and per-label
//! conditional distributions.

use indexmap::IndexMap;

use crate::counts::{ConditionalCounts, LabelCounts};

/// Probability of each value within one column, given a label.
pub type ValueProbabilities = IndexMap<String, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct PriorDistribution(IndexMap<String, f64>);

impl PriorDistribution {
    /// `count / total` for every label.
    pub fn estimate(labels: &LabelCounts) -> Self {
        let total = labels.total() as f64;

        PriorDistribution(
            labels
                .iter()
                .map(|(label, count)| (label.to_string(), count as f64 / total))
                .collect(),
        )
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    /// Labels in first-seen training order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(label, &p)| (label.as_str(), p))
    }
}

/// label -> column index -> value -> probability.
///
/// Values never seen under a label are absent; the classifier smooths them.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalDistribution {
    feature_count: usize,
    by_label: IndexMap<String, Vec<ValueProbabilities>>,
}

impl ConditionalDistribution {
    /// `count(label, column, value) / count(label)` for every observed triple.
    pub fn estimate(conditional: &ConditionalCounts, labels: &LabelCounts) -> Self {
        let by_label = conditional
            .iter()
            .map(|(label, columns)| {
                let total = labels.get(label).unwrap_or_default() as f64;
                let columns = columns
                    .iter()
                    .map(|values| {
                        values
                            .iter()
                            .map(|(value, &count)| (value.clone(), count as f64 / total))
                            .collect()
                    })
                    .collect();
                (label.to_string(), columns)
            })
            .collect();

        ConditionalDistribution {
            feature_count: conditional.feature_count(),
            by_label,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn column(&self, label: &str, column: usize) -> Option<&ValueProbabilities> {
        self.by_label.get(label)?.get(column)
    }

    pub fn get(&self, label: &str, column: usize, value: &str) -> Option<f64> {
        self.column(label, column)?.get(value).copied()
    }
}
