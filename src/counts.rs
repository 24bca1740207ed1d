//! Frequency Counter: one pass over the training table producing label counts
//! and per-label, per-column value counts.

use indexmap::map::Entry;
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::{BayesError, Result};
use crate::table::{Row, Table};

/// Occurrences of each value within one column.
pub type ValueCounts = IndexMap<String, usize>;

/// Rows seen per label, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCounts(IndexMap<String, usize>);

impl LabelCounts {
    pub fn get(&self, label: &str) -> Option<usize> {
        self.0.get(label).copied()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(label, &count)| (label.as_str(), count))
    }

    fn bump_by(&mut self, label: &str, by: usize) {
        *self.0.entry(label.to_string()).or_insert(0) += by;
    }
}

/// label -> column index -> value -> count.
///
/// Only values actually observed under a label are present; nothing is
/// zero-filled across labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalCounts {
    feature_count: usize,
    by_label: IndexMap<String, Vec<ValueCounts>>,
}

impl ConditionalCounts {
    fn new(feature_count: usize) -> Self {
        ConditionalCounts {
            feature_count,
            by_label: IndexMap::new(),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn column(&self, label: &str, column: usize) -> Option<&ValueCounts> {
        self.by_label.get(label)?.get(column)
    }

    pub fn count(&self, label: &str, column: usize, value: &str) -> usize {
        self.column(label, column)
            .and_then(|values| values.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct values seen for `(label, column)` in training.
    pub fn distinct(&self, label: &str, column: usize) -> usize {
        self.column(label, column).map_or(0, IndexMap::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValueCounts])> {
        self.by_label
            .iter()
            .map(|(label, columns)| (label.as_str(), columns.as_slice()))
    }

    fn columns_mut(&mut self, label: &str) -> &mut Vec<ValueCounts> {
        let feature_count = self.feature_count;
        match self.by_label.entry(label.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(vec![ValueCounts::new(); feature_count]),
        }
    }
}

/// Sufficient statistics of a training table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyCounts {
    pub labels: LabelCounts,
    pub conditional: ConditionalCounts,
}

impl FrequencyCounts {
    /// Count a training table in a single pass.
    pub fn count(table: &Table) -> Result<Self> {
        let width = table.width().ok_or(BayesError::EmptyTable)?;

        let mut counts = Self::empty(width - 1);
        for row in table {
            counts.observe(row);
        }

        Ok(counts)
    }

    /// Same result as [`FrequencyCounts::count`], with the pass split into
    /// chunks of `chunk_rows` rows counted on the rayon pool. Chunks are
    /// merged in row order, so first-seen ordering of labels and values is
    /// identical to the sequential count.
    pub fn count_parallel(table: &Table, chunk_rows: usize) -> Result<Self> {
        let width = table.width().ok_or(BayesError::EmptyTable)?;
        let feature_count = width - 1;

        if chunk_rows == 0 {
            return Err(BayesError::InvalidParameter(
                "chunk size must be positive".to_string(),
            ));
        }

        Ok(table
            .rows()
            .par_chunks(chunk_rows)
            .map(|chunk| {
                let mut counts = Self::empty(feature_count);
                chunk.iter().for_each(|row| counts.observe(row));
                counts
            })
            .reduce(|| Self::empty(feature_count), Self::merge))
    }

    /// Sum two sets of counts. Keys from `self` keep their position; keys
    /// only present in `other` are appended in `other`'s order.
    pub fn merge(mut self, other: Self) -> Self {
        for (label, count) in other.labels.iter() {
            self.labels.bump_by(label, count);
        }

        for (label, columns) in other.conditional.by_label {
            let mine = self.conditional.columns_mut(&label);
            for (column, values) in columns.into_iter().enumerate() {
                for (value, count) in values {
                    *mine[column].entry(value).or_insert(0) += count;
                }
            }
        }

        self
    }

    fn empty(feature_count: usize) -> Self {
        FrequencyCounts {
            labels: LabelCounts::default(),
            conditional: ConditionalCounts::new(feature_count),
        }
    }

    fn observe(&mut self, row: &Row) {
        let label = row.label();
        self.labels.bump_by(label, 1);

        let columns = self.conditional.columns_mut(label);
        for (column, value) in row.features().iter().enumerate() {
            *columns[column].entry(value.clone()).or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Table {
        Table::from_slices(&[&["a", "x", "L1"], &["b", "x", "L1"], &["a", "y", "L2"]]).unwrap()
    }

    #[test]
    fn counts_labels_in_first_seen_order() {
        let counts = FrequencyCounts::count(&scenario()).unwrap();
        let labels: Vec<_> = counts.labels.iter().collect();
        assert_eq!(labels, vec![("L1", 2), ("L2", 1)]);
        assert_eq!(counts.labels.total(), 3);
    }

    #[test]
    fn counts_values_per_label_and_column() {
        let counts = FrequencyCounts::count(&scenario()).unwrap();
        let conditional = &counts.conditional;

        assert_eq!(conditional.feature_count(), 2);
        assert_eq!(conditional.count("L1", 0, "a"), 1);
        assert_eq!(conditional.count("L1", 0, "b"), 1);
        assert_eq!(conditional.count("L1", 1, "x"), 2);
        assert_eq!(conditional.count("L2", 1, "y"), 1);

        // not zero-filled across labels
        assert_eq!(conditional.count("L2", 0, "b"), 0);
        assert!(!conditional.column("L2", 0).unwrap().contains_key("b"));
        assert_eq!(conditional.distinct("L1", 0), 2);
        assert_eq!(conditional.distinct("L2", 1), 1);
    }

    #[test]
    fn empty_table_is_an_error() {
        let table = Table::new(Vec::new()).unwrap();
        assert!(matches!(
            FrequencyCounts::count(&table),
            Err(BayesError::EmptyTable)
        ));
        assert!(matches!(
            FrequencyCounts::count_parallel(&table, 4),
            Err(BayesError::EmptyTable)
        ));
    }

    #[test]
    fn parallel_count_matches_sequential() {
        let mut rows = Vec::new();
        for i in 0..97 {
            rows.push(vec![
                format!("v{}", i % 7),
                format!("w{}", i % 3),
                if i % 4 == 0 { "<=50K" } else { ">50K" }.to_string(),
            ]);
        }
        let table = Table::new(rows).unwrap();

        let sequential = FrequencyCounts::count(&table).unwrap();
        for chunk in [1, 5, 16, 200] {
            let parallel = FrequencyCounts::count_parallel(&table, chunk).unwrap();
            assert_eq!(parallel, sequential);
            assert!(parallel
                .labels
                .labels()
                .eq(sequential.labels.labels()));
        }
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            FrequencyCounts::count_parallel(&scenario(), 0),
            Err(BayesError::InvalidParameter(_))
        ));
    }
}
