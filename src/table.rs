//! Record tables: fixed-width rows of string fields whose last field is the label.

use crate::error::{BayesError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Row { fields }
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// The label is always the last field.
    pub fn label(&self) -> &str {
        self.fields.last().map(String::as_str).unwrap_or("")
    }

    /// Every field except the label.
    pub fn features(&self) -> &[String] {
        match self.fields.split_last() {
            Some((_, features)) => features,
            None => &[],
        }
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Row::new(iter.into_iter().map(Into::into).collect())
    }
}

/// An ordered set of rows sharing one width and column meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, rejecting ragged rows and rows with no feature column.
    pub fn new(rows: Vec<Vec<String>>) -> Result<Self> {
        Self::from_rows(rows.into_iter().map(Row::new).collect())
    }

    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        if let Some(first) = rows.first() {
            let expected = first.width();
            if expected < 2 {
                return Err(BayesError::TooNarrow { found: expected });
            }
            if let Some((row, found)) = rows
                .iter()
                .map(Row::width)
                .enumerate()
                .find(|&(_, width)| width != expected)
            {
                return Err(BayesError::RaggedRow {
                    row,
                    expected,
                    found,
                });
            }
        }

        Ok(Table { rows })
    }

    /// Convenience constructor for literal tables.
    pub fn from_slices(rows: &[&[&str]]) -> Result<Self> {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|field| field.to_string()).collect())
                .collect(),
        )
    }

    /// Table over rows taken from `self`, which already share its width.
    pub(crate) fn subset(&self, rows: Vec<Row>) -> Table {
        debug_assert!(rows.iter().all(|row| Some(row.width()) == self.width()));
        Table { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width shared by every row, or `None` for an empty table.
    pub fn width(&self) -> Option<usize> {
        self.rows.first().map(Row::width)
    }

    pub fn feature_count(&self) -> Option<usize> {
        self.width().map(|width| width - 1)
    }

    pub fn label_column(&self) -> Option<usize> {
        self.feature_count()
    }

    pub(crate) fn check_column(&self, column: usize) -> Result<()> {
        match self.width() {
            Some(width) if column >= width => Err(BayesError::UnknownColumn { column, width }),
            _ => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
