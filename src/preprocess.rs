//! Preprocessing steps that turn raw census files into a normalized table.
//!
//! Each step borrows a table and returns a new one.

use indexmap::IndexMap;
use rand::seq::index;
use rand::Rng;
use std::{io, path::Path};

use crate::census::UNKNOWN;
use crate::error::{BayesError, Result};
use crate::table::{Row, Table};

/// Parse delimited text into a table.
///
/// Fields are trimmed and stripped of trailing `.` (the test file ends each
/// label with one). Blank lines and lines starting with `|` are skipped.
pub fn read_records<R: io::Read>(reader: R, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .comment(Some(b'|'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|field| field.trim().trim_end_matches('.').to_string())
                .collect(),
        );
    }

    Table::new(rows)
}

pub fn read_file<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Table> {
    let file = std::fs::File::open(path)?;
    read_records(io::BufReader::new(file), delimiter)
}

/// Keep a random `percent` share of the rows, in their original order.
///
/// `len * (100 - percent) / 100` rows (rounded down) are dropped.
pub fn sample_percent<R: Rng + ?Sized>(table: &Table, percent: u32, rng: &mut R) -> Table {
    if percent >= 100 {
        return table.clone();
    }

    let len = table.len();
    let dropped = len * (100 - percent as usize) / 100;
    let mut keep = index::sample(rng, len, len - dropped).into_vec();
    keep.sort_unstable();

    table.subset(keep.into_iter().map(|i| table.rows()[i].clone()).collect())
}

/// Project every row onto `columns`, which must end with the label column.
/// Columns may repeat.
pub fn select_columns(table: &Table, columns: &[usize]) -> Result<Table> {
    let Some(label) = table.label_column() else {
        return Ok(table.clone());
    };

    if columns.last() != Some(&label) {
        return Err(BayesError::LabelNotLast);
    }
    for &column in columns {
        table.check_column(column)?;
    }

    map_rows(table, |row| {
        Ok(columns
            .iter()
            .map(|&column| row.fields()[column].clone())
            .collect())
    })
}

/// Replace an integer column by `value / width`, truncating toward zero.
/// `width` must be positive.
pub fn bucket(table: &Table, column: usize, width: i64) -> Result<Table> {
    if width <= 0 {
        return Err(BayesError::InvalidParameter(format!(
            "bucket width must be positive, got {width}"
        )));
    }
    table.check_column(column)?;

    map_indexed(table, |i, row| {
        let value = parse_int(row, i, column)?;
        Ok(replace(row, column, (value / width).to_string()))
    })
}

/// Integer mean of a column, truncated toward zero.
pub fn column_mean(table: &Table, column: usize) -> Result<i64> {
    if table.is_empty() {
        return Err(BayesError::EmptyTable);
    }
    table.check_column(column)?;

    // i128 holds the sum of any number of i64 rows a table can carry
    let mut total: i128 = 0;
    for (i, row) in table.rows().iter().enumerate() {
        total += i128::from(parse_int(row, i, column)?);
    }

    i64::try_from(total / table.len() as i128).map_err(|_| {
        BayesError::InvalidParameter(format!("mean of column {column} does not fit in i64"))
    })
}

/// Map an integer column to `high` (at or above `mean`), `none` (exactly
/// `"0"`) or `low`, checked in that order.
pub fn band_by_mean(table: &Table, column: usize, mean: i64) -> Result<Table> {
    table.check_column(column)?;

    map_indexed(table, |i, row| {
        let value = parse_int(row, i, column)?;
        let band = if value >= mean {
            "high"
        } else if row.fields()[column] == "0" {
            "none"
        } else {
            "low"
        };
        Ok(replace(row, column, band.to_string()))
    })
}

/// Number of unknown (`?`) fields in each column.
pub fn unknown_counts(table: &Table) -> Vec<usize> {
    let mut counts = vec![0; table.width().unwrap_or(0)];
    for row in table {
        for (column, field) in row.fields().iter().enumerate() {
            if field == UNKNOWN {
                counts[column] += 1;
            }
        }
    }
    counts
}

/// Drop every row with an unknown field.
pub fn drop_unknown(table: &Table) -> Table {
    let rows = table
        .rows()
        .iter()
        .filter(|row| row.fields().iter().all(|field| field != UNKNOWN))
        .cloned()
        .collect();
    table.subset(rows)
}

/// Most frequent known value of a column; the first seen wins a tie.
pub fn column_mode(table: &Table, column: usize) -> Result<Option<String>> {
    table.check_column(column)?;

    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for row in table {
        let field = row.fields()[column].as_str();
        if field != UNKNOWN {
            *counts.entry(field).or_insert(0) += 1;
        }
    }

    let (mode, _) = counts
        .into_iter()
        .fold((None, 0), |(best, best_count), (value, count)| {
            if count > best_count {
                (Some(value), count)
            } else {
                (best, best_count)
            }
        });

    Ok(mode.map(str::to_string))
}

/// Replace unknown fields of one column with `value`.
pub fn impute(table: &Table, column: usize, value: &str) -> Result<Table> {
    table.check_column(column)?;

    map_rows(table, |row| {
        if row.fields()[column] == UNKNOWN {
            Ok(replace(row, column, value.to_string()))
        } else {
            Ok(row.clone())
        }
    })
}

fn map_rows<F>(table: &Table, f: F) -> Result<Table>
where
    F: Fn(&Row) -> Result<Row>,
{
    map_indexed(table, |_, row| f(row))
}

fn map_indexed<F>(table: &Table, f: F) -> Result<Table>
where
    F: Fn(usize, &Row) -> Result<Row>,
{
    let rows = table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| f(i, row))
        .collect::<Result<Vec<_>>>()?;
    Table::from_rows(rows)
}

fn replace(row: &Row, column: usize, value: String) -> Row {
    let mut fields = row.fields().to_vec();
    fields[column] = value;
    Row::new(fields)
}

fn parse_int(row: &Row, i: usize, column: usize) -> Result<i64> {
    let field = &row.fields()[column];
    field.parse().map_err(|_| BayesError::NotNumeric {
        row: i,
        column,
        value: field.clone(),
    })
}
