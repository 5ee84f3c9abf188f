use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::source::{Row, check_row_width};
use crate::table::Table;

/// the type a column is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Decimal,
    /// text, with the length in characters of the longest value seen in the column.
    Varchar(usize),
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::Varchar(0)
    }
}

/// what a single non-empty cell looks like. ordered from most to least specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CellClass {
    Integer,
    Decimal,
    Text,
}

/// how the classes of a column's cells combine into the column's type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NarrowingPolicy {
    /// the last non-empty cell of the column decides its type, so
    /// `["1", "2", "abc"]` is text while `["abc", "1", "2"]` is an integer.
    #[default]
    LastObservation,
    /// the column gets the most specific type that fits every non-empty cell.
    Consistent,
}

// classifies a raw cell value.
// `None` means the cell says nothing about the column's type; only the empty string does.
// whitespace around a number is tolerated, a cell of only whitespace is text.
// integers are an optional sign followed by ascii digits, of any length.
// decimals are anything else that parses as a float, including exponents, `inf` and `nan`.
pub fn classify_cell(value: &str) -> Option<CellClass> {
    if value.is_empty() {
        return None;
    }

    let trimmed = value.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let class = if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        CellClass::Integer
    } else if trimmed.parse::<f64>().is_ok() {
        CellClass::Decimal
    } else {
        CellClass::Text
    };
    Some(class)
}

#[derive(Debug, Clone, Copy, Default)]
struct ColumnState {
    class: Option<CellClass>,
    max_len: usize,
}

impl ColumnState {
    fn observe(&mut self, value: &str, policy: NarrowingPolicy) {
        self.max_len = self.max_len.max(value.chars().count());

        let Some(class) = classify_cell(value) else {
            return;
        };
        self.class = Some(match (policy, self.class) {
            (NarrowingPolicy::Consistent, Some(previous)) => previous.max(class),
            _ => class,
        });
    }

    fn column_type(&self) -> ColumnType {
        match self.class {
            Some(CellClass::Integer) => ColumnType::Integer,
            Some(CellClass::Decimal) => ColumnType::Decimal,
            Some(CellClass::Text) | None => ColumnType::Varchar(self.max_len),
        }
    }
}

/// infers a type for every header in a single pass over `rows`.
///
/// every column starts out as text and a column without any non-empty cell stays text.
/// a row whose width differs from the header count fails with `MalformedRow`.
/// headers are expected to be unique; a repeated name keeps the type of its last column.
pub fn infer_column_types<S, I>(
    headers: &[S],
    rows: I,
    policy: NarrowingPolicy,
) -> Result<HashMap<String, ColumnType>>
where
    S: AsRef<str>,
    I: IntoIterator<Item = Result<Row>>,
{
    let mut states = vec![ColumnState::default(); headers.len()];

    for (index, row) in rows.into_iter().enumerate() {
        let row = row?;
        check_row_width(index + 1, headers.len(), &row)?;
        for (state, value) in states.iter_mut().zip(&row) {
            state.observe(value, policy);
        }
    }

    Ok(headers
        .iter()
        .zip(&states)
        .map(|(header, state)| (header.as_ref().to_string(), state.column_type()))
        .collect())
}

/// infers the column types of `table` and stores them on its columns.
pub fn infer_table_types<I>(table: &mut Table, rows: I, policy: NarrowingPolicy) -> Result<()>
where
    I: IntoIterator<Item = Result<Row>>,
{
    let names: Vec<&str> = table.column_names().collect();
    let mut types = infer_column_types(&names, rows, policy)?;

    for column in &mut table.columns {
        if let Some(inferred_type) = types.remove(&column.name) {
            debug!(column = %column.name, ?inferred_type, "inferred column type");
            column.inferred_type = inferred_type;
        }
    }
    Ok(())
}
