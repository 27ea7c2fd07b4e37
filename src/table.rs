//! Sources of training tables.
//!
//! A table is a flat relation: an ordered schema of columns and rows of
//! positional cells, where a missing cell is `None`.
use std::collections::BTreeSet;

mod csv_source;
mod memory;

pub use csv_source::CsvTableSource;
pub use memory::MemoryTableSource;

use crate::{TrainingDataError, Value};

/// A column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    numeric: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, numeric: bool) -> Self {
        Self {
            name: name.into(),
            numeric,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }
}

/// Rows of a table, one `Option<Value>` per column.
pub type Rows = Vec<Vec<Option<Value>>>;

/// Capability to read training tables.
pub trait TableSource {
    /// Columns of `table`, in positional order.
    fn load_schema(&self, table: &str) -> Result<Vec<Column>, TrainingDataError>;
    /// All the rows of `table`.
    fn load_rows(&self, table: &str) -> Result<Rows, TrainingDataError>;
    /// Distinct values of `column` in `table`. Fails on a null cell.
    fn distinct_values(
        &self,
        table: &str,
        column: &Column,
    ) -> Result<BTreeSet<Value>, TrainingDataError>;
}

/// Checks that `table` is a plain identifier: ASCII letters, digits, `_`
/// and `-`. Table names end up in file paths.
pub fn validate_table_name(table: &str) -> Result<(), TrainingDataError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TrainingDataError::InvalidTableName(table.to_owned()))
    }
}

/// Distinct values of the cells at `position`, failing on the first null.
pub(crate) fn distinct_in_rows(
    table: &str,
    rows: &Rows,
    column: &Column,
    position: usize,
) -> Result<BTreeSet<Value>, TrainingDataError> {
    rows.iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .get(position)
                .cloned()
                .flatten()
                .ok_or_else(|| TrainingDataError::NullValue {
                    table: table.to_owned(),
                    row,
                    column: column.name().to_owned(),
                })
        })
        .collect()
}
