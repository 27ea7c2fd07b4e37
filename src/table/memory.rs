use std::collections::BTreeSet;

use hashbrown::HashMap;

use super::{distinct_in_rows, Column, Rows, TableSource};
use crate::{TrainingDataError, Value};

#[derive(Debug, Clone, Default)]
struct Table {
    columns: Vec<Column>,
    rows: Rows,
}

/// Tables held in memory, keyed by name.
///
/// # Example
/// ```
/// use regtree::{Column, MemoryTableSource, TrainingSet, Value};
/// let source = MemoryTableSource::new().with_table(
///     "prices",
///     vec![Column::new("area", true), Column::new("price", true)],
///     vec![
///         vec![Some(Value::Number(50.)), Some(Value::Number(100.))],
///         vec![Some(Value::Number(80.)), Some(Value::Number(180.))],
///     ],
/// );
/// let set = TrainingSet::from_source(&source, "prices").unwrap();
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTableSource {
    tables: HashMap<String, Table>,
}

impl MemoryTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces `name`.
    pub fn insert(&mut self, name: impl Into<String>, columns: Vec<Column>, rows: Rows) {
        self.tables.insert(name.into(), Table { columns, rows });
    }

    pub fn with_table(mut self, name: impl Into<String>, columns: Vec<Column>, rows: Rows) -> Self {
        self.insert(name, columns, rows);
        self
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn table(&self, name: &str) -> Result<&Table, TrainingDataError> {
        self.tables
            .get(name)
            .ok_or_else(|| TrainingDataError::TableNotFound(name.to_owned()))
    }
}

impl TableSource for MemoryTableSource {
    fn load_schema(&self, table: &str) -> Result<Vec<Column>, TrainingDataError> {
        Ok(self.table(table)?.columns.clone())
    }

    fn load_rows(&self, table: &str) -> Result<Rows, TrainingDataError> {
        Ok(self.table(table)?.rows.clone())
    }

    fn distinct_values(
        &self,
        table: &str,
        column: &Column,
    ) -> Result<BTreeSet<Value>, TrainingDataError> {
        let stored = self.table(table)?;
        let position = stored
            .columns
            .iter()
            .position(|c| c.name() == column.name())
            .ok_or_else(|| TrainingDataError::TableNotFound(table.to_owned()))?;
        distinct_in_rows(table, &stored.rows, column, position)
    }
}
