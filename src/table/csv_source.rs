use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use super::{distinct_in_rows, validate_table_name, Column, Rows, TableSource};
use crate::{TrainingDataError, Value};

/// Tables stored as CSV files of a directory: table `t` is read from
/// `<dir>/t.csv`.
///
/// The first record holds the column names. A column is numeric when every
/// non empty cell parses as a number; empty cells are nulls.
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    dir: PathBuf,
}

impl CsvTableSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, table: &str) -> Result<PathBuf, TrainingDataError> {
        validate_table_name(table)?;
        let path = self.dir.join(format!("{table}.csv"));
        if path.is_file() {
            Ok(path)
        } else {
            Err(TrainingDataError::TableNotFound(table.to_owned()))
        }
    }

    /// Reads the whole table and infers its column types.
    fn read(&self, table: &str) -> Result<(Vec<Column>, Rows), TrainingDataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(self.path(table)?)?;
        let names = reader
            .headers()?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let mut raw = Vec::new();
        for record in reader.records() {
            let record = record?;
            raw.push(
                record
                    .iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_owned()))
                    .collect::<Vec<_>>(),
            );
        }

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(j, name)| {
                let mut cells = raw.iter().filter_map(|row| row.get(j).cloned().flatten());
                let mut any = false;
                let numeric = cells.all(|cell| {
                    any = true;
                    cell.parse::<f64>().is_ok()
                });
                Column::new(name, numeric && any)
            })
            .collect::<Vec<_>>();

        let rows = raw
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&columns)
                    .map(|(cell, column)| {
                        cell.map(|cell| match cell.parse::<f64>() {
                            Ok(x) if column.is_numeric() => Value::Number(x),
                            _ => Value::Text(cell),
                        })
                    })
                    .collect()
            })
            .collect();
        Ok((columns, rows))
    }
}

impl TableSource for CsvTableSource {
    fn load_schema(&self, table: &str) -> Result<Vec<Column>, TrainingDataError> {
        Ok(self.read(table)?.0)
    }

    fn load_rows(&self, table: &str) -> Result<Rows, TrainingDataError> {
        Ok(self.read(table)?.1)
    }

    fn distinct_values(
        &self,
        table: &str,
        column: &Column,
    ) -> Result<BTreeSet<Value>, TrainingDataError> {
        let (columns, rows) = self.read(table)?;
        let position = columns
            .iter()
            .position(|c| c.name() == column.name())
            .ok_or_else(|| TrainingDataError::TableNotFound(table.to_owned()))?;
        distinct_in_rows(table, &rows, column, position)
    }
}
