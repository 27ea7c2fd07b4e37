use core::fmt;

use ndarray::{ArrayView1, ArrayView2, Axis};

use super::{Attribute, Value};
use crate::{
    table::{Column, TableSource},
    utils::{mean, sum_of_squared_errors},
    TrainingDataError,
};

/// One row of the training set: the explanatory values, in attribute order,
/// followed by the numerical class value.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    values: Vec<Value>,
    class_value: f64,
}

impl Example {
    pub fn new(values: Vec<Value>, class_value: f64) -> Self {
        Self {
            values,
            class_value,
        }
    }

    /// Value of the explanatory attribute at column `index`.
    ///
    /// # Panics
    /// If `index` is not an explanatory column.
    pub fn value(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn class_value(&self) -> f64 {
        self.class_value
    }
}

/// In-memory training set.
///
/// The examples live in a single buffer that tree construction reorders in
/// place with [`TrainingSet::sort`]. A range of examples is always in the
/// order of the last attribute it was sorted by, so whoever consumes the
/// layout of a range must sort it by the relevant attribute first.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    examples: Vec<Example>,
    explanatory: Vec<Attribute>,
    class_attribute: Attribute,
}

impl TrainingSet {
    /// Builds a training set from already typed examples.
    ///
    /// # Example
    /// ```
    /// use regtree::{Attribute, Example, TrainingSet, Value};
    /// let set = TrainingSet::new(
    ///     vec![Attribute::discrete("outlook", 0, ["sunny", "rain"])],
    ///     Attribute::continuous("hours", 1),
    ///     vec![
    ///         Example::new(vec![Value::from("sunny")], 25.),
    ///         Example::new(vec![Value::from("rain")], 30.),
    ///     ],
    /// )
    /// .unwrap();
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn new(
        explanatory: Vec<Attribute>,
        class_attribute: Attribute,
        examples: Vec<Example>,
    ) -> Result<Self, TrainingDataError> {
        if examples.is_empty() {
            return Err(TrainingDataError::NoExamples);
        }
        if let Some((row, example)) = examples
            .iter()
            .enumerate()
            .find(|(_, example)| example.values.len() != explanatory.len())
        {
            return Err(TrainingDataError::Arity {
                row,
                expected: explanatory.len(),
                got: example.values.len(),
            });
        }
        Ok(Self {
            examples,
            explanatory,
            class_attribute,
        })
    }

    /// Acquires the training set stored in `table`.
    ///
    /// Every column but the last becomes an explanatory attribute, discrete
    /// for textual columns and continuous for numerical ones. The last column
    /// is the class attribute and must be numerical.
    pub fn from_source<S>(source: &S, table: &str) -> Result<Self, TrainingDataError>
    where
        S: TableSource + ?Sized,
    {
        let schema = source.load_schema(table)?;
        let Some((class_column, explanatory_columns)) = schema.split_last() else {
            return Err(TrainingDataError::TableNotFound(table.to_owned()));
        };
        if explanatory_columns.is_empty() {
            return Err(TrainingDataError::TooFewColumns {
                table: table.to_owned(),
                columns: schema.len(),
            });
        }
        let rows = source.load_rows(table)?;
        if rows.is_empty() {
            return Err(TrainingDataError::EmptyTable(table.to_owned()));
        }

        let mut explanatory = Vec::with_capacity(explanatory_columns.len());
        for (index, column) in explanatory_columns.iter().enumerate() {
            if column.is_numeric() {
                explanatory.push(Attribute::continuous(column.name(), index));
            } else {
                let domain = source.distinct_values(table, column)?;
                explanatory.push(Attribute::discrete(
                    column.name(),
                    index,
                    domain.iter().map(ToString::to_string),
                ));
            }
        }
        if !class_column.is_numeric() {
            return Err(TrainingDataError::NonNumericClass {
                table: table.to_owned(),
                column: class_column.name().to_owned(),
            });
        }
        let class_attribute = Attribute::continuous(class_column.name(), explanatory.len());

        let examples = rows
            .into_iter()
            .enumerate()
            .map(|(row, cells)| example_from_row(table, &schema, row, cells))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(explanatory, class_attribute, examples)
    }

    /// Builds a training set of continuous attributes `x0, x1, ...` with class
    /// attribute `y`, one example per row of `x`.
    pub fn from_arrays(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
    ) -> Result<Self, TrainingDataError> {
        if x.nrows() != y.len() {
            return Err(TrainingDataError::LengthMismatch {
                rows: x.nrows(),
                targets: y.len(),
            });
        }
        if x.ncols() == 0 {
            return Err(TrainingDataError::TooFewColumns {
                table: String::from("<array>"),
                columns: 1,
            });
        }
        for ((row, column), value) in x.indexed_iter() {
            if !value.is_finite() {
                return Err(TrainingDataError::NonFiniteValue {
                    table: String::from("<array>"),
                    row,
                    column: format!("x{column}"),
                });
            }
        }
        if let Some(row) = y.iter().position(|target| !target.is_finite()) {
            return Err(TrainingDataError::NonFiniteValue {
                table: String::from("<array>"),
                row,
                column: String::from("y"),
            });
        }
        let explanatory = (0..x.ncols())
            .map(|j| Attribute::continuous(format!("x{j}"), j))
            .collect();
        let examples = x
            .axis_iter(Axis(0))
            .zip(y.iter())
            .map(|(row, target)| Example::new(row.iter().map(|v| Value::Number(*v)).collect(), *target))
            .collect();
        Self::new(explanatory, Attribute::continuous("y", x.ncols()), examples)
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn number_of_explanatory_attributes(&self) -> usize {
        self.explanatory.len()
    }

    pub fn explanatory_attribute(&self, index: usize) -> &Attribute {
        &self.explanatory[index]
    }

    pub fn explanatory_attributes(&self) -> &[Attribute] {
        &self.explanatory
    }

    pub fn class_attribute(&self) -> &Attribute {
        &self.class_attribute
    }

    pub fn example(&self, index: usize) -> &Example {
        &self.examples[index]
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn class_value(&self, example: usize) -> f64 {
        self.examples[example].class_value
    }

    pub fn explanatory_value(&self, example: usize, attribute: usize) -> &Value {
        &self.examples[example].values[attribute]
    }

    /// Sum of squared errors of the class values over `[begin, end]`.
    pub fn sum_of_squared_errors(&self, begin: usize, end: usize) -> f64 {
        sum_of_squared_errors(self.examples[begin..=end].iter().map(Example::class_value))
    }

    /// Mean of the class values over `[begin, end]`.
    pub fn mean(&self, begin: usize, end: usize) -> f64 {
        mean(self.examples[begin..=end].iter().map(Example::class_value))
    }

    /// Sorts the examples of `[begin, end]` (inclusive) by their value of
    /// `attribute`. Examples outside the range are untouched and the sort is
    /// not stable. An empty range (`begin > end`) is left as is.
    ///
    /// # Panics
    /// If `end` is out of bounds for a non empty range.
    pub fn sort(&mut self, attribute: &Attribute, begin: usize, end: usize) {
        if begin <= end {
            self.quicksort(attribute.index(), begin, end);
        }
    }

    /// Quicksort recursing into the smaller side and looping on the larger.
    fn quicksort(&mut self, column: usize, mut inf: usize, mut sup: usize) {
        loop {
            let pos = self.partition(column, inf, sup);
            if pos - inf < sup - pos + 1 {
                if pos > inf {
                    self.quicksort(column, inf, pos - 1);
                }
                if pos >= sup {
                    return;
                }
                inf = pos + 1;
            } else {
                if pos < sup {
                    self.quicksort(column, pos + 1, sup);
                }
                if pos == inf {
                    return;
                }
                sup = pos - 1;
            }
        }
    }

    /// Partitions `[inf, sup]` around the value found in the middle of the
    /// range and returns the final position of that pivot.
    fn partition(&mut self, column: usize, inf: usize, sup: usize) -> usize {
        let mid = inf + (sup - inf) / 2;
        self.examples.swap(inf, mid);
        let pivot = self.examples[inf].values[column].clone();
        let (mut i, mut j) = (inf, sup);
        loop {
            while i <= sup && self.examples[i].values[column] <= pivot {
                i += 1;
            }
            // stops at `inf` at the latest, which holds the pivot
            while self.examples[j].values[column] > pivot {
                j -= 1;
            }
            if i < j {
                self.examples.swap(i, j);
            } else {
                break;
            }
        }
        self.examples.swap(inf, j);
        j
    }
}

fn example_from_row(
    table: &str,
    schema: &[Column],
    row: usize,
    cells: Vec<Option<Value>>,
) -> Result<Example, TrainingDataError> {
    if cells.len() != schema.len() {
        return Err(TrainingDataError::Arity {
            row,
            expected: schema.len() - 1,
            got: cells.len().saturating_sub(1),
        });
    }
    let mut values = Vec::with_capacity(schema.len());
    for (cell, column) in cells.into_iter().zip(schema) {
        let value = cell.ok_or_else(|| TrainingDataError::NullValue {
            table: table.to_owned(),
            row,
            column: column.name().to_owned(),
        })?;
        if value.is_number() != column.is_numeric() {
            return Err(TrainingDataError::CellType {
                table: table.to_owned(),
                row,
                column: column.name().to_owned(),
            });
        }
        if value.as_number().is_some_and(|x| !x.is_finite()) {
            return Err(TrainingDataError::NonFiniteValue {
                table: table.to_owned(),
                row,
                column: column.name().to_owned(),
            });
        }
        values.push(value);
    }
    match values.pop() {
        Some(Value::Number(class_value)) => Ok(Example::new(values, class_value)),
        _ => Err(TrainingDataError::NonNumericClass {
            table: table.to_owned(),
            column: schema[schema.len() - 1].name().to_owned(),
        }),
    }
}

impl fmt::Display for TrainingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for example in &self.examples {
            for value in &example.values {
                write!(f, "{value},")?;
            }
            writeln!(f, "{}", example.class_value)?;
        }
        Ok(())
    }
}
