//! The in-memory table: an Arrow [`RecordBatch`] holding a loaded artifact or
//! a query result, and the handful of helpers the engine needs on top of it.
//!
//! Tables are values: filtering and column replacement return new batches and
//! never touch the source.

use std::sync::Arc;

use arrow::{
  array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray},
  datatypes::{DataType, Field, FieldRef, Float64Type, Int64Type, Schema},
  record_batch::{RecordBatch, RecordBatchOptions},
  util::display::array_value_to_string,
};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A loaded artifact or query result. Every field is nullable.
pub type Table = RecordBatch;

// ─── Arrays ──────────────────────────────────────────────────────────────────

/// A text column. `None` is a missing value.
pub fn strings<S: AsRef<str>>(values: impl IntoIterator<Item = Option<S>>) -> ArrayRef {
  Arc::new(values.into_iter().collect::<StringArray>())
}

pub fn integers(values: impl IntoIterator<Item = Option<i64>>) -> ArrayRef {
  Arc::new(values.into_iter().collect::<Int64Array>())
}

pub fn numerics(values: impl IntoIterator<Item = Option<f64>>) -> ArrayRef {
  Arc::new(values.into_iter().collect::<Float64Array>())
}

// ─── Construction ────────────────────────────────────────────────────────────

/// Build a table from named columns, rejecting duplicate names and ragged
/// columns. No columns at all gives an empty table.
pub fn from_columns<N: Into<String>>(
  columns: impl IntoIterator<Item = (N, ArrayRef)>,
) -> Result<Table> {
  let (names, arrays): (Vec<String>, Vec<ArrayRef>) = columns
    .into_iter()
    .map(|(name, array)| (name.into(), array))
    .unzip();

  let n_rows = arrays.first().map_or(0, |a| a.len());
  for (i, (name, array)) in names.iter().zip(&arrays).enumerate() {
    if array.len() != n_rows {
      return Err(Error::ColumnLength {
        name:     name.clone(),
        len:      array.len(),
        expected: n_rows,
      });
    }
    if names[..i].contains(name) {
      return Err(Error::DuplicateColumn(name.clone()));
    }
  }

  let fields: Vec<Field> = names
    .iter()
    .zip(&arrays)
    .map(|(name, array)| Field::new(name, array.data_type().clone(), true))
    .collect();
  let options = RecordBatchOptions::new().with_row_count(Some(n_rows));
  Ok(RecordBatch::try_new_with_options(
    Arc::new(Schema::new(fields)),
    arrays,
    &options,
  )?)
}

/// A table with no columns and no rows.
pub fn empty() -> Table { RecordBatch::new_empty(Arc::new(Schema::empty())) }

/// Replace the column of the same name in place, or append it.
pub fn with_column(table: &Table, name: &str, values: ArrayRef) -> Result<Table> {
  if table.num_columns() > 0 && values.len() != table.num_rows() {
    return Err(Error::ColumnLength {
      name:     name.to_owned(),
      len:      values.len(),
      expected: table.num_rows(),
    });
  }

  let schema = table.schema_ref();
  let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
  let mut arrays = table.columns().to_vec();
  let field = Arc::new(Field::new(name, values.data_type().clone(), true));
  match schema.column_with_name(name) {
    Some((i, _)) => {
      fields[i] = field;
      arrays[i] = values;
    }
    None => {
      fields.push(field);
      arrays.push(values);
    }
  }
  Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

pub fn column_names(table: &Table) -> impl Iterator<Item = &str> {
  table.schema_ref().fields().iter().map(|f| f.name().as_str())
}

/// The column called `name`, or [`Error::ColumnNotFound`].
pub fn column<'a>(table: &'a Table, name: &str) -> Result<&'a ArrayRef> {
  table
    .column_by_name(name)
    .ok_or_else(|| Error::ColumnNotFound(name.to_owned()))
}

pub fn int64_column<'a>(table: &'a Table, name: &str) -> Result<&'a Int64Array> {
  let array = column(table, name)?;
  array
    .as_primitive_opt::<Int64Type>()
    .ok_or_else(|| type_error(name, DataType::Int64, array))
}

pub fn string_column<'a>(table: &'a Table, name: &str) -> Result<&'a StringArray> {
  let array = column(table, name)?;
  array
    .as_string_opt::<i32>()
    .ok_or_else(|| type_error(name, DataType::Utf8, array))
}

fn type_error(name: &str, expected: DataType, array: &ArrayRef) -> Error {
  Error::ColumnType {
    name: name.to_owned(),
    expected,
    found: array.data_type().clone(),
  }
}

// ─── JSON ────────────────────────────────────────────────────────────────────

/// One JSON object per row, keyed by column name, with `null` for missing
/// values.
pub fn to_records(table: &Table) -> Vec<Map<String, Value>> {
  let names: Vec<&str> = column_names(table).collect();
  (0..table.num_rows())
    .map(|row| {
      names
        .iter()
        .zip(table.columns())
        .map(|(name, array)| ((*name).to_owned(), json_at(array.as_ref(), row)))
        .collect()
    })
    .collect()
}

fn json_at(array: &dyn Array, row: usize) -> Value {
  if array.is_null(row) {
    return Value::Null;
  }
  match array.data_type() {
    DataType::Utf8 => Value::from(array.as_string::<i32>().value(row)),
    DataType::Int64 => Value::from(array.as_primitive::<Int64Type>().value(row)),
    // Non-finite floats have no JSON form and become null.
    DataType::Float64 => Value::from(array.as_primitive::<Float64Type>().value(row)),
    _ => array_value_to_string(array, row).map_or(Value::Null, Value::String),
  }
}
