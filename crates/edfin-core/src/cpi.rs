//! CPI normalization: expressing every dollar column in one baseline
//! school year's dollars.
//!
//! For each row the adjustment index is `row CPI / baseline CPI`, and every
//! currency column of the dataset is multiplied by it with Arrow's arithmetic
//! kernels, so missing values propagate. The set of currency columns comes
//! from [`crate::variables::currency_columns`].

use arrow::{
  array::{Array, AsArray, Float64Array},
  compute::{
    cast,
    kernels::numeric::{div, mul},
  },
  datatypes::{DataType, Float64Type},
};

use crate::{
  DatasetType, Error, Result, Table,
  table::{column, int64_column, with_column},
  variables::{CPI_INDEX, YEAR, currency_columns},
};

/// Name of the per-row adjustment index column added by [`normalize`].
pub const ADJUSTMENT_INDEX: &str = "cpi_adj_index";

/// The CPI value of `year`, taken from the first row of that year.
///
/// Every row of one school year carries the same national CPI value; that is
/// an upstream invariant and is not verified here.
pub fn baseline_cpi(table: &Table, year: i32) -> Result<f64> {
  let row = int64_column(table, YEAR)?
    .iter()
    .position(|y| y == Some(i64::from(year)))
    .ok_or(Error::MissingBaselineYear(year))?;

  let cpi = cast(column(table, CPI_INDEX)?, &DataType::Float64)?;
  let cpi = cpi.as_primitive::<Float64Type>();
  if cpi.is_null(row) {
    return Err(Error::MissingBaselineCpi(year));
  }
  Ok(cpi.value(row))
}

/// Rescale the currency columns of `table` into baseline dollars and append
/// the adjustment index column.
///
/// Currency columns absent from `table` are skipped; integer ones come back
/// as floats. A missing CPI value or currency value yields a missing result
/// for that cell.
pub fn normalize(
  table: &Table,
  baseline: f64,
  dataset: DatasetType,
) -> Result<Table> {
  let cpi = cast(column(table, CPI_INDEX)?, &DataType::Float64)?;
  let index = div(&cpi, &Float64Array::new_scalar(baseline))?;

  let mut out = table.clone();
  for name in currency_columns(dataset) {
    let Some(values) = table.column_by_name(name) else { continue };
    let values = cast(values, &DataType::Float64)?;
    out = with_column(&out, name, mul(&values, &index)?)?;
  }
  with_column(&out, ADJUSTMENT_INDEX, index)
}
