//! Fixture panel shared by the unit tests.

use arrow::{array::BooleanArray, compute::filter_record_batch};

use crate::{
  DatasetType, Table,
  dataset::{MAX_YEAR, MIN_YEAR},
  states::VALID_STATE_CODES,
  table::{from_columns, int64_column, integers, numerics, string_column, strings},
  variables::{CPI_INDEX, ColumnType, STATE, YEAR, variables},
};

/// Districts generated per state and year.
pub(crate) const DISTRICTS_PER_STATE: usize = 2;

/// The fixture's CPI factor for `year`; strictly decreasing.
pub(crate) fn cpi_for(year: i64) -> f64 { 1.0 / (1.0 + 0.03 * (year - 2012) as f64) }

/// Every registry column of `dataset`, for all 51 jurisdictions and every
/// year of the panel, [`DISTRICTS_PER_STATE`] districts each.
pub(crate) fn fixture_table(dataset: DatasetType) -> Table {
  let mut keys: Vec<(i64, &str, usize)> = Vec::new();
  for year in MIN_YEAR..=MAX_YEAR {
    for state in VALID_STATE_CODES {
      for district in 0..DISTRICTS_PER_STATE {
        keys.push((i64::from(year), state, district));
      }
    }
  }

  let columns = variables(dataset).map(|v| {
    let array = match (v.name, v.kind) {
      (YEAR, _) => integers(keys.iter().map(|k| Some(k.0))),
      (STATE, _) => strings(keys.iter().map(|k| Some(k.1))),
      (CPI_INDEX, _) => numerics(keys.iter().map(|k| Some(cpi_for(k.0)))),
      ("ncesid", _) => strings(keys.iter().map(|k| Some(format!("{}{:05}", k.1, k.2)))),
      (_, ColumnType::Character) => {
        strings(keys.iter().map(|k| Some(format!("{}-{}", v.name, k.1))))
      }
      (_, ColumnType::Integer) => {
        integers(keys.iter().map(|k| Some(1_000 + 10 * k.2 as i64 + (k.0 - 2012))))
      }
      (_, ColumnType::Numeric) => numerics(
        keys
          .iter()
          .map(|k| Some(100.0 * (k.2 + 1) as f64 + (k.0 - 2012) as f64)),
      ),
    };
    (v.name, array)
  });

  from_columns(columns).expect("fixture columns are consistent")
}

/// `table` without the rows for which `drop(year, state)` holds.
pub(crate) fn without_rows(table: &Table, drop: impl Fn(i64, &str) -> bool) -> Table {
  let years = int64_column(table, YEAR).unwrap();
  let states = string_column(table, STATE).unwrap();
  let keep: BooleanArray = years
    .iter()
    .zip(states.iter())
    .map(|(year, state)| Some(!drop(year.unwrap(), state.unwrap())))
    .collect();
  filter_record_batch(table, &keep).unwrap()
}
