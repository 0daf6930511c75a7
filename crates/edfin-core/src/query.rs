//! The query engine: validate, refresh the cache if needed, load, filter,
//! and optionally normalize to baseline-year dollars.

use arrow::{array::BooleanArray, compute::filter_record_batch};
use tracing::{debug, info};

use crate::{
  CpiBaseline, Error, FinanceQuery, GeoSpec, Result, Table, YearSpec,
  cpi::{baseline_cpi, normalize},
  store::ArtifactStore,
  table::{int64_column, string_column},
  variables::{STATE, YEAR, check_schema},
};

/// Cache behaviour for one call to [`get_finance_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
  /// Download even if the local copy is current.
  pub refresh: bool,
  /// Demote progress notices from `info` to `debug`.
  pub quiet:   bool,
}

macro_rules! notice {
  ($quiet:expr, $($arg:tt)+) => {
    if $quiet { debug!($($arg)+) } else { info!($($arg)+) }
  };
}

fn store_error<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

/// Run `query` against `store`.
///
/// The query is already validated, so every failure here is either a store
/// failure, a schema mismatch, or a missing CPI baseline year.
pub async fn get_finance_data<S: ArtifactStore>(
  store: &S,
  query: &FinanceQuery,
  options: FetchOptions,
) -> Result<Table> {
  let dataset = query.dataset;

  let needs_download =
    options.refresh || !store.is_current(dataset).await.map_err(store_error)?;
  if needs_download {
    notice!(options.quiet, %dataset, "downloading dataset");
    let entry = store.download(dataset).await.map_err(store_error)?;
    notice!(options.quiet, %dataset, path = %entry.path.display(), "download complete");
  } else {
    notice!(options.quiet, %dataset, "using cached data");
  }

  let table = store.load(dataset).await.map_err(store_error)?;
  check_schema(&table, dataset)?;

  // The baseline is looked up before any filtering so that the year and
  // geography filters cannot remove it.
  let baseline = match query.cpi {
    CpiBaseline::None => None,
    CpiBaseline::Year(year) => Some(baseline_cpi(&table, year)?),
  };

  let table = filter_rows(&table, query)?;

  let result = match baseline {
    Some(baseline) => normalize(&table, baseline, dataset)?,
    None => table,
  };
  debug!(rows = result.num_rows(), cols = result.num_columns(), "query complete");
  Ok(result)
}

/// Keep the rows matching the year and geography filters. A dimension set to
/// `all` keeps every row, including rows whose value there is missing.
fn filter_rows(table: &Table, query: &FinanceQuery) -> Result<Table> {
  let all_years = matches!(query.years, YearSpec::All);
  let all_states = matches!(query.geo, GeoSpec::All);
  if all_years && all_states {
    return Ok(table.clone());
  }

  let years = int64_column(table, YEAR)?;
  let states = string_column(table, STATE)?;
  let mask: BooleanArray = years
    .iter()
    .zip(states.iter())
    .map(|(year, state)| {
      let year_ok = year.map_or(all_years, |year| query.years.matches(year));
      let geo_ok = state.map_or(all_states, |state| query.geo.matches(state));
      Some(year_ok && geo_ok)
    })
    .collect();
  Ok(filter_record_batch(table, &mask)?)
}
