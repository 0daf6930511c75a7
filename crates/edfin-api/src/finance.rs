//! Handler for `GET /finance`.
//!
//! The four query parameters use the same string syntax as the library
//! (`yr=2020:2022`, `geo=KY,TN`, `dataset_type=full`, `cpi_adj=2022`) and
//! default to `all`, `all`, `skinny` and `none`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use edfin_core::{
  DatasetType, FetchOptions, FinanceQuery, get_finance_data,
  params::ALL,
  store::ArtifactStore,
  table::{column_names, to_records},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct FinanceParams {
  pub yr:           Option<String>,
  pub geo:          Option<String>,
  pub dataset_type: Option<String>,
  pub cpi_adj:      Option<String>,
  /// Download the artifact even if the cached copy is current.
  #[serde(default)]
  pub refresh:      bool,
}

#[derive(Debug, Serialize)]
pub struct FinanceResponse {
  pub dataset_type: DatasetType,
  pub rows:         usize,
  pub columns:      Vec<String>,
  pub data:         Vec<Map<String, Value>>,
}

/// `GET /finance[?yr=...][&geo=...][&dataset_type=...][&cpi_adj=...][&refresh=true]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<FinanceParams>,
) -> Result<Json<FinanceResponse>, ApiError>
where
  S: ArtifactStore,
{
  let query = FinanceQuery::parse(
    params.yr.as_deref().unwrap_or(ALL),
    params.geo.as_deref().unwrap_or(ALL),
    params
      .dataset_type
      .as_deref()
      .unwrap_or(DatasetType::Skinny.as_str()),
    params.cpi_adj.as_deref().unwrap_or("none"),
  )?;

  let options = FetchOptions {
    refresh: params.refresh,
    quiet:   true,
  };
  let table = get_finance_data(store.as_ref(), &query, options).await?;

  Ok(Json(FinanceResponse {
    dataset_type: query.dataset,
    rows:         table.num_rows(),
    columns:      column_names(&table).map(str::to_owned).collect(),
    data:         to_records(&table),
  }))
}
