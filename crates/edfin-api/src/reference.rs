//! Handlers for the reference lists: `GET /variables` and `GET /states`.

use axum::{Json, extract::Query};
use edfin_core::{
  DatasetType, get_valid_state_codes, list_variables, params::ALL, table::to_records,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct VariablesParams {
  pub dataset_type: Option<String>,
  /// A registry category such as `revenue`, or `all`.
  pub category:     Option<String>,
}

/// `GET /variables[?dataset_type=...][&category=...]`
pub async fn variables(
  Query(params): Query<VariablesParams>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
  let table = list_variables(
    params
      .dataset_type
      .as_deref()
      .unwrap_or(DatasetType::Skinny.as_str()),
    params.category.as_deref().unwrap_or(ALL),
  )?;
  Ok(Json(to_records(&table)))
}

/// `GET /states`
pub async fn states() -> Json<Vec<&'static str>> {
  Json(get_valid_state_codes().to_vec())
}
