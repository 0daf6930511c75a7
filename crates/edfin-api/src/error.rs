//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// A query parameter failed validation.
  #[error("bad request: {0}")]
  BadRequest(String),

  /// The parameters were valid but the data cannot satisfy them, e.g. a CPI
  /// baseline year absent from the artifact.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  /// Downloading, reading or decoding an artifact failed.
  #[error("upstream error: {0}")]
  Upstream(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<edfin_core::Error> for ApiError {
  fn from(e: edfin_core::Error) -> Self {
    use edfin_core::Error as E;
    match e {
      e if e.is_invalid_input() => Self::BadRequest(e.to_string()),
      E::MissingBaselineYear(_) | E::MissingBaselineCpi(_) => {
        Self::Unprocessable(e.to_string())
      }
      E::Store(_) | E::SchemaMismatch { .. } | E::ColumnType { .. } => {
        Self::Upstream(e.to_string())
      }
      e => Self::Internal(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    if status.is_server_error() {
      tracing::warn!(%status, error = %message, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
