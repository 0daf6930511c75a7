//! Error types for `edfin-core`.

use arrow::{datatypes::DataType, error::ArrowError};
use thiserror::Error;

use crate::dataset::{MAX_YEAR, MIN_YEAR};

#[derive(Debug, Error)]
pub enum Error {
  // ── Invalid input ───────────────────────────────────────────────────────
  #[error("invalid year {0:?}: not an integer")]
  YearNotInteger(String),

  #[error("invalid year {0}: must be between {min} and {max}", min = MIN_YEAR, max = MAX_YEAR)]
  YearOutOfRange(i32),

  #[error("invalid year range {0:?}: expected START:END")]
  MalformedRange(String),

  #[error("invalid year range {input:?}: start {start} is after end {end}")]
  ReversedRange { input: String, start: i32, end: i32 },

  #[error("invalid state code(s): {}", quoted(.0))]
  InvalidStates(Vec<String>),

  #[error("invalid dataset type {0:?}: expected \"skinny\" or \"full\"")]
  InvalidDatasetType(String),

  #[error(
    "invalid CPI baseline {0:?}: expected \"none\" or a year between {min} and {max}",
    min = MIN_YEAR,
    max = MAX_YEAR
  )]
  InvalidCpiBaseline(String),

  // ── Data ────────────────────────────────────────────────────────────────
  #[error("no rows found for CPI baseline year {0}")]
  MissingBaselineYear(i32),

  #[error("CPI index is missing for baseline year {0}")]
  MissingBaselineCpi(i32),

  #[error("{dataset} artifact is missing expected columns: {}", .missing.join(", "))]
  SchemaMismatch {
    dataset: String,
    missing: Vec<String>,
  },

  #[error("column not found: {0}")]
  ColumnNotFound(String),

  #[error("duplicate column: {0}")]
  DuplicateColumn(String),

  #[error("column {name} has {len} rows, expected {expected}")]
  ColumnLength {
    name:     String,
    len:      usize,
    expected: usize,
  },

  #[error("column {name} holds {found}, expected {expected}")]
  ColumnType {
    name:     String,
    expected: DataType,
    found:    DataType,
  },

  #[error("arrow: {0}")]
  Arrow(#[from] ArrowError),

  // ── Backend ─────────────────────────────────────────────────────────────
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// `true` for errors caused by a malformed caller parameter.
  pub fn is_invalid_input(&self) -> bool {
    matches!(
      self,
      Self::YearNotInteger(_)
        | Self::YearOutOfRange(_)
        | Self::MalformedRange(_)
        | Self::ReversedRange { .. }
        | Self::InvalidStates(_)
        | Self::InvalidDatasetType(_)
        | Self::InvalidCpiBaseline(_)
    )
  }
}

/// Codes in debug quotes, e.g. `"ZZ", ""`.
fn quoted(codes: &[String]) -> String {
  codes
    .iter()
    .map(|c| format!("{c:?}"))
    .collect::<Vec<_>>()
    .join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
