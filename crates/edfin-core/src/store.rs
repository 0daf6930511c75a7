//! The `ArtifactStore` trait and the cache entry record.
//!
//! The trait is implemented by storage backends (e.g. `edfin-cache`). The
//! query engine and the HTTP layer depend on this abstraction, never on the
//! filesystem or the network directly.

use std::{future::Future, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DatasetType, Table};

/// A downloaded artifact on local disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
  /// Logical name, e.g. `edfin_full`.
  pub name:     String,
  pub path:     PathBuf,
  pub modified: DateTime<Utc>,
}

/// Abstraction over a local copy of the published artifacts.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ArtifactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether a local copy of `dataset` exists and is younger than the
  /// store's maximum age.
  fn is_current(
    &self,
    dataset: DatasetType,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fetch the remote artifact for `dataset`, replacing any local copy.
  ///
  /// On failure the previous local copy, if any, is left as it was.
  fn download(
    &self,
    dataset: DatasetType,
  ) -> impl Future<Output = Result<CacheEntry, Self::Error>> + Send + '_;

  /// Read the local copy of `dataset` into memory.
  fn load(
    &self,
    dataset: DatasetType,
  ) -> impl Future<Output = Result<Table, Self::Error>> + Send + '_;
}
