//! On-disk cache for the published finance artifacts.
//!
//! [`CachedArtifactStore`] implements [`edfin_core::store::ArtifactStore`]:
//! it downloads each dataset variant over HTTP into a [`CacheDir`], decides
//! freshness from file modification times, and decodes the SQLite artifact
//! into an [`edfin_core::Table`]. Database reads go through
//! [`tokio_rusqlite`] so they never block the async runtime.

mod decode;

pub mod cache_dir;
pub mod error;
pub mod fetch;
pub mod store;

pub use cache_dir::CacheDir;
pub use decode::{ARTIFACT_TABLE, read_table};
pub use error::{Error, Result};
pub use fetch::{Fetcher, HttpFetcher};
pub use store::{ArtifactUrls, CachedArtifactStore, DEFAULT_MAX_AGE_DAYS};

#[cfg(test)]
mod tests;
