//! Error type for `edfin-cache`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] edfin_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("i/o error at {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with a non-success status.
  #[error("GET {url} failed with status {status}")]
  Status { url: String, status: u16 },

  /// No per-user cache directory could be determined for this platform.
  #[error("no cache directory available on this platform")]
  NoCacheDir,

  #[error("dataset {0} is not cached")]
  NotCached(String),

  #[error("artifact {} has no `{table}` table", path.display())]
  MissingTable { path: PathBuf, table: &'static str },
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
