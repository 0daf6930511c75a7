//! [`CacheDir`]: the directory holding one file per dataset variant.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use edfin_core::{DatasetType, store::CacheEntry};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{Error, Result};

/// Extension of every cached artifact.
pub const ARTIFACT_EXTENSION: &str = "sqlite";

/// Per-user cache directory for downloaded artifacts.
///
/// The directory is created lazily by [`CacheDir::ensure`]; constructing a
/// `CacheDir` touches nothing on disk.
#[derive(Debug)]
pub struct CacheDir {
  root:    PathBuf,
  created: OnceCell<()>,
}

impl CacheDir {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root:    root.into(),
      created: OnceCell::new(),
    }
  }

  /// `<os cache dir>/edfin`, e.g. `~/.cache/edfin` on Linux.
  pub fn platform_default() -> Result<Self> {
    let base = dirs::cache_dir().ok_or(Error::NoCacheDir)?;
    Ok(Self::new(base.join("edfin")))
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Create the directory (and parents) if needed. Only the first successful
  /// call touches the filesystem.
  pub async fn ensure(&self) -> Result<&Path> {
    self
      .created
      .get_or_try_init(|| async {
        tokio::fs::create_dir_all(&self.root)
          .await
          .map_err(|e| Error::io(&self.root, e))?;
        debug!(path = %self.root.display(), "cache directory ready");
        Ok::<_, Error>(())
      })
      .await?;
    Ok(&self.root)
  }

  /// Path of the artifact with logical name `name`, e.g. `edfin_full` →
  /// `<root>/edfin_full.sqlite`.
  pub fn resolve(&self, name: &str) -> PathBuf {
    self.root.join(format!("{name}.{ARTIFACT_EXTENSION}"))
  }

  /// Path of the artifact for `dataset`.
  pub fn artifact_path(&self, dataset: DatasetType) -> PathBuf {
    self.resolve(dataset.cache_name())
  }

  /// A fresh, unique sibling path for an in-progress download of `name`.
  pub(crate) fn temp_path(&self, name: &str) -> PathBuf {
    self
      .root
      .join(format!(".{name}.{ARTIFACT_EXTENSION}.part-{}", uuid::Uuid::new_v4()))
  }

  /// The cache entry for `name`, or `None` if no file exists.
  pub async fn entry(&self, name: &str) -> Result<Option<CacheEntry>> {
    let path = self.resolve(name);
    let meta = match tokio::fs::metadata(&path).await {
      Ok(meta) => meta,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(Error::io(path, e)),
    };
    if !meta.is_file() {
      return Ok(None);
    }
    let modified = meta.modified().map_err(|e| Error::io(&path, e))?;
    Ok(Some(CacheEntry {
      name: name.to_owned(),
      path,
      modified: DateTime::<Utc>::from(modified),
    }))
  }

  /// Whether `name` exists and was modified strictly less than `max_age`
  /// before now.
  pub async fn is_current(&self, name: &str, max_age: TimeDelta) -> Result<bool> {
    self.is_current_at(name, max_age, Utc::now()).await
  }

  /// [`CacheDir::is_current`] with an explicit clock.
  pub async fn is_current_at(
    &self,
    name: &str,
    max_age: TimeDelta,
    now: DateTime<Utc>,
  ) -> Result<bool> {
    Ok(
      self
        .entry(name)
        .await?
        .is_some_and(|entry| now - entry.modified < max_age),
    )
  }

  /// Cache entries present on disk, in [`DatasetType::ALL`] order.
  pub async fn entries(&self) -> Result<Vec<CacheEntry>> {
    let mut out = Vec::new();
    for dataset in DatasetType::ALL {
      if let Some(entry) = self.entry(dataset.cache_name()).await? {
        out.push(entry);
      }
    }
    Ok(out)
  }
}
