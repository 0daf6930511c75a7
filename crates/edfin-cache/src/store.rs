//! [`CachedArtifactStore`]: the disk-backed implementation of
//! [`ArtifactStore`].

use std::path::Path;

use chrono::TimeDelta;
use edfin_core::{
  DatasetType, Table,
  store::{ArtifactStore, CacheEntry},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{CacheDir, Error, Fetcher, HttpFetcher, Result, decode::read_table};

/// Days after which a cached artifact is considered stale.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 30;

// ─── URLs ────────────────────────────────────────────────────────────────────

/// Remote location of each dataset variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUrls {
  pub skinny: String,
  pub full:   String,
}

impl ArtifactUrls {
  pub const DEFAULT_SKINNY: &'static str =
    "https://edfin-panel.s3.amazonaws.com/edfin_skinny.sqlite";
  pub const DEFAULT_FULL: &'static str =
    "https://edfin-panel.s3.amazonaws.com/edfin_full.sqlite";

  pub fn get(&self, dataset: DatasetType) -> &str {
    match dataset {
      DatasetType::Skinny => &self.skinny,
      DatasetType::Full => &self.full,
    }
  }
}

impl Default for ArtifactUrls {
  fn default() -> Self {
    Self {
      skinny: Self::DEFAULT_SKINNY.to_owned(),
      full:   Self::DEFAULT_FULL.to_owned(),
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Artifacts cached in a [`CacheDir`] and refreshed through a [`Fetcher`].
///
/// Downloads of the same variant are serialised by a per-variant lock; a
/// download lands in a temporary sibling file and is renamed onto the cache
/// path only once complete, so readers never see a partial artifact.
#[derive(Debug)]
pub struct CachedArtifactStore<F = HttpFetcher> {
  dir:     CacheDir,
  urls:    ArtifactUrls,
  max_age: TimeDelta,
  fetcher: F,
  locks:   [Mutex<()>; 2],
}

impl CachedArtifactStore<HttpFetcher> {
  /// A store over HTTP with the default URLs and a 30-day maximum age.
  pub fn open(dir: CacheDir) -> Result<Self> {
    Ok(Self::with_fetcher(dir, HttpFetcher::new()?))
  }
}

impl<F: Fetcher> CachedArtifactStore<F> {
  pub fn with_fetcher(dir: CacheDir, fetcher: F) -> Self {
    Self {
      dir,
      urls: ArtifactUrls::default(),
      max_age: TimeDelta::days(DEFAULT_MAX_AGE_DAYS),
      fetcher,
      locks: [Mutex::new(()), Mutex::new(())],
    }
  }

  pub fn urls(mut self, urls: ArtifactUrls) -> Self {
    self.urls = urls;
    self
  }

  pub fn max_age(mut self, max_age: TimeDelta) -> Self {
    self.max_age = max_age;
    self
  }

  pub fn cache_dir(&self) -> &CacheDir { &self.dir }

  pub fn fetcher(&self) -> &F { &self.fetcher }

  fn lock(&self, dataset: DatasetType) -> &Mutex<()> {
    match dataset {
      DatasetType::Skinny => &self.locks[0],
      DatasetType::Full => &self.locks[1],
    }
  }

  async fn fetch_into_cache(&self, dataset: DatasetType) -> Result<CacheEntry> {
    let _guard = self.lock(dataset).lock().await;
    self.dir.ensure().await?;

    let name = dataset.cache_name();
    let url = self.urls.get(dataset);
    let temp = self.dir.temp_path(name);
    let dest = self.dir.resolve(name);

    let bytes = match self.fetcher.fetch(url, &temp).await {
      Ok(bytes) => bytes,
      Err(e) => {
        discard(&temp).await;
        return Err(e);
      }
    };
    if let Err(e) = tokio::fs::rename(&temp, &dest).await {
      discard(&temp).await;
      return Err(Error::io(dest, e));
    }
    debug!(%dataset, bytes, path = %dest.display(), "artifact replaced");

    self
      .dir
      .entry(name)
      .await?
      .ok_or_else(|| Error::NotCached(name.to_owned()))
  }
}

async fn discard(temp: &Path) {
  match tokio::fs::remove_file(temp).await {
    Ok(()) => {}
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
    Err(e) => warn!(path = %temp.display(), error = %e, "could not remove partial download"),
  }
}

impl<F: Fetcher> ArtifactStore for CachedArtifactStore<F> {
  type Error = Error;

  async fn is_current(&self, dataset: DatasetType) -> Result<bool> {
    self.dir.is_current(dataset.cache_name(), self.max_age).await
  }

  async fn download(&self, dataset: DatasetType) -> Result<CacheEntry> {
    debug!(%dataset, url = self.urls.get(dataset), "refreshing cache");
    self.fetch_into_cache(dataset).await
  }

  async fn load(&self, dataset: DatasetType) -> Result<Table> {
    let path = self.dir.artifact_path(dataset);
    if !tokio::fs::try_exists(&path).await.map_err(|e| Error::io(&path, e))? {
      return Err(Error::NotCached(dataset.cache_name().to_owned()));
    }
    read_table(&path).await
  }
}
