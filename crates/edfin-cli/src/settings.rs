//! Runtime settings, layered from an optional TOML file and `EDFIN_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use chrono::TimeDelta;
use edfin_cache::{ArtifactUrls, CacheDir, CachedArtifactStore, DEFAULT_MAX_AGE_DAYS};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Overrides the platform cache directory.
  pub cache_dir:    Option<PathBuf>,
  pub max_age_days: i64,
  pub skinny_url:   String,
  pub full_url:     String,
  pub host:         String,
  pub port:         u16,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      cache_dir:    None,
      max_age_days: DEFAULT_MAX_AGE_DAYS,
      skinny_url:   ArtifactUrls::DEFAULT_SKINNY.to_owned(),
      full_url:     ArtifactUrls::DEFAULT_FULL.to_owned(),
      host:         "127.0.0.1".to_owned(),
      port:         8080,
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then apply `EDFIN_*` overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("EDFIN"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn cache_dir(&self) -> anyhow::Result<CacheDir> {
    match &self.cache_dir {
      Some(root) => Ok(CacheDir::new(root)),
      None => CacheDir::platform_default().context("no usable cache directory"),
    }
  }

  /// `max_age_days` as a duration; negative or unrepresentable values are
  /// rejected.
  pub fn max_age(&self) -> anyhow::Result<TimeDelta> {
    if self.max_age_days < 0 {
      bail!("max_age_days must not be negative, got {}", self.max_age_days);
    }
    TimeDelta::try_days(self.max_age_days)
      .with_context(|| format!("max_age_days {} is out of range", self.max_age_days))
  }

  pub fn urls(&self) -> ArtifactUrls {
    ArtifactUrls {
      skinny: self.skinny_url.clone(),
      full:   self.full_url.clone(),
    }
  }

  /// The disk-backed store these settings describe.
  pub fn store(&self) -> anyhow::Result<CachedArtifactStore> {
    let store = CachedArtifactStore::open(self.cache_dir()?)
      .context("failed to build HTTP client")?
      .urls(self.urls())
      .max_age(self.max_age()?);
    Ok(store)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
