//! Downloading artifacts.

use std::{future::Future, path::Path};

use tokio::io::AsyncWriteExt as _;
use tracing::debug;

use crate::{Error, Result};

/// Something that can copy the body at `url` into the file at `dest`.
///
/// Implementations create or truncate `dest` and return the number of bytes
/// written. A partially written `dest` is left for the caller to clean up.
pub trait Fetcher: Send + Sync {
  fn fetch(
    &self,
    url: &str,
    dest: &Path,
  ) -> impl Future<Output = Result<u64>> + Send;
}

/// [`Fetcher`] over HTTP(S), streaming the body to disk chunk by chunk.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new() -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("edfin/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client })
  }
}

impl Fetcher for HttpFetcher {
  async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
    debug!(url, "fetching artifact");
    let mut resp = self.client.get(url).send().await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status {
        url:    url.to_owned(),
        status: status.as_u16(),
      });
    }

    let mut file = tokio::fs::File::create(dest)
      .await
      .map_err(|e| Error::io(dest, e))?;
    let mut written = 0u64;
    while let Some(chunk) = resp.chunk().await? {
      file.write_all(&chunk).await.map_err(|e| Error::io(dest, e))?;
      written += chunk.len() as u64;
    }
    file.sync_all().await.map_err(|e| Error::io(dest, e))?;

    debug!(url, bytes = written, "fetch complete");
    Ok(written)
  }
}
