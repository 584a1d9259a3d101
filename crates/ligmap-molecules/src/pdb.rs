//! PDB structure fetching with an on-disk cache.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use ligmap_common::http::CappedClient;
use ligmap_common::{ExtractionConfig, LigmapError, PdbCode, Result};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where structure text comes from when it is not cached.
#[async_trait]
pub trait StructureSource: Send + Sync {
    /// Download the raw PDB text for one code.
    async fn download(&self, code: &PdbCode) -> Result<String>;
}

/// Downloads from the configured RCSB endpoint template.
pub struct RcsbSource {
    client: CappedClient,
    config: ExtractionConfig,
}

impl RcsbSource {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            client: CappedClient::for_extraction(config)?,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl StructureSource for RcsbSource {
    async fn download(&self, code: &PdbCode) -> Result<String> {
        let url = self.config.url_for(code.as_str());
        info!("Fetching PDB {} from {}", code, url);

        let response = self.client.get(&url)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LigmapError::Fetch(format!("{} returned HTTP {}", url, status)));
        }

        let body = response.bytes().await?;
        String::from_utf8(body.to_vec())
            .map_err(|_| LigmapError::Fetch(format!("{} returned a non-UTF-8 body", url)))
    }
}

/// Fetches structures through a [`StructureSource`], caching them as `{CODE}.pdb`.
///
/// The cache is checked by file existence only and never refreshed.
pub struct StructureFetcher<S = RcsbSource> {
    source: S,
    cache_dir: Option<PathBuf>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl StructureFetcher<RcsbSource> {
    /// Fetcher for the configured endpoint and cache settings.
    pub fn from_config(config: &ExtractionConfig, cache_dir: &Path) -> Result<Self> {
        let fetcher = Self::new(RcsbSource::new(config)?)
            .with_retries(config.max_retries, Duration::from_millis(config.retry_backoff_ms));
        Ok(if config.use_cache {
            fetcher.with_cache_dir(cache_dir)
        } else {
            fetcher
        })
    }
}

impl<S: StructureSource> StructureFetcher<S> {
    /// Uncached fetcher making a single attempt per code.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache_dir: None,
            max_retries: 0,
            retry_backoff: Duration::ZERO,
        }
    }

    pub fn with_cache_dir<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache_path(&self, code: &PdbCode) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.pdb", code)))
    }

    /// Structure text for `code`, from the cache when present.
    pub async fn fetch(&self, code: &PdbCode) -> Result<String> {
        if let Some(path) = self.cache_path(code) {
            if path.exists() {
                debug!("PDB {} found in cache", code);
                return Ok(fs::read_to_string(&path).await?);
            }
        }

        let text = self.download_with_retry(code).await?;

        if let Some(path) = self.cache_path(code) {
            if let Err(e) = write_atomic(&path, &text).await {
                warn!("Could not cache {} at {}: {}", code, path.display(), e);
            }
        }

        Ok(text)
    }

    async fn download_with_retry(&self, code: &PdbCode) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.source.download(code).await {
                Ok(text) => return Ok(text),
                Err(LigmapError::Fetch(msg)) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;
                    warn!(
                        "Fetch of {} failed ({}), retry {}/{} in {:?}",
                        code, msg, attempt, self.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Write through a uniquely named temp file in the same directory, then rename.
async fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{}.{}.part", file_name, Uuid::new_v4()));

    fs::write(&tmp, text).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}
