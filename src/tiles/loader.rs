use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

use super::cache::TileCache;
use crate::core::config::TileLoaderConfig;
use crate::core::geo::TileRef;
use crate::{MapError, Result};

/// Shared async HTTP client for tile fetching when no custom loader config is
/// given.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    let defaults = TileLoaderConfig::default();
    build_client(&defaults).unwrap_or_else(|e| {
        log::warn!("falling back to default HTTP client: {}", e);
        reqwest::Client::new()
    })
});

fn build_client(config: &TileLoaderConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.timeout_ms))
        .pool_max_idle_per_host(16)
        .build()?)
}

/// Outcome of one tile fetch, reported back to the synchronizer.
///
/// `generation` identifies the fetch that produced it; a completion whose
/// generation no longer matches the tracked fetch for that tile is stale.
#[derive(Debug)]
pub struct TileCompletion {
    pub tile: TileRef,
    pub generation: u64,
    pub result: Result<Arc<Vec<u8>>>,
}

/// Fetches tile image bytes
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, tile: TileRef, url: &str) -> Result<Arc<Vec<u8>>>;
}

/// Fetches tiles over HTTP, serving repeats from an in-memory LRU cache.
/// No retries: a failed tile is reported once and left blank.
pub struct HttpTileFetcher {
    client: reqwest::Client,
    cache: TileCache,
}

impl HttpTileFetcher {
    pub fn new(config: &TileLoaderConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            cache: TileCache::new(config.cache_capacity),
        })
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }
}

impl Default for HttpTileFetcher {
    fn default() -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            cache: TileCache::default(),
        }
    }
}

#[async_trait]
impl TileFetcher for HttpTileFetcher {
    async fn fetch(&self, tile: TileRef, url: &str) -> Result<Arc<Vec<u8>>> {
        if let Some(bytes) = self.cache.get(&tile) {
            log::debug!("tile {} served from cache", tile);
            return Ok(bytes);
        }

        log::debug!("fetch tile {} from {}", tile, url);
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(MapError::TileFetch {
                tile,
                reason: format!("HTTP {}", resp.status()),
            });
        }

        let bytes = Arc::new(resp.bytes().await?.to_vec());
        log::debug!("downloaded tile {} ({} bytes)", tile, bytes.len());
        self.cache.put(tile, Arc::clone(&bytes));
        Ok(bytes)
    }
}
