//! Image retrieval for picture regions.
use crate::common::error::{Error, Result};
use crate::fetch::tier::{http_client, http_get};
use crate::mutate::Assets;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client as HttpClient;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

/// Byte-fetch capability for image URLs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>>;
}

/// Plain HTTP GET with its own (short) timeout.
#[derive(Debug, Clone)]
pub struct HttpAssets {
    client: HttpClient,
}

impl HttpAssets {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl AssetSource for HttpAssets {
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = http_get(&self.client, url).await.map_err(|e| Error::AssetFetchFailed {
            url: url.to_string(),
            kind: e.kind,
            detail: e.detail,
        })?;
        debug!(%url, size = bytes.len(), "asset fetched");
        Ok(bytes)
    }
}

/// Fetch every distinct URL concurrently. Failures are kept per URL so the
/// step can turn them into warnings.
pub async fn fetch_assets(source: &dyn AssetSource, urls: &[&str]) -> Assets {
    let mut seen = HashSet::with_capacity(urls.len());
    let unique: Vec<&str> = urls.iter().copied().filter(|u| seen.insert(*u)).collect();

    let results = join_all(unique.iter().map(|url| source.fetch_asset(url))).await;

    let mut assets = Assets::new();
    for (url, result) in unique.into_iter().zip(results) {
        if let Err(e) = &result {
            warn!(%url, error = %e, "asset fetch failed");
        }
        assets.insert(url, result);
    }
    assets
}
