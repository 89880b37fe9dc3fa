//! Publishing the finished deck.
//!
//! A finished [`Document`] is either uploaded to the object store under a
//! generated, collision-resistant key, or handed back as bytes for the
//! caller to stream. Nothing is written to the local filesystem.
use crate::common::error::{Error, Result};
use crate::fetch::reference::encode_key;
use crate::mutate::{Document, SlideType};
use crate::ooxml::opc::constants::content_type::PPTX_PACKAGE;
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    #[default]
    Upload,
    Stream,
}

/// Where the finished deck ended up.
#[derive(Debug, PartialEq, Eq)]
pub enum Finalized {
    Uploaded { artifact_key: String, artifact_url: String },
    Stream {
        bytes: Vec<u8>,
        content_type: &'static str,
        filename: String,
    },
}

/// Blob store accepting finished decks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `key` and return the object's URL.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Uploads through the object-store API.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: S3Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3Store {
    pub fn new(client: S3Client, bucket: impl Into<String>, region: impl Into<String>, endpoint: Option<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            region: region.into(),
            endpoint,
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, encode_key(key)),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, encode_key(key)),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3Store {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| Error::Upload {
                key: key.to_string(),
                detail: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;
        Ok(self.url_for(key))
    }
}

pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `<slide_type>_slide_<ts>.pptx` for one step, `multi_slide_<ts>.pptx` for a chain.
pub fn default_filename(slide_type: Option<SlideType>, now: DateTime<Utc>) -> String {
    match slide_type {
        Some(t) => format!("{}_slide_{}.pptx", t.tag(), timestamp(now)),
        None => format!("multi_slide_{}.pptx", timestamp(now)),
    }
}

fn stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("presentation")
}

/// `<folder>/<stem>_<ts>_<first 8 hex of sha256(bytes)>.pptx`
pub fn artifact_key(folder: &str, filename: &str, bytes: &[u8], now: DateTime<Utc>) -> String {
    let digest = Sha256::digest(bytes);
    let short: String = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect();
    let name = format!("{}_{}_{}.pptx", stem(filename), timestamp(now), short);
    match folder.trim_matches('/') {
        "" => name,
        folder => format!("{}/{}", folder, name),
    }
}

/// Turns finished documents into artifacts.
#[derive(Clone)]
pub struct Finalizer {
    store: Arc<dyn ArtifactStore>,
    folder: String,
}

impl Finalizer {
    pub fn new(store: Arc<dyn ArtifactStore>, folder: impl Into<String>) -> Self {
        Self {
            store,
            folder: folder.into(),
        }
    }

    #[instrument(skip(self, document), fields(size = document.len()))]
    pub async fn finalize(&self, document: Document, destination: Destination, filename: &str) -> Result<Finalized> {
        self.finalize_at(document, destination, filename, Utc::now()).await
    }

    pub(crate) async fn finalize_at(
        &self,
        document: Document,
        destination: Destination,
        filename: &str,
        now: DateTime<Utc>,
    ) -> Result<Finalized> {
        match destination {
            Destination::Upload => {
                let key = artifact_key(&self.folder, filename, document.as_bytes(), now);
                let url = self.store.put(&key, document.into_bytes(), PPTX_PACKAGE).await?;
                info!(%key, %url, "deck uploaded");
                Ok(Finalized::Uploaded {
                    artifact_key: key,
                    artifact_url: url,
                })
            },
            Destination::Stream => {
                let filename = if filename.to_ascii_lowercase().ends_with(".pptx") {
                    filename.to_string()
                } else {
                    format!("{}.pptx", filename)
                };
                Ok(Finalized::Stream {
                    bytes: document.into_bytes(),
                    content_type: PPTX_PACKAGE,
                    filename,
                })
            },
        }
    }
}
