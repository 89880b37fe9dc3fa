//! Transport strategies for reading one object.
use crate::common::FetchErrorKind;
use crate::fetch::reference::{ObjectLocation, encode_key};
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use reqwest::{Client as HttpClient, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Why a single tier attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierError {
    pub kind: FetchErrorKind,
    pub detail: String,
}

impl TierError {
    pub fn new(kind: FetchErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Transport, detail)
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode) -> Self {
        let kind = match status {
            StatusCode::NOT_FOUND => FetchErrorKind::NotFound,
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => FetchErrorKind::Forbidden,
            _ => FetchErrorKind::Transport,
        };
        Self::new(kind, format!("HTTP {}", status.as_u16()))
    }
}

impl fmt::Display for TierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// One way of reading an object. Attempts never panic or escape the chain;
/// every failure is a [`TierError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FetchTier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, location: &ObjectLocation) -> Result<Vec<u8>, TierError>;
}

/// Plain GET returning the body of a 2xx response.
pub(crate) async fn http_get(client: &HttpClient, url: &str) -> Result<Vec<u8>, TierError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| TierError::transport(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(TierError::from_status(status));
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| TierError::transport(e.to_string()))?;
    if body.is_empty() {
        return Err(TierError::transport("empty response body"));
    }
    Ok(body.to_vec())
}

pub(crate) fn http_client(timeout: Duration) -> crate::Result<HttpClient> {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| crate::Error::Config(format!("HTTP client: {}", e)))
}

/// Reads through the edge (CDN) domain in front of the store.
#[derive(Debug, Clone)]
pub struct EdgeTier {
    client: HttpClient,
    domain: String,
}

impl EdgeTier {
    pub fn new(client: HttpClient, domain: impl Into<String>) -> Self {
        Self {
            client,
            domain: domain.into(),
        }
    }

    pub fn url_for(&self, location: &ObjectLocation) -> String {
        format!("https://{}/{}", self.domain, encode_key(&location.key))
    }
}

#[async_trait]
impl FetchTier for EdgeTier {
    fn name(&self) -> &'static str {
        "edge"
    }

    async fn attempt(&self, location: &ObjectLocation) -> Result<Vec<u8>, TierError> {
        let url = self.url_for(location);
        debug!(tier = "edge", %url, "GET");
        http_get(&self.client, &url).await
    }
}

/// Reads the store's public HTTP endpoint.
#[derive(Debug, Clone)]
pub struct PublicTier {
    client: HttpClient,
    region: String,
    endpoint: Option<String>,
}

impl PublicTier {
    pub fn new(client: HttpClient, region: impl Into<String>, endpoint: Option<String>) -> Self {
        Self {
            client,
            region: region.into(),
            endpoint,
        }
    }

    /// The caller's own URL when it pointed outside the store, otherwise the
    /// virtual-hosted URL (path-style under a custom endpoint).
    pub fn url_for(&self, location: &ObjectLocation) -> String {
        if let Some(direct) = &location.direct_url {
            return direct.clone();
        }
        let key = encode_key(&location.key);
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), location.bucket, key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", location.bucket, self.region, key),
        }
    }
}

#[async_trait]
impl FetchTier for PublicTier {
    fn name(&self) -> &'static str {
        "public"
    }

    async fn attempt(&self, location: &ObjectLocation) -> Result<Vec<u8>, TierError> {
        let url = self.url_for(location);
        debug!(tier = "public", %url, "GET");
        http_get(&self.client, &url).await
    }
}

/// Authenticated `GetObject` through the SDK.
#[derive(Debug, Clone)]
pub struct ApiTier {
    client: S3Client,
    timeout: Duration,
}

impl ApiTier {
    pub fn new(client: S3Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>, TierError> {
        let response = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                let detail = aws_sdk_s3::error::DisplayErrorContext(&e).to_string();
                if detail.contains("NoSuchKey") || detail.contains("NotFound") {
                    TierError::new(FetchErrorKind::NotFound, detail)
                } else if detail.contains("AccessDenied") || detail.contains("Forbidden") {
                    TierError::new(FetchErrorKind::Forbidden, detail)
                } else {
                    TierError::transport(detail)
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| TierError::transport(e.to_string()))?;
        let bytes = bytes.to_vec();
        if bytes.is_empty() {
            return Err(TierError::transport("empty object"));
        }
        Ok(bytes)
    }
}

#[async_trait]
impl FetchTier for ApiTier {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn attempt(&self, location: &ObjectLocation) -> Result<Vec<u8>, TierError> {
        debug!(tier = "api", bucket = %location.bucket, key = %location.key, "GetObject");
        tokio::time::timeout(self.timeout, self.get(location))
            .await
            .map_err(|_| TierError::transport(format!("timed out after {:?}", self.timeout)))?
    }
}
