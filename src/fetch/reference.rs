//! Template references and the bucket/key they resolve to.
//!
//! A reference is a bare object key, a URL on the object store itself
//! (virtual-hosted or path-style), or a URL on the edge domain that fronts
//! the store. Every form resolves to exactly one bucket and key; query
//! strings are dropped and path segments are percent-decoded.
use crate::common::error::{Error, Result};
use reqwest::Url;
use std::fmt;

/// Where a template lives, as the caller named it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateReference {
    /// `presentations/deck.pptx`
    Key(String),
    /// `https://<bucket>.s3.<region>.amazonaws.com/<key>` or the path-style form
    BucketUrl { bucket: String, key: String },
    /// `https://<edge-domain>/<key>`
    EdgeUrl { key: String },
    /// Any other URL; the key is its path and the bucket is the default
    Opaque { url: Url, key: String },
}

/// A resolved object: the same value is handed to every fetch tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
    /// The caller's own URL when it points outside the store
    pub direct_url: Option<String>,
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

fn decode_key(path: &str, input: &str) -> Result<String> {
    let trimmed = path.trim_start_matches('/');
    let key = urlencoding::decode(trimmed)
        .map_err(|e| Error::InvalidReference(format!("'{}': {}", input, e)))?
        .into_owned();
    if key.is_empty() {
        return Err(Error::InvalidReference(format!("'{}' names no object key", input)));
    }
    Ok(key)
}

/// Bucket from a virtual-hosted store host: `<bucket>.s3[.-]<region>.amazonaws.com` or `<bucket>.s3.amazonaws.com`.
///
/// Bucket names may themselves contain `.s3`, so the service label is the last one.
fn virtual_hosted_bucket(host: &str) -> Option<&str> {
    let rest = host.strip_suffix(".amazonaws.com")?;
    let (bucket, service) = rest.rsplit_once(".s3")?;
    let valid_service = service.is_empty() || service.starts_with('.') || service.starts_with('-');
    (valid_service && !bucket.is_empty()).then_some(bucket)
}

/// Path-style store host: `s3.amazonaws.com`, `s3.<region>.amazonaws.com`, `s3-<region>.amazonaws.com`.
fn is_path_style_host(host: &str) -> bool {
    host == "s3.amazonaws.com"
        || (host.ends_with(".amazonaws.com") && (host.starts_with("s3.") || host.starts_with("s3-")))
}

impl TemplateReference {
    /// Classify a reference. `edge_domain` is the configured edge host, if any.
    pub fn parse(input: &str, edge_domain: Option<&str>) -> Result<Self> {
        let input = input.trim();
        if !(input.starts_with("http://") || input.starts_with("https://")) {
            let key = input.trim_start_matches('/');
            if key.is_empty() {
                return Err(Error::InvalidReference("empty object key".to_string()));
            }
            return Ok(Self::Key(key.to_string()));
        }

        let url = Url::parse(input).map_err(|e| Error::InvalidReference(format!("'{}': {}", input, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidReference(format!("'{}' has no host", input)))?
            .to_ascii_lowercase();

        if edge_domain.is_some_and(|edge| edge.eq_ignore_ascii_case(&host)) {
            return Ok(Self::EdgeUrl {
                key: decode_key(url.path(), input)?,
            });
        }
        if is_path_style_host(&host) {
            let path = url.path().trim_start_matches('/');
            let (bucket, key) = path
                .split_once('/')
                .ok_or_else(|| Error::InvalidReference(format!("'{}' names no object key", input)))?;
            return Ok(Self::BucketUrl {
                bucket: bucket.to_string(),
                key: decode_key(key, input)?,
            });
        }
        if let Some(bucket) = virtual_hosted_bucket(&host) {
            return Ok(Self::BucketUrl {
                bucket: bucket.to_string(),
                key: decode_key(url.path(), input)?,
            });
        }
        let key = decode_key(url.path(), input)?;
        Ok(Self::Opaque { url, key })
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Key(key) | Self::BucketUrl { key, .. } | Self::EdgeUrl { key } | Self::Opaque { key, .. } => key,
        }
    }

    /// Resolve the bucket. Explicit buckets win; edge URLs use the bucket
    /// behind the edge domain; everything else uses the default bucket.
    pub fn locate(&self, default_bucket: &str, edge_bucket: Option<&str>) -> ObjectLocation {
        let (bucket, direct_url) = match self {
            Self::BucketUrl { bucket, .. } => (bucket.as_str(), None),
            Self::EdgeUrl { .. } => (edge_bucket.unwrap_or(default_bucket), None),
            Self::Opaque { url, .. } => {
                let mut direct = url.clone();
                direct.set_fragment(None);
                (default_bucket, Some(direct.to_string()))
            },
            Self::Key(_) => (default_bucket, None),
        };
        ObjectLocation {
            bucket: bucket.to_string(),
            key: self.key().to_string(),
            direct_url,
        }
    }
}

/// Percent-encode each path segment of a key for use in a URL.
pub(crate) fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
