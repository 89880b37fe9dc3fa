//! Environment-driven configuration.
//!
//! # Example
//!
//! ```no_run
//! use deckfill::Config;
//!
//! # fn main() -> deckfill::Result<()> {
//! let config = Config::from_env()?;
//! println!("templates come from bucket {}", config.store.bucket);
//! # Ok(())
//! # }
//! ```
use crate::common::error::{Error, Result};
use crate::finalize::Destination;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::{Credentials, Region};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ASSET_TIMEOUT_SECS: u64 = 10;
const DEFAULT_OUTPUT_FOLDER: &str = "generated_presentations";

/// Object store holding templates and generated decks.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, LocalStack); switches to path-style addressing
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
        }
    }
}

// Keeps the secret out of logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Host of the CDN in front of the store, e.g. `d111.cloudfront.net`
    pub edge_domain: Option<String>,
    /// Bucket served by the edge domain; the store bucket when unset
    pub edge_bucket: Option<String>,
    pub timeout_secs: u64,
    pub asset_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            edge_domain: None,
            edge_bucket: None,
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            asset_timeout_secs: DEFAULT_ASSET_TIMEOUT_SECS,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Key prefix for uploaded decks
    pub folder: String,
    pub destination: Destination,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: DEFAULT_OUTPUT_FOLDER.to_string(),
            destination: Destination::Upload,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |name: &str| get(name).ok_or_else(|| Error::Config(format!("{} is not set", name)));
        let seconds = |name: &str, default: u64| -> Result<u64> {
            match get(name) {
                Some(v) => v
                    .parse()
                    .map_err(|_| Error::Config(format!("{} must be a whole number of seconds, got '{}'", name, v))),
                None => Ok(default),
            }
        };

        let config = Self {
            store: StoreConfig {
                bucket: required("S3_BUCKET_NAME")?,
                region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                endpoint: get("AWS_ENDPOINT_URL"),
                access_key_id: required("AWS_ACCESS_KEY_ID")?,
                secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
            },
            fetch: FetchConfig {
                edge_domain: get("EDGE_DOMAIN"),
                edge_bucket: get("EDGE_BUCKET"),
                timeout_secs: seconds("FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?,
                asset_timeout_secs: seconds("ASSET_TIMEOUT_SECS", DEFAULT_ASSET_TIMEOUT_SECS)?,
            },
            output: OutputConfig {
                folder: get("OUTPUT_FOLDER").unwrap_or_else(|| DEFAULT_OUTPUT_FOLDER.to_string()),
                ..OutputConfig::default()
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.bucket.is_empty() {
            return Err(Error::Config("store bucket is empty".to_string()));
        }
        if let Some(domain) = &self.fetch.edge_domain
            && (domain.contains("://") || domain.contains('/'))
        {
            return Err(Error::Config(format!(
                "edge domain '{}' must be a bare host name",
                domain
            )));
        }
        if self.fetch.timeout_secs == 0 || self.fetch.asset_timeout_secs == 0 {
            return Err(Error::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Client for the configured store, from static credentials.
    pub fn s3_client(&self) -> S3Client {
        let credentials = Credentials::new(
            &self.store.access_key_id,
            &self.store.secret_access_key,
            None,
            None,
            "deckfill",
        );
        let mut builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(self.store.region.clone()))
            .behavior_version_latest();
        if let Some(endpoint) = &self.store.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        S3Client::from_conf(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("S3_BUCKET_NAME", "assets"),
        ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
        ("AWS_SECRET_ACCESS_KEY", "secret"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(config.store.region, "us-east-1");
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch.asset_timeout(), Duration::from_secs(10));
        assert_eq!(config.output.folder, "generated_presentations");
        assert_eq!(config.output.destination, Destination::Upload);
        assert!(config.fetch.edge_domain.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut vars = BASE.to_vec();
        vars.extend([
            ("AWS_REGION", "eu-west-1"),
            ("EDGE_DOMAIN", "d111.cloudfront.net"),
            ("EDGE_BUCKET", "cdn-assets"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("AWS_ENDPOINT_URL", "  "),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.store.region, "eu-west-1");
        assert_eq!(config.store.endpoint, None);
        assert_eq!(config.fetch.edge_domain.as_deref(), Some("d111.cloudfront.net"));
        assert_eq!(config.fetch.edge_bucket.as_deref(), Some("cdn-assets"));
        assert_eq!(config.fetch.timeout_secs, 5);
    }

    #[test]
    fn test_missing_credentials() {
        let err = Config::from_lookup(lookup(&BASE[..2])).unwrap_err();
        assert!(err.to_string().contains("AWS_SECRET_ACCESS_KEY"));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = BASE.to_vec();
        vars.push(("FETCH_TIMEOUT_SECS", "soon"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());

        let mut vars = BASE.to_vec();
        vars.push(("EDGE_DOMAIN", "https://d111.cloudfront.net"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());

        let mut vars = BASE.to_vec();
        vars.push(("ASSET_TIMEOUT_SECS", "0"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config = serde_json::from_str(r#"{"store": {"bucket": "b"}, "output": {"destination": "stream"}}"#).unwrap();
        assert_eq!(config.store.region, "us-east-1");
        assert_eq!(config.output.destination, Destination::Stream);
        assert_eq!(config.fetch.timeout_secs, 30);
    }
}
