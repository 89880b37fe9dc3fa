use crate::common::FetchErrorKind;
use crate::common::error::{Error, Result};
use crate::config::Config;
use crate::fetch::reference::{ObjectLocation, TemplateReference};
use crate::fetch::tier::{ApiTier, EdgeTier, FetchTier, PublicTier, TierError, http_client};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// Anything that can produce template bytes for a reference.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// `preferred_bucket` replaces the default bucket unless the reference names its own.
    async fn fetch_template<'a>(&self, reference: &str, preferred_bucket: Option<&'a str>) -> Result<Vec<u8>>;
}

/// Ordered chain of fetch tiers, short-circuiting on the first success.
pub struct Fetcher {
    tiers: Vec<Box<dyn FetchTier>>,
    default_bucket: String,
    edge_domain: Option<String>,
    edge_bucket: Option<String>,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("tiers", &self.tiers.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("default_bucket", &self.default_bucket)
            .field("edge_domain", &self.edge_domain)
            .finish()
    }
}

impl Fetcher {
    pub fn new(tiers: Vec<Box<dyn FetchTier>>, default_bucket: impl Into<String>) -> Self {
        Self {
            tiers,
            default_bucket: default_bucket.into(),
            edge_domain: None,
            edge_bucket: None,
        }
    }

    pub fn with_edge(mut self, domain: impl Into<String>, bucket: Option<String>) -> Self {
        self.edge_domain = Some(domain.into());
        self.edge_bucket = bucket;
        self
    }

    /// Edge (when a domain is configured), public, then authenticated API.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = http_client(config.fetch.timeout())?;
        let mut tiers: Vec<Box<dyn FetchTier>> = Vec::with_capacity(3);
        if let Some(domain) = &config.fetch.edge_domain {
            tiers.push(Box::new(EdgeTier::new(http.clone(), domain.clone())));
        }
        tiers.push(Box::new(PublicTier::new(
            http,
            config.store.region.clone(),
            config.store.endpoint.clone(),
        )));
        tiers.push(Box::new(ApiTier::new(config.s3_client(), config.fetch.timeout())));

        let fetcher = Self::new(tiers, config.store.bucket.clone());
        Ok(match &config.fetch.edge_domain {
            Some(domain) => fetcher.with_edge(domain.clone(), config.fetch.edge_bucket.clone()),
            None => fetcher,
        })
    }

    /// Bucket precedence: the reference's own bucket, the edge bucket for edge
    /// URLs, `preferred_bucket`, then the configured default.
    pub fn resolve(&self, reference: &str, preferred_bucket: Option<&str>) -> Result<ObjectLocation> {
        let parsed = TemplateReference::parse(reference, self.edge_domain.as_deref())?;
        let fallback = preferred_bucket
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.default_bucket);
        Ok(parsed.locate(fallback, self.edge_bucket.as_deref()))
    }

    /// Try every tier against the same location.
    pub async fn fetch_location(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        let mut failures: Vec<(&'static str, TierError)> = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            match tier.attempt(location).await {
                Ok(bytes) => {
                    info!(tier = tier.name(), %location, size = bytes.len(), "template fetched");
                    return Ok(bytes);
                },
                Err(e) => {
                    warn!(tier = tier.name(), %location, error = %e, "fetch tier failed");
                    failures.push((tier.name(), e));
                },
            }
        }
        Err(exhausted(location, failures))
    }
}

/// Not-found if any tier saw the object missing, else forbidden if any tier
/// was refused, else transport.
fn exhausted(location: &ObjectLocation, failures: Vec<(&'static str, TierError)>) -> Error {
    let kind = [FetchErrorKind::NotFound, FetchErrorKind::Forbidden]
        .into_iter()
        .find(|k| failures.iter().any(|(_, e)| e.kind == *k))
        .unwrap_or(FetchErrorKind::Transport);
    let detail = if failures.is_empty() {
        "no fetch tiers configured".to_string()
    } else {
        failures
            .iter()
            .map(|(name, e)| format!("{}: {}", name, e))
            .collect::<Vec<_>>()
            .join("; ")
    };
    Error::Fetch {
        kind,
        key: location.key.clone(),
        detail,
    }
}

#[async_trait]
impl TemplateSource for Fetcher {
    #[instrument(skip(self))]
    async fn fetch_template<'a>(&self, reference: &str, preferred_bucket: Option<&'a str>) -> Result<Vec<u8>> {
        let location = self.resolve(reference, preferred_bucket)?;
        self.fetch_location(&location).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tier::MockFetchTier;
    use mockall::predicate::eq;

    const BYTES: &[u8] = b"PK\x03\x04deck";

    fn tier(name: &'static str, result: std::result::Result<Vec<u8>, TierError>, times: usize) -> Box<dyn FetchTier> {
        let mut mock = MockFetchTier::new();
        mock.expect_name().return_const(name);
        mock.expect_attempt().times(times).return_once(move |_| result);
        Box::new(mock)
    }

    fn forbidden() -> TierError {
        TierError::new(FetchErrorKind::Forbidden, "HTTP 403")
    }

    #[tokio::test]
    async fn test_edge_forbidden_falls_through_to_public() {
        crate::testing::init_tracing();
        let fetcher = Fetcher::new(
            vec![
                tier("edge", Err(forbidden()), 1),
                tier("public", Ok(BYTES.to_vec()), 1),
                tier("api", Ok(b"never".to_vec()), 0),
            ],
            "assets",
        )
        .with_edge("d111.cloudfront.net", None);

        let bytes = fetcher.fetch_template("presentations/deck.pptx", None).await.unwrap();
        assert_eq!(bytes, BYTES);
    }

    #[tokio::test]
    async fn test_all_tiers_exhausted() {
        let fetcher = Fetcher::new(
            vec![
                tier("edge", Err(forbidden()), 1),
                tier("public", Err(TierError::new(FetchErrorKind::NotFound, "HTTP 404")), 1),
                tier("api", Err(TierError::transport("timed out")), 1),
            ],
            "assets",
        );
        let err = fetcher.fetch_template("missing.pptx", None).await.unwrap_err();
        match err {
            Error::Fetch { kind, key, detail } => {
                assert_eq!(kind, FetchErrorKind::NotFound);
                assert_eq!(key, "missing.pptx");
                assert!(detail.contains("edge: forbidden"));
                assert!(detail.contains("api: transport: timed out"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_forbidden_outranks_transport() {
        let fetcher = Fetcher::new(
            vec![
                tier("public", Err(TierError::transport("reset")), 1),
                tier("api", Err(forbidden()), 1),
            ],
            "assets",
        );
        let err = fetcher.fetch_template("k.pptx", None).await.unwrap_err();
        assert_eq!(err.kind(), crate::common::ErrorKind::Fetch(FetchErrorKind::Forbidden));
    }

    /// Three tiers that must all see `expected`; only the last one succeeds.
    fn expecting(expected: ObjectLocation) -> Vec<Box<dyn FetchTier>> {
        let mut tiers: Vec<Box<dyn FetchTier>> = Vec::new();
        for (i, name) in ["edge", "public", "api"].into_iter().enumerate() {
            let mut mock = MockFetchTier::new();
            mock.expect_name().return_const(name);
            let result = if i == 2 { Ok(BYTES.to_vec()) } else { Err(forbidden()) };
            mock.expect_attempt()
                .with(eq(expected.clone()))
                .times(1)
                .return_once(move |_| result);
            tiers.push(Box::new(mock));
        }
        tiers
    }

    fn location(bucket: &str, key: &str) -> ObjectLocation {
        ObjectLocation {
            bucket: bucket.to_string(),
            key: key.to_string(),
            direct_url: None,
        }
    }

    #[tokio::test]
    async fn test_bucket_override_reaches_every_tier() {
        let fetcher = Fetcher::new(expecting(location("decks", "q4/deck.pptx")), "assets");
        let bytes = fetcher
            .fetch_template("https://decks.s3.us-east-1.amazonaws.com/q4/deck.pptx?token=abc", None)
            .await
            .unwrap();
        assert_eq!(bytes, BYTES);
    }

    #[tokio::test]
    async fn test_preferred_bucket_reaches_every_tier() {
        let fetcher = Fetcher::new(expecting(location("decks", "q4/deck.pptx")), "assets");
        let bytes = fetcher.fetch_template("q4/deck.pptx", Some("decks")).await.unwrap();
        assert_eq!(bytes, BYTES);
    }

    #[tokio::test]
    async fn test_explicit_bucket_outranks_preferred() {
        let fetcher = Fetcher::new(expecting(location("decks", "q4/deck.pptx")), "assets");
        let bytes = fetcher
            .fetch_template("https://decks.s3.amazonaws.com/q4/deck.pptx", Some("archive"))
            .await
            .unwrap();
        assert_eq!(bytes, BYTES);
    }

    #[test]
    fn test_resolve_bucket_precedence() {
        let fetcher = Fetcher::new(Vec::new(), "assets").with_edge("d111.cloudfront.net", Some("edge".to_string()));
        assert_eq!(fetcher.resolve("a.pptx", None).unwrap().bucket, "assets");
        assert_eq!(fetcher.resolve("a.pptx", Some("decks")).unwrap().bucket, "decks");
        assert_eq!(fetcher.resolve("a.pptx", Some("")).unwrap().bucket, "assets");
        assert_eq!(
            fetcher.resolve("https://d111.cloudfront.net/a.pptx", Some("decks")).unwrap().bucket,
            "edge"
        );
        assert_eq!(
            fetcher.resolve("https://files.example.com/a.pptx", Some("decks")).unwrap().bucket,
            "decks"
        );
    }

    #[tokio::test]
    async fn test_invalid_reference_skips_tiers() {
        let fetcher = Fetcher::new(vec![tier("public", Ok(BYTES.to_vec()), 0)], "assets");
        let err = fetcher.fetch_template("", Some("decks")).await.unwrap_err();
        assert_eq!(err.kind(), crate::common::ErrorKind::Validation);
    }
}
