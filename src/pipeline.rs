//! Request-level orchestration: fetch once, mutate, finalize.
//!
//! Every request is validated (tag dispatch and record decoding) before the
//! template is fetched, so a bad request never costs a network round trip.
use crate::chain::run_chain;
use crate::common::error::Result;
use crate::config::Config;
use crate::fetch::{AssetSource, Fetcher, HttpAssets, TemplateSource, fetch_assets};
use crate::finalize::{Destination, Finalized, Finalizer, S3Store, default_filename};
use crate::mutate::{Document, MutationRequest, SlideMutator, Warning, mutate};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

/// A published deck and the non-fatal problems met while building it.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub finalized: Finalized,
    pub warnings: Vec<Warning>,
}

/// How the caller wants the result delivered.
#[derive(Debug, Clone, Default)]
pub struct Delivery {
    /// Falls back to the configured destination
    pub destination: Option<Destination>,
    /// Falls back to a generated `<type>_slide_<ts>.pptx` name
    pub filename: Option<String>,
}

/// Holds no per-request state; one instance serves concurrent requests.
#[derive(Clone)]
pub struct Pipeline {
    templates: Arc<dyn TemplateSource>,
    assets: Arc<dyn AssetSource>,
    finalizer: Finalizer,
    destination: Destination,
}

impl Pipeline {
    pub fn new(
        templates: Arc<dyn TemplateSource>,
        assets: Arc<dyn AssetSource>,
        finalizer: Finalizer,
        destination: Destination,
    ) -> Self {
        Self {
            templates,
            assets,
            finalizer,
            destination,
        }
    }

    /// Wire the store-backed fetcher, HTTP image fetching and S3 uploads.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let store = S3Store::new(
            config.s3_client(),
            config.store.bucket.clone(),
            config.store.region.clone(),
            config.store.endpoint.clone(),
        );
        Ok(Self::new(
            Arc::new(Fetcher::from_config(config)?),
            Arc::new(HttpAssets::new(config.fetch.asset_timeout())?),
            Finalizer::new(Arc::new(store), config.output.folder.clone()),
            config.output.destination,
        ))
    }

    /// Apply one mutation. A missing required region fails the request.
    ///
    /// `bucket` is the caller's preferred bucket for a template reference that
    /// does not name one.
    #[instrument(skip(self, request, delivery), fields(slide_type = %request.slide_type))]
    pub async fn run_single(
        &self,
        template: &str,
        bucket: Option<&str>,
        request: MutationRequest,
        delivery: Delivery,
    ) -> Result<PipelineOutcome> {
        let step = request.into_mutator()?;
        let bytes = self.templates.fetch_template(template, bucket).await?;
        let assets = fetch_assets(self.assets.as_ref(), &step.image_urls()).await;

        let done = mutate(Document::new(bytes), step.as_ref(), &assets).map_err(|failure| failure.error)?;
        let filename = delivery
            .filename
            .unwrap_or_else(|| default_filename(Some(step.slide_type()), Utc::now()));
        self.publish(done.document, done.warnings, delivery.destination, &filename)
            .await
    }

    /// Apply an ordered list of mutations to one fetch of the template.
    #[instrument(skip(self, requests, delivery), fields(steps = requests.len()))]
    pub async fn run_multi(
        &self,
        template: &str,
        bucket: Option<&str>,
        requests: Vec<MutationRequest>,
        delivery: Delivery,
    ) -> Result<PipelineOutcome> {
        let steps = requests
            .into_iter()
            .map(MutationRequest::into_mutator)
            .collect::<Result<Vec<Box<dyn SlideMutator>>>>()?;
        let bytes = self.templates.fetch_template(template, bucket).await?;

        let outcome = run_chain(Document::new(bytes), &steps, self.assets.as_ref()).await?;
        let filename = delivery
            .filename
            .unwrap_or_else(|| default_filename(None, Utc::now()));
        self.publish(outcome.document, outcome.warnings, delivery.destination, &filename)
            .await
    }

    async fn publish(
        &self,
        document: Document,
        warnings: Vec<Warning>,
        destination: Option<Destination>,
        filename: &str,
    ) -> Result<PipelineOutcome> {
        let destination = destination.unwrap_or(self.destination);
        let finalized = self.finalizer.finalize(document, destination, filename).await?;
        info!(?destination, warnings = warnings.len(), "request complete");
        Ok(PipelineOutcome { finalized, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Error, ErrorKind, FetchErrorKind};
    use crate::fetch::assets::MockAssetSource;
    use crate::fetch::fetcher::MockTemplateSource;
    use crate::finalize::MockArtifactStore;
    use crate::testing::{PptxBuilder, shape_text, text_shape};
    use serde_json::json;

    fn template() -> Vec<u8> {
        PptxBuilder::new()
            .slide(vec![text_shape(2, "Title 1", "Deck"), text_shape(3, "Company", "ACME")])
            .slide(vec![text_shape(2, "Header1", "Overview"), text_shape(3, "Description", "d")])
            .slide(vec![text_shape(2, "Header1", "Old"), text_shape(3, "Notes", "n")])
            .slide(vec![text_shape(2, "Header1", "Third"), text_shape(3, "Description", "d")])
            .build()
    }

    fn templates(times: usize) -> MockTemplateSource {
        let mut source = MockTemplateSource::new();
        source
            .expect_fetch_template()
            .withf(|reference, bucket| reference == "presentations/deck.pptx" && bucket.is_none())
            .times(times)
            .returning(|_, _| Ok(template()));
        source
    }

    fn pipeline(source: MockTemplateSource, store: MockArtifactStore) -> Pipeline {
        Pipeline::new(
            Arc::new(source),
            Arc::new(MockAssetSource::new()),
            Finalizer::new(Arc::new(store), "out"),
            Destination::Stream,
        )
    }

    fn streamed(outcome: &PipelineOutcome) -> &[u8] {
        match &outcome.finalized {
            Finalized::Stream { bytes, .. } => bytes,
            other => panic!("expected a stream, got {:?}", other),
        }
    }

    fn points(slide: u32, header: &str) -> MutationRequest {
        MutationRequest::new(
            "points",
            json!({"slide_number": slide, "header": header, "description": "body"}),
        )
    }

    #[tokio::test]
    async fn test_chain_fetches_template_once() {
        crate::testing::init_tracing();
        let p = pipeline(templates(1), MockArtifactStore::new());
        let requests = vec![
            MutationRequest::new("cover", json!({"slide_number": 1, "title": "Annual", "company_name": "Initech"})),
            points(2, "Q4 Results"),
            points(3, "Skipped body"),
            points(4, "Outlook"),
        ];
        let outcome = p
            .run_multi("presentations/deck.pptx", None, requests, Delivery::default())
            .await
            .unwrap();
        let bytes = streamed(&outcome);

        assert_eq!(shape_text(bytes, 1, "Title 1").as_deref(), Some("Annual"));
        assert_eq!(shape_text(bytes, 2, "Header1").as_deref(), Some("Q4 Results"));
        assert_eq!(shape_text(bytes, 3, "Notes").as_deref(), Some("n"));
        assert_eq!(shape_text(bytes, 4, "Header1").as_deref(), Some("Outlook"));
        assert!(
            outcome
                .warnings
                .iter()
                .any(|w| matches!(w, Warning::StepFailed { step: 3, .. }))
        );
        match &outcome.finalized {
            Finalized::Stream { filename, .. } => assert!(filename.starts_with("multi_slide_")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_request_never_fetches() {
        let p = pipeline(templates(0), MockArtifactStore::new());
        let err = p
            .run_multi(
                "presentations/deck.pptx",
                None,
                vec![points(2, "ok"), MutationRequest::new("graphs", json!({}))],
                Delivery::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownType);

        let err = p
            .run_single(
                "presentations/deck.pptx",
                None,
                MutationRequest::new("table", json!({"slide_number": 1, "title": "t", "table_data": [["a"], ["b", "c"]]})),
                Delivery::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_single_upload() {
        let mut store = MockArtifactStore::new();
        store
            .expect_put()
            .withf(|key, _, _| key.starts_with("out/points_slide_") && key.ends_with(".pptx"))
            .times(1)
            .returning(|key, _, _| Ok(format!("https://decks.s3.us-east-1.amazonaws.com/{}", key)));
        let p = pipeline(templates(1), store);

        let outcome = p
            .run_single(
                "presentations/deck.pptx",
                None,
                points(2, "Q4 Results"),
                Delivery {
                    destination: Some(Destination::Upload),
                    filename: None,
                },
            )
            .await
            .unwrap();
        match outcome.finalized {
            Finalized::Uploaded { artifact_key, artifact_url } => {
                assert!(artifact_url.ends_with(&artifact_key));
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_missing_required_region_fails() {
        let p = pipeline(templates(1), MockArtifactStore::new());
        let err = p
            .run_single("presentations/deck.pptx", None, points(3, "x"), Delivery::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegionNotFound);
        assert_eq!(err.region(), Some("description"));
    }

    #[tokio::test]
    async fn test_fetch_error_surfaces_key() {
        let mut source = MockTemplateSource::new();
        source.expect_fetch_template().times(1).returning(|reference, _| {
            Err(Error::Fetch {
                kind: FetchErrorKind::NotFound,
                key: reference.to_string(),
                detail: "all tiers exhausted".to_string(),
            })
        });
        let p = pipeline(source, MockArtifactStore::new());
        let err = p
            .run_single("gone.pptx", None, points(1, "x"), Delivery::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch(FetchErrorKind::NotFound));
        assert!(err.to_string().contains("gone.pptx"));
    }

    #[tokio::test]
    async fn test_preferred_bucket_reaches_template_source() {
        let mut source = MockTemplateSource::new();
        source
            .expect_fetch_template()
            .withf(|reference, bucket| reference == "presentations/deck.pptx" && *bucket == Some("archive"))
            .times(1)
            .returning(|_, _| Ok(template()));
        let p = pipeline(source, MockArtifactStore::new());
        let outcome = p
            .run_multi(
                "presentations/deck.pptx",
                Some("archive"),
                vec![points(2, "From archive")],
                Delivery::default(),
            )
            .await
            .unwrap();
        assert_eq!(
            shape_text(streamed(&outcome), 2, "Header1").as_deref(),
            Some("From archive")
        );
    }
}
