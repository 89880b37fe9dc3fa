//! Multi-slide chains.
//!
//! A chain folds an ordered list of mutations over one document: each step
//! consumes the previous step's output. A step that loses a required region
//! is recorded as [`Warning::StepFailed`] and its partial result is carried
//! forward; any other failure aborts the chain.
use crate::common::error::Result;
use crate::fetch::{AssetSource, fetch_assets};
use crate::mutate::{Document, SlideMutator, Warning, mutate};
use tracing::{info, instrument, warn};

/// The document after every step, with the warnings they raised in order.
#[derive(Debug)]
pub struct ChainOutcome {
    pub document: Document,
    pub warnings: Vec<Warning>,
}

/// Run `steps` in order against `document`.
#[instrument(skip_all, fields(steps = steps.len()))]
pub async fn run_chain(
    document: Document,
    steps: &[Box<dyn SlideMutator>],
    assets: &dyn AssetSource,
) -> Result<ChainOutcome> {
    let mut document = document;
    let mut warnings = Vec::new();

    for (i, step) in steps.iter().enumerate() {
        let number = i + 1;
        let fetched = fetch_assets(assets, &step.image_urls()).await;
        match mutate(document, step.as_ref(), &fetched) {
            Ok(done) => {
                document = done.document;
                warnings.extend(done.warnings);
            },
            Err(failure) if failure.is_step_local() => {
                warn!(step = number, slide_type = %step.slide_type(), error = %failure, "chain step incomplete");
                warnings.extend(failure.warnings);
                warnings.push(Warning::StepFailed {
                    step: number,
                    slide_type: step.slide_type(),
                    error: failure.error.to_string(),
                });
                document = failure.document;
            },
            Err(failure) => return Err(failure.error),
        }
    }

    info!(size = document.len(), warnings = warnings.len(), "chain complete");
    Ok(ChainOutcome { document, warnings })
}
