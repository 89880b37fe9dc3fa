//! Typed slide mutations.
//!
//! Each slide type has a data record that implements [`SlideMutator`]. The
//! shared skeleton in [`mutate`] parses the document, resolves the target
//! slide, lets the mutator edit named regions, and serializes the result into
//! a new [`Document`]. The input document is consumed; on failure it is handed
//! back untouched unless the step got far enough to produce a partial result.
//!
//! # Example
//!
//! ```no_run
//! use deckfill::mutate::{Assets, Document, SlideType, mutate};
//! use serde_json::json;
//!
//! # fn main() -> deckfill::Result<()> {
//! # let template: Vec<u8> = Vec::new();
//! let step = SlideType::Points.parse_data(json!({
//!     "slide_number": 2,
//!     "header": "Q4 Results",
//!     "description": "Revenue and margin by region",
//! }))?;
//! let outcome = mutate(Document::new(template), step.as_ref(), &Assets::default())
//!     .map_err(|failure| failure.error)?;
//! assert!(outcome.warnings.is_empty());
//! # Ok(())
//! # }
//! ```
mod data;
mod regions;
pub mod registry;

pub mod contact;
pub mod cover;
pub mod image_text;
pub mod images;
pub mod people;
pub mod phases;
pub mod points;
pub mod statistics;
pub mod table;

pub use registry::{MutationRequest, SlideType, TypeInfo, catalogue, dispatch};

use crate::common::error::{Error, Result};
use crate::ooxml::pptx::{Package, SlideEditor};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Exclusively owned bytes of the document being built.
///
/// Deliberately not `Clone`: a step consumes its input and returns a new
/// handle, so there is never more than one live copy of the evolving deck.
#[derive(PartialEq, Eq)]
pub struct Document(Vec<u8>);

impl Document {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Document({} bytes)", self.0.len())
    }
}

/// A problem that did not stop the step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An optional field had no matching region and was skipped
    RegionNotFound { slide_number: u32, region: String },
    /// An image could not be fetched or decoded; the picture keeps its old image
    AssetFetchFailed {
        slide_number: u32,
        url: String,
        detail: String,
    },
    /// Table data did not fit the template table
    TableTruncated {
        slide_number: u32,
        rows_written: usize,
        cols_written: usize,
        rows_supplied: usize,
        cols_supplied: usize,
    },
    /// A chain step failed on a required region; its other fields were applied
    StepFailed {
        step: usize,
        slide_type: SlideType,
        error: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::RegionNotFound { slide_number, region } => {
                write!(f, "slide {}: no region for '{}', field skipped", slide_number, region)
            },
            Warning::AssetFetchFailed {
                slide_number,
                url,
                detail,
            } => write!(f, "slide {}: image '{}' not applied: {}", slide_number, url, detail),
            Warning::TableTruncated {
                slide_number,
                rows_written,
                cols_written,
                rows_supplied,
                cols_supplied,
            } => write!(
                f,
                "slide {}: table holds {}x{} of the {}x{} supplied cells",
                slide_number, rows_written, cols_written, rows_supplied, cols_supplied
            ),
            Warning::StepFailed { step, slide_type, error } => {
                write!(f, "step {} ({}): {}", step, slide_type, error)
            },
        }
    }
}

/// Image bytes fetched ahead of a step, keyed by URL.
///
/// A failed fetch is kept as its error so the step can report it against the
/// region it was meant for.
#[derive(Debug, Default)]
pub struct Assets {
    fetched: HashMap<String, Result<Vec<u8>>>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, result: Result<Vec<u8>>) {
        self.fetched.insert(url.into(), result);
    }

    pub fn get(&self, url: &str) -> Option<&Result<Vec<u8>>> {
        self.fetched.get(url)
    }

    pub fn len(&self) -> usize {
        self.fetched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetched.is_empty()
    }
}

/// Per-step bookkeeping handed to [`SlideMutator::apply`].
#[derive(Debug)]
pub struct StepContext<'a> {
    slide_number: u32,
    assets: &'a Assets,
    warnings: Vec<Warning>,
    missing_required: Vec<String>,
}

impl<'a> StepContext<'a> {
    pub fn new(slide_number: u32, assets: &'a Assets) -> Self {
        Self {
            slide_number,
            assets,
            warnings: Vec::new(),
            missing_required: Vec::new(),
        }
    }

    #[inline]
    pub fn slide_number(&self) -> u32 {
        self.slide_number
    }

    pub fn warn(&mut self, warning: Warning) {
        warn!(%warning, "mutation warning");
        self.warnings.push(warning);
    }

    /// Record an optional region that the slide does not have.
    pub fn region_missing(&mut self, region: &str) {
        self.warn(Warning::RegionNotFound {
            slide_number: self.slide_number,
            region: region.to_string(),
        });
    }

    /// Record a required region that the slide does not have. The step keeps
    /// applying its other fields and fails once it is done.
    pub fn required_missing(&mut self, region: &str) {
        warn!(slide = self.slide_number, region, "required region missing");
        self.missing_required.push(region.to_string());
    }

    /// Bytes for an image URL, or `None` with a warning recorded.
    pub fn image(&mut self, url: &str) -> Option<&'a [u8]> {
        let assets = self.assets;
        match assets.get(url) {
            Some(Ok(bytes)) => Some(bytes.as_slice()),
            Some(Err(e)) => {
                self.asset_failed(url, e.to_string());
                None
            },
            None => {
                self.asset_failed(url, "image was not fetched".to_string());
                None
            },
        }
    }

    pub fn asset_failed(&mut self, url: &str, detail: String) {
        self.warn(Warning::AssetFetchFailed {
            slide_number: self.slide_number,
            url: url.to_string(),
            detail,
        });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// One slide type's data record, able to apply itself to a slide.
pub trait SlideMutator: Send + Sync + fmt::Debug {
    fn slide_type(&self) -> SlideType;

    /// 1-based target slide.
    fn slide_number(&self) -> u32;

    /// Check the record before any document bytes are touched.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Image URLs the step will need, in the order they are applied.
    fn image_urls(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Edit the target slide.
    fn apply(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>) -> Result<()>;
}

/// A successfully applied step.
#[derive(Debug)]
pub struct Mutated {
    pub document: Document,
    pub warnings: Vec<Warning>,
}

/// A failed step together with the document the caller should keep.
///
/// For errors raised before the slide was edited this is the untouched input.
/// For a missing required region it is the partial result with every other
/// field applied.
#[derive(Debug)]
pub struct MutationFailure {
    pub error: Error,
    pub document: Document,
    pub warnings: Vec<Warning>,
}

impl MutationFailure {
    fn untouched(error: Error, document: Document) -> Self {
        Self {
            error,
            document,
            warnings: Vec::new(),
        }
    }

    /// Whether the error ends only this step.
    pub fn is_step_local(&self) -> bool {
        self.error.is_step_local()
    }
}

impl fmt::Display for MutationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

/// Apply one mutation to a document.
pub fn mutate(
    document: Document,
    mutator: &dyn SlideMutator,
    assets: &Assets,
) -> std::result::Result<Mutated, MutationFailure> {
    if let Err(e) = mutator.validate() {
        return Err(MutationFailure::untouched(e, document));
    }
    let slide_number = mutator.slide_number();

    let (bytes, warnings, missing) = match apply_to_bytes(document.as_bytes(), mutator, assets) {
        Ok(applied) => applied,
        Err(e) => return Err(MutationFailure::untouched(e, document)),
    };
    drop(document);
    let document = Document::new(bytes);

    debug!(
        slide_type = %mutator.slide_type(),
        slide = slide_number,
        warnings = warnings.len(),
        "slide mutated"
    );

    match missing.into_iter().next() {
        Some(region) => Err(MutationFailure {
            error: Error::RegionNotFound { slide_number, region },
            document,
            warnings,
        }),
        None => Ok(Mutated { document, warnings }),
    }
}

type Applied = (Vec<u8>, Vec<Warning>, Vec<String>);

fn apply_to_bytes(bytes: &[u8], mutator: &dyn SlideMutator, assets: &Assets) -> Result<Applied> {
    let mut package = Package::open(bytes)?;
    let slide_count = package.slide_count();
    let mut ctx = StepContext::new(mutator.slide_number(), assets);

    let mut slide = package.slide_editor(mutator.slide_number())?;
    mutator.apply(&mut slide, &mut ctx)?;
    slide.commit()?;

    let output = package.to_bytes()?;
    debug_assert_eq!(Package::open(&output).map(|p| p.slide_count()).ok(), Some(slide_count));
    Ok((output, ctx.warnings, ctx.missing_required))
}
