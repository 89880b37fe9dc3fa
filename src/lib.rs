//! Deckfill - fill structured data into PowerPoint templates
//!
//! This library fetches a `.pptx` template from an object store, applies one
//! or more typed slide mutations to named regions on specific slides, and
//! publishes the result either as an uploaded artifact or as bytes for the
//! caller to stream.
//!
//! # Features
//!
//! - **Tiered fetching**: edge domain, public endpoint, then the authenticated API
//! - **Lossless editing**: only the edited slide part changes; every other part
//!   is written back byte-for-byte
//! - **Nine slide types**: points, image+text, table, phases, statistics,
//!   people, cover, contact and image gallery
//! - **Chains**: many mutations against one fetch of the template
//!
//! # Example - One slide
//!
//! ```no_run
//! use deckfill::{Config, Delivery, MutationRequest, Pipeline};
//! use serde_json::json;
//!
//! # async fn run() -> deckfill::Result<()> {
//! let pipeline = Pipeline::from_config(&Config::from_env()?)?;
//! let request = MutationRequest::new(
//!     "points",
//!     json!({
//!         "slide_number": 2,
//!         "header": "Q4 Results",
//!         "description": "Revenue by region",
//!         "points": [{"text": "EMEA up 12%", "color": "#1F4E79"}],
//!     }),
//! );
//! let outcome = pipeline
//!     .run_single("presentations/deck.pptx", None, request, Delivery::default())
//!     .await?;
//! for warning in &outcome.warnings {
//!     println!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level mutation
//!
//! ```no_run
//! use deckfill::mutate::{Assets, Document, SlideType, mutate};
//! use serde_json::json;
//!
//! # fn main() -> deckfill::Result<()> {
//! let template = std::fs::read("deck.pptx")?;
//! let step = SlideType::Cover.parse_data(json!({"slide_number": 1, "title": "Annual Report", "company_name": "Initech"}))?;
//! let done = mutate(Document::new(template), step.as_ref(), &Assets::default())
//!     .map_err(|failure| failure.error)?;
//! std::fs::write("out.pptx", done.document.into_bytes())?;
//! # Ok(())
//! # }
//! ```

/// Shared error types, colours and the XML tree
pub mod common;

/// Open Packaging Conventions and the PresentationML editing layer
pub mod ooxml;

/// Template and image retrieval
pub mod fetch;

/// Slide-type registry and the mutators
pub mod mutate;

pub mod chain;
pub mod config;
pub mod finalize;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

pub use chain::{ChainOutcome, run_chain};
pub use common::{Error, ErrorKind, FetchErrorKind, Result};
pub use config::Config;
pub use fetch::{Fetcher, TemplateReference, TemplateSource};
pub use finalize::{ArtifactStore, Destination, Finalized, Finalizer};
pub use mutate::{Document, MutationRequest, SlideType, Warning, mutate};
pub use pipeline::{Delivery, Pipeline, PipelineOutcome};
