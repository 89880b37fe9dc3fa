//! Office Open XML (OOXML) package handling.
//!
//! # Architecture
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): Low-level package handling (ZIP, parts, relationships, content types)
//! 2. **PresentationML** (`pptx`): slide order, shapes, and in-place slide editing
//!
//! # Example: Replacing a title
//!
//! ```rust,no_run
//! use deckfill::ooxml::pptx::Package;
//!
//! let bytes = std::fs::read("template.pptx")?;
//! let mut pkg = Package::open(&bytes)?;
//! let mut slide = pkg.slide_editor(1)?;
//! if let Some(title) = slide.find(|t| t.has_text_frame(), |name| name.to_lowercase().contains("title")) {
//!     slide.set_text(title, "Quarterly Review")?;
//! }
//! slide.commit()?;
//! std::fs::write("out.pptx", pkg.to_bytes()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod opc;
pub mod pptx;
