//! Common types and utilities shared across the crate.

pub mod color;
pub mod error;
pub mod xml;

pub use color::RGBColor;
pub use error::{Error, ErrorKind, FetchErrorKind, Result};
