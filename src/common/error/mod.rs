//! Unified error types for deckfill.
//!
//! This module provides a unified error type that encompasses errors from
//! package parsing, remote fetching and slide mutation, presenting a
//! consistent API to callers.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, ErrorKind, FetchErrorKind, Result};
