//! Unified error types for deckfill.
//!
//! Every layer of the pipeline (package parsing, fetching, mutation,
//! finalization) reports through this one enum so that callers get a single
//! structured error with a kind and, where relevant, the offending slide
//! number and region name.
use std::fmt;
use thiserror::Error;

/// Why a remote read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The object does not exist under the resolved bucket and key.
    NotFound,
    /// The credentials or the object ACL refused the read.
    Forbidden,
    /// Network, timeout or unexpected status.
    Transport,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Transport => "transport",
        })
    }
}

/// Stable, user-visible classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Fetch(FetchErrorKind),
    SlideNotFound,
    RegionNotFound,
    AssetFetchFailed,
    UnknownType,
    Validation,
    Document,
    Upload,
    Config,
    Io,
}

/// Main error type for deckfill operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Every fetch tier was exhausted without retrieving the object
    #[error("fetch failed ({kind}) for key '{key}': {detail}")]
    Fetch {
        kind: FetchErrorKind,
        key: String,
        detail: String,
    },

    /// The requested slide number is outside `[1, slide_count]`
    #[error("slide {slide_number} not found (presentation has {slide_count} slides)")]
    SlideNotFound { slide_number: u32, slide_count: usize },

    /// A region the slide type requires is missing from the target slide
    #[error("region '{region}' not found on slide {slide_number}")]
    RegionNotFound { slide_number: u32, region: String },

    /// An image could not be retrieved
    #[error("asset fetch failed ({kind}) for '{url}': {detail}")]
    AssetFetchFailed {
        url: String,
        kind: FetchErrorKind,
        detail: String,
    },

    /// The slide-type tag is not in the registry
    #[error("unknown slide type '{0}'")]
    UnknownType(String),

    /// Caller-supplied data is malformed
    #[error("validation error: {0}")]
    Validation(String),

    /// A template reference could not be resolved to a bucket and key
    #[error("invalid template reference: {0}")]
    InvalidReference(String),

    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    XmlError(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// A package part or relationship is missing
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// The bytes are not a presentation package
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Uploading the finished artifact failed
    #[error("upload failed for key '{key}': {detail}")]
    Upload { key: String, detail: String },

    /// Missing or inconsistent configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Structured kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Fetch { kind, .. } => ErrorKind::Fetch(*kind),
            Error::SlideNotFound { .. } => ErrorKind::SlideNotFound,
            Error::RegionNotFound { .. } => ErrorKind::RegionNotFound,
            Error::AssetFetchFailed { .. } => ErrorKind::AssetFetchFailed,
            Error::UnknownType(_) => ErrorKind::UnknownType,
            Error::Validation(_) | Error::InvalidReference(_) => ErrorKind::Validation,
            Error::XmlError(_)
            | Error::ZipError(_)
            | Error::ComponentNotFound(_)
            | Error::InvalidFormat(_) => ErrorKind::Document,
            Error::Upload { .. } => ErrorKind::Upload,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Slide number the error refers to, if any.
    pub fn slide_number(&self) -> Option<u32> {
        match self {
            Error::SlideNotFound { slide_number, .. } | Error::RegionNotFound { slide_number, .. } => {
                Some(*slide_number)
            },
            _ => None,
        }
    }

    /// Region name the error refers to, if any.
    pub fn region(&self) -> Option<&str> {
        match self {
            Error::RegionNotFound { region, .. } => Some(region),
            _ => None,
        }
    }

    /// True when the error ends only the current chain step.
    ///
    /// A required region missing from the template invalidates the step that
    /// needed it; later steps never depend on it, so a chain may continue.
    pub fn is_step_local(&self) -> bool {
        matches!(self, Error::RegionNotFound { .. })
    }
}

/// Result type for deckfill operations.
pub type Result<T> = std::result::Result<T, Error>;
