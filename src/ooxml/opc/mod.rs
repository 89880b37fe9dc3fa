/// Open Packaging Conventions (OPC) implementation.
///
/// The container layer of every Office Open XML file:
///
/// - Package structure (parts held in archive order)
/// - Relationships between parts and to external URLs
/// - Content type management
/// - ZIP-based physical packaging via the `zip` crate
pub mod constants;
pub mod content_types;
pub mod error;
pub mod package;
pub mod packuri;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypes;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
