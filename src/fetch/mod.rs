//! Remote retrieval of templates and images.
//!
//! A template reference is resolved to one bucket and key, then handed to an
//! ordered list of [`FetchTier`]s until one of them returns the bytes:
//!
//! 1. the edge (CDN) domain, when configured
//! 2. the store's public HTTP endpoint
//! 3. the authenticated object-store API
//!
//! A tier failure is logged and the next tier is tried; only when every tier
//! has failed does [`Fetcher`] return [`Error::Fetch`](crate::Error::Fetch).
pub mod assets;
pub mod fetcher;
pub mod reference;
pub mod tier;

pub use assets::{AssetSource, HttpAssets, fetch_assets};
pub use fetcher::{Fetcher, TemplateSource};
pub use reference::{ObjectLocation, TemplateReference};
pub use tier::{ApiTier, EdgeTier, FetchTier, PublicTier, TierError};
