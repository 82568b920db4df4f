//! Shared types for the catalog feed
//!
//! Catalog rows as the store delivers them, and the wire-level error
//! payload returned instead of a feed when a run is rejected.

pub mod error;
pub mod models;

// Re-exports
pub use error::{ErrorPayload, FeedErrorCode, InvalidFeedErrorCode};
pub use models::{Category, CurrencyInfo, Language, Product, ProductStatus};
pub use serde::{Deserialize, Serialize};
