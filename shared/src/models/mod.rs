//! Catalog models
//!
//! Read-only snapshots of store rows. The exporter never mutates them.
//! All IDs are `i64` (the store's integer primary keys).

pub mod category;
pub mod currency;
pub mod language;
pub mod product;

// Re-exports
pub use category::*;
pub use currency::*;
pub use language::*;
pub use product::*;
