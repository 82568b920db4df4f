//! Feed error codes and payloads
//!
//! A rejected feed run answers with a small JSON document instead of the
//! feed body:
//!
//! ```json
//! {
//!     "error": "ERR_CURRENCY",
//!     "message": "Currency is not valid.",
//!     "hint": "Valid values are: EUR, USD"
//! }
//! ```
//!
//! `hint` is `false` when there is nothing to suggest.
//!
//! # Example
//!
//! ```
//! use shared::error::{ErrorPayload, FeedErrorCode};
//!
//! let payload = ErrorPayload::new(FeedErrorCode::InvalidCurrency)
//!     .with_hint("Valid values are: EUR, USD");
//! assert_eq!(payload.message, "Currency is not valid.");
//! ```

mod codes;
mod payload;

pub use codes::{FeedErrorCode, InvalidFeedErrorCode};
pub use payload::ErrorPayload;
