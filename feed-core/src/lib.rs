//! Catalog search feed pipeline
//!
//! Reads products page by page from a [`ProductRepository`], resolves
//! category paths, converts prices and sanitizes text, and streams one
//! delimited record per active product into a [`FeedSink`].
//!
//! ```no_run
//! use feed_core::{FeedConfig, FeedDefaults, FeedOutcome, FeedRun, MemoryCatalog};
//!
//! let catalog = MemoryCatalog::new();
//! let config = FeedConfig::new(&FeedDefaults::default());
//! let mut out: Vec<u8> = Vec::new();
//! match FeedRun::new(&catalog, config).execute(&mut out) {
//!     Ok(FeedOutcome::Completed(summary)) => println!("{} records", summary.records_written),
//!     Ok(FeedOutcome::Rejected(payload)) => eprintln!("{}", payload.message),
//!     Err(e) => eprintln!("feed aborted: {e}"),
//! }
//! ```

pub mod category;
pub mod config;
pub mod currency;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod feed;
pub mod paginator;
pub mod repository;
pub mod sanitize;
pub mod writer;

// Re-exports
pub use category::CategoryIndex;
pub use config::{FeedConfig, FeedDefaults, FeedRequest, FeedWindow, Separators, StoreLinks};
pub use currency::CurrencyConverter;
pub use discovery::{DiscoveryDocument, StoreInfo};
pub use encoding::{OutputCharset, to_latin1, to_utf8};
pub use error::{FeedError, FeedResult, RepoResult, RepositoryError};
pub use feed::{FeedOutcome, FeedRun, FeedSummary, RecordBuilder};
pub use paginator::{Batch, FeedPaginator};
pub use repository::{MemoryCatalog, ProductRepository};
pub use sanitize::TextSanitizer;
pub use writer::{Availability, FeedRecord, FeedSink, FeedWriter, FlushPolicy, WriterState};
