//! Wire error codes for rejected or aborted feed runs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Feed error code
///
/// Serialized as the `ERR_*` string the indexing service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum FeedErrorCode {
    /// Requested currency is not configured in the store
    InvalidCurrency,
    /// Requested language is not configured in the store
    InvalidLanguage,
    /// Feed options are inconsistent (chunk size, separators, ...)
    InvalidConfig,
    /// Category parent links form a cycle
    CategoryCycle,
    /// Catalog query failed
    Repository,
    /// Output sink failed
    Io,
}

impl FeedErrorCode {
    pub const ALL: [FeedErrorCode; 6] = [
        FeedErrorCode::InvalidCurrency,
        FeedErrorCode::InvalidLanguage,
        FeedErrorCode::InvalidConfig,
        FeedErrorCode::CategoryCycle,
        FeedErrorCode::Repository,
        FeedErrorCode::Io,
    ];

    /// Get the wire code
    pub const fn as_str(&self) -> &'static str {
        match self {
            FeedErrorCode::InvalidCurrency => "ERR_CURRENCY",
            FeedErrorCode::InvalidLanguage => "ERR_LANGUAGE",
            FeedErrorCode::InvalidConfig => "ERR_CONFIG",
            FeedErrorCode::CategoryCycle => "ERR_CATEGORY_CYCLE",
            FeedErrorCode::Repository => "ERR_REPOSITORY",
            FeedErrorCode::Io => "ERR_IO",
        }
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            FeedErrorCode::InvalidCurrency => "Currency is not valid.",
            FeedErrorCode::InvalidLanguage => "Language is not valid.",
            FeedErrorCode::InvalidConfig => "Feed configuration is not valid.",
            FeedErrorCode::CategoryCycle => "Category tree contains a cycle.",
            FeedErrorCode::Repository => "Catalog query failed.",
            FeedErrorCode::Io => "Output stream failed.",
        }
    }
}

impl From<FeedErrorCode> for &'static str {
    #[inline]
    fn from(code: FeedErrorCode) -> Self {
        code.as_str()
    }
}

/// Error when parsing an unknown wire code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid feed error code: {0}")]
pub struct InvalidFeedErrorCode(pub String);

impl FromStr for FeedErrorCode {
    type Err = InvalidFeedErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| InvalidFeedErrorCode(s.to_string()))
    }
}

impl TryFrom<String> for FeedErrorCode {
    type Error = InvalidFeedErrorCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FeedErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
