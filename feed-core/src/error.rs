//! Error types for the feed pipeline

use shared::{ErrorPayload, FeedErrorCode};
use thiserror::Error;

/// Repository (catalog store) error
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Query rejected or failed in the store
    #[error("Query failed: {0}")]
    Query(String),

    /// Underlying IO failure (connection, file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Feed error types
#[derive(Debug, Error)]
pub enum FeedError {
    /// Requested currency is not available
    #[error("Invalid currency: {code}")]
    InvalidCurrency { code: String, valid: Vec<String> },

    /// Requested language is not available
    #[error("Invalid language: {code}")]
    InvalidLanguage { code: String, valid: Vec<String> },

    /// Inconsistent feed options
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Category parent links loop back on themselves
    #[error("Category graph contains a cycle through category {id}")]
    CyclicCategoryGraph { id: i64 },

    /// Catalog query failed
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Output sink failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    pub fn code(&self) -> FeedErrorCode {
        match self {
            Self::InvalidCurrency { .. } => FeedErrorCode::InvalidCurrency,
            Self::InvalidLanguage { .. } => FeedErrorCode::InvalidLanguage,
            Self::InvalidConfig(_) => FeedErrorCode::InvalidConfig,
            Self::CyclicCategoryGraph { .. } => FeedErrorCode::CategoryCycle,
            Self::Repository(_) => FeedErrorCode::Repository,
            Self::Io(_) => FeedErrorCode::Io,
        }
    }

    /// Valid alternatives for the rejected value, if any
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidCurrency { valid, .. } | Self::InvalidLanguage { valid, .. } => {
                Some(format!("Valid values are: {}", valid.join(", ")))
            }
            _ => None,
        }
    }

    /// Errors raised before the first output byte
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::InvalidCurrency { .. }
                | Self::InvalidLanguage { .. }
                | Self::InvalidConfig(_)
                | Self::CyclicCategoryGraph { .. }
        )
    }

    /// Convert to the wire payload
    pub fn payload(&self) -> ErrorPayload {
        let code = self.code();
        let payload = match self {
            Self::InvalidConfig(message) => ErrorPayload::with_message(code, message.clone()),
            Self::InvalidCurrency { .. }
            | Self::InvalidLanguage { .. }
            | Self::CyclicCategoryGraph { .. } => ErrorPayload::new(code),
            Self::Repository(e) => ErrorPayload::with_message(code, e.to_string()),
            Self::Io(e) => ErrorPayload::with_message(code, e.to_string()),
        };
        match self.hint() {
            Some(hint) => payload.with_hint(hint),
            None => payload,
        }
    }
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepositoryError>;
