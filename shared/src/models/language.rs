//! Language Model

use serde::{Deserialize, Serialize};

/// Store language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    /// ISO code, e.g. "en"
    pub code: String,
    pub name: String,
}

impl Language {
    pub fn new(id: i64, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
        }
    }

    /// Case-insensitive code comparison
    pub fn matches(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code.trim())
    }
}
