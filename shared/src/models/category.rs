//! Category Model

use serde::{Deserialize, Serialize};

/// Category row for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    /// Parent category, `None` or `0` for a root
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub name: String,
}

impl Category {
    pub fn new(id: i64, parent_id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            parent_id: Some(parent_id),
            name: name.into(),
        }
    }

    /// Parent id, normalizing the store's `0` root marker to `None`
    pub fn parent(&self) -> Option<i64> {
        self.parent_id.filter(|&id| id != 0)
    }
}
