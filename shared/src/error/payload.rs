//! Error payload returned instead of a feed body

use super::codes::FeedErrorCode;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Structured rejection returned before any feed byte is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Wire error code
    pub error: FeedErrorCode,
    /// Human-readable message
    pub message: String,
    /// Valid alternatives, serialized as `false` when absent
    #[serde(default, serialize_with = "hint_out", deserialize_with = "hint_in")]
    pub hint: Option<String>,
}

impl ErrorPayload {
    /// Create a payload with the default message for the code
    pub fn new(error: FeedErrorCode) -> Self {
        Self {
            error,
            message: error.message().to_string(),
            hint: None,
        }
    }

    /// Create a payload with a custom message
    pub fn with_message(error: FeedErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            error,
            message: if message.is_empty() {
                "Unknown error".to_string()
            } else {
                message
            },
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Serialize to the JSON wire form
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"{}","message":"{}","hint":false}}"#,
                self.error,
                self.error.message()
            )
        })
    }
}

fn hint_out<S: Serializer>(hint: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match hint {
        Some(text) => serializer.serialize_str(text),
        None => serializer.serialize_bool(false),
    }
}

fn hint_in<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hint {
        Text(String),
        Flag(IgnoredAny),
    }

    Ok(match Option::<Hint>::deserialize(deserializer)? {
        Some(Hint::Text(text)) => Some(text),
        Some(Hint::Flag(_)) | None => None,
    })
}
