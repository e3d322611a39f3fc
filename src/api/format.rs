//! Backend wire envelopes

use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;

/// `{data: ...}` wrapper used by show/store/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Paginated collection body: `{data: [...], last_page, total}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default = "first_page")]
    pub last_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub current_page: Option<u32>,
}

fn first_page() -> u32 {
    1
}

/// `{message}` body answered by delete
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default)]
    pub message: String,
}

/// Error body; `errors` is only present on 422
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<std::collections::BTreeMap<String, Messages>>,
}

/// Some backends send a bare string instead of a list per field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Messages {
    Many(Vec<String>),
    One(String),
}

impl Messages {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Messages::Many(messages) => messages,
            Messages::One(message) => vec![message],
        }
    }
}

impl ErrorEnvelope {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.errors
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|(field, messages)| (field, messages.into_vec()))
            .collect()
    }
}
