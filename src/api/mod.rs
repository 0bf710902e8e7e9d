use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub mod client;

pub use client::{BackendError, ChatBackend, HttpBackend};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
}

/// Successful `/api/chat` payload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub matched_keyword: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub steps: Vec<String>,
}

/// Error payload returned alongside a non-success status. FastAPI-style
/// validation failures put a list in `detail`, so only string details count.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WireIntent {
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    pub response: String,
}

/// `/api/intents` payload. `serde_json` is built with `preserve_order`, so
/// iterating `intents` yields entries in the order the backend sent them.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentsResponse {
    #[serde(default)]
    pub intents: Map<String, Value>,
}

impl IntentsResponse {
    pub fn into_entries(self) -> Result<Vec<(String, WireIntent)>, serde_json::Error> {
        self.intents
            .into_iter()
            .map(|(name, value)| serde_json::from_value(value).map(|intent| (name, intent)))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
