//! Intent catalog shown in the side panel.
//!
//! The catalog is display-only: classification happens on the backend. It
//! starts as the built-in default and is replaced wholesale by the first
//! successful `/api/intents` fetch.

use tracing::{debug, warn};

use crate::api::{BackendError, ChatBackend, WireIntent};

pub const UNKNOWN_INTENT: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentDescriptor {
    WithKeywords {
        keywords: Vec<String>,
        response: String,
    },
    /// Fallback intent chosen when no keyword matches.
    CatchAll { response: String },
}

impl IntentDescriptor {
    pub fn response(&self) -> &str {
        match self {
            IntentDescriptor::WithKeywords { response, .. } => response,
            IntentDescriptor::CatchAll { response } => response,
        }
    }

    pub fn keywords(&self) -> Option<&[String]> {
        match self {
            IntentDescriptor::WithKeywords { keywords, .. } => Some(keywords),
            IntentDescriptor::CatchAll { .. } => None,
        }
    }
}

impl From<WireIntent> for IntentDescriptor {
    fn from(intent: WireIntent) -> Self {
        match intent.keywords {
            Some(keywords) => IntentDescriptor::WithKeywords {
                keywords,
                response: intent.response,
            },
            None => IntentDescriptor::CatchAll {
                response: intent.response,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    Remote,
}

/// Ordered name → descriptor mapping; insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentCatalog {
    entries: Vec<(String, IntentDescriptor)>,
    source: CatalogSource,
}

impl IntentCatalog {
    pub fn builtin() -> Self {
        let with_keywords = |name: &str, keywords: &[&str], response: &str| {
            (
                name.to_string(),
                IntentDescriptor::WithKeywords {
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                    response: response.to_string(),
                },
            )
        };

        Self {
            entries: vec![
                with_keywords(
                    "greeting",
                    &["hi", "hello", "hey"],
                    "Hello! How can I help you today?",
                ),
                with_keywords(
                    "help",
                    &["help", "assist", "support"],
                    "Sure! Tell me what you need help with.",
                ),
                with_keywords(
                    "python",
                    &["python", "code", "programming"],
                    "Python is a beginner-friendly programming language.",
                ),
                (
                    UNKNOWN_INTENT.to_string(),
                    IntentDescriptor::CatchAll {
                        response: "I'm not sure I understand. Can you rephrase?".to_string(),
                    },
                ),
            ],
            source: CatalogSource::Builtin,
        }
    }

    pub fn from_remote(entries: Vec<(String, WireIntent)>) -> Result<Self, BackendError> {
        if entries.is_empty() {
            return Err(BackendError::EmptyCatalog);
        }
        Ok(Self {
            entries: entries
                .into_iter()
                .map(|(name, intent)| (name, intent.into()))
                .collect(),
            source: CatalogSource::Remote,
        })
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&IntentDescriptor> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, descriptor)| descriptor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IntentDescriptor)> {
        self.entries
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }
}

impl Default for IntentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Fetch the catalog once. Any failure yields the built-in catalog and is
/// only reported through tracing.
pub async fn load_catalog(backend: &dyn ChatBackend) -> IntentCatalog {
    let fetched = match backend.fetch_intents().await {
        Ok(response) => response
            .into_entries()
            .map_err(|e| BackendError::Decode(e.to_string()))
            .and_then(IntentCatalog::from_remote),
        Err(err) => Err(err),
    };

    match fetched {
        Ok(catalog) => {
            debug!(intents = catalog.len(), "loaded intent catalog from backend");
            catalog
        }
        Err(err) => {
            warn!(error = %err, "using built-in intent catalog");
            IntentCatalog::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::IntentsResponse;
    use crate::utils::test_utils::ScriptedBackend;

    fn intents_response(json: &str) -> IntentsResponse {
        serde_json::from_str(json).expect("intents json")
    }

    #[test]
    fn builtin_catalog_matches_default_literals() {
        let catalog = IntentCatalog::builtin();
        let names: Vec<&str> = catalog.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["greeting", "help", "python", "unknown"]);

        assert_eq!(
            catalog.get("greeting"),
            Some(&IntentDescriptor::WithKeywords {
                keywords: vec!["hi".into(), "hello".into(), "hey".into()],
                response: "Hello! How can I help you today?".into(),
            })
        );
        assert_eq!(
            catalog.get("help").and_then(|d| d.keywords()),
            Some(&["help".to_string(), "assist".to_string(), "support".to_string()][..])
        );
        assert_eq!(
            catalog.get("python").map(|d| d.response()),
            Some("Python is a beginner-friendly programming language.")
        );
        assert_eq!(
            catalog.get("unknown"),
            Some(&IntentDescriptor::CatchAll {
                response: "I'm not sure I understand. Can you rephrase?".into()
            })
        );
        assert_eq!(catalog.source(), CatalogSource::Builtin);
    }

    #[tokio::test]
    async fn error_status_falls_back_to_builtin() {
        let backend = ScriptedBackend::default();
        *backend.intents.lock().unwrap() = Some(Err(BackendError::Status {
            status: 503,
            detail: None,
        }));

        let catalog = load_catalog(&backend).await;
        assert_eq!(catalog, IntentCatalog::builtin());
    }

    #[tokio::test]
    async fn malformed_entry_falls_back_to_builtin() {
        let backend = ScriptedBackend::default();
        *backend.intents.lock().unwrap() = Some(Ok(intents_response(
            r#"{"intents":{"greeting":{"keywords":["hi"]}}}"#,
        )));

        let catalog = load_catalog(&backend).await;
        assert_eq!(catalog, IntentCatalog::builtin());
    }

    #[tokio::test]
    async fn remote_catalog_replaces_default_wholesale() {
        let backend = ScriptedBackend::default();
        *backend.intents.lock().unwrap() = Some(Ok(intents_response(
            r#"{"intents":{
                "weather":{"keywords":["rain","sun"],"response":"Check the sky."},
                "unknown":{"response":"Pardon?"}
            }}"#,
        )));

        let catalog = load_catalog(&backend).await;
        assert_eq!(catalog.source(), CatalogSource::Remote);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("greeting").is_none());
        assert_eq!(
            catalog.get("unknown"),
            Some(&IntentDescriptor::CatchAll {
                response: "Pardon?".into()
            })
        );
    }
}
