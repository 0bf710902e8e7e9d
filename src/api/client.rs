//! HTTP access to the intent-classification backend.
//!
//! The interactive loop and the one-shot commands only see the
//! [`ChatBackend`] trait; [`HttpBackend`] is the reqwest implementation used
//! at runtime.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ChatReply, ChatRequest, ErrorBody, HealthStatus, HistoryEntry, IntentsResponse};
use crate::utils::url::{construct_api_url, with_query};

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong.";
pub const UNREACHABLE_MESSAGE: &str = "Unable to reach the backend.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("backend returned HTTP {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("backend returned an empty intent catalog")]
    EmptyCatalog,
}

impl BackendError {
    /// The single line shown to the user when a chat turn fails.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            BackendError::Status { .. } | BackendError::Decode(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            BackendError::Transport(_) | BackendError::EmptyCatalog => {
                UNREACHABLE_MESSAGE.to_string()
            }
        }
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn base_url(&self) -> &str;

    async fn fetch_intents(&self) -> Result<IntentsResponse, BackendError>;

    async fn fetch_history(&self, limit: Option<u32>) -> Result<Vec<HistoryEntry>, BackendError>;

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;

    async fn health(&self) -> Result<HealthStatus, BackendError>;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Without a timeout the transport default applies, which means a request
    /// can stay pending for as long as the server keeps the socket open.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, BackendError> {
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|error| error.detail_text());
        debug!(status = status.as_u16(), detail = ?detail, "backend returned an error status");
        return Err(BackendError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_intents(&self) -> Result<IntentsResponse, BackendError> {
        let response: IntentsResponse = self
            .get_json(construct_api_url(&self.base_url, "api/intents"))
            .await?;
        if response.intents.is_empty() {
            return Err(BackendError::EmptyCatalog);
        }
        Ok(response)
    }

    async fn fetch_history(&self, limit: Option<u32>) -> Result<Vec<HistoryEntry>, BackendError> {
        let url = construct_api_url(&self.base_url, "api/history");
        let url = match limit {
            Some(limit) => with_query(&url, "limit", &limit.to_string()),
            None => url,
        };
        self.get_json(url).await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let url = construct_api_url(&self.base_url, "api/chat");
        debug!(url = %url, chars = request.message.chars().count(), "POST chat turn");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        decode_response(response).await
    }

    async fn health(&self) -> Result<HealthStatus, BackendError> {
        self.get_json(construct_api_url(&self.base_url, "api/health"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{serve_once, unused_local_url};

    #[test]
    fn user_message_prefers_backend_detail() {
        let err = BackendError::Status {
            status: 500,
            detail: Some("overloaded".to_string()),
        };
        assert_eq!(err.user_message(), "overloaded");

        let bare = BackendError::Status {
            status: 502,
            detail: None,
        };
        assert_eq!(bare.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(
            BackendError::Decode("expected value".into()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            BackendError::Transport("refused".into()).user_message(),
            UNREACHABLE_MESSAGE
        );
    }

    #[tokio::test]
    async fn send_chat_posts_message_and_parses_reply() {
        let (base_url, request) = serve_once(
            "200 OK",
            r#"{"reply":"Hello! How can I help you today?","intent":"greeting","matched_keyword":"hello","steps":["a","b"],"message":"hello"}"#,
        )
        .await;
        let backend = HttpBackend::new(base_url, None).expect("client");

        let reply = backend
            .send_chat(&ChatRequest {
                message: "hello".into(),
            })
            .await
            .expect("reply");

        assert_eq!(reply.intent, "greeting");
        assert_eq!(reply.matched_keyword.as_deref(), Some("hello"));
        assert_eq!(reply.steps, vec!["a", "b"]);

        let raw = request.await.expect("server task");
        assert!(raw.starts_with("POST /api/chat "));
        assert!(raw.ends_with(r#"{"message":"hello"}"#));
    }

    #[tokio::test]
    async fn send_chat_surfaces_detail_on_error_status() {
        let (base_url, _request) =
            serve_once("500 Internal Server Error", r#"{"detail":"overloaded"}"#).await;
        let backend = HttpBackend::new(base_url, None).expect("client");

        let err = backend
            .send_chat(&ChatRequest {
                message: "hi".into(),
            })
            .await
            .expect_err("error status");

        assert_eq!(
            err,
            BackendError::Status {
                status: 500,
                detail: Some("overloaded".into())
            }
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let (base_url, _request) = serve_once("200 OK", "<html>nope</html>").await;
        let backend = HttpBackend::new(base_url, None).expect("client");

        let err = backend.fetch_history(None).await.expect_err("decode");
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn history_limit_is_sent_as_query() {
        let (base_url, request) = serve_once("200 OK", "[]").await;
        let backend = HttpBackend::new(base_url, None).expect("client");

        let history = backend.fetch_history(Some(20)).await.expect("history");
        assert!(history.is_empty());
        let raw = request.await.expect("server task");
        assert!(raw.starts_with("GET /api/history?limit=20 "));
    }

    #[tokio::test]
    async fn empty_intent_mapping_is_rejected() {
        let (base_url, _request) = serve_once("200 OK", r#"{"intents":{}}"#).await;
        let backend = HttpBackend::new(base_url, None).expect("client");

        assert_eq!(
            backend.fetch_intents().await.expect_err("empty"),
            BackendError::EmptyCatalog
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let backend = HttpBackend::new(unused_local_url().await, None).expect("client");
        let err = backend.health().await.expect_err("refused");
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
