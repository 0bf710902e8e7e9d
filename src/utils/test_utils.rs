use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::api::{
    BackendError, ChatBackend, ChatReply, ChatRequest, HealthStatus, HistoryEntry,
    IntentsResponse,
};
use crate::core::app::{App, SessionContext};

pub fn create_test_app() -> App {
    App::new(SessionContext::new("http://backend.test", None, None))
}

pub fn reply(text: &str, intent: &str, keyword: Option<&str>, steps: &[&str]) -> ChatReply {
    ChatReply {
        reply: text.to_string(),
        intent: intent.to_string(),
        matched_keyword: keyword.map(str::to_string),
        steps: steps.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn history_entry(role: &str, content: &str, intent: Option<&str>) -> HistoryEntry {
    HistoryEntry {
        id: None,
        role: role.to_string(),
        content: content.to_string(),
        intent: intent.map(str::to_string),
        created_at: None,
    }
}

/// In-memory backend whose responses are queued up front.
#[derive(Default)]
pub struct ScriptedBackend {
    pub intents: Mutex<Option<Result<IntentsResponse, BackendError>>>,
    pub history: Mutex<Option<Result<Vec<HistoryEntry>, BackendError>>>,
    pub chat: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    pub sent: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn with_chat(replies: impl IntoIterator<Item = Result<ChatReply, BackendError>>) -> Self {
        let backend = Self::default();
        backend.chat.lock().expect("lock").extend(replies);
        backend
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn base_url(&self) -> &str {
        "http://backend.test"
    }

    async fn fetch_intents(&self) -> Result<IntentsResponse, BackendError> {
        self.intents
            .lock()
            .expect("lock")
            .take()
            .unwrap_or(Err(BackendError::Transport("not scripted".into())))
    }

    async fn fetch_history(&self, _limit: Option<u32>) -> Result<Vec<HistoryEntry>, BackendError> {
        self.history
            .lock()
            .expect("lock")
            .take()
            .unwrap_or(Err(BackendError::Transport("not scripted".into())))
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.sent.lock().expect("lock").push(request.message.clone());
        self.chat
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(Err(BackendError::Transport("not scripted".into())))
    }

    async fn health(&self) -> Result<HealthStatus, BackendError> {
        Ok(HealthStatus {
            status: "ok".into(),
        })
    }
}

/// Accept one HTTP connection on a loopback port and answer it with a fixed
/// JSON response. The join handle yields the raw request text.
pub async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut socket).await;
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{addr}"), handle)
}

/// A loopback URL nothing is listening on.
pub async fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = socket.read(&mut chunk).await.expect("read");
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
