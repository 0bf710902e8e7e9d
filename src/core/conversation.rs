use tracing::{debug, warn};

use crate::api::ChatBackend;
use crate::core::message::Message;

/// Ordered, append-only record of the conversation.
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    history_loaded: bool,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True once the startup history attempt has finished, whatever its
    /// outcome. Until then an empty log means "still loading".
    pub fn history_loaded(&self) -> bool {
        self.history_loaded
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Import backend history. Turns the user started before history arrived
    /// stay after it, so the log always reads history first. Only the first
    /// call has any effect.
    pub fn hydrate(&mut self, history: Vec<Message>) -> bool {
        if self.history_loaded {
            debug!("ignoring repeated history hydration");
            return false;
        }
        self.history_loaded = true;
        if !history.is_empty() {
            let local = std::mem::replace(&mut self.messages, history);
            self.messages.extend(local);
        }
        true
    }
}

/// Fetch prior turns for hydration. Failures and unreadable rows degrade to
/// fewer (or no) messages; they are never surfaced to the user.
pub async fn fetch_history(backend: &dyn ChatBackend, limit: Option<u32>) -> Vec<Message> {
    match backend.fetch_history(limit).await {
        Ok(entries) => entries
            .into_iter()
            .filter_map(|entry| match Message::try_from(entry) {
                Ok(message) => Some(message),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable history entry");
                    None
                }
            })
            .collect(),
        Err(err) => {
            warn!(error = %err, "no conversation history available");
            Vec::new()
        }
    }
}
