//! Application state and the transitions that mutate it.
//!
//! Everything the interface shows lives in [`App`]. The catalog, the
//! conversation log, the reasoning trace and the turn state are private and
//! only change through [`apply_action`]; rendering code gets read-only
//! accessors.

use std::path::PathBuf;
use std::time::Instant;

use tracing::warn;

use crate::core::catalog::IntentCatalog;
use crate::core::conversation::ConversationLog;
use crate::core::message::Message;
use crate::core::trace::ReasoningTraceHolder;
use crate::utils::logging::TranscriptLog;

pub mod actions;
pub mod executor;
pub mod turn;

pub use actions::{apply_action, apply_actions, AppAction, AppActionDispatcher, AppCommand};
pub use turn::{TurnOutcome, TurnPhase, TurnRequest, TurnState};

pub struct SessionContext {
    pub base_url: String,
    pub history_limit: Option<u32>,
    pub transcript: TranscriptLog,
    catalog_requested: bool,
    history_requested: bool,
}

impl SessionContext {
    pub fn new(
        base_url: impl Into<String>,
        history_limit: Option<u32>,
        log_file: Option<PathBuf>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            history_limit,
            transcript: TranscriptLog::new(log_file),
            catalog_requested: false,
            history_requested: false,
        }
    }
}

pub struct UiState {
    pub input: String,
    /// Lines scrolled up from the newest message; 0 follows the conversation.
    pub scroll_back: u16,
    pub exit_requested: bool,
    pub pulse_start: Instant,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            scroll_back: 0,
            exit_requested: false,
            pulse_start: Instant::now(),
        }
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn follow_latest(&mut self) {
        self.scroll_back = 0;
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct App {
    catalog: IntentCatalog,
    conversation: ConversationLog,
    trace: ReasoningTraceHolder,
    turn: TurnState,
    pub ui: UiState,
    pub session: SessionContext,
}

impl App {
    pub fn new(session: SessionContext) -> Self {
        Self {
            catalog: IntentCatalog::builtin(),
            conversation: ConversationLog::new(),
            trace: ReasoningTraceHolder::new(),
            turn: TurnState::default(),
            ui: UiState::new(),
            session,
        }
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn trace(&self) -> &ReasoningTraceHolder {
        &self.trace
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn is_loading(&self) -> bool {
        self.turn.is_sending()
    }

    fn record(&mut self, message: Message) {
        if let Err(e) = self.session.transcript.log_message(&message) {
            warn!(error = %e, "failed to write transcript");
        }
        self.conversation.append(message);
    }
}
