//! One user turn: `Idle -> Sending -> {Fulfilled, Failed} -> Idle`.
//!
//! `Fulfilled` and `Failed` are never stored; [`App::complete_turn`] applies
//! the outcome and drops straight back to `Idle` in the same step.

use tracing::{debug, warn};

use super::App;
use crate::api::{BackendError, ChatBackend, ChatReply, ChatRequest};
use crate::core::message::Message;
use crate::core::trace::ReasoningTrace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    Sending {
        turn_id: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Fulfilled(ChatReply),
    Failed(BackendError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub turn_id: u64,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct TurnState {
    phase: TurnPhase,
    last_turn_id: u64,
    error: Option<String>,
}

impl TurnState {
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.phase, TurnPhase::Sending { .. })
    }

    /// Error from the most recent failed turn, if it has not been cleared.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn start(&mut self, message: String) -> TurnRequest {
        self.last_turn_id += 1;
        self.phase = TurnPhase::Sending {
            turn_id: self.last_turn_id,
        };
        TurnRequest {
            turn_id: self.last_turn_id,
            message,
        }
    }

    /// Leave `Sending` if `turn_id` is the outstanding turn.
    fn finish(&mut self, turn_id: u64) -> bool {
        match self.phase {
            TurnPhase::Sending { turn_id: current } if current == turn_id => {
                self.phase = TurnPhase::Idle;
                true
            }
            _ => false,
        }
    }
}

impl App {
    /// Start a turn from the input buffer. Returns `None` without touching
    /// any state when the trimmed input is empty or a turn is in flight.
    pub fn begin_turn(&mut self) -> Option<TurnRequest> {
        let trimmed = self.ui.input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.turn.is_sending() {
            debug!("send ignored while a turn is outstanding");
            return None;
        }

        let message = trimmed.to_string();
        self.turn.clear_error();
        self.record(Message::user(message.clone()));
        self.ui.clear_input();
        self.ui.follow_latest();

        let request = self.turn.start(message);
        debug!(turn_id = request.turn_id, "turn started");
        Some(request)
    }

    /// Apply the result of `turn_id`. Results for any other turn are dropped.
    pub fn complete_turn(&mut self, turn_id: u64, outcome: TurnOutcome) -> bool {
        if !self.turn.finish(turn_id) {
            debug!(turn_id, "discarding result for a turn that is not outstanding");
            return false;
        }

        match outcome {
            TurnOutcome::Fulfilled(reply) => {
                debug!(turn_id, intent = %reply.intent, steps = reply.steps.len(), "turn fulfilled");
                self.record(Message::from_reply(&reply));
                self.trace.replace(ReasoningTrace::from_reply(&reply));
                self.ui.follow_latest();
            }
            TurnOutcome::Failed(err) => {
                warn!(turn_id, error = %err, "turn failed");
                self.turn.error = Some(err.user_message());
            }
        }
        true
    }
}

/// Send one classification request. Every path produces an outcome, so the
/// caller always has something to hand back to [`App::complete_turn`].
pub async fn execute_turn(backend: &dyn ChatBackend, request: &TurnRequest) -> TurnOutcome {
    let body = ChatRequest {
        message: request.message.clone(),
    };
    match backend.send_chat(&body).await {
        Ok(reply) => TurnOutcome::Fulfilled(reply),
        Err(err) => TurnOutcome::Failed(err),
    }
}
