use tokio::sync::mpsc;
use tracing::debug;

use super::{App, TurnOutcome, TurnRequest};
use crate::core::catalog::IntentCatalog;
use crate::core::message::Message;

pub enum AppAction {
    LoadCatalog,
    CatalogLoaded { catalog: IntentCatalog },
    LoadHistory,
    HistoryLoaded { messages: Vec<Message> },
    InsertIntoInput { text: String },
    DeleteBackward,
    ClearInput,
    SubmitInput,
    TurnCompleted { turn_id: u64, outcome: TurnOutcome },
    DismissError,
    ScrollUp { lines: u16 },
    ScrollDown { lines: u16 },
    ScrollToLatest,
    Quit,
}

/// Side effects requested by a state transition, run outside the state lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    FetchCatalog,
    FetchHistory { limit: Option<u32> },
    SendTurn(TurnRequest),
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppAction>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppAction>) -> Self {
        Self { tx }
    }

    pub fn dispatch_many<I>(&self, actions: I)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(action);
        }
    }
}

pub fn apply_actions(app: &mut App, actions: impl IntoIterator<Item = AppAction>) -> Vec<AppCommand> {
    actions
        .into_iter()
        .filter_map(|action| apply_action(app, action))
        .collect()
}

pub fn apply_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::LoadCatalog => {
            if app.session.catalog_requested {
                return None;
            }
            app.session.catalog_requested = true;
            Some(AppCommand::FetchCatalog)
        }
        AppAction::CatalogLoaded { catalog } => {
            app.catalog = catalog;
            None
        }
        AppAction::LoadHistory => {
            if app.session.history_requested {
                return None;
            }
            app.session.history_requested = true;
            Some(AppCommand::FetchHistory {
                limit: app.session.history_limit,
            })
        }
        AppAction::HistoryLoaded { messages } => {
            let count = messages.len();
            if app.conversation.hydrate(messages) {
                debug!(count, "conversation hydrated");
            }
            None
        }
        AppAction::InsertIntoInput { text } => {
            app.ui.input.push_str(&text);
            None
        }
        AppAction::DeleteBackward => {
            app.ui.input.pop();
            None
        }
        AppAction::ClearInput => {
            app.ui.clear_input();
            None
        }
        AppAction::SubmitInput => app.begin_turn().map(AppCommand::SendTurn),
        AppAction::TurnCompleted { turn_id, outcome } => {
            app.complete_turn(turn_id, outcome);
            None
        }
        AppAction::DismissError => {
            app.turn.clear_error();
            None
        }
        AppAction::ScrollUp { lines } => {
            app.ui.scroll_back = app.ui.scroll_back.saturating_add(lines);
            None
        }
        AppAction::ScrollDown { lines } => {
            app.ui.scroll_back = app.ui.scroll_back.saturating_sub(lines);
            None
        }
        AppAction::ScrollToLatest => {
            app.ui.follow_latest();
            None
        }
        AppAction::Quit => {
            app.ui.exit_requested = true;
            None
        }
    }
}
