use super::turn::execute_turn;
use super::{AppAction, AppCommand};
use crate::api::ChatBackend;
use crate::core::catalog::load_catalog;
use crate::core::conversation::fetch_history;

/// Run the I/O behind a command and turn its result into the action that
/// records it. Catalog and history failures are already folded into safe
/// defaults here; turn failures travel inside the outcome.
pub async fn execute(backend: &dyn ChatBackend, command: AppCommand) -> AppAction {
    match command {
        AppCommand::FetchCatalog => AppAction::CatalogLoaded {
            catalog: load_catalog(backend).await,
        },
        AppCommand::FetchHistory { limit } => AppAction::HistoryLoaded {
            messages: fetch_history(backend, limit).await,
        },
        AppCommand::SendTurn(request) => AppAction::TurnCompleted {
            turn_id: request.turn_id,
            outcome: execute_turn(backend, &request).await,
        },
    }
}
