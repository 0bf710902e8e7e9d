//! Main chat event loop
//!
//! Terminal events become [`AppAction`]s on an unbounded channel. Each loop
//! iteration drains that channel into [`apply_actions`] under the state lock,
//! then spawns the returned [`AppCommand`]s as tokio tasks whose results come
//! back through the same channel. The UI therefore never blocks on the
//! backend, and the state lock is never held across an await on I/O.

mod keybindings;
mod lifecycle;

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use self::keybindings::{actions_for_key, actions_for_paste};
use self::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};
use crate::api::ChatBackend;
use crate::core::app::executor::execute;
use crate::core::app::{
    apply_actions, App, AppAction, AppActionDispatcher, AppCommand, SessionContext,
};
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;

const MAX_FPS: u64 = 30;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

/// Shared, lock-guarded application state.
#[derive(Clone)]
pub struct AppHandle {
    inner: Arc<Mutex<App>>,
}

impl AppHandle {
    pub fn new(inner: Arc<Mutex<App>>) -> Self {
        Self { inner }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&App) -> R) -> R {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut App) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}

fn spawn_command(
    backend: Arc<dyn ChatBackend>,
    dispatcher: AppActionDispatcher,
    cancel: CancellationToken,
    command: AppCommand,
) {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("backend request abandoned on shutdown");
            }
            action = execute(backend.as_ref(), command) => {
                dispatcher.dispatch_many([action]);
            }
        }
    });
}

async fn drain_action_queue(
    app: &AppHandle,
    dispatcher: &AppActionDispatcher,
    backend: &Arc<dyn ChatBackend>,
    cancel: &CancellationToken,
    action_rx: &mut mpsc::UnboundedReceiver<AppAction>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(action) = action_rx.try_recv() {
        pending.push(action);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = app.update(|app| apply_actions(app, pending)).await;
    for command in commands {
        spawn_command(
            Arc::clone(backend),
            dispatcher.clone(),
            cancel.clone(),
            command,
        );
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Forwards pending terminal events to the dispatcher. Returns whether any
/// event arrived.
fn process_ui_events(
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
) -> bool {
    let mut processed = false;
    while let Ok(UiEvent::Crossterm(ev)) = event_rx.try_recv() {
        processed = true;
        match ev {
            Event::Key(key) => dispatcher.dispatch_many(actions_for_key(&key)),
            Event::Paste(text) => dispatcher.dispatch_many(actions_for_paste(&text)),
            _ => {}
        }
    }
    processed
}

async fn draw_frame(
    app: &AppHandle,
    terminal: &SharedTerminal,
    theme: &Theme,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = terminal.lock().await;
    app.read(|app| terminal.draw(|f| ui(f, app, theme)).map(|_| ()))
        .await?;
    Ok(())
}

pub async fn run_chat(
    backend: Arc<dyn ChatBackend>,
    session: SessionContext,
) -> Result<(), Box<dyn Error>> {
    let app = AppHandle::new(Arc::new(Mutex::new(App::new(session))));
    let theme = Theme::dark_default();

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppAction>();
    let dispatcher = AppActionDispatcher::new(action_tx);
    dispatcher.dispatch_many([AppAction::LoadCatalog, AppAction::LoadHistory]);

    let cancel = CancellationToken::new();
    let terminal = setup_terminal()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut request_redraw = true;
    let mut last_pulse_frame = Instant::now();

    let result = loop {
        if app.read(|app| app.ui.exit_requested).await {
            break Ok(());
        }

        if request_redraw {
            if let Err(e) = draw_frame(&app, &terminal, &theme).await {
                break Err(e);
            }
            request_redraw = false;
        }

        let events_processed = process_ui_events(&mut event_rx, &dispatcher);
        let actions_applied =
            drain_action_queue(&app, &dispatcher, &backend, &cancel, &mut action_rx).await;
        if events_processed || actions_applied {
            request_redraw = true;
        }

        // Keep the thinking indicator animated while a turn is in flight.
        if app.read(|app| app.is_loading()).await
            && last_pulse_frame.elapsed() >= frame_duration
        {
            request_redraw = true;
            last_pulse_frame = Instant::now();
        }

        if !request_redraw {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    cancel.cancel();
    event_reader_handle.abort();
    restore_terminal(&terminal).await?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trace::TraceView;
    use crate::utils::test_utils::{create_test_app, reply, ScriptedBackend};

    fn new_app_handle() -> AppHandle {
        AppHandle::new(Arc::new(Mutex::new(create_test_app())))
    }

    #[tokio::test]
    async fn submitted_turn_completes_through_the_queue() {
        let app = new_app_handle();
        let backend: Arc<dyn ChatBackend> = Arc::new(ScriptedBackend::with_chat([Ok(reply(
            "Hello! How can I help you today?",
            "greeting",
            Some("hello"),
            &["match keyword hello"],
        ))]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = AppActionDispatcher::new(tx);
        let cancel = CancellationToken::new();

        dispatcher.dispatch_many([
            AppAction::InsertIntoInput {
                text: "hello".into(),
            },
            AppAction::SubmitInput,
        ]);
        assert!(drain_action_queue(&app, &dispatcher, &backend, &cancel, &mut rx).await);
        assert!(app.read(|app| app.is_loading()).await);

        for _ in 0..200 {
            drain_action_queue(&app, &dispatcher, &backend, &cancel, &mut rx).await;
            if !app.read(|app| app.is_loading()).await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        app.read(|app| {
            assert!(!app.is_loading());
            assert_eq!(app.conversation().len(), 2);
            assert!(matches!(app.trace().view(), TraceView::Populated(_)));
        })
        .await;
    }

    #[tokio::test]
    async fn cancelled_requests_never_report_back() {
        let app = new_app_handle();
        let backend: Arc<dyn ChatBackend> = Arc::new(ScriptedBackend::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = AppActionDispatcher::new(tx);
        let cancel = CancellationToken::new();
        cancel.cancel();

        dispatcher.dispatch_many([AppAction::LoadCatalog]);
        assert!(drain_action_queue(&app, &dispatcher, &backend, &cancel, &mut rx).await);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_queue_reports_no_work() {
        let app = new_app_handle();
        let backend: Arc<dyn ChatBackend> = Arc::new(ScriptedBackend::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = AppActionDispatcher::new(tx);

        assert!(
            !drain_action_queue(&app, &dispatcher, &backend, &CancellationToken::new(), &mut rx)
                .await
        );
    }
}
