//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::api::ChatBackend;
use crate::core::app::executor::execute;
use crate::core::app::{apply_action, apply_actions, App, AppAction, SessionContext};
use crate::core::trace::TraceView;

pub async fn run_say(
    backend: &dyn ChatBackend,
    message: Vec<String>,
    log_file: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let message = message.join(" ");
    if message.trim().is_empty() {
        eprintln!("Usage: rulechat say <message>");
        std::process::exit(1);
    }

    let app = run_single_turn(backend, &message, log_file).await;
    if let Some(error) = app.turn().error() {
        eprintln!("❌ {error}");
        std::process::exit(1);
    }

    let mut stdout = io::stdout().lock();
    write_report(&mut stdout, &app)?;
    stdout.flush()?;
    Ok(())
}

/// Drives one turn through the same state machine the TUI uses.
pub async fn run_single_turn(
    backend: &dyn ChatBackend,
    message: &str,
    log_file: Option<PathBuf>,
) -> App {
    let mut app = App::new(SessionContext::new(backend.base_url(), None, log_file));
    let commands = apply_actions(
        &mut app,
        [
            AppAction::InsertIntoInput {
                text: message.to_string(),
            },
            AppAction::SubmitInput,
        ],
    );
    for command in commands {
        let action = execute(backend, command).await;
        apply_action(&mut app, action);
    }
    app
}

pub fn write_report<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    if let Some(reply) = app.conversation().last().filter(|m| m.is_bot()) {
        writeln!(out, "{}", reply.text)?;
    }

    let trace = match app.trace().view() {
        TraceView::Unset => return Ok(()),
        TraceView::Empty(trace) | TraceView::Populated(trace) => trace,
    };
    writeln!(out)?;
    writeln!(out, "intent:  {}", trace.intent)?;
    if !trace.matched_keyword.is_empty() {
        writeln!(out, "matched: {}", trace.matched_keyword)?;
    }
    if trace.steps.is_empty() {
        writeln!(out, "steps:   (none reported)")?;
    } else {
        writeln!(out, "steps:")?;
        for (index, step) in trace.steps.iter().enumerate() {
            writeln!(out, "  {}. {step}", index + 1)?;
        }
    }
    Ok(())
}
