//! Read-only commands: `intents`, `history` and `health`.

use std::error::Error;
use std::io::{self, Write};

use crate::api::ChatBackend;
use crate::core::catalog::{load_catalog, CatalogSource, IntentCatalog};
use crate::core::conversation::{fetch_history, ConversationLog};
use crate::utils::logging::transcript_prefix;

pub async fn run_intents(backend: &dyn ChatBackend) -> Result<(), Box<dyn Error>> {
    let catalog = load_catalog(backend).await;
    let mut stdout = io::stdout().lock();
    write_catalog(&mut stdout, &catalog)?;
    Ok(())
}

pub async fn run_history(
    backend: &dyn ChatBackend,
    limit: Option<u32>,
) -> Result<(), Box<dyn Error>> {
    let mut log = ConversationLog::new();
    log.hydrate(fetch_history(backend, limit).await);
    let mut stdout = io::stdout().lock();
    write_history(&mut stdout, &log)?;
    Ok(())
}

pub async fn run_health(backend: &dyn ChatBackend) -> Result<(), Box<dyn Error>> {
    match backend.health().await {
        Ok(health) => {
            println!("✅ {} is {}", backend.base_url(), health.status);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}: {}", backend.base_url(), e.user_message());
            std::process::exit(1);
        }
    }
}

pub fn write_catalog<W: Write>(out: &mut W, catalog: &IntentCatalog) -> io::Result<()> {
    match catalog.source() {
        CatalogSource::Remote => writeln!(out, "Intents ({}):", catalog.len())?,
        CatalogSource::Builtin => writeln!(
            out,
            "Intents ({}, built-in; the backend catalog was unavailable):",
            catalog.len()
        )?,
    }
    for (name, descriptor) in catalog.iter() {
        writeln!(out)?;
        match descriptor.keywords() {
            Some(keywords) => writeln!(out, "  {name}  [{}]", keywords.join(", "))?,
            None => writeln!(out, "  {name}  (fallback)")?,
        }
        writeln!(out, "    → {}", descriptor.response())?;
    }
    Ok(())
}

pub fn write_history<W: Write>(out: &mut W, log: &ConversationLog) -> io::Result<()> {
    if log.is_empty() {
        return writeln!(out, "No conversation history.");
    }
    for message in log.messages() {
        let stamp = message
            .created_at
            .map(|at| format!("[{}] ", at.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default();
        writeln!(out, "{stamp}{}{}", transcript_prefix(message), message.text)?;
    }
    Ok(())
}
