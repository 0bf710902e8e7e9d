//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod inspect;
pub mod say;

use std::env;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::api::{ChatBackend, HttpBackend};
use crate::cli::inspect::{run_health, run_history, run_intents};
use crate::cli::say::run_say;
use crate::core::app::SessionContext;
use crate::core::config::{Config, BASE_URL_ENV};
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "rulechat")]
#[command(version)]
#[command(about = "A terminal client for a keyword-matching chatbot backend")]
#[command(
    long_about = "rulechat is a full-screen terminal client for a rule-based chatbot \
backend. Every reply shows which intent matched, which keyword triggered it, and the \
reasoning steps the backend reported.\n\n\
Environment Variables:\n\
  RULECHAT_BASE_URL   Backend URL (overridden by --base-url, defaults to http://localhost:8000)\n\
  RUST_LOG            Filter for --debug-log output (defaults to rulechat=debug)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down           Scroll one line\n\
  PgUp/PgDn         Scroll one page\n\
  End               Jump to the latest message\n\
  Esc               Dismiss the error line\n\
  Ctrl+U            Clear the input field\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL (overrides the environment and config file)
    #[arg(short = 'b', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Append every message of this session to the given file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Write diagnostic tracing output to the given file
    #[arg(long, global = true, value_name = "FILE")]
    pub debug_log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send a single message and print the reply with its reasoning
    Say {
        /// Message to send (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
    /// Print the intent catalog
    Intents,
    /// Print the stored conversation history
    History {
        /// Maximum number of messages to request
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },
    /// Check that the backend is reachable
    Health,
    /// Set configuration values, or print them when no value is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    if let Some(path) = &args.debug_log {
        init_tracing(path)?;
    }

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

fn init_tracing(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rulechat=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| -> Box<dyn Error> { e })?;
    Ok(())
}

fn build_backend(args: &Args, config: &Config) -> Result<HttpBackend, Box<dyn Error>> {
    let env_url = env::var(BASE_URL_ENV).ok();
    let base_url = config.resolve_base_url(args.base_url.as_deref(), env_url.as_deref());
    debug!(%base_url, timeout = ?config.request_timeout(), "using backend");
    Ok(HttpBackend::new(base_url, config.request_timeout())?)
}

async fn async_main(mut args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.take().unwrap_or(Commands::Chat);

    match command {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let value = value.map(|parts| parts.join(" ")).unwrap_or_default();
            match key {
                Some(key) if !value.trim().is_empty() => match config.set(&key, &value) {
                    Ok(confirmation) => {
                        config.save()?;
                        println!("✅ {confirmation}");
                    }
                    Err(e) => {
                        eprintln!("❌ {e}");
                        std::process::exit(1);
                    }
                },
                _ => config.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match config.unset(&key) {
                Ok(confirmation) => {
                    config.save()?;
                    println!("✅ {confirmation}");
                }
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Chat => {
            let config = Config::load()?;
            let backend = build_backend(&args, &config)?;
            let session = SessionContext::new(
                backend.base_url().to_string(),
                Some(config.history_limit()),
                args.log.clone(),
            );
            run_chat(Arc::new(backend), session).await
        }
        Commands::Say { message } => {
            let config = Config::load()?;
            let backend = build_backend(&args, &config)?;
            run_say(&backend, message, args.log.clone()).await
        }
        Commands::Intents => {
            let config = Config::load()?;
            let backend = build_backend(&args, &config)?;
            run_intents(&backend).await
        }
        Commands::History { limit } => {
            let config = Config::load()?;
            let backend = build_backend(&args, &config)?;
            run_history(&backend, Some(limit.unwrap_or(config.history_limit()))).await
        }
        Commands::Health => {
            let config = Config::load()?;
            let backend = build_backend(&args, &config)?;
            run_health(&backend).await
        }
    }
}
