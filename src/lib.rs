//! rulechat is a terminal client for a keyword-matching chatbot backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the backend wire types and the [`api::ChatBackend`]
//!   seam, with an HTTP implementation on `reqwest`.
//! - [`core`] owns runtime state: the intent catalog, the conversation log,
//!   the reasoning trace and the turn state machine that ties them together.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that turns key presses into state transitions.
//! - [`cli`] parses arguments and routes to the TUI or a one-shot command.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
