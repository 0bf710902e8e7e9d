//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the main interaction loop that turns terminal events into
//!   [`crate::core::app::AppAction`]s and runs backend requests off the UI task.
//! - [`renderer`]: view composition and frame output.
//! - [`theme`]: color and style policy.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns domain logic and backend coordination.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
