pub mod app;
pub mod catalog;
pub mod config;
pub mod conversation;
pub mod message;
pub mod trace;
