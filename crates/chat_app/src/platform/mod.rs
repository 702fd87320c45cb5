//! Terminal presentation layer for the chat client.
mod app;
mod config;
mod effects;
mod ui;

pub use app::run_app;
