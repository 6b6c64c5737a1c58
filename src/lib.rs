//! `issue_tracker` - Project-scoped issue tracker HTTP API
//!
//! This crate provides the HTTP layer and CLI for the `issue-tracker`
//! binary. Ticket storage lives in the `tickets-lib` crate.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`api`] - axum router and handlers for `/api/issues/:project`
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Layered configuration (defaults, YAML, env, flags)
//! - [`error`] - API error responses
//! - [`format`] - Response bodies
//! - [`logging`] - tracing subscriber setup
//! - [`validation`] - Request validation

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod validation;

pub use error::ApiError;

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if configuration, startup or serving fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
