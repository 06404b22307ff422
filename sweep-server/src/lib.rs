//! # Sweep Server
//!
//! HTTP and command line front-ends for the resumable maintenance scanner.
//!
//! The server exposes the admin maintenance API under `/api/v1/maintenance`
//! and drives scheduled continuations from a tokio timer. The `scan`
//! subcommand runs a whole scan in the foreground instead.

pub mod cli;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
