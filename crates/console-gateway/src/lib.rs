//! # console-gateway
//!
//! HTTP layer for the admin console built on Axum.
//!
//! Provides the admission-gate and logging middleware, auth and document
//! proxy handlers, page shells, DTOs, error mapping, and the authorized
//! upstream client.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod upstream;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
