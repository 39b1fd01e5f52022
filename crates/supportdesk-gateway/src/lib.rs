//! HTTP API for supportdesk.
//!
//! [`GatewayServer::build`] wires the session manager and the support agent
//! into an axum [`Router`](axum::Router); [`spawn_expiry_sweeper`] runs the
//! background purge of expired sessions.

/// API error type and its HTTP mapping.
pub mod error;
/// Route handlers and request/response bodies.
pub mod handlers;
/// Router construction and shared state.
pub mod server;
/// Background session expiry.
pub mod sweeper;

pub use error::ApiError;
pub use server::{AppState, GatewayServer};
pub use sweeper::spawn_expiry_sweeper;
