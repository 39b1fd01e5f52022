//! Core types and error definitions for supportdesk.
//!
//! This crate provides the foundational types shared across all supportdesk
//! crates: the unified error enum and the normalized conversation turn.
//!
//! # Main types
//!
//! - [`SupportError`]: Unified error enum for all supportdesk subsystems.
//! - [`SupportResult`]: Convenience alias for `Result<T, SupportError>`.
//! - [`Role`]: Author of a conversation turn (user, assistant, system).
//! - [`Turn`]: A single normalized `{role, content}` conversation turn.
//! - [`HistoryItem`]: Loosely-shaped history input, normalized into a [`Turn`].

/// Error types.
pub mod error;
/// Conversation turn types.
pub mod message;

pub use error::{SupportError, SupportResult};
pub use message::{HistoryItem, Role, Turn};
