//! Session lifecycle management for supportdesk.
//!
//! The [`SessionManager`] owns the in-memory working set of active sessions,
//! guards it with a single lock, expires sessions older than the configured
//! window, and writes every mutation through to a [`DocumentStore`].
//!
//! # Main types
//!
//! - [`Session`]: A cached support conversation.
//! - [`SessionManager`]: Cache, expiration and write-through persistence.
//! - [`DocumentStore`]: Trait over the `sessions` and `conversations` collections.
//! - [`InMemoryDocumentStore`] / [`FileDocumentStore`]: Store adapters.
//! - [`Clock`]: Time source, injectable for tests via [`ManualClock`].

/// Time sources.
pub mod clock;
/// Manager configuration.
pub mod config;
/// File-backed document store.
pub mod file_store;
/// The session cache and lifecycle manager.
pub mod manager;
/// Durable record shapes.
pub mod record;
/// The cached session type.
pub mod session;
/// Document store trait and in-memory implementation.
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SessionConfig, MAX_EXPIRATION_MINUTES};
pub use file_store::FileDocumentStore;
pub use manager::SessionManager;
pub use record::{ConversationEntry, SessionRecord};
pub use session::Session;
pub use store::{DocumentStore, InMemoryDocumentStore};
