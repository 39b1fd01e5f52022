//! Text completion and support-agent logic for supportdesk.
//!
//! # Main types
//!
//! - [`CompletionBackend`]: Trait over a provider's text generation API.
//! - [`GeminiBackend`] / [`OpenAiBackend`]: HTTP provider backends.
//! - [`FailoverBackend`]: Retries with backoff across several backends.
//! - [`CompletionClient`]: Builds the backend chain from a [`ModelConfig`].
//! - [`SupportAgent`]: Replies, escalation, summaries and next actions.

/// Provider backends.
pub mod backends;
/// Completion client.
pub mod client;
/// Model configuration.
pub mod config;
/// Retry and failover across backends.
pub mod failover;
pub mod prompts;
/// The customer support agent.
pub mod support;

pub use backends::gemini::GeminiBackend;
pub use backends::openai::OpenAiBackend;
pub use backends::CompletionBackend;
pub use client::CompletionClient;
pub use config::{LlmProvider, ModelConfig};
pub use failover::{FailoverBackend, RetryPolicy};
pub use support::{AgentReply, SupportAgent};
