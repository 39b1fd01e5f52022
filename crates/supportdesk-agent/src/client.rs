use crate::backends::gemini::GeminiBackend;
use crate::backends::openai::OpenAiBackend;
use crate::backends::CompletionBackend;
use crate::config::{LlmProvider, ModelConfig};
use crate::failover::FailoverBackend;
use supportdesk_core::SupportResult;

/// Completion client that dispatches to the configured provider backend.
///
/// The primary model and its `fallback_models` are tried in order, each with
/// the primary model's retry policy.
pub struct CompletionClient {
    backend: Box<dyn CompletionBackend>,
}

impl CompletionClient {
    pub fn new(config: ModelConfig) -> Self {
        let policy = config.retry_policy.clone().unwrap_or_default();
        let mut configs = vec![config];
        let fallbacks = std::mem::take(&mut configs[0].fallback_models);
        configs.extend(fallbacks);

        let backends = configs.into_iter().map(backend_for).collect();
        Self {
            backend: Box::new(FailoverBackend::new(backends, policy)),
        }
    }

    /// Create from a pre-built backend.
    pub fn from_backend(backend: Box<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn generate(&self, prompt: &str) -> SupportResult<String> {
        self.backend.generate(prompt).await
    }
}

fn backend_for(config: ModelConfig) -> Box<dyn CompletionBackend> {
    match config.provider {
        LlmProvider::Gemini => Box::new(GeminiBackend::new(config)),
        LlmProvider::OpenAi | LlmProvider::OpenRouter | LlmProvider::Groq => {
            Box::new(OpenAiBackend::new(config))
        }
    }
}
