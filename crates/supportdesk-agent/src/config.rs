use crate::failover::RetryPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Generative Language API (`generateContent`).
    Gemini,
    OpenAi,
    OpenRouter,
    /// Groq cloud inference, OpenAI-compatible API.
    Groq,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: LlmProvider,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub fallback_models: Vec<ModelConfig>,
    #[serde(default)]
    pub retry_policy: Option<RetryPolicy>,
}

fn default_provider() -> LlmProvider {
    LlmProvider::Gemini
}

fn default_model_id() -> String {
    "gemini-2.5-flash".into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model_id: default_model_id(),
            api_key: String::new(),
            api_base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            fallback_models: Vec::new(),
            retry_policy: None,
        }
    }
}

impl ModelConfig {
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url.trim_end_matches('/')
        } else {
            match self.provider {
                LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
                LlmProvider::OpenAi => "https://api.openai.com",
                LlmProvider::OpenRouter => "https://openrouter.ai/api",
                LlmProvider::Groq => "https://api.groq.com/openai",
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_gemini_defaults() {
        let config: ModelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.provider, LlmProvider::Gemini);
        assert_eq!(config.model_id, "gemini-2.5-flash");
        assert_eq!(config.max_tokens, 1024);
        assert!(config.fallback_models.is_empty());
        assert_eq!(config.base_url(), "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let config = ModelConfig {
            provider: LlmProvider::Groq,
            api_base_url: Some("http://localhost:9000/".into()),
            ..ModelConfig::default()
        };
        assert_eq!(config.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_provider_names_are_lowercase() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"provider":"openrouter","model_id":"m"}"#).unwrap();
        assert_eq!(config.provider, LlmProvider::OpenRouter);
        assert_eq!(config.base_url(), "https://openrouter.ai/api");
    }
}
