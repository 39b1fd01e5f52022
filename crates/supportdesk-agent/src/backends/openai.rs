use super::{send_json, CompletionBackend};
use crate::config::{LlmProvider, ModelConfig};
use async_trait::async_trait;
use supportdesk_core::{SupportError, SupportResult};

/// OpenAI-compatible chat completions backend.
///
/// Works with OpenAI, OpenRouter, Groq and any other provider that speaks
/// the `/v1/chat/completions` API.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("Authorization", format!("Bearer {}", self.config.api_key));

        // OpenRouter asks callers to identify themselves
        if self.config.provider == LlmProvider::OpenRouter {
            request.header("X-Title", "supportdesk")
        } else {
            request
        }
    }

    fn provider_name(&self) -> &'static str {
        match self.config.provider {
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::Groq => "Groq",
            _ => "OpenAI",
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn generate(&self, prompt: &str) -> SupportResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let request = self.add_provider_headers(self.http.post(&url));
        let resp_body = send_json(self.provider_name(), request, &body).await?;
        parse_openai_response(&resp_body)
    }
}

pub(crate) fn parse_openai_response(body: &serde_json::Value) -> SupportResult<String> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .map(|choice| &choice["message"])
        .ok_or_else(|| SupportError::Completion(format!("No choices in response: {body}")))?;
    Ok(message["content"].as_str().unwrap_or_default().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_choice() {
        let body = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Track it here." } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        });
        assert_eq!(parse_openai_response(&body).unwrap(), "Track it here.");
    }

    #[test]
    fn test_null_content_is_empty() {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        });
        assert_eq!(parse_openai_response(&body).unwrap(), "");
    }

    #[test]
    fn test_no_choices_is_error() {
        let body = serde_json::json!({ "choices": [] });
        assert!(parse_openai_response(&body).is_err());
    }
}
