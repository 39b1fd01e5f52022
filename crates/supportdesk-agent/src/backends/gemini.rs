use super::{send_json, CompletionBackend};
use crate::config::ModelConfig;
use async_trait::async_trait;
use supportdesk_core::{SupportError, SupportResult};
use tracing::debug;

/// Google Generative Language API backend (`models/{model}:generateContent`).
pub struct GeminiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens,
            }
        })
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> SupportResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url(),
            self.config.model_id
        );
        let request = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key);

        let resp_body = send_json("Gemini", request, &self.build_body(prompt)).await?;
        let text = parse_gemini_response(&resp_body)?;
        debug!(model = %self.config.model_id, chars = text.len(), "Gemini completion received");
        Ok(text)
    }
}

/// Concatenates the text parts of the first candidate.
///
/// A candidate with no text parts (for example one stopped by a safety
/// filter) yields an empty string; a body without candidates is an error.
pub(crate) fn parse_gemini_response(body: &serde_json::Value) -> SupportResult<String> {
    let candidate = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .ok_or_else(|| {
            SupportError::Completion(format!("Gemini response has no candidates: {body}"))
        })?;

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text)
}
