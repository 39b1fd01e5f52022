pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use supportdesk_core::{SupportError, SupportResult};

/// A text completion provider.
///
/// Each provider (Gemini, OpenAI-compatible APIs) implements this trait to
/// turn one prompt into one block of generated text. Retries are not the
/// backend's concern; wrap it in [`FailoverBackend`](crate::FailoverBackend).
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate text for `prompt`.
    async fn generate(&self, prompt: &str) -> SupportResult<String>;
}

/// Sends a JSON request and returns the decoded body, mapping transport
/// failures and non-2xx statuses to [`SupportError::Completion`].
pub(crate) async fn send_json(
    provider: &str,
    request: reqwest::RequestBuilder,
    body: &serde_json::Value,
) -> SupportResult<serde_json::Value> {
    let resp = request
        .json(body)
        .send()
        .await
        .map_err(|e| SupportError::Completion(format!("{provider} request failed: {e}")))?;

    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| SupportError::Completion(format!("{provider} request failed: {e}")))?;

    if !status.is_success() {
        return Err(SupportError::Completion(format!(
            "{provider} API error {status}: {text}"
        )));
    }

    serde_json::from_str(&text).map_err(|e| {
        SupportError::Completion(format!("{provider} returned invalid JSON: {e}"))
    })
}
