use crate::backends::CompletionBackend;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use supportdesk_core::{SupportError, SupportResult};
use tracing::{info, warn};

#[cfg(test)]
type SleepFn = Box<
    dyn Fn(u64) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> + Send + Sync,
>;

/// Retry behaviour for completion calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries per backend after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub backoff_base_ms: u64,
    /// Upper bound for a single delay.
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    /// Three attempts in total, waiting 2 s then 4 s.
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 2_000,
            backoff_max_ms: 30_000,
        }
    }
}

/// Whether a completion failure is worth retrying on the same backend.
///
/// Transport failures, rate limits and server errors are retried. Client
/// errors that will fail the same way again (400, 403, 404) and local
/// failures such as bad configuration are not. Only the message head before
/// the first `": "` is inspected, so a provider's response body never
/// changes the outcome.
pub fn is_retryable(err: &SupportError) -> bool {
    let SupportError::Completion(msg) = err else {
        return false;
    };
    let head = msg.split_once(": ").map_or(msg.as_str(), |(head, _)| head);

    if head.ends_with("returned invalid JSON") {
        return false;
    }
    match head.split_once(" API error ") {
        Some((_, status)) => !matches!(
            status.split_whitespace().next(),
            Some("400" | "403" | "404")
        ),
        None => true,
    }
}

fn compute_backoff(policy: &RetryPolicy, attempt: u32) -> u64 {
    let delay = policy
        .backoff_base_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    delay.min(policy.backoff_max_ms)
}

/// A [`CompletionBackend`] that tries several backends in order, retrying
/// transient errors on each with exponential backoff.
///
/// A non-retryable error moves straight on to the next backend. When every
/// backend has failed the last error is returned.
pub struct FailoverBackend {
    backends: Vec<Box<dyn CompletionBackend>>,
    policy: RetryPolicy,
    #[cfg(test)]
    sleep_fn: Option<SleepFn>,
}

impl FailoverBackend {
    pub fn new(backends: Vec<Box<dyn CompletionBackend>>, policy: RetryPolicy) -> Self {
        Self {
            backends,
            policy,
            #[cfg(test)]
            sleep_fn: None,
        }
    }

    async fn do_sleep(&self, ms: u64) {
        #[cfg(test)]
        if let Some(ref f) = self.sleep_fn {
            f(ms).await;
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }
}

#[async_trait]
impl CompletionBackend for FailoverBackend {
    async fn generate(&self, prompt: &str) -> SupportResult<String> {
        let mut last_err: Option<SupportError> = None;

        for (backend_idx, backend) in self.backends.iter().enumerate() {
            for attempt in 0..=self.policy.max_retries {
                match backend.generate(prompt).await {
                    Ok(text) => return Ok(text),
                    Err(e) => {
                        if !is_retryable(&e) {
                            warn!(
                                backend = backend_idx,
                                attempt,
                                error = %e,
                                "Non-retryable error, moving to next backend"
                            );
                            last_err = Some(e);
                            break;
                        }

                        if attempt < self.policy.max_retries {
                            let delay = compute_backoff(&self.policy, attempt);
                            info!(
                                backend = backend_idx,
                                attempt,
                                delay_ms = delay,
                                error = %e,
                                "Retryable error, backing off"
                            );
                            self.do_sleep(delay).await;
                        } else {
                            warn!(backend = backend_idx, error = %e, "Retries exhausted");
                        }
                        last_err = Some(e);
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| SupportError::Completion("No completion backend configured".into())))
    }
}
