use crate::client::CompletionClient;
use crate::prompts;
use serde::Serialize;
use supportdesk_core::Turn;
use tracing::{error, info};

/// Reply text used when the model's answer triggers escalation.
pub const ESCALATION_REPLY: &str = "Your query has been escalated to a human agent for assistance.";
/// Reply text used when the completion service fails.
pub const FAILURE_REPLY: &str = "Sorry, I'm having trouble processing your request at the moment.";
pub const EMPTY_SUMMARY: &str = "No summary available.";
pub const FAILED_SUMMARY: &str = "Unable to generate summary at this time.";

/// Outcome of answering one customer query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentReply {
    pub text: String,
    /// The reply was replaced by a hand-off to a human agent.
    pub escalated: bool,
}

/// Answers customer queries, summarizes conversations and proposes next
/// actions on top of a [`CompletionClient`].
///
/// Completion failures never reach the caller: every operation degrades to
/// a fixed fallback text (or an empty list) and logs the error.
pub struct SupportAgent {
    client: CompletionClient,
}

impl SupportAgent {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    pub async fn generate_response(&self, user_query: &str, history: &[Turn]) -> AgentReply {
        let prompt = prompts::build_conversational_prompt(user_query, history);

        match self.client.generate(&prompt).await {
            Ok(text) if prompts::is_unsatisfactory(&text) => {
                info!(history_len = history.len(), "Escalating to a human agent");
                AgentReply {
                    text: ESCALATION_REPLY.to_string(),
                    escalated: true,
                }
            }
            Ok(text) => AgentReply {
                text,
                escalated: false,
            },
            Err(e) => {
                error!(error = %e, "Failed to generate response");
                AgentReply {
                    text: FAILURE_REPLY.to_string(),
                    escalated: false,
                }
            }
        }
    }

    pub async fn summarize_session(&self, conversation: &str) -> String {
        let prompt = prompts::build_summary_prompt(conversation);
        match self.client.generate(&prompt).await {
            Ok(text) if text.trim().is_empty() => EMPTY_SUMMARY.to_string(),
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to generate summary");
                FAILED_SUMMARY.to_string()
            }
        }
    }

    /// Suggested next steps for the customer, one per non-empty output line.
    pub async fn suggest_next_actions(&self, latest_response: &str) -> Vec<String> {
        let prompt = prompts::build_next_actions_prompt(latest_response);
        match self.client.generate(&prompt).await {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(e) => {
                error!(error = %e, "Failed to generate next actions");
                Vec::new()
            }
        }
    }
}
