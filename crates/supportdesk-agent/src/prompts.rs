//! Prompt templates and escalation detection.

use regex::RegexSet;
use std::sync::LazyLock;
use supportdesk_core::Turn;
use tracing::debug;

/// System instruction placed at the head of a conversational prompt.
pub const SYSTEM_PROMPT: &str =
    "You are an AI customer support agent. Provide clear, concise, and relevant answers.";

/// `{conversation}` is replaced by the formatted transcript.
pub const SUMMARY_PROMPT_TEMPLATE: &str = "Please provide a concise and clear summary of the following customer support conversation:\n{conversation}";

/// `{response}` is replaced by the latest bot response.
pub const NEXT_ACTIONS_PROMPT_TEMPLATE: &str = "You are a helpful assistant representing Unthinkable Company. Based on the following support response, suggest 3 helpful and relevant next actions or recommendations for the customer that align with Unthinkable Company's tone, policies, and services (dont mention this while responding):\n{response}";

/// Replies containing any of these (case-insensitive) are handed to a human.
pub const ESCALATION_TRIGGER_PHRASES: &[&str] = &[
    "i'm unable to answer",
    "i don't know",
    "please contact support",
    "escalate",
    "sorry, i cannot assist with that",
    "not sure",
    "could you please clarify",
    "unable to help",
    "can't help",
    "try to help",
    "clarify or rephrase your question:",
    "do not have that information",
    "i'm here to assist specifically with questions related to our company and services",
    "please clarify or ask about our company or products",
];

/// Weaker signals that are logged for tuning but never escalate.
const FALLBACK_INDICATORS: &[&str] = &[
    "sorry",
    "unable to help",
    "expertise is limited",
    "please clarify",
];

static ESCALATION_TRIGGERS: LazyLock<Result<RegexSet, regex::Error>> = LazyLock::new(|| {
    RegexSet::new(
        ESCALATION_TRIGGER_PHRASES
            .iter()
            .map(|phrase| format!("(?i){}", regex::escape(phrase))),
    )
});

/// Whether a model reply should be escalated to a human agent.
pub fn is_unsatisfactory(response_text: &str) -> bool {
    let matched = match &*ESCALATION_TRIGGERS {
        Ok(set) => set.is_match(response_text),
        Err(_) => {
            let lowered = response_text.to_lowercase();
            ESCALATION_TRIGGER_PHRASES
                .iter()
                .any(|phrase| lowered.contains(phrase))
        }
    };
    if matched {
        return true;
    }

    let lowered = response_text.to_lowercase();
    if FALLBACK_INDICATORS.iter().any(|i| lowered.contains(i)) {
        debug!(response = %response_text, "Possible fallback reply did not match an escalation trigger");
    }
    false
}

/// Renders prior turns as `Role: content` lines followed by the new query.
pub fn format_conversation(user_query: &str, history: &[Turn]) -> String {
    let mut lines: Vec<String> = history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect();
    lines.push(format!("User: {user_query}"));
    lines.join("\n")
}

/// The prompt sent for a customer query: the system instruction, a blank
/// line, then the transcript from [`format_conversation`].
pub fn build_conversational_prompt(user_query: &str, history: &[Turn]) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\n{}",
        format_conversation(user_query, history)
    )
}

pub fn build_summary_prompt(conversation: &str) -> String {
    SUMMARY_PROMPT_TEMPLATE.replace("{conversation}", conversation)
}

pub fn build_next_actions_prompt(response: &str) -> String {
    NEXT_ACTIONS_PROMPT_TEMPLATE.replace("{response}", response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_set_compiles() {
        assert!(ESCALATION_TRIGGERS.is_ok());
    }

    #[test]
    fn test_triggers_match_case_insensitively() {
        assert!(is_unsatisfactory("I DON'T KNOW the answer to that."));
        assert!(is_unsatisfactory("Please Contact Support for billing issues."));
        assert!(is_unsatisfactory("I'm not sure what you mean."));
        assert!(is_unsatisfactory(
            "Clarify or Rephrase Your Question: what product do you mean?"
        ));
        assert!(is_unsatisfactory("Sorry, we do not have that information."));
    }

    #[test]
    fn test_near_misses_do_not_escalate() {
        assert!(!is_unsatisfactory("Sorry for the delay, your refund is on its way."));
        assert!(!is_unsatisfactory("My expertise is limited, but here is the manual link."));
        assert!(!is_unsatisfactory("Your order ships tomorrow."));
    }

    #[test]
    fn test_punctuation_is_literal() {
        // The trailing colon is part of the phrase, not a pattern.
        assert!(!is_unsatisfactory("clarify or rephrase your question"));
    }

    #[test]
    fn test_format_conversation() {
        let history = vec![Turn::user("Where is my order?"), Turn::assistant("It shipped.")];
        assert_eq!(
            format_conversation("When will it arrive?", &history),
            "User: Where is my order?\nAssistant: It shipped.\nUser: When will it arrive?"
        );
        assert_eq!(format_conversation("Hi", &[]), "User: Hi");
    }

    #[test]
    fn test_conversational_prompt_leads_with_system_instruction() {
        let history = Turn::from_history(&["q1".to_string(), "a1".to_string()]);
        let prompt = build_conversational_prompt("q2", &history);

        let (head, transcript) = prompt.split_once("\n\n").unwrap();
        assert_eq!(head, SYSTEM_PROMPT);
        assert_eq!(transcript, "User: q1\nAssistant: a1\nUser: q2");
    }

    #[test]
    fn test_templates_fill_placeholders() {
        let summary = build_summary_prompt("User: hi");
        assert!(summary.ends_with("conversation:\nUser: hi"));

        let actions = build_next_actions_prompt("Your refund was issued.");
        assert!(actions.starts_with("You are a helpful assistant representing Unthinkable Company."));
        assert!(actions.ends_with(":\nYour refund was issued."));
    }
}
