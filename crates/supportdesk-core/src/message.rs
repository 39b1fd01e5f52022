use serde::{Deserialize, Serialize};

/// The role of the participant that authored a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user.
    User,
    /// The support bot.
    Assistant,
    /// A system-level instruction.
    System,
}

impl Role {
    /// Parses a free-form role name. Anything unrecognized is treated as the user.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "assistant" | "bot" | "model" => Role::Assistant,
            "system" => Role::System,
            _ => Role::User,
        }
    }

    /// Capitalized label used when rendering prompts.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
        }
    }
}

/// A single normalized conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored the turn.
    pub role: Role,
    /// The textual content of the turn.
    pub content: String,
}

impl Turn {
    /// Creates a turn with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a [`Role::User`] turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a [`Role::Assistant`] turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a [`Role::System`] turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Converts a flat alternating history (user, bot, user, bot, ...) into turns.
    ///
    /// Even positions are user turns and odd positions are assistant turns, so
    /// a trailing unpaired item stays a user turn.
    pub fn from_history(history: &[String]) -> Vec<Turn> {
        history
            .iter()
            .enumerate()
            .map(|(i, content)| {
                if i % 2 == 0 {
                    Turn::user(content.as_str())
                } else {
                    Turn::assistant(content.as_str())
                }
            })
            .collect()
    }
}

/// Conversation history as it arrives from outside the service.
///
/// Callers may send a bare string, a `[role, content]` pair, or a
/// `{"role": ..., "content": ...}` object. Each shape is normalized into a
/// [`Turn`] exactly once via [`HistoryItem::into_turn`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HistoryItem {
    /// Bare text, attributed to the user.
    Text(String),
    /// A `[role, content]` pair.
    Pair(String, String),
    /// A `{role, content}` object; a missing role means the user.
    Tagged {
        /// Role name, e.g. `"user"` or `"assistant"`.
        #[serde(default)]
        role: Option<String>,
        /// Turn content.
        #[serde(default)]
        content: String,
    },
}

impl HistoryItem {
    /// Normalizes this item into a [`Turn`].
    pub fn into_turn(self) -> Turn {
        match self {
            HistoryItem::Text(content) => Turn::user(content),
            HistoryItem::Pair(role, content) => Turn::new(Role::parse(&role), content),
            HistoryItem::Tagged { role, content } => {
                let role = role.as_deref().map(Role::parse).unwrap_or(Role::User);
                Turn::new(role, content)
            }
        }
    }
}

impl From<HistoryItem> for Turn {
    fn from(item: HistoryItem) -> Self {
        item.into_turn()
    }
}
