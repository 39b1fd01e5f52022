use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A document in the `sessions` collection.
///
/// Timestamps are optional because storing contextual memory is an upsert:
/// memory stored for an unknown id produces a memory-only record that is not
/// a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    /// Always empty; turns live in the `conversations` collection.
    #[serde(default)]
    pub conversation_history: Vec<String>,
    #[serde(default)]
    pub contextual_memory: Option<Vec<String>>,
}

impl SessionRecord {
    /// A fresh record for a session created at `created_at`.
    pub fn new(id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: Some(created_at),
            last_active_at: Some(created_at),
            conversation_history: Vec::new(),
            contextual_memory: None,
        }
    }

    /// A record that carries only contextual memory.
    pub fn memory_only(id: Uuid, items: Vec<String>) -> Self {
        Self {
            id,
            created_at: None,
            last_active_at: None,
            conversation_history: Vec::new(),
            contextual_memory: Some(items),
        }
    }
}

/// A document in the `conversations` collection: one user/bot exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub session_id: Uuid,
    pub user_query: String,
    pub bot_response: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    pub fn new(
        session_id: Uuid,
        user_query: impl Into<String>,
        bot_response: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            user_query: user_query.into(),
            bot_response: bot_response.into(),
            timestamp,
        }
    }
}

/// Flattens entries (already in chronological order) into an alternating
/// user/bot history.
pub fn flatten_entries(entries: Vec<ConversationEntry>) -> Vec<String> {
    let mut history = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        history.push(entry.user_query);
        history.push(entry.bot_response);
    }
    history
}
