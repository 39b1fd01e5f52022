use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A support conversation held in the session cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Alternating user and bot content, in turn order.
    pub query_history: Vec<String>,
}

impl Session {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self::with_history(Uuid::new_v4(), created_at, Vec::new())
    }

    pub fn with_history(
        session_id: Uuid,
        created_at: DateTime<Utc>,
        query_history: Vec<String>,
    ) -> Self {
        Self {
            session_id,
            created_at,
            query_history,
        }
    }

    /// Appends one exchange: the user query followed by the bot response.
    pub fn push_turn(&mut self, user_query: impl Into<String>, bot_response: impl Into<String>) {
        self.query_history.push(user_query.into());
        self.query_history.push(bot_response.into());
    }

    /// True once more than `window` has elapsed since creation.
    pub fn is_expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.created_at > window
    }

    /// The most recent bot response, if any exchange has happened.
    pub fn last_response(&self) -> Option<&str> {
        if self.query_history.len() >= 2 && self.query_history.len() % 2 == 0 {
            self.query_history.last().map(String::as_str)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new(Utc::now());
        assert!(session.query_history.is_empty());
        assert!(session.last_response().is_none());
    }

    #[test]
    fn test_push_turn_appends_pair() {
        let mut session = Session::new(Utc::now());
        session.push_turn("where is my order?", "It ships tomorrow.");
        session.push_turn("thanks", "You're welcome!");
        assert_eq!(
            session.query_history,
            vec![
                "where is my order?",
                "It ships tomorrow.",
                "thanks",
                "You're welcome!"
            ]
        );
        assert_eq!(session.last_response(), Some("You're welcome!"));
    }

    #[test]
    fn test_expiry_is_strictly_after_window() {
        let created = Utc::now();
        let session = Session::new(created);
        let window = Duration::minutes(30);
        assert!(!session.is_expired(created + Duration::minutes(30), window));
        assert!(session.is_expired(created + Duration::minutes(31), window));
    }
}
