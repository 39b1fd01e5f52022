use crate::record::{ConversationEntry, SessionRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use supportdesk_core::SupportResult;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Keyed access to the two collections backing sessions: `sessions`
/// (metadata records) and `conversations` (one entry per exchange).
///
/// Implementations own their own concurrency control and retry policy; the
/// session manager neither retries nor masks their errors.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a session record by id.
    async fn find_session(&self, id: Uuid) -> SupportResult<Option<SessionRecord>>;

    /// Insert a new session record.
    async fn insert_session(&self, record: &SessionRecord) -> SupportResult<()>;

    /// Set `last_active_at` on an existing record. Missing records are left absent.
    async fn touch_session(&self, id: Uuid, at: DateTime<Utc>) -> SupportResult<()>;

    /// Replace the contextual memory of a record, creating a memory-only
    /// record when none exists.
    async fn set_contextual_memory(&self, id: Uuid, items: &[String]) -> SupportResult<()>;

    /// Delete a session record. Returns whether a record was removed.
    async fn delete_session(&self, id: Uuid) -> SupportResult<bool>;

    /// All records whose `last_active_at` is at or after `threshold`.
    async fn sessions_active_since(
        &self,
        threshold: DateTime<Utc>,
    ) -> SupportResult<Vec<SessionRecord>>;

    /// Append one conversation entry.
    async fn insert_conversation(&self, entry: &ConversationEntry) -> SupportResult<()>;

    /// Every entry of a session, oldest first. Entries sharing a timestamp
    /// keep their insertion order.
    async fn conversations_for(&self, session_id: Uuid) -> SupportResult<Vec<ConversationEntry>>;

    /// Delete every entry of a session. Returns how many were removed.
    async fn delete_conversations(&self, session_id: Uuid) -> SupportResult<usize>;
}

/// Document store held entirely in memory.
pub struct InMemoryDocumentStore {
    sessions: RwLock<HashMap<Uuid, SessionRecord>>,
    conversations: RwLock<Vec<ConversationEntry>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            conversations: RwLock::new(Vec::new()),
        }
    }

    /// Number of session records, including memory-only ones.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of conversation entries across all sessions.
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_session(&self, id: Uuid) -> SupportResult<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn insert_session(&self, record: &SessionRecord) -> SupportResult<()> {
        self.sessions.write().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn touch_session(&self, id: Uuid, at: DateTime<Utc>) -> SupportResult<()> {
        if let Some(record) = self.sessions.write().await.get_mut(&id) {
            record.last_active_at = Some(at);
        }
        Ok(())
    }

    async fn set_contextual_memory(&self, id: Uuid, items: &[String]) -> SupportResult<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(record) => record.contextual_memory = Some(items.to_vec()),
            None => {
                sessions.insert(id, SessionRecord::memory_only(id, items.to_vec()));
            }
        }
        Ok(())
    }

    async fn delete_session(&self, id: Uuid) -> SupportResult<bool> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn sessions_active_since(
        &self,
        threshold: DateTime<Utc>,
    ) -> SupportResult<Vec<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|r| r.last_active_at.is_some_and(|at| at >= threshold))
            .cloned()
            .collect())
    }

    async fn insert_conversation(&self, entry: &ConversationEntry) -> SupportResult<()> {
        self.conversations.write().await.push(entry.clone());
        Ok(())
    }

    async fn conversations_for(&self, session_id: Uuid) -> SupportResult<Vec<ConversationEntry>> {
        let conversations = self.conversations.read().await;
        let mut entries: Vec<ConversationEntry> = conversations
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect();
        // sort_by_key is stable, so same-timestamp entries keep insertion order
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn delete_conversations(&self, session_id: Uuid) -> SupportResult<usize> {
        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|e| e.session_id != session_id);
        Ok(before - conversations.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_insert_and_find_session() {
        let store = InMemoryDocumentStore::new();
        let record = SessionRecord::new(Uuid::new_v4(), Utc::now());
        store.insert_session(&record).await.unwrap();

        let loaded = store.find_session(record.id).await.unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(store.find_session(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_touch_missing_record_does_not_create() {
        let store = InMemoryDocumentStore::new();
        store.touch_session(Uuid::new_v4(), Utc::now()).await.unwrap();
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_set_contextual_memory_upserts_and_replaces() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();

        store
            .set_contextual_memory(id, &["a".to_string()])
            .await
            .unwrap();
        let record = store.find_session(id).await.unwrap().unwrap();
        assert!(record.created_at.is_none());
        assert_eq!(record.contextual_memory, Some(vec!["a".to_string()]));

        store
            .set_contextual_memory(id, &["b".to_string(), "c".to_string()])
            .await
            .unwrap();
        let record = store.find_session(id).await.unwrap().unwrap();
        assert_eq!(
            record.contextual_memory,
            Some(vec!["b".to_string(), "c".to_string()])
        );
    }

    #[tokio::test]
    async fn test_sessions_active_since_filters_by_last_active() {
        let store = InMemoryDocumentStore::new();
        let now = Utc::now();
        let fresh = SessionRecord::new(Uuid::new_v4(), now);
        let stale = SessionRecord::new(Uuid::new_v4(), now - Duration::hours(2));
        store.insert_session(&fresh).await.unwrap();
        store.insert_session(&stale).await.unwrap();
        store
            .set_contextual_memory(Uuid::new_v4(), &["memo".to_string()])
            .await
            .unwrap();

        let active = store
            .sessions_active_since(now - Duration::minutes(30))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, fresh.id);
    }

    #[tokio::test]
    async fn test_conversations_sorted_by_timestamp_stable() {
        let store = InMemoryDocumentStore::new();
        let sid = Uuid::new_v4();
        let t0 = Utc::now();

        store
            .insert_conversation(&ConversationEntry::new(sid, "late", "l", t0 + Duration::seconds(5)))
            .await
            .unwrap();
        store
            .insert_conversation(&ConversationEntry::new(sid, "tie-1", "x", t0))
            .await
            .unwrap();
        store
            .insert_conversation(&ConversationEntry::new(sid, "tie-2", "y", t0))
            .await
            .unwrap();
        store
            .insert_conversation(&ConversationEntry::new(Uuid::new_v4(), "other", "z", t0))
            .await
            .unwrap();

        let entries = store.conversations_for(sid).await.unwrap();
        let queries: Vec<&str> = entries.iter().map(|e| e.user_query.as_str()).collect();
        assert_eq!(queries, vec!["tie-1", "tie-2", "late"]);
    }

    #[tokio::test]
    async fn test_delete_conversations_counts() {
        let store = InMemoryDocumentStore::new();
        let sid = Uuid::new_v4();
        for i in 0..3 {
            store
                .insert_conversation(&ConversationEntry::new(sid, format!("q{i}"), "a", Utc::now()))
                .await
                .unwrap();
        }
        assert_eq!(store.delete_conversations(sid).await.unwrap(), 3);
        assert_eq!(store.delete_conversations(sid).await.unwrap(), 0);
        assert!(!store.delete_session(sid).await.unwrap());
    }
}
