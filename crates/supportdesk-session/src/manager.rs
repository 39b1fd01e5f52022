use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::record::{flatten_entries, ConversationEntry, SessionRecord};
use crate::session::Session;
use crate::store::DocumentStore;
use chrono::{DateTime, Duration, Utc};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use supportdesk_core::{SupportError, SupportResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Owns the in-memory working set of sessions and keeps it in step with the
/// [`DocumentStore`].
///
/// The cache is guarded by one async mutex. It is held only for cache reads
/// and writes, with a single exception: [`add_to_conversation`] keeps it
/// across the store read that hydrates a missing session, so the lookup,
/// hydration and append happen as one step and concurrent appends to the
/// same session are never lost. Durable writes happen after the lock is
/// released and are therefore not ordered against other tasks' writes.
///
/// A cached session older than the expiration window (measured from its
/// `created_at`) is logically absent on every read path. Sessions hydrated
/// from the store keep the stored `created_at`, so they expire on the next
/// cached read rather than receiving a fresh window.
///
/// [`add_to_conversation`]: SessionManager::add_to_conversation
pub struct SessionManager {
    cache: Mutex<HashMap<Uuid, Session>>,
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    expiration: Duration,
}

impl SessionManager {
    /// Build a manager over `store` using the wall clock.
    ///
    /// Fails with [`SupportError::Config`] when the expiration window is out
    /// of range.
    pub fn new(store: Arc<dyn DocumentStore>, config: &SessionConfig) -> SupportResult<Self> {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Build a manager with an explicit time source.
    pub fn with_clock(
        store: Arc<dyn DocumentStore>,
        config: &SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> SupportResult<Self> {
        Ok(Self {
            cache: Mutex::new(HashMap::new()),
            store,
            clock,
            expiration: config.expiration_window()?,
        })
    }

    /// The configured expiration window.
    pub fn expiration_window(&self) -> Duration {
        self.expiration
    }

    /// Create a session, cache it and persist its metadata record.
    ///
    /// If the store write fails the session is dropped from the cache again
    /// and the error is returned.
    pub async fn create_session(&self) -> SupportResult<Session> {
        let now = self.clock.now();
        let session = Session::new(now);
        let id = session.session_id;

        self.cache.lock().await.insert(id, session.clone());

        if let Err(e) = self.store.insert_session(&SessionRecord::new(id, now)).await {
            self.cache.lock().await.remove(&id);
            return Err(e);
        }

        info!(session_id = %id, "Session created");
        Ok(session)
    }

    /// Look up a session, hydrating it from the store on a cache miss.
    ///
    /// An expired cached session is deleted from cache and store and reported
    /// as `None`. Store-hydrated sessions are not checked against the window.
    pub async fn get_session(&self, id: Uuid) -> SupportResult<Option<Session>> {
        let now = self.clock.now();
        {
            let mut cache = self.cache.lock().await;
            let expired = match cache.get(&id) {
                Some(session) if session.is_expired(now, self.expiration) => true,
                Some(session) => return Ok(Some(session.clone())),
                None => false,
            };
            if expired {
                cache.remove(&id);
            }
            drop(cache);

            if expired {
                info!(session_id = %id, "Session expired");
                self.delete_from_store(id).await?;
                return Ok(None);
            }
        }

        let Some(loaded) = self.load_from_store(id).await? else {
            return Ok(None);
        };

        let mut cache = self.cache.lock().await;
        // Another task may have hydrated the same id while we were reading.
        let session = cache.entry(id).or_insert(loaded);
        debug!(
            session_id = %id,
            history_len = session.query_history.len(),
            "Session hydrated from store"
        );
        Ok(Some(session.clone()))
    }

    /// Append one user/bot exchange to a session and persist it.
    ///
    /// The cache append is serialized with every other cache operation. The
    /// conversation entry write propagates its error; a failed
    /// `last_active_at` update is only logged.
    pub async fn add_to_conversation(
        &self,
        id: Uuid,
        user_query: &str,
        bot_response: &str,
    ) -> SupportResult<()> {
        {
            let mut cache = self.cache.lock().await;
            let session = match cache.entry(id) {
                Entry::Occupied(entry) => entry.into_mut(),
                // Lock stays held across this read.
                Entry::Vacant(slot) => match self.load_from_store(id).await? {
                    Some(loaded) => slot.insert(loaded),
                    None => return Err(SupportError::SessionNotFound(id.to_string())),
                },
            };
            session.push_turn(user_query, bot_response);
        }

        let now = self.clock.now();
        self.store
            .insert_conversation(&ConversationEntry::new(id, user_query, bot_response, now))
            .await?;

        if let Err(e) = self.store.touch_session(id, now).await {
            warn!(session_id = %id, error = %e, "Failed to update last_active_at");
        }
        Ok(())
    }

    /// The alternating user/bot history of a session.
    ///
    /// Served from the cache when a live entry exists, otherwise rebuilt from
    /// the store without touching the cache. Unknown ids yield an empty history.
    pub async fn get_conversation_history(&self, id: Uuid) -> SupportResult<Vec<String>> {
        let now = self.clock.now();
        {
            let cache = self.cache.lock().await;
            if let Some(session) = cache.get(&id) {
                if !session.is_expired(now, self.expiration) {
                    return Ok(session.query_history.clone());
                }
            }
        }
        self.load_history(id).await
    }

    /// Live cached sessions plus store records active within the window.
    ///
    /// Cached entries win on id collisions and carry their history;
    /// store-only entries come back with an empty history. Ordered by
    /// `created_at`.
    pub async fn list_sessions(&self) -> SupportResult<Vec<Session>> {
        let now = self.clock.now();
        let (mut sessions, mut seen) = {
            let cache = self.cache.lock().await;
            let mut live = Vec::with_capacity(cache.len());
            let mut seen = HashSet::with_capacity(cache.len());
            for session in cache.values() {
                // Expired ids also shadow their store records.
                seen.insert(session.session_id);
                if !session.is_expired(now, self.expiration) {
                    live.push(session.clone());
                }
            }
            (live, seen)
        };

        let cutoff = now
            .checked_sub_signed(self.expiration)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let records = self.store.sessions_active_since(cutoff).await?;
        for record in records {
            let Some(created_at) = record.created_at else {
                continue;
            };
            if seen.insert(record.id) {
                sessions.push(Session::with_history(record.id, created_at, Vec::new()));
            }
        }

        sessions.sort_by_key(|s| s.created_at);
        Ok(sessions)
    }

    /// Remove a session from cache and store, including all of its
    /// conversation entries. Deleting an unknown id is not an error.
    pub async fn delete_session(&self, id: Uuid) -> SupportResult<()> {
        self.cache.lock().await.remove(&id);
        self.delete_from_store(id).await
    }

    /// Delete every expired cached session from cache and store.
    ///
    /// Returns how many sessions were purged. Every purged id is attempted
    /// even if one store deletion fails; the first failure is returned.
    pub async fn purge_expired(&self) -> SupportResult<usize> {
        let now = self.clock.now();
        let expired: Vec<Uuid> = {
            let mut cache = self.cache.lock().await;
            let ids: Vec<Uuid> = cache
                .values()
                .filter(|s| s.is_expired(now, self.expiration))
                .map(|s| s.session_id)
                .collect();
            for id in &ids {
                cache.remove(id);
            }
            ids
        };

        let mut first_err = None;
        for id in &expired {
            if let Err(e) = self.delete_from_store(*id).await {
                warn!(session_id = %id, error = %e, "Failed to delete expired session");
                first_err.get_or_insert(e);
            }
        }

        if !expired.is_empty() {
            info!(count = expired.len(), "Purged expired sessions");
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(expired.len()),
        }
    }

    /// Drop a session from the cache only. Returns whether it was cached.
    pub async fn evict(&self, id: Uuid) -> bool {
        self.cache.lock().await.remove(&id).is_some()
    }

    /// Number of sessions currently cached, expired or not.
    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Contextual memory attached to a session record; empty when none.
    pub async fn get_contextual_memory(&self, id: Uuid) -> SupportResult<Vec<String>> {
        Ok(self
            .store
            .find_session(id)
            .await?
            .and_then(|record| record.contextual_memory)
            .unwrap_or_default())
    }

    /// Replace the contextual memory of a session (upsert).
    pub async fn store_contextual_memory(&self, id: Uuid, items: &[String]) -> SupportResult<()> {
        self.store.set_contextual_memory(id, items).await
    }

    /// Append `"Summary: <text>"` to a session's contextual memory.
    ///
    /// This is a read-modify-write without any lock: concurrent summaries for
    /// the same session can overwrite each other.
    pub async fn store_session_summary(&self, id: Uuid, summary: &str) -> SupportResult<()> {
        let mut memory = self.get_contextual_memory(id).await?;
        memory.push(format!("Summary: {summary}"));
        self.store_contextual_memory(id, &memory).await
    }

    async fn load_from_store(&self, id: Uuid) -> SupportResult<Option<Session>> {
        let Some(record) = self.store.find_session(id).await? else {
            return Ok(None);
        };
        let Some(created_at) = record.created_at else {
            debug!(session_id = %id, "Record holds contextual memory only");
            return Ok(None);
        };
        let history = self.load_history(id).await?;
        Ok(Some(Session::with_history(id, created_at, history)))
    }

    async fn load_history(&self, id: Uuid) -> SupportResult<Vec<String>> {
        Ok(flatten_entries(self.store.conversations_for(id).await?))
    }

    async fn delete_from_store(&self, id: Uuid) -> SupportResult<()> {
        let removed = self.store.delete_session(id).await?;
        let entries = self.store.delete_conversations(id).await?;
        debug!(session_id = %id, removed, entries, "Session deleted from store");
        Ok(())
    }
}
