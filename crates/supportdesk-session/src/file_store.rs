use crate::record::{ConversationEntry, SessionRecord};
use crate::store::DocumentStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use supportdesk_core::{SupportError, SupportResult};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Document store backed by JSON files on disk.
///
/// Layout under the root directory:
///
/// ```text
/// sessions/<id>.json         one pretty-printed SessionRecord
/// conversations/<id>.jsonl   one ConversationEntry per line, append-only
/// ```
///
/// Record rewrites go through a temp file and a rename so readers never see
/// a half-written record. A single in-process mutex serializes mutations.
pub struct FileDocumentStore {
    sessions_dir: PathBuf,
    conversations_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileDocumentStore {
    pub async fn new(dir: PathBuf) -> SupportResult<Self> {
        let sessions_dir = dir.join("sessions");
        let conversations_dir = dir.join("conversations");
        for d in [&sessions_dir, &conversations_dir] {
            tokio::fs::create_dir_all(d).await.map_err(|e| {
                SupportError::Store(format!("Failed to create {}: {e}", d.display()))
            })?;
        }
        Ok(Self {
            sessions_dir,
            conversations_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn session_path(&self, id: Uuid) -> PathBuf {
        self.sessions_dir.join(format!("{id}.json"))
    }

    fn conversation_path(&self, session_id: Uuid) -> PathBuf {
        self.conversations_dir.join(format!("{session_id}.jsonl"))
    }

    async fn read_record(path: &Path) -> SupportResult<Option<SessionRecord>> {
        let data = match tokio::fs::read_to_string(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SupportError::Store(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        let record = serde_json::from_str(&data).map_err(|e| {
            SupportError::Store(format!("Failed to parse {}: {e}", path.display()))
        })?;
        Ok(Some(record))
    }

    async fn write_record(&self, record: &SessionRecord) -> SupportResult<()> {
        let path = self.session_path(record.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| SupportError::Store(format!("Failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| SupportError::Store(format!("Failed to write {}: {e}", path.display())))
    }

    async fn remove_if_exists(path: &Path) -> SupportResult<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SupportError::Store(format!(
                "Failed to delete {}: {e}",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn find_session(&self, id: Uuid) -> SupportResult<Option<SessionRecord>> {
        Self::read_record(&self.session_path(id)).await
    }

    async fn insert_session(&self, record: &SessionRecord) -> SupportResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_record(record).await
    }

    async fn touch_session(&self, id: Uuid, at: DateTime<Utc>) -> SupportResult<()> {
        let _guard = self.write_lock.lock().await;
        if let Some(mut record) = Self::read_record(&self.session_path(id)).await? {
            record.last_active_at = Some(at);
            self.write_record(&record).await?;
        }
        Ok(())
    }

    async fn set_contextual_memory(&self, id: Uuid, items: &[String]) -> SupportResult<()> {
        let _guard = self.write_lock.lock().await;
        let record = match Self::read_record(&self.session_path(id)).await? {
            Some(mut record) => {
                record.contextual_memory = Some(items.to_vec());
                record
            }
            None => SessionRecord::memory_only(id, items.to_vec()),
        };
        self.write_record(&record).await
    }

    async fn delete_session(&self, id: Uuid) -> SupportResult<bool> {
        let _guard = self.write_lock.lock().await;
        Self::remove_if_exists(&self.session_path(id)).await
    }

    async fn sessions_active_since(
        &self,
        threshold: DateTime<Utc>,
    ) -> SupportResult<Vec<SessionRecord>> {
        let mut dir = tokio::fs::read_dir(&self.sessions_dir)
            .await
            .map_err(SupportError::store)?;
        let mut records = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(SupportError::store)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = Self::read_record(&path).await? {
                if record.last_active_at.is_some_and(|at| at >= threshold) {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }

    async fn insert_conversation(&self, entry: &ConversationEntry) -> SupportResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.conversation_path(entry.session_id);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| SupportError::Store(format!("Failed to open {}: {e}", path.display())))?;
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .map_err(SupportError::store)?;
        file.flush().await.map_err(SupportError::store)?;
        Ok(())
    }

    async fn conversations_for(&self, session_id: Uuid) -> SupportResult<Vec<ConversationEntry>> {
        let path = self.conversation_path(session_id);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SupportError::store(e)),
        };
        let mut entries: Vec<ConversationEntry> = data
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                SupportError::Store(format!("Failed to parse {}: {e}", path.display()))
            })?;
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn delete_conversations(&self, session_id: Uuid) -> SupportResult<usize> {
        let _guard = self.write_lock.lock().await;
        let path = self.conversation_path(session_id);
        let count = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data.lines().filter(|l| !l.trim().is_empty()).count(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(SupportError::store(e)),
        };
        Self::remove_if_exists(&path).await?;
        Ok(count)
    }
}
