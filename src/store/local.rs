//! Local durable chat cache backed by sled
//!
//! The whole chat list is stored as one serialized JSON array under a
//! fixed key, read and rewritten as a unit. Chat histories are small
//! enough that whole-document writes stay cheap, and it keeps the local
//! format identical to what the remote store exchanges.

use crate::error::{MentoraError, Result};
use crate::store::ChatRecord;
use std::path::{Path, PathBuf};

const CHATS_KEY: &str = "chats";

/// Sled-backed local chat store
pub struct LocalChatStore {
    db: sled::Db,
}

impl LocalChatStore {
    /// Open the store at the default location
    ///
    /// Uses the platform data directory, or the `MENTORA_CHATS_DB`
    /// environment variable when set (tests point this at a temp dir).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new() -> Result<Self> {
        let path = Self::default_path()?;
        Self::new_with_path(&path)
    }

    /// Open the store at an explicit path
    pub fn new_with_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(path)
            .map_err(|e| MentoraError::LocalPersistence(format!("Failed to open chat db: {}", e)))?;
        tracing::debug!("Opened local chat store at {}", path.display());
        Ok(Self { db })
    }

    fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("MENTORA_CHATS_DB") {
            return Ok(PathBuf::from(path));
        }
        let dirs = directories::ProjectDirs::from("", "", "mentora").ok_or_else(|| {
            MentoraError::LocalPersistence("Could not determine data directory".to_string())
        })?;
        Ok(dirs.data_dir().join("chats"))
    }

    /// Load every stored chat
    ///
    /// A missing or empty key yields an empty list, not an error.
    pub fn load_all(&self) -> Result<Vec<ChatRecord>> {
        let bytes = self
            .db
            .get(CHATS_KEY)
            .map_err(|e| MentoraError::LocalPersistence(format!("Failed to read chats: {}", e)))?;

        match bytes {
            Some(bytes) => {
                let chats: Vec<ChatRecord> = serde_json::from_slice(&bytes).map_err(|e| {
                    MentoraError::LocalPersistence(format!("Corrupt chat cache: {}", e))
                })?;
                Ok(chats)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Replace the entire stored chat list
    pub fn replace_all(&self, chats: &[ChatRecord]) -> Result<()> {
        let bytes = serde_json::to_vec(chats)?;
        self.db
            .insert(CHATS_KEY, bytes)
            .map_err(|e| MentoraError::LocalPersistence(format!("Failed to write chats: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| MentoraError::LocalPersistence(format!("Failed to flush chats: {}", e)))?;
        Ok(())
    }

    /// Insert or update one chat, matched by session id
    ///
    /// Merging an existing session refreshes its timestamp, so a re-save
    /// always counts as the latest write.
    pub fn upsert(&self, chat: &ChatRecord) -> Result<()> {
        let mut chats = self.load_all()?;
        match chats.iter_mut().find(|c| c.session_id == chat.session_id) {
            Some(existing) => {
                *existing = chat.clone();
                existing.timestamp = chrono::Utc::now().to_rfc3339();
            }
            None => chats.push(chat.clone()),
        }
        self.replace_all(&chats)
    }

    /// Fetch one chat by session id
    pub fn get(&self, session_id: &str) -> Result<Option<ChatRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|c| c.session_id == session_id))
    }

    /// Delete one chat; returns whether it existed
    pub fn delete_one(&self, session_id: &str) -> Result<bool> {
        let mut chats = self.load_all()?;
        let before = chats.len();
        chats.retain(|c| c.session_id != session_id);
        let removed = chats.len() < before;
        if removed {
            self.replace_all(&chats)?;
        }
        Ok(removed)
    }

    /// Delete every stored chat
    pub fn delete_all(&self) -> Result<()> {
        self.replace_all(&[])
    }
}
