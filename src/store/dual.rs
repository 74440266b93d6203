//! Dual-write chat store: durable local, best-effort remote
//!
//! Saves go to the local cache first and fail the operation if that
//! write fails. The remote mirror is then attempted, retrying only
//! transient outages with a short linear backoff; any remote outcome
//! short of success is logged and swallowed
//! so the user never loses a chat to a network problem. Reads prefer the
//! remote copy and reconcile it into the local cache, falling back to
//! local data when the remote is unreachable.

use crate::error::Result;
use crate::store::local::LocalChatStore;
use crate::store::remote::RemoteChatStore;
use crate::store::ChatRecord;
use std::sync::Arc;
use std::time::Duration;

const REMOTE_ATTEMPTS: u32 = 3;
const REMOTE_BACKOFF_STEP: Duration = Duration::from_millis(1_000);

/// Chat store combining a durable local cache with an optional remote mirror
pub struct DualWriteStore {
    local: LocalChatStore,
    remote: Option<Arc<dyn RemoteChatStore>>,
}

impl DualWriteStore {
    /// Build a store; `remote` of `None` means local-only operation
    pub fn new(local: LocalChatStore, remote: Option<Arc<dyn RemoteChatStore>>) -> Self {
        Self { local, remote }
    }

    /// Whether a remote mirror is configured
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Save a chat
    ///
    /// The local write must succeed; the remote mirror is best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local write fails. Remote failures
    /// are logged and swallowed.
    pub async fn save(&self, chat: &ChatRecord) -> Result<()> {
        self.local.upsert(chat)?;

        if let Some(remote) = &self.remote {
            self.mirror_to_remote(remote.as_ref(), chat).await;
        }
        Ok(())
    }

    /// Load all chats, newest first
    ///
    /// Prefers the remote copy and reconciles it into the local cache.
    /// A remote failure falls back to local data with a warning.
    pub async fn load(&self) -> Result<Vec<ChatRecord>> {
        if let Some(remote) = &self.remote {
            match remote.list().await {
                Ok(chats) => {
                    // Remote is the source of truth once reachable
                    self.local.replace_all(&chats)?;
                    return Ok(chats);
                }
                Err(err) => {
                    tracing::warn!("Remote chat list failed, using local cache: {}", err);
                }
            }
        }

        let mut chats = self.local.load_all()?;
        chats.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(chats)
    }

    /// Fetch one chat by session id, from the local cache
    pub fn get(&self, session_id: &str) -> Result<Option<ChatRecord>> {
        self.local.get(session_id)
    }

    /// Delete one chat locally, mirroring to the remote best-effort
    ///
    /// Returns whether the chat existed locally.
    pub async fn delete_one(&self, session_id: &str) -> Result<bool> {
        let removed = self.local.delete_one(session_id)?;

        if let Some(remote) = &self.remote {
            if let Err(err) = remote.delete(session_id).await {
                tracing::warn!("Remote chat delete failed: {}", err);
            }
        }
        Ok(removed)
    }

    /// Delete every chat locally, mirroring to the remote best-effort
    pub async fn delete_all(&self) -> Result<()> {
        self.local.delete_all()?;

        if let Some(remote) = &self.remote {
            if let Err(err) = remote.delete_all().await {
                tracing::warn!("Remote chat wipe failed: {}", err);
            }
        }
        Ok(())
    }

    async fn mirror_to_remote(&self, remote: &dyn RemoteChatStore, chat: &ChatRecord) {
        for attempt in 1..=REMOTE_ATTEMPTS {
            match remote.add(chat).await {
                Ok(()) => {
                    tracing::debug!("Mirrored chat {} to remote", chat.session_id);
                    return;
                }
                Err(err) if !err.is_retryable() => {
                    tracing::warn!("Remote save rejected, not retrying: {}", err);
                    return;
                }
                Err(err) if attempt == REMOTE_ATTEMPTS => {
                    tracing::warn!(
                        "Remote save failed after {} attempts, chat kept locally: {}",
                        REMOTE_ATTEMPTS,
                        err
                    );
                }
                Err(err) => {
                    tracing::debug!("Remote save attempt {} failed: {}", attempt, err);
                    tokio::time::sleep(REMOTE_BACKOFF_STEP * attempt).await;
                }
            }
        }
    }
}
