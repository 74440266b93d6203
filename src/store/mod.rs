//! Chat persistence for Mentora
//!
//! Chats are written to a local sled cache first (durable, always
//! succeeds or the operation fails) and mirrored to an optional remote
//! store on a best-effort basis. Reads prefer the remote copy and fall
//! back to the local cache.

pub mod dual;
pub mod local;
pub mod remote;

pub use dual::DualWriteStore;
pub use local::LocalChatStore;
pub use remote::{HttpRemoteStore, RemoteChatStore, RemoteErrorKind, RemoteStoreError};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A single message within a chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Millisecond epoch timestamp, unique enough within one session
    pub id: i64,
    pub sender: Sender,
    pub text: String,
    /// Base64 data URL of an attached image, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// RFC 3339 creation time
    pub timestamp: String,
}

impl ChatMessage {
    /// Create a message stamped with the current time
    pub fn new(sender: Sender, text: impl Into<String>, image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            sender,
            text: text.into(),
            image,
            timestamp: now.to_rfc3339(),
        }
    }
}

/// A chat session: an ordered message transcript plus bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Stable session identifier (ULID)
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    /// RFC 3339 time of the last update; list views sort on this
    pub timestamp: String,
}

impl ChatRecord {
    /// Start a new session with a fresh ULID
    pub fn new() -> Self {
        Self {
            session_id: ulid::Ulid::new().to_string(),
            messages: Vec::new(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Append a message and bump the session timestamp
    pub fn push(&mut self, message: ChatMessage) {
        self.timestamp = Utc::now().to_rfc3339();
        self.messages.push(message);
    }

    /// First user message text, shortened for list views
    pub fn preview(&self, max_len: usize) -> String {
        let text = self
            .messages
            .iter()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.text.as_str())
            .unwrap_or("(empty)");
        if text.chars().count() > max_len {
            let truncated: String = text.chars().take(max_len).collect();
            format!("{}...", truncated)
        } else {
            text.to_string()
        }
    }
}

impl Default for ChatRecord {
    fn default() -> Self {
        Self::new()
    }
}
