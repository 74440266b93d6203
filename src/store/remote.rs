//! Remote chat store interface and HTTP implementation
//!
//! The remote side is best-effort: callers treat its failures as
//! survivable and rely on the local cache. Errors carry a coarse kind so
//! the dual-write layer can tell a transient outage (worth retrying)
//! from a denial that will never succeed.

use crate::store::ChatRecord;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Coarse classification of a remote store failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Authenticated but not allowed; retrying cannot help
    PermissionDenied,
    /// Target resource or collection missing; retrying cannot help
    NotFound,
    /// Transient outage or throttling; the only kind worth retrying
    Unavailable,
    /// Anything else; aborts without retry
    Other,
}

/// Error from a remote chat store operation
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RemoteStoreError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteStoreError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the dual-write layer should retry this failure
    ///
    /// Only transient outages qualify; denials, missing collections, and
    /// unclassified failures abort immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, RemoteErrorKind::Unavailable)
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteStoreError>;

/// Remote persistence backend for chats
///
/// All operations are scoped to the user configured on the
/// implementation; session ids are the only addressing callers see.
#[async_trait]
pub trait RemoteChatStore: Send + Sync {
    /// Create or overwrite one chat
    async fn add(&self, chat: &ChatRecord) -> RemoteResult<()>;

    /// List every chat, newest first
    async fn list(&self) -> RemoteResult<Vec<ChatRecord>>;

    /// Delete one chat by session id
    async fn delete(&self, session_id: &str) -> RemoteResult<()>;

    /// Delete every chat for the user
    async fn delete_all(&self) -> RemoteResult<()>;
}

/// Remote chat store over a REST API
///
/// Chats live under `/users/{user_id}/chats`, one document per session.
pub struct HttpRemoteStore {
    client: Client,
    api_base: String,
    user_id: String,
}

impl HttpRemoteStore {
    /// Create a store for the given endpoint and user
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(api_base: &str, user_id: &str) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("mentora/0.1.0")
            .build()
            .map_err(|e| {
                RemoteStoreError::new(
                    RemoteErrorKind::Other,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        })
    }

    fn chats_url(&self) -> String {
        format!("{}/users/{}/chats", self.api_base, self.user_id)
    }

    fn chat_url(&self, session_id: &str) -> String {
        format!("{}/{}", self.chats_url(), session_id)
    }

    fn classify_status(status: StatusCode) -> RemoteErrorKind {
        match status {
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => RemoteErrorKind::PermissionDenied,
            StatusCode::NOT_FOUND => RemoteErrorKind::NotFound,
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                RemoteErrorKind::Unavailable
            }
            s if s.is_server_error() => RemoteErrorKind::Unavailable,
            _ => RemoteErrorKind::Other,
        }
    }

    fn status_error(operation: &str, status: StatusCode, body: String) -> RemoteStoreError {
        RemoteStoreError::new(
            Self::classify_status(status),
            format!("{} failed with {}: {}", operation, status.as_u16(), body),
        )
    }

    fn transport_error(operation: &str, err: reqwest::Error) -> RemoteStoreError {
        // Connection-level failures count as outages
        RemoteStoreError::new(
            RemoteErrorKind::Unavailable,
            format!("{} failed: {}", operation, err),
        )
    }
}

#[async_trait]
impl RemoteChatStore for HttpRemoteStore {
    async fn add(&self, chat: &ChatRecord) -> RemoteResult<()> {
        let response = self
            .client
            .put(self.chat_url(&chat.session_id))
            .json(chat)
            .send()
            .await
            .map_err(|e| Self::transport_error("remote save", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error("remote save", status, body));
        }
        Ok(())
    }

    async fn list(&self) -> RemoteResult<Vec<ChatRecord>> {
        let response = self
            .client
            .get(self.chats_url())
            .send()
            .await
            .map_err(|e| Self::transport_error("remote list", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error("remote list", status, body));
        }

        let mut chats: Vec<ChatRecord> = response.json().await.map_err(|e| {
            RemoteStoreError::new(
                RemoteErrorKind::Other,
                format!("remote list returned invalid body: {}", e),
            )
        })?;

        // Newest first, regardless of server ordering
        chats.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(chats)
    }

    async fn delete(&self, session_id: &str) -> RemoteResult<()> {
        let response = self
            .client
            .delete(self.chat_url(session_id))
            .send()
            .await
            .map_err(|e| Self::transport_error("remote delete", e))?;

        let status = response.status();
        // Deleting something already gone is fine
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error("remote delete", status, body));
        }
        Ok(())
    }

    async fn delete_all(&self) -> RemoteResult<()> {
        let chats = self.list().await?;
        let deletes = chats
            .iter()
            .map(|chat| self.delete(&chat.session_id));
        let results = futures::future::join_all(deletes).await;
        for result in results {
            result?;
        }
        Ok(())
    }
}
