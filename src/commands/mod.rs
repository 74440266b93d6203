/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `ask`     — Send a question to the assistant and print the response
- `history` — List, show, and delete saved chat sessions

Handlers are intentionally small and use the library components: the
gateway, the providers, and the chat store.
*/

pub mod ask;
pub mod history;

use crate::config::Config;
use crate::error::Result;
use crate::store::{DualWriteStore, HttpRemoteStore, LocalChatStore, RemoteChatStore};
use std::sync::Arc;

/// Build the chat store from configuration
///
/// The remote mirror is attached only when the config carries a remote
/// section; otherwise the store runs local-only.
pub fn build_store(config: &Config) -> Result<DualWriteStore> {
    let local = match &config.storage.local_path {
        Some(path) => LocalChatStore::new_with_path(std::path::Path::new(path))?,
        None => LocalChatStore::new()?,
    };

    let remote: Option<Arc<dyn RemoteChatStore>> = match &config.storage.remote {
        Some(remote_config) => {
            let store = HttpRemoteStore::new(&remote_config.api_base, &remote_config.user_id)
                .map_err(|e| {
                    crate::error::MentoraError::RemotePersistence(format!(
                        "Failed to initialize remote store: {}",
                        e
                    ))
                })?;
            Some(Arc::new(store))
        }
        None => None,
    };

    Ok(DualWriteStore::new(local, remote))
}
