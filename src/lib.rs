/*!
Mentora: an AI learning assistant for your terminal

Mentora sends questions (optionally with image attachments) to a
generative model behind a resilient gateway, and keeps chat history in a
durable local cache mirrored best-effort to an optional remote store.

The crate is organized as:

- `gateway`   — Rate limiting, retry with backoff, and error taxonomy
- `providers` — The `ChatProvider` trait and the Gemini implementation
- `store`     — Local, remote, and dual-write chat persistence
- `config`    — YAML configuration with serde defaults
- `commands`  — CLI command handlers
*/

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod store;

pub use config::Config;
pub use error::{MentoraError, Result};
pub use gateway::{ChatGateway, RateLimiter, RetryPolicy};
pub use providers::{ChatProvider, GeminiProvider, InlineAttachment};
pub use store::{ChatMessage, ChatRecord, DualWriteStore, LocalChatStore};
