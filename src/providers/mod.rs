//! Chat provider abstraction for Mentora
//!
//! This module defines the `ChatProvider` trait that model backends
//! implement, along with the inline attachment type shared across the
//! gateway and the CLI.

pub mod gemini;

pub use gemini::GeminiProvider;

use crate::error::Result;
use async_trait::async_trait;

/// Inline binary attachment for a chat prompt
///
/// Carries the payload as base64 text plus its MIME type, matching how
/// generative APIs accept inline media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAttachment {
    /// MIME type of the payload (e.g. "image/png")
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

impl InlineAttachment {
    /// Create an attachment from a MIME type and base64 payload
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Trait for generative chat providers
///
/// Implementations issue a single model request and return the final
/// response text. Failures must surface the provider's status marker
/// (e.g. "429", "NOT_FOUND") inside the error message, since the error
/// classification upstream matches on those markers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate a response for a prompt, optionally with an inline attachment
    ///
    /// Attachment requests may stream on the provider side; either way the
    /// returned value is the single final text of the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is unusable.
    async fn generate(&self, prompt: &str, attachment: Option<&InlineAttachment>)
        -> Result<String>;

    /// Whether a usable credential is configured for this provider
    fn credential_configured(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_attachment_new() {
        let attachment = InlineAttachment::new("image/png", "aGVsbG8=");
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.data, "aGVsbG8=");
    }
}
