//! Chat gateway: the single entry point for model requests
//!
//! The gateway owns request pacing (via [`RateLimiter`] and
//! [`RetryPolicy`]) and the translation of raw provider failures into
//! the user-facing error taxonomy. It performs no persistence; callers
//! save results through the chat store.

pub mod classify;
pub mod rate_limit;
pub mod retry;

pub use classify::{classify_provider_error, ProviderErrorKind};
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;

use crate::config::RetryConfig;
use crate::error::{MentoraError, Result};
use crate::providers::{ChatProvider, InlineAttachment};
use std::sync::Arc;
use std::time::Duration;

/// Single entry point for "ask the model" operations
///
/// Wraps a provider with the shared rate limiter and retry policy, and
/// maps provider error text into typed errors the UI layer can display.
pub struct ChatGateway {
    provider: Arc<dyn ChatProvider>,
    retry: RetryPolicy,
}

impl ChatGateway {
    /// Build a gateway from a provider and retry configuration
    ///
    /// One gateway (and therefore one rate limiter) should exist per
    /// provider endpoint so request spacing is enforced process-wide.
    pub fn new(provider: Arc<dyn ChatProvider>, retry_config: &RetryConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            retry_config.min_request_interval_ms,
        )));
        let retry = RetryPolicy::new(
            limiter,
            retry_config.max_retries,
            Duration::from_millis(retry_config.initial_delay_ms),
            Duration::from_millis(retry_config.max_delay_ms),
        );
        Self { provider, retry }
    }

    /// Build a gateway around an existing retry policy
    ///
    /// Used by tests that need control over the policy's timing.
    pub fn with_retry_policy(provider: Arc<dyn ChatProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Send a message to the model and return the response text
    ///
    /// # Errors
    ///
    /// Returns `MentoraError::Config` when no provider credential is
    /// configured, `MentoraError::RateLimitExceeded` when retries are
    /// exhausted, and the other taxonomy variants for non-retryable
    /// provider failures.
    pub async fn send(
        &self,
        message: &str,
        attachment: Option<InlineAttachment>,
    ) -> Result<String> {
        if !self.provider.credential_configured() {
            return Err(MentoraError::Config(
                "API key is not configured. Please check your environment variables.".to_string(),
            )
            .into());
        }

        let result = self
            .retry
            .execute(|| self.provider.generate(message, attachment.as_ref()))
            .await;

        result.map_err(map_provider_error)
    }
}

/// Map a raw provider failure into the user-facing error taxonomy
///
/// Errors already typed by the retry layer (rate-limit exhaustion) or by
/// configuration checks pass through unchanged; everything else is
/// classified from the message text.
fn map_provider_error(err: anyhow::Error) -> anyhow::Error {
    if let Some(known) = err.downcast_ref::<MentoraError>() {
        match known {
            MentoraError::RateLimitExceeded(_) | MentoraError::Config(_) => return err,
            _ => {}
        }
    }

    let message = err.to_string();
    let mapped = match classify_provider_error(&message) {
        ProviderErrorKind::NotFound => MentoraError::NotFound(
            "Unable to connect to the model API. Please check your API key and try again."
                .to_string(),
        ),
        ProviderErrorKind::InvalidArgument => MentoraError::InvalidArgument(
            "Invalid request. Please check your input and try again.".to_string(),
        ),
        ProviderErrorKind::PermissionDenied => MentoraError::PermissionDenied(
            "Access denied. Please check your API key permissions.".to_string(),
        ),
        ProviderErrorKind::PayloadTooLarge => MentoraError::PayloadTooLarge(
            "Attachment exceeds the size limit. Please try a smaller file.".to_string(),
        ),
        ProviderErrorKind::BadRequest => MentoraError::BadRequest(
            "Bad request. Please check your input format and API configuration.".to_string(),
        ),
        ProviderErrorKind::RateLimited => MentoraError::RateLimitExceeded(
            "API rate limit reached. Please try again later.".to_string(),
        ),
        ProviderErrorKind::Unknown => {
            MentoraError::Provider(format!("API request failed: {}", message))
        }
    };

    mapped.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FakeProvider {
        configured: bool,
        responses: Vec<Result<String>>,
        calls: AtomicU32,
    }

    impl FakeProvider {
        fn failing_with(message: &str) -> Self {
            Self {
                configured: true,
                responses: Vec::new(),
                calls: AtomicU32::new(0),
            }
            .with_error(message)
        }

        fn with_error(mut self, message: &str) -> Self {
            self.responses
                .push(Err(MentoraError::Provider(message.to_string()).into()));
            self
        }
    }

    #[async_trait]
    impl ChatProvider for FakeProvider {
        async fn generate(
            &self,
            _prompt: &str,
            _attachment: Option<&InlineAttachment>,
        ) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            match self.responses.get(n.min(self.responses.len().saturating_sub(1))) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(err)) => Err(anyhow::anyhow!("{}", err)),
                None => Ok("ok".to_string()),
            }
        }

        fn credential_configured(&self) -> bool {
            self.configured
        }
    }

    fn gateway_with(provider: FakeProvider) -> ChatGateway {
        let config = RetryConfig {
            max_retries: 0,
            initial_delay_ms: 1,
            max_delay_ms: 1,
            min_request_interval_ms: 1,
        };
        ChatGateway::new(Arc::new(provider), &config)
    }

    #[tokio::test]
    async fn test_send_without_credential_is_configuration_error() {
        let provider = FakeProvider {
            configured: false,
            responses: Vec::new(),
            calls: AtomicU32::new(0),
        };
        let gateway = gateway_with(provider);

        let err = gateway.send("hi", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MentoraError>(),
            Some(MentoraError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_send_returns_provider_text() {
        let provider = FakeProvider {
            configured: true,
            responses: vec![Ok("the answer".to_string())],
            calls: AtomicU32::new(0),
        };
        let gateway = gateway_with(provider);

        let text = gateway.send("question", None).await.unwrap();
        assert_eq!(text, "the answer");
    }

    #[tokio::test]
    async fn test_send_maps_not_found() {
        let gateway = gateway_with(FakeProvider::failing_with("NOT_FOUND: no such model"));
        let err = gateway.send("hi", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MentoraError>(),
            Some(MentoraError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_send_maps_permission_denied() {
        let gateway = gateway_with(FakeProvider::failing_with("PERMISSION_DENIED"));
        let err = gateway.send("hi", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MentoraError>(),
            Some(MentoraError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_send_maps_bad_request() {
        let gateway = gateway_with(FakeProvider::failing_with("Gemini returned error 400: nope"));
        let err = gateway.send("hi", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MentoraError>(),
            Some(MentoraError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_send_maps_payload_too_large() {
        let gateway = gateway_with(FakeProvider::failing_with("DOCUMENT_TOO_LARGE"));
        let err = gateway.send("hi", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MentoraError>(),
            Some(MentoraError::PayloadTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_send_wraps_unknown_errors() {
        let gateway = gateway_with(FakeProvider::failing_with("connection reset"));
        let err = gateway.send("hi", None).await.unwrap_err();
        let err = err.downcast_ref::<MentoraError>().unwrap();
        assert!(matches!(err, MentoraError::Provider(_)));
        assert!(err.to_string().contains("API request failed"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_send_exhausted_rate_limit_is_rate_limit_exceeded() {
        let gateway = gateway_with(FakeProvider::failing_with("Gemini returned error 429: quota"));
        let err = gateway.send("hi", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MentoraError>(),
            Some(MentoraError::RateLimitExceeded(_))
        ));
    }
}
