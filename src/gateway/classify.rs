//! Provider error classification
//!
//! The chat provider does not expose structured error codes; failures come
//! back as message strings with embedded status markers ("429", "NOT_FOUND",
//! "PERMISSION_DENIED"). This module isolates the substring matching behind
//! one function so the brittle part has a single seam and can be tested in
//! isolation.

/// Classified kind of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Transient rate-limit rejection; the only retryable kind
    RateLimited,
    /// Bad endpoint or API key
    NotFound,
    /// Malformed input
    InvalidArgument,
    /// Credential lacks access
    PermissionDenied,
    /// Payload (usually an attachment) exceeds provider limits
    PayloadTooLarge,
    /// Generic malformed request
    BadRequest,
    /// Anything else; the original message is preserved by the caller
    Unknown,
}

impl ProviderErrorKind {
    /// Whether failures of this kind are worth retrying after a delay
    pub fn is_transient(self) -> bool {
        matches!(self, ProviderErrorKind::RateLimited)
    }
}

/// Classify a provider error message into an error kind
///
/// Matching is case-insensitive substring search. Rate-limit markers are
/// checked first since they decide retry behavior; "400" is checked last
/// among the status codes so it does not shadow more specific markers.
pub fn classify_provider_error(message: &str) -> ProviderErrorKind {
    let haystack = message.to_ascii_lowercase();

    if haystack.contains("429") || haystack.contains("resource_exhausted") {
        return ProviderErrorKind::RateLimited;
    }
    if haystack.contains("not_found") || haystack.contains("404") {
        return ProviderErrorKind::NotFound;
    }
    if haystack.contains("invalid_argument") {
        return ProviderErrorKind::InvalidArgument;
    }
    if haystack.contains("permission_denied") || haystack.contains("403") {
        return ProviderErrorKind::PermissionDenied;
    }
    if haystack.contains("document_too_large") || haystack.contains("payload too large") {
        return ProviderErrorKind::PayloadTooLarge;
    }
    if haystack.contains("400") {
        return ProviderErrorKind::BadRequest;
    }

    ProviderErrorKind::Unknown
}
