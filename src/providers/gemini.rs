//! Gemini provider implementation for Mentora
//!
//! This module implements the `ChatProvider` trait against the Gemini
//! REST API (`generateContent`). Provider failures are folded into error
//! strings that keep the HTTP status and any status name from the
//! response body, because upstream classification matches on those
//! markers rather than on structured codes.

use crate::config::GeminiConfig;
use crate::error::{MentoraError, Result};
use crate::providers::{ChatProvider, InlineAttachment};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini API provider
///
/// Connects to the Gemini REST API to generate chat responses, with
/// optional inline image attachments. The `api_base` override in the
/// config allows tests to point the provider at a mock server.
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: Option<String>,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// Response body from `generateContent`
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// The API key is resolved once at construction, from the config file
    /// or the `GEMINI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("mentora/0.1.0")
            .build()
            .map_err(|e| MentoraError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = config.resolve_api_key();

        tracing::info!(
            "Initialized Gemini provider: model={}, credential_configured={}",
            config.model,
            api_key.is_some()
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// The configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn generate_url(&self, key: &str) -> String {
        let base = self
            .config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            base, self.config.model, key
        )
    }

    fn build_request(prompt: &str, attachment: Option<&InlineAttachment>) -> GenerateRequest {
        let mut parts = vec![Part {
            text: Some(prompt.to_string()),
            inline_data: None,
        }];

        if let Some(attachment) = attachment {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: attachment.mime_type.clone(),
                    data: attachment.data.clone(),
                }),
            });
        }

        GenerateRequest {
            contents: vec![Content { parts }],
        }
    }

    fn extract_text(response: GenerateResponse) -> Result<String> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(
                MentoraError::Provider("Gemini response contained no text".to_string()).into(),
            );
        }

        Ok(text)
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&InlineAttachment>,
    ) -> Result<String> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            MentoraError::Config("Gemini API key is not configured".to_string())
        })?;

        let url = self.generate_url(key);
        let request = Self::build_request(prompt, attachment);

        tracing::debug!(
            "Sending Gemini request: model={}, attachment={}",
            self.config.model,
            attachment.is_some()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                MentoraError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Gemini returned error {}: {}", status, error_text);
            // The status code stays in the message; classification matches on it
            return Err(MentoraError::Provider(format!(
                "Gemini returned error {}: {}",
                status.as_u16(),
                error_text
            ))
            .into());
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            MentoraError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        Self::extract_text(body)
    }

    fn credential_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(api_base: Option<String>) -> GeminiConfig {
        GeminiConfig {
            model: "gemini-2.5-flash".to_string(),
            api_key: Some("test-key".to_string()),
            api_base,
        }
    }

    #[test]
    fn test_gemini_provider_creation() {
        let provider = GeminiProvider::new(test_config(None));
        assert!(provider.is_ok());
        assert!(provider.unwrap().credential_configured());
    }

    #[test]
    fn test_credential_not_configured_without_key() {
        let config = GeminiConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        // Blank key plus no ambient env var means no credential
        if std::env::var("GEMINI_API_KEY").is_err() {
            let provider = GeminiProvider::new(config).unwrap();
            assert!(!provider.credential_configured());
        }
    }

    #[test]
    fn test_generate_url_uses_api_base_override() {
        let provider =
            GeminiProvider::new(test_config(Some("http://localhost:9999/".to_string()))).unwrap();
        let url = provider.generate_url("k");
        assert_eq!(
            url,
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent?key=k"
        );
    }

    #[test]
    fn test_build_request_text_only() {
        let request = GeminiProvider::build_request("hello", None);
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].parts.len(), 1);
        assert_eq!(request.contents[0].parts[0].text.as_deref(), Some("hello"));
        assert!(request.contents[0].parts[0].inline_data.is_none());
    }

    #[test]
    fn test_build_request_with_attachment() {
        let attachment = InlineAttachment::new("image/png", "aGVsbG8=");
        let request = GeminiProvider::build_request("what is this?", Some(&attachment));
        assert_eq!(request.contents[0].parts.len(), 2);
        let inline = request.contents[0].parts[1].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "aGVsbG8=");
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let attachment = InlineAttachment::new("image/jpeg", "data");
        let request = GeminiProvider::build_request("p", Some(&attachment));
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"inlineData\""));
        assert!(json.contains("\"mimeType\":\"image/jpeg\""));
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello, "},{"text":"world"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(GeminiProvider::extract_text(response).unwrap(), "Hello, world");
    }

    #[test]
    fn test_extract_text_empty_response_is_error() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(GeminiProvider::extract_text(response).is_err());
    }
}
