//! Configuration management for Mentora
//!
//! This module handles loading, parsing, and validating configuration
//! from files and environment variables.

use crate::error::{MentoraError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Mentora
///
/// This structure holds all configuration needed by the CLI,
/// including provider settings, retry behavior, and storage locations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Retry and rate-limit configuration for model calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Chat persistence configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API key; falls back to the `GEMINI_API_KEY` environment variable
    /// when not set in the file
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional API base URL (useful for tests and local mocks)
    ///
    /// When set, this base is used to build the generate endpoint
    /// (`/v1beta/models/{model}:generateContent`), which allows tests to
    /// point the provider at a mock server.
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_key: None,
            api_base: None,
        }
    }
}

impl GeminiConfig {
    /// Resolve the API key from config or environment
    ///
    /// The config file takes precedence; `GEMINI_API_KEY` is the fallback.
    /// Blank values count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Retry and rate-limit configuration for outbound model calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after a rate-limited attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Backoff delay cap in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Minimum spacing between consecutive provider requests in milliseconds
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    2_000
}

fn default_max_delay_ms() -> u64 {
    32_000
}

fn default_min_request_interval_ms() -> u64 {
    1_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            min_request_interval_ms: default_min_request_interval_ms(),
        }
    }
}

/// Chat persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Path to the local chat cache database; defaults to the user data dir
    #[serde(default)]
    pub local_path: Option<String>,

    /// Remote store settings; when absent, chats are local-only
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

/// Remote chat store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote chat store API
    pub api_base: String,

    /// User identifier scoping the remote chat collection
    pub user_id: String,
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// A missing file is not an error: defaults are used so the CLI works
    /// out of the box with just `GEMINI_API_KEY` set.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns `MentoraError::Config` if the file exists but cannot be
    /// read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            MentoraError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Config = serde_yaml::from_str(&contents).map_err(|e| {
            MentoraError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `MentoraError::Config` if a value cannot be used: unknown
    /// provider type, zero request interval, or a delay cap below the
    /// initial delay.
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type != "gemini" {
            return Err(MentoraError::Config(format!(
                "Unknown provider type: {}",
                self.provider.provider_type
            ))
            .into());
        }

        if self.retry.min_request_interval_ms == 0 {
            return Err(
                MentoraError::Config("min_request_interval_ms must be positive".to_string())
                    .into(),
            );
        }

        if self.retry.initial_delay_ms == 0 {
            return Err(
                MentoraError::Config("initial_delay_ms must be positive".to_string()).into(),
            );
        }

        if self.retry.max_delay_ms < self.retry.initial_delay_ms {
            return Err(MentoraError::Config(
                "max_delay_ms must be at least initial_delay_ms".to_string(),
            )
            .into());
        }

        if let Some(remote) = &self.storage.remote {
            if remote.api_base.trim().is_empty() {
                return Err(
                    MentoraError::Config("remote api_base must not be empty".to_string()).into(),
                );
            }
            if remote.user_id.trim().is_empty() {
                return Err(
                    MentoraError::Config("remote user_id must not be empty".to_string()).into(),
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.provider.provider_type, "gemini");
        assert_eq!(config.provider.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_delay_ms, 2_000);
        assert_eq!(config.retry.max_delay_ms, 32_000);
        assert_eq!(config.retry.min_request_interval_ms, 1_000);
        assert!(config.storage.local_path.is_none());
        assert!(config.storage.remote.is_none());
    }

    #[test]
    fn test_config_load_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/config.yaml").unwrap();
        assert_eq!(config.retry.max_retries, 5);
    }

    #[test]
    fn test_config_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
provider:
  type: gemini
  gemini:
    model: gemini-2.5-pro
retry:
  max_retries: 3
  initial_delay_ms: 500
storage:
  remote:
    api_base: https://chats.example.com
    user_id: user-1
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.provider.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.initial_delay_ms, 500);
        // Unspecified fields keep their defaults
        assert_eq!(config.retry.max_delay_ms, 32_000);
        let remote = config.storage.remote.unwrap();
        assert_eq!(remote.api_base, "https://chats.example.com");
        assert_eq!(remote.user_id, "user-1");
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "provider: [not: a map").unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.provider.provider_type = "copilot".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.retry.min_request_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_cap_below_initial_delay() {
        let mut config = Config::default();
        config.retry.initial_delay_ms = 4_000;
        config.retry.max_delay_ms = 2_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_remote_fields() {
        let mut config = Config::default();
        config.storage.remote = Some(RemoteConfig {
            api_base: "  ".to_string(),
            user_id: "user-1".to_string(),
        });
        assert!(config.validate().is_err());

        config.storage.remote = Some(RemoteConfig {
            api_base: "https://chats.example.com".to_string(),
            user_id: "".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_api_key_prefers_config_value() {
        let gemini = GeminiConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(gemini.resolve_api_key(), Some("from-config".to_string()));
    }

    #[test]
    fn test_resolve_api_key_blank_counts_as_unset() {
        let gemini = GeminiConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        // Falls through to the environment; may be None or the ambient value,
        // but never the blank config string.
        assert_ne!(gemini.resolve_api_key(), Some("   ".to_string()));
    }
}
