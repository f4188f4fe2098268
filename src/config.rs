// ABOUTME: Environment-based configuration for the chat client (backend URL, timeouts, data dir)
// ABOUTME: Parses DOM360_* variables with defaults and validates them before use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use dom360_core::constants::defaults;
use dom360_core::errors::{ClientError, ClientResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Backend base URL variable
pub const ENV_API_URL: &str = "DOM360_API_URL";
/// Request timeout variable (seconds)
pub const ENV_REQUEST_TIMEOUT: &str = "DOM360_REQUEST_TIMEOUT_SECS";
/// Connect timeout variable (seconds)
pub const ENV_CONNECT_TIMEOUT: &str = "DOM360_CONNECT_TIMEOUT_SECS";
/// Durable storage directory variable
pub const ENV_DATA_DIR: &str = "DOM360_DATA_DIR";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// Directory for the durable key/value store
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: defaults::API_BASE_URL.to_owned(),
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS),
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join("dom360")
}

fn parse_secs(var: &str, default: u64) -> ClientResult<Duration> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ClientError::validation(format!("{var} must be a whole number of seconds"))),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

impl ClientConfig {
    /// Create a configuration for a backend URL with default timeouts
    #[must_use]
    pub fn for_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_owned(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables and defaults
    ///
    /// # Errors
    ///
    /// Returns a validation error if a variable is malformed
    pub fn from_env() -> ClientResult<Self> {
        let config = Self {
            api_base_url: env::var(ENV_API_URL)
                .unwrap_or_else(|_| defaults::API_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            request_timeout: parse_secs(ENV_REQUEST_TIMEOUT, defaults::REQUEST_TIMEOUT_SECS)?,
            connect_timeout: parse_secs(ENV_CONNECT_TIMEOUT, defaults::CONNECT_TIMEOUT_SECS)?,
            data_dir: env::var(ENV_DATA_DIR).map_or_else(|_| default_data_dir(), PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-HTTP URL or a zero timeout
    pub fn validate(&self) -> ClientResult<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ClientError::validation(format!(
                "API URL must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ClientError::validation("request timeout must be greater than 0"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ClientError::validation("connect timeout must be greater than 0"));
        }
        Ok(())
    }

    /// Absolute URL for an API path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::for_url("http://localhost:3001/");
        assert_eq!(config.api_base_url, "http://localhost:3001");
        assert!(config.validate().is_ok());

        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let config = ClientConfig::for_url("localhost:3001");
        assert!(matches!(config.validate(), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_url_join() {
        let config = ClientConfig::for_url("https://api.dom360.example");
        assert_eq!(
            config.url("/api/chat"),
            "https://api.dom360.example/api/chat"
        );
    }
}
