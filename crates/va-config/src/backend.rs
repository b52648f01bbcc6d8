//! Backend connection settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Local development backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Scheme, host and port of the analysis backend. API routes live under
    /// `/api`, uploaded documents under `/static`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client-side request timeout in seconds. `0` disables it, which matches
    /// the backend's own expectation that uploads may take a while.
    #[serde(default)]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: 0,
        }
    }
}

impl BackendConfig {
    /// Base URL without a trailing slash.
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Reject base URLs that cannot address an HTTP backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.normalized_base_url();
        let host = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"));
        match host {
            Some(rest) if !rest.is_empty() => Ok(()),
            _ => Err(ConfigError::InvalidValue {
                field: "backend.base_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            }),
        }
    }
}
