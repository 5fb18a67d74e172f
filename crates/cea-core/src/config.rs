//! Client configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CeaError, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 120;

/// Settings read from `config.toml`.
///
/// ```toml
/// api_base_url = "http://localhost:8000/api"
/// request_timeout_secs = 30
/// report_timeout_secs = 120
/// download_dir = "/home/me/Downloads"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub report_timeout_secs: u64,
    /// Where exported reports are written; platform download dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            report_timeout_secs: DEFAULT_REPORT_TIMEOUT_SECS,
            download_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Rejects settings that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CeaError::config(format!(
                "api_base_url must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        if self.request_timeout_secs == 0 || self.report_timeout_secs == 0 {
            return Err(CeaError::config("timeouts must be greater than zero"));
        }
        Ok(())
    }
}
