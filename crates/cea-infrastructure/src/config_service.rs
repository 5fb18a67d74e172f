//! Configuration service.
//!
//! Loads [`ClientConfig`] from `config.toml` in the config directory and
//! applies environment overrides on top.

use cea_core::config::ClientConfig;
use cea_core::error::{CeaError, Result};
use std::path::PathBuf;

use crate::paths::CeaPaths;
use crate::storage::AtomicTomlFile;

/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "CEA_API_URL";

#[derive(Debug, Clone)]
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    pub fn new(paths: &CeaPaths) -> Result<Self> {
        let config_path = paths
            .config_file()
            .map_err(|e| CeaError::config(e.to_string()))?;
        Ok(Self { config_path })
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Loads the configuration using the process environment for overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Loads the configuration with an explicit environment lookup.
    ///
    /// A missing or empty file yields the defaults.
    pub fn load_with_env<F>(&self, env: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = AtomicTomlFile::<ClientConfig>::new(self.config_path.clone());
        let mut config = match file.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::debug!(
                    "[Config] No config at {}, using defaults",
                    self.config_path.display()
                );
                ClientConfig::default()
            }
            Err(e) => {
                return Err(CeaError::config(format!(
                    "Failed to load {}: {}",
                    self.config_path.display(),
                    e
                )));
            }
        };

        if let Some(url) = env(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            tracing::debug!("[Config] {} overrides api_base_url", API_URL_ENV);
            config.api_base_url = url;
        }

        config.validate()?;
        Ok(config)
    }
}
