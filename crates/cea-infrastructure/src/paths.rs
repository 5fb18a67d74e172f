//! Unified path management for CEA files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/cea/               # Config directory (or $CEA_HOME)
//! ├── config.toml              # Client configuration
//! ├── session.toml             # Persisted access_token + username
//! └── logs/                    # Application logs
//!     └── cea.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory.
pub const CEA_HOME_ENV: &str = "CEA_HOME";

const APP_DIR_NAME: &str = "cea";

/// Errors that can occur during path resolution.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Platform config directory could not be determined.
    #[error("Cannot find config directory")]
    ConfigDirNotFound,
}

/// Path resolver rooted either at an explicit base or at the platform default.
#[derive(Debug, Clone)]
pub struct CeaPaths {
    base: Option<PathBuf>,
}

impl CeaPaths {
    /// Creates a resolver.
    ///
    /// `base` takes precedence over `$CEA_HOME`, which takes precedence over
    /// `dirs::config_dir()/cea`.
    pub fn new(base: Option<&Path>) -> Self {
        let base = base
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CEA_HOME_ENV).map(PathBuf::from));
        Self { base }
    }

    /// Returns the CEA configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// File holding the persisted session credential.
    ///
    /// Contains a bearer token; the repository writes it with mode 600 on Unix.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Default destination for exported reports.
    ///
    /// Falls back to the current directory when the platform has no
    /// download directory.
    pub fn default_download_dir(&self) -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for CeaPaths {
    fn default() -> Self {
        Self::new(None)
    }
}
