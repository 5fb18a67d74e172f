//! TOML-backed credential repository.

use cea_core::error::Result;
use cea_core::session::{CredentialRepository, Session};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths::CeaPaths;
use crate::storage::AtomicTomlFile;

/// On-disk shape of `session.toml`.
///
/// Field names are the persisted keys (`access_token`, `username`).
#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// Stores the session pair in a single owner-only TOML file.
///
/// Both keys live in one file, so a save or a clear always affects them
/// together.
pub struct TomlCredentialRepository {
    file: AtomicTomlFile<CredentialFile>,
}

impl TomlCredentialRepository {
    /// Creates a repository at the default `session.toml` location.
    pub fn new(paths: &CeaPaths) -> Result<Self> {
        let path = paths
            .session_file()
            .map_err(|e| cea_core::CeaError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path).private(),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl CredentialRepository for TomlCredentialRepository {
    fn load(&self) -> Result<Option<Session>> {
        let Some(stored) = self.file.load()? else {
            return Ok(None);
        };

        match (stored.access_token, stored.username) {
            (Some(token), Some(username)) if !token.is_empty() && !username.is_empty() => {
                Ok(Some(Session { username, token }))
            }
            _ => {
                tracing::warn!(
                    "[Credentials] Ignoring incomplete session file at {}",
                    self.file.path().display()
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        self.file.save(&CredentialFile {
            access_token: Some(session.token.clone()),
            username: Some(session.username.clone()),
        })?;
        tracing::debug!("[Credentials] Saved session for {}", session.username);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.file.remove()?;
        tracing::debug!("[Credentials] Cleared persisted session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cea_core::session::{ACCESS_TOKEN_KEY, USERNAME_KEY};
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlCredentialRepository::with_path(temp_dir.path().join("session.toml"));
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlCredentialRepository::with_path(temp_dir.path().join("session.toml"));

        repo.save(&Session::new("alice", "jwt-token")).unwrap();

        let restored = repo.load().unwrap().expect("session should be restored");
        assert_eq!(restored.username, "alice");
        assert_eq!(restored.token, "jwt-token");
    }

    #[test]
    fn test_file_uses_fixed_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.toml");
        let repo = TomlCredentialRepository::with_path(path.clone());
        repo.save(&Session::new("alice", "jwt-token")).unwrap();

        let raw: toml::Table = toml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.get(ACCESS_TOKEN_KEY).and_then(|v| v.as_str()), Some("jwt-token"));
        assert_eq!(raw.get(USERNAME_KEY).and_then(|v| v.as_str()), Some("alice"));
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.toml");
        let repo = TomlCredentialRepository::with_path(path.clone());
        repo.save(&Session::new("alice", "jwt-token")).unwrap();

        repo.clear().unwrap();

        assert!(!path.exists());
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_half_written_pair_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.toml");
        std::fs::write(&path, "access_token = \"jwt-token\"\n").unwrap();
        let repo = TomlCredentialRepository::with_path(path.clone());
        assert!(repo.load().unwrap().is_none());

        std::fs::write(&path, "access_token = \"\"\nusername = \"alice\"\n").unwrap();
        assert!(repo.load().unwrap().is_none());
    }
}
