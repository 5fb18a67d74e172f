//! Error types for the CEA client.

use thiserror::Error;

/// A shared error type for the entire CEA client.
///
/// Remote failures are classified at the component boundary into
/// `Auth`, `Transport` and `NotFound`; purely local rejections are
/// `Validation` and `Busy` and never reach the network.
#[derive(Error, Debug, Clone)]
pub enum CeaError {
    /// Local input rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credentials rejected by the auth service, or an expired token (401)
    #[error("Authentication error{}: {}", fmt_status(.status), .message.as_deref().unwrap_or("rejected"))]
    Auth {
        status: Option<u16>,
        message: Option<String>,
    },

    /// Network or service failure on any call
    #[error("Transport error{}: {detail}", fmt_status(.status))]
    Transport {
        status: Option<u16>,
        /// Service-provided text, shown to the user verbatim when present
        message: Option<String>,
        /// Technical detail for logs
        detail: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// An operation of the same kind is still in flight
    #[error("Operation already in progress: {0}")]
    Busy(&'static str),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistent storage error (credential file, report sink)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl CeaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Auth error carrying the service text, if any
    pub fn auth(status: Option<u16>, message: Option<String>) -> Self {
        Self::Auth { status, message }
    }

    /// Creates a Transport error for a failure that produced no response
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: None,
            detail: detail.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an Auth error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Check if the service rejected the bearer credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth { status: Some(401), .. })
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Busy error
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }

    /// Short user-facing text for this error.
    ///
    /// Validation messages are shown as-is. Remote failures show the
    /// service-provided text when there is one, and `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Auth {
                message: Some(message),
                ..
            }
            | Self::Transport {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Busy(operation) => format!("{} already in progress", operation),
            _ => fallback.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CeaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CeaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CeaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CeaError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CeaError>`.
pub type Result<T> = std::result::Result<T, CeaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_service_text() {
        let err = CeaError::Transport {
            status: Some(400),
            message: Some("Missing required columns: Type".to_string()),
            detail: "HTTP 400".to_string(),
        };
        assert_eq!(
            err.user_message("Error uploading file"),
            "Missing required columns: Type"
        );
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = CeaError::transport("connection refused");
        assert_eq!(err.user_message("Login failed"), "Login failed");

        let err = CeaError::auth(Some(401), None);
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = CeaError::validation("Please select a CSV file");
        assert_eq!(err.user_message("ignored"), "Please select a CSV file");
        assert!(err.is_validation());
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(CeaError::auth(Some(401), None).is_unauthorized());
        assert!(!CeaError::auth(Some(400), None).is_unauthorized());
        assert!(CeaError::auth(Some(400), None).is_auth());
    }

    #[test]
    fn test_display_includes_status() {
        let err = CeaError::auth(Some(401), Some("Invalid credentials".to_string()));
        assert_eq!(
            err.to_string(),
            "Authentication error (401): Invalid credentials"
        );
    }
}
