//! Credential repository trait.

use super::model::Session;
use crate::error::Result;

/// Persisted key holding the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Persisted key holding the username.
pub const USERNAME_KEY: &str = "username";

/// Persistence port for the session credential.
///
/// The pair is stored under [`ACCESS_TOKEN_KEY`] and [`USERNAME_KEY`] and is
/// written and cleared as a unit. Reads are synchronous so that the initial
/// restore can settle before anything is rendered.
pub trait CredentialRepository: Send + Sync {
    /// Returns the stored session if both keys are present and non-empty.
    fn load(&self) -> Result<Option<Session>>;

    fn save(&self, session: &Session) -> Result<()>;

    /// Removes both keys. Clearing an absent credential is not an error.
    fn clear(&self) -> Result<()>;
}
