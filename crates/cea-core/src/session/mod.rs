//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: `Session` credential and the `SessionState` machine
//! - `repository`: persistence port for the `(token, username)` pair

mod model;
mod repository;

pub use model::{Session, SessionState};
pub use repository::{ACCESS_TOKEN_KEY, CredentialRepository, USERNAME_KEY};
