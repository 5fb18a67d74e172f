//! Domain layer for the CEA client.
//!
//! Holds the data model, the session state machine types, the navigation
//! gate, the result-view projection and the ports implemented by the
//! infrastructure and interaction crates.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod notice;
pub mod report;
pub mod route;
pub mod session;

pub use error::{CeaError, Result};
