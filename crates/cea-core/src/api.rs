//! Port to the remote analysis service.
//!
//! Every call takes the current session explicitly; implementations attach
//! the bearer credential themselves instead of relying on shared client
//! defaults.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::{DatasetSummary, LatestSummary, UploadFile, UploadResult};
use crate::error::Result;
use crate::session::Session;

/// Body of `POST /login/`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /register/`. An empty `username` lets the service derive one.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Successful response of `POST /login/`.
#[derive(Clone, Default, Deserialize)]
pub struct LoginGrant {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
}

impl fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginGrant")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Binary report as returned by the service.
#[derive(Clone, PartialEq, Eq)]
pub struct ReportPayload {
    pub bytes: Vec<u8>,
    /// File extension without the dot, derived from the response type
    pub extension: String,
}

impl fmt::Debug for ReportPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportPayload")
            .field("bytes", &self.bytes.len())
            .field("extension", &self.extension)
            .finish()
    }
}

/// Remote analysis service.
///
/// Failures are already classified: rejected credentials and 401s are
/// `Auth`, a missing dataset is `NotFound`, everything else is `Transport`.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn login(&self, session: Option<&Session>, credentials: &Credentials)
    -> Result<LoginGrant>;

    async fn register(&self, session: Option<&Session>, registration: &Registration)
    -> Result<()>;

    async fn upload(&self, session: Option<&Session>, file: &UploadFile) -> Result<UploadResult>;

    /// Most recent datasets first, at most five.
    async fn history(&self, session: Option<&Session>) -> Result<Vec<DatasetSummary>>;

    async fn latest_summary(&self, session: Option<&Session>) -> Result<LatestSummary>;

    async fn report(&self, session: Option<&Session>, dataset_id: &str) -> Result<ReportPayload>;
}
