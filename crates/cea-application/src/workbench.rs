//! Workbench - wires the session, upload and history stores together.

use cea_core::analysis::LatestSummary;
use cea_core::api::AnalysisApi;
use cea_core::error::Result;
use cea_core::report::ReportSink;
use cea_core::route::{RouteDecision, RouteGate, View};
use cea_core::session::{CredentialRepository, Session, SessionState};
use std::sync::Arc;

use crate::history_store::HistoryStore;
use crate::session_store::SessionStore;
use crate::upload_pipeline::UploadPipeline;

/// Entry point for a front end.
///
/// Upload results and the history cache are scoped to one session: every
/// login, logout or invalidation empties them.
pub struct Workbench {
    session: Arc<SessionStore>,
    upload: UploadPipeline,
    history: HistoryStore,
    api: Arc<dyn AnalysisApi>,
}

impl Workbench {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        api: Arc<dyn AnalysisApi>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(credentials, api.clone()));
        let upload = UploadPipeline::new(session.clone(), api.clone());
        let history = HistoryStore::new(session.clone(), api.clone(), sink);
        Self {
            session,
            upload,
            history,
            api,
        }
    }

    /// Restores the persisted session. Call once before navigating.
    pub fn start(&self) -> SessionState {
        self.session.restore()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn upload(&self) -> &UploadPipeline {
        &self.upload
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn route_gate(&self, view: View) -> RouteGate {
        self.session.route_gate(view)
    }

    /// One-shot gate decision for `view`.
    pub fn navigate(&self, view: View) -> RouteDecision {
        self.route_gate(view).current()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.session.login(email, password).await?;
        self.clear_session_data().await;
        Ok(session)
    }

    pub async fn register(&self, username: &str, password: &str, email: &str) -> Result<()> {
        self.session.register(username, password, email).await
    }

    pub async fn logout(&self) -> Result<()> {
        let result = self.session.logout();
        self.clear_session_data().await;
        result
    }

    /// Summary of the most recently uploaded dataset.
    pub async fn latest_summary(&self) -> Result<LatestSummary> {
        let session = self.session.require_session()?;
        self.api
            .latest_summary(Some(&session))
            .await
            .map_err(|e| self.session.observe_failure(e))
    }

    async fn clear_session_data(&self) {
        self.upload.clear().await;
        self.history.clear().await;
    }
}
