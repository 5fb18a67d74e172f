//! Dataset history and report export.
//!
//! Loading is soft: a failed fetch is logged and shows as an empty list.
//! Exporting is loud: a failure leaves a blocking notice for the user.

use cea_core::analysis::DatasetSummary;
use cea_core::api::AnalysisApi;
use cea_core::error::{CeaError, Result};
use cea_core::notice::Notice;
use cea_core::report::{ReportArtifact, ReportSink, report_file_name};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::session_store::SessionStore;
use crate::session_watch::SessionWatch;

/// Blocking notice raised by a failed export.
pub const EXPORT_FAILED: &str = "Failed to generate PDF";

struct HistoryState {
    active: bool,
    loading: bool,
    datasets: Vec<DatasetSummary>,
    selected: Option<String>,
    exporting: HashSet<String>,
    notice: Option<Notice>,
    watch: SessionWatch,
}

impl HistoryState {
    fn sync_session(&mut self) {
        if self.watch.transitioned() {
            self.active = false;
            self.datasets.clear();
            self.selected = None;
            self.notice = None;
        }
    }
}

pub struct HistoryStore {
    session: Arc<SessionStore>,
    api: Arc<dyn AnalysisApi>,
    sink: Arc<dyn ReportSink>,
    state: Mutex<HistoryState>,
}

impl HistoryStore {
    pub fn new(
        session: Arc<SessionStore>,
        api: Arc<dyn AnalysisApi>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let watch = SessionWatch::new(session.subscribe());
        Self {
            session,
            api,
            sink,
            state: Mutex::new(HistoryState {
                active: false,
                loading: false,
                datasets: Vec::new(),
                selected: None,
                exporting: HashSet::new(),
                notice: None,
                watch,
            }),
        }
    }

    /// Opens the history view; fetches only on the first activation.
    pub async fn activate(&self) -> Vec<DatasetSummary> {
        {
            let mut state = self.state.lock().await;
            state.sync_session();
            if state.active {
                return state.datasets.clone();
            }
            state.active = true;
        }
        self.load().await
    }

    /// Closes the view and drops the cached list.
    pub async fn deactivate(&self) {
        let mut state = self.state.lock().await;
        state.active = false;
        state.datasets.clear();
        state.selected = None;
    }

    /// Re-fetches within the current activation.
    pub async fn refresh(&self) -> Vec<DatasetSummary> {
        self.load().await
    }

    /// Fetches the list, keeping the service order and count.
    ///
    /// Never fails: any error is logged and yields an empty list. A load
    /// issued while another is running returns the current list.
    pub async fn load(&self) -> Vec<DatasetSummary> {
        let session = {
            let mut state = self.state.lock().await;
            state.sync_session();
            if state.loading {
                return state.datasets.clone();
            }
            let Some(session) = self.session.session() else {
                state.datasets.clear();
                return Vec::new();
            };
            state.loading = true;
            session
        };

        let outcome = self.api.history(Some(&session)).await;
        let outcome = outcome.map_err(|e| self.session.observe_failure(e));

        let mut state = self.state.lock().await;
        state.loading = false;
        state.sync_session();
        match outcome {
            Ok(datasets) if self.session.session().as_ref() == Some(&session) => {
                tracing::info!("[History] Loaded {} datasets", datasets.len());
                state.datasets = datasets;
            }
            Ok(_) => {
                tracing::debug!("[History] Discarding list fetched for an ended session");
                state.datasets.clear();
            }
            Err(e) => {
                tracing::error!("[History] Failed to load history: {}", e);
                state.datasets.clear();
            }
        }
        if let Some(id) = state.selected.clone() {
            if !state.datasets.iter().any(|d| d.id == id) {
                state.selected = None;
            }
        }
        state.datasets.clone()
    }

    pub async fn datasets(&self) -> Vec<DatasetSummary> {
        let mut state = self.state.lock().await;
        state.sync_session();
        state.datasets.clone()
    }

    /// Marks a listed dataset as inspected.
    pub async fn select(&self, dataset_id: &str) -> Result<DatasetSummary> {
        let mut state = self.state.lock().await;
        state.sync_session();
        let dataset = state
            .datasets
            .iter()
            .find(|d| d.id == dataset_id)
            .cloned()
            .ok_or_else(|| CeaError::not_found("dataset", dataset_id))?;
        state.selected = Some(dataset.id.clone());
        Ok(dataset)
    }

    pub async fn deselect(&self) {
        self.state.lock().await.selected = None;
    }

    pub async fn selected(&self) -> Option<DatasetSummary> {
        let mut state = self.state.lock().await;
        state.sync_session();
        let id = state.selected.as_ref()?;
        state.datasets.iter().find(|d| &d.id == id).cloned()
    }

    /// Downloads the report for `dataset_id` and saves it as
    /// `equipment_report_<id>.<ext>`.
    ///
    /// On failure a blocking notice is left for [`take_notice`](Self::take_notice)
    /// and the list is untouched.
    pub async fn export_report(&self, dataset_id: &str) -> Result<ReportArtifact> {
        let session = {
            let mut state = self.state.lock().await;
            state.sync_session();
            let session = self.session.require_session()?;
            if !state.exporting.insert(dataset_id.to_string()) {
                return Err(CeaError::Busy("export"));
            }
            session
        };

        let outcome = self.download(&session, dataset_id).await;

        let mut state = self.state.lock().await;
        state.exporting.remove(dataset_id);
        state.sync_session();
        match outcome {
            Ok(artifact) => {
                tracing::info!(
                    "[History] Exported {} to {}",
                    artifact.file_name,
                    artifact.location.display()
                );
                Ok(artifact)
            }
            Err(e) => {
                tracing::error!("[History] Export of dataset {} failed: {}", dataset_id, e);
                state.notice = Some(Notice::blocking(EXPORT_FAILED));
                Err(e)
            }
        }
    }

    async fn download(
        &self,
        session: &cea_core::session::Session,
        dataset_id: &str,
    ) -> Result<ReportArtifact> {
        let payload = self
            .api
            .report(Some(session), dataset_id)
            .await
            .map_err(|e| self.session.observe_failure(e))?;

        let file_name = report_file_name(dataset_id, &payload.extension);
        let location = self.sink.save(&file_name, &payload.bytes)?;
        Ok(ReportArtifact {
            dataset_id: dataset_id.to_string(),
            file_name,
            location,
            size: payload.bytes.len(),
        })
    }

    /// Returns and clears the pending notice.
    pub async fn take_notice(&self) -> Option<Notice> {
        self.state.lock().await.notice.take()
    }

    /// Drops everything cached, including the activation.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.active = false;
        state.datasets.clear();
        state.selected = None;
        state.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemorySink, MockApi, authenticated_store, five_datasets};
    use cea_core::api::ReportPayload;
    use cea_core::notice::Severity;
    use std::path::PathBuf;

    struct Fixture {
        api: Arc<MockApi>,
        sink: Arc<MemorySink>,
        session: Arc<SessionStore>,
        store: HistoryStore,
    }

    fn fixture() -> Fixture {
        let api = Arc::new(MockApi::default());
        let sink = Arc::new(MemorySink::default());
        let session = authenticated_store(api.clone());
        let store = HistoryStore::new(session.clone(), api.clone(), sink.clone());
        Fixture {
            api,
            sink,
            session,
            store,
        }
    }

    fn pdf() -> ReportPayload {
        ReportPayload {
            bytes: b"%PDF-1.4 report".to_vec(),
            extension: "pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_preserves_order_and_count() {
        let f = fixture();
        f.api.set_history(Ok(five_datasets()));

        let datasets = f.store.load().await;

        let ids: Vec<_> = datasets.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "4", "3", "2", "1"]);
        assert!(
            datasets
                .windows(2)
                .all(|w| w[0].upload_timestamp > w[1].upload_timestamp)
        );
        assert_eq!(f.store.datasets().await.len(), 5);
    }

    #[tokio::test]
    async fn test_load_failure_is_soft() {
        let f = fixture();
        f.api.set_history(Ok(five_datasets()));
        f.store.load().await;

        f.api.set_history(Err(CeaError::transport("connection refused")));
        let datasets = f.store.refresh().await;

        assert!(datasets.is_empty());
        assert_eq!(f.store.take_notice().await, None);
        assert!(f.session.current().is_authenticated());
    }

    #[tokio::test]
    async fn test_activate_fetches_once_per_activation() {
        let f = fixture();
        f.api.set_history(Ok(five_datasets()));

        f.store.activate().await;
        f.store.activate().await;
        assert_eq!(f.api.history_calls(), 1);

        f.store.refresh().await;
        assert_eq!(f.api.history_calls(), 2);

        f.store.deactivate().await;
        assert!(f.store.datasets().await.is_empty());
        f.store.activate().await;
        assert_eq!(f.api.history_calls(), 3);
    }

    #[tokio::test]
    async fn test_unauthorized_load_invalidates_session() {
        let f = fixture();
        f.api.set_history(Err(CeaError::auth(Some(401), None)));

        assert!(f.store.load().await.is_empty());
        assert!(!f.session.current().is_authenticated());
    }

    #[tokio::test]
    async fn test_export_success_names_artifact() {
        let f = fixture();
        f.api.set_history(Ok(five_datasets()));
        f.api.set_report(Ok(pdf()));
        f.store.load().await;

        let artifact = f.store.export_report("42").await.unwrap();

        assert_eq!(artifact.file_name, "equipment_report_42.pdf");
        assert_eq!(artifact.location, PathBuf::from("/downloads/equipment_report_42.pdf"));
        assert_eq!(artifact.size, 15);
        assert_eq!(
            f.sink.saved(),
            vec![("equipment_report_42.pdf".to_string(), b"%PDF-1.4 report".to_vec())]
        );
        assert_eq!(f.store.take_notice().await, None);
    }

    #[tokio::test]
    async fn test_export_failure_is_blocking_and_keeps_list() {
        let f = fixture();
        f.api.set_history(Ok(five_datasets()));
        f.api.set_report(Err(CeaError::not_found("dataset", "99")));
        let before = f.store.load().await;

        let err = f.store.export_report("99").await.unwrap_err();

        assert!(err.is_not_found());
        let notice = f.store.take_notice().await.unwrap();
        assert_eq!(notice.severity, Severity::Blocking);
        assert_eq!(notice.text, "Failed to generate PDF");
        assert_eq!(f.store.datasets().await, before);
        assert!(f.sink.saved().is_empty());
    }

    #[tokio::test]
    async fn test_export_sink_failure_is_blocking() {
        let f = fixture();
        f.api.set_report(Ok(pdf()));
        f.sink.fail_saves();

        assert!(f.store.export_report("1").await.is_err());
        assert_eq!(
            f.store.take_notice().await.map(|n| n.severity),
            Some(Severity::Blocking)
        );
    }

    #[tokio::test]
    async fn test_concurrent_export_of_same_dataset_is_busy() {
        let f = fixture();
        f.api.set_report(Ok(pdf()));
        let gate = f.api.hold_requests();
        let store = Arc::new(f.store);

        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.export_report("7").await })
        };
        f.api.wait_for_calls(1).await;

        assert!(store.export_report("7").await.unwrap_err().is_busy());

        gate.release();
        first.await.unwrap().unwrap();
        assert_eq!(f.api.report_calls(), 1);
    }

    #[tokio::test]
    async fn test_select_and_deselect() {
        let f = fixture();
        f.api.set_history(Ok(five_datasets()));
        f.store.load().await;

        let dataset = f.store.select("3").await.unwrap();
        assert_eq!(dataset.name, "batch_3.csv");
        assert_eq!(f.store.selected().await.map(|d| d.id), Some("3".to_string()));
        assert!(f.store.select("404").await.unwrap_err().is_not_found());

        f.store.deselect().await;
        assert_eq!(f.store.selected().await, None);
        assert_eq!(f.api.history_calls(), 1);
    }

    #[tokio::test]
    async fn test_activate_fetches_again_after_relogin() {
        let f = fixture();
        f.api.set_history(Ok(five_datasets()));
        f.api.set_login(Ok(cea_core::api::LoginGrant {
            access: Some("tok-2".to_string()),
            username: Some("alice".to_string()),
            ..Default::default()
        }));
        f.store.activate().await;

        f.session.logout().unwrap();
        f.session.login("alice@example.com", "pw").await.unwrap();

        assert_eq!(f.store.activate().await.len(), 5);
        assert_eq!(f.api.history_calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_cleared_on_session_transition() {
        let f = fixture();
        f.api.set_history(Ok(five_datasets()));
        f.store.activate().await;
        f.store.select("5").await.unwrap();

        f.session.logout().unwrap();

        assert!(f.store.datasets().await.is_empty());
        assert_eq!(f.store.selected().await, None);
        assert!(f.store.load().await.is_empty());
        assert_eq!(f.api.history_calls(), 1);
    }
}
