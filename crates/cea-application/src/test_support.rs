//! In-memory doubles for the core ports.

use async_trait::async_trait;
use cea_core::analysis::{
    AnalysisSummary, AverageValues, DatasetSummary, EquipmentRecord, LatestSummary, UploadFile,
    UploadResult,
};
use cea_core::api::{AnalysisApi, Credentials, LoginGrant, Registration, ReportPayload};
use cea_core::error::{CeaError, Result};
use cea_core::report::ReportSink;
use cea_core::session::{CredentialRepository, Session};
use chrono::{Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Default)]
pub(crate) struct MemoryCredentials {
    stored: Mutex<Option<Session>>,
    fail_load: AtomicBool,
}

impl MemoryCredentials {
    pub(crate) fn with(session: Session) -> Self {
        Self {
            stored: Mutex::new(Some(session)),
            fail_load: AtomicBool::new(false),
        }
    }

    pub(crate) fn stored(&self) -> Option<Session> {
        self.stored.lock().unwrap().clone()
    }

    pub(crate) fn fail_load(&self) {
        self.fail_load.store(true, Ordering::SeqCst);
    }
}

impl CredentialRepository for MemoryCredentials {
    fn load(&self) -> Result<Option<Session>> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(CeaError::storage("unreadable"));
        }
        Ok(self.stored())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.stored.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}

/// Releases requests parked by [`MockApi::hold_requests`].
pub(crate) struct RequestGate(Arc<Semaphore>);

impl RequestGate {
    pub(crate) fn release(&self) {
        self.0.close();
    }
}

/// Scripted analysis service that counts calls.
#[derive(Default)]
pub(crate) struct MockApi {
    login: Mutex<Option<Result<LoginGrant>>>,
    register: Mutex<Option<Result<()>>>,
    upload: Mutex<Option<Result<UploadResult>>>,
    history: Mutex<Option<Result<Vec<DatasetSummary>>>>,
    summary: Mutex<Option<Result<LatestSummary>>>,
    report: Mutex<Option<Result<ReportPayload>>>,
    login_calls: AtomicUsize,
    register_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    history_calls: AtomicUsize,
    summary_calls: AtomicUsize,
    report_calls: AtomicUsize,
    registrations: Mutex<Vec<Registration>>,
    sessions: Mutex<Vec<Option<Session>>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockApi {
    pub(crate) fn set_login(&self, response: Result<LoginGrant>) {
        *self.login.lock().unwrap() = Some(response);
    }

    pub(crate) fn set_register(&self, response: Result<()>) {
        *self.register.lock().unwrap() = Some(response);
    }

    pub(crate) fn set_upload(&self, response: Result<UploadResult>) {
        *self.upload.lock().unwrap() = Some(response);
    }

    pub(crate) fn set_history(&self, response: Result<Vec<DatasetSummary>>) {
        *self.history.lock().unwrap() = Some(response);
    }

    pub(crate) fn set_summary(&self, response: Result<LatestSummary>) {
        *self.summary.lock().unwrap() = Some(response);
    }

    pub(crate) fn set_report(&self, response: Result<ReportPayload>) {
        *self.report.lock().unwrap() = Some(response);
    }

    /// Parks every following request until the gate is released.
    pub(crate) fn hold_requests(&self) -> RequestGate {
        let semaphore = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(semaphore.clone());
        RequestGate(semaphore)
    }

    pub(crate) async fn wait_for_calls(&self, count: usize) {
        while self.total_calls() < count {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    }

    pub(crate) fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.login_calls()
            + self.register_calls.load(Ordering::SeqCst)
            + self.upload_calls()
            + self.history_calls()
            + self.summary_calls.load(Ordering::SeqCst)
            + self.report_calls()
    }

    pub(crate) fn last_registration(&self) -> Option<Registration> {
        self.registrations.lock().unwrap().last().cloned()
    }

    /// Session passed with the most recent call.
    pub(crate) fn last_session(&self) -> Option<Option<Session>> {
        self.sessions.lock().unwrap().last().cloned()
    }

    async fn enter(&self, counter: &AtomicUsize, session: Option<&Session>) {
        self.sessions.lock().unwrap().push(session.cloned());
        counter.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            // A closed gate lets everything through.
            let _ = gate.acquire().await;
        }
    }
}

fn scripted<T: Clone>(slot: &Mutex<Option<Result<T>>>, default: Result<T>) -> Result<T> {
    slot.lock().unwrap().clone().unwrap_or(default)
}

#[async_trait]
impl AnalysisApi for MockApi {
    async fn login(
        &self,
        session: Option<&Session>,
        _credentials: &Credentials,
    ) -> Result<LoginGrant> {
        self.enter(&self.login_calls, session).await;
        scripted(&self.login, Err(CeaError::transport("no login scripted")))
    }

    async fn register(
        &self,
        session: Option<&Session>,
        registration: &Registration,
    ) -> Result<()> {
        self.registrations.lock().unwrap().push(registration.clone());
        self.enter(&self.register_calls, session).await;
        scripted(&self.register, Ok(()))
    }

    async fn upload(&self, session: Option<&Session>, _file: &UploadFile) -> Result<UploadResult> {
        self.enter(&self.upload_calls, session).await;
        scripted(&self.upload, Err(CeaError::transport("no upload scripted")))
    }

    async fn history(&self, session: Option<&Session>) -> Result<Vec<DatasetSummary>> {
        self.enter(&self.history_calls, session).await;
        scripted(&self.history, Ok(Vec::new()))
    }

    async fn latest_summary(&self, session: Option<&Session>) -> Result<LatestSummary> {
        self.enter(&self.summary_calls, session).await;
        scripted(
            &self.summary,
            Err(CeaError::not_found("summary", "latest")),
        )
    }

    async fn report(&self, session: Option<&Session>, _dataset_id: &str) -> Result<ReportPayload> {
        self.enter(&self.report_calls, session).await;
        scripted(&self.report, Err(CeaError::transport("no report scripted")))
    }
}

/// Report sink keeping saved files in memory.
#[derive(Default)]
pub(crate) struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    fail: AtomicBool,
}

impl MemorySink {
    pub(crate) fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }

    pub(crate) fn fail_saves(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl ReportSink for MemorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CeaError::storage("disk full"));
        }
        self.saved
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("/downloads").join(file_name))
    }
}

pub(crate) fn sample_result() -> UploadResult {
    UploadResult {
        summary: AnalysisSummary {
            total_equipment: 2,
            average_values: AverageValues {
                flowrate: 120.5,
                pressure: 6.2,
                temperature: 110.0,
            },
            type_distribution: BTreeMap::from([("Pump".to_string(), 1), ("Valve".to_string(), 1)]),
        },
        equipment_data: vec![
            EquipmentRecord {
                name: "Pump-1".to_string(),
                equipment_type: "Pump".to_string(),
                flowrate: Some(120.0),
                pressure: Some(5.2),
                temperature: Some(110.0),
                ..EquipmentRecord::default()
            },
            EquipmentRecord {
                name: "Valve-1".to_string(),
                equipment_type: "Valve".to_string(),
                flowrate: Some(121.0),
                pressure: Some(7.2),
                temperature: Some(110.0),
                ..EquipmentRecord::default()
            },
        ],
        message: Some("File uploaded and processed successfully".to_string()),
        dataset_id: Some("42".to_string()),
    }
}

/// Datasets `5, 4, 3, 2, 1`, newest first.
pub(crate) fn five_datasets() -> Vec<DatasetSummary> {
    let newest = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    (1..=5)
        .rev()
        .map(|id| DatasetSummary {
            id: id.to_string(),
            name: format!("batch_{}.csv", id),
            upload_timestamp: newest - Duration::hours(5 - id),
            total_equipment: 10 + id as u64,
            average_flowrate: 100.0,
            average_pressure: 5.0,
            average_temperature: 90.0,
            type_distribution: BTreeMap::from([("Pump".to_string(), 4)]),
            username: Some("alice".to_string()),
        })
        .collect()
}

pub(crate) fn authenticated_store(api: Arc<MockApi>) -> Arc<crate::SessionStore> {
    let store = crate::SessionStore::new(
        Arc::new(MemoryCredentials::with(Session::new("alice", "tok"))),
        api,
    );
    store.restore();
    Arc::new(store)
}
