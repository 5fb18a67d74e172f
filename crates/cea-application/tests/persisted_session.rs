//! Session and export flows over the on-disk credential file and report sink.

use async_trait::async_trait;
use cea_application::Workbench;
use cea_core::analysis::{DatasetSummary, LatestSummary, UploadFile, UploadResult};
use cea_core::api::{AnalysisApi, Credentials, LoginGrant, Registration, ReportPayload};
use cea_core::error::{CeaError, Result};
use cea_core::route::{RouteDecision, View};
use cea_core::session::{ACCESS_TOKEN_KEY, Session, SessionState, USERNAME_KEY};
use cea_infrastructure::{DownloadDirReportSink, TomlCredentialRepository};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Accepts any login and serves a one-page report.
#[derive(Default)]
struct StubApi {
    calls: AtomicUsize,
}

impl StubApi {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnalysisApi for StubApi {
    async fn login(&self, _: Option<&Session>, credentials: &Credentials) -> Result<LoginGrant> {
        self.count();
        Ok(LoginGrant {
            access: Some(format!("token-for-{}", credentials.email)),
            username: Some("alice".to_string()),
            ..LoginGrant::default()
        })
    }

    async fn register(&self, _: Option<&Session>, _: &Registration) -> Result<()> {
        self.count();
        Ok(())
    }

    async fn upload(&self, _: Option<&Session>, _: &UploadFile) -> Result<UploadResult> {
        self.count();
        Err(CeaError::transport("not used"))
    }

    async fn history(&self, _: Option<&Session>) -> Result<Vec<DatasetSummary>> {
        self.count();
        Ok(Vec::new())
    }

    async fn latest_summary(&self, _: Option<&Session>) -> Result<LatestSummary> {
        self.count();
        Err(CeaError::not_found("summary", "latest"))
    }

    async fn report(&self, session: Option<&Session>, dataset_id: &str) -> Result<ReportPayload> {
        self.count();
        if session.is_none() {
            return Err(CeaError::auth(Some(401), None));
        }
        if dataset_id != "42" {
            return Err(CeaError::not_found("dataset", dataset_id));
        }
        Ok(ReportPayload {
            bytes: b"%PDF-1.4".to_vec(),
            extension: "pdf".to_string(),
        })
    }
}

fn workbench(home: &TempDir, api: Arc<StubApi>) -> Workbench {
    let credentials = TomlCredentialRepository::with_path(home.path().join("session.toml"));
    let sink = DownloadDirReportSink::new(home.path().join("downloads"));
    Workbench::new(Arc::new(credentials), api, Arc::new(sink))
}

#[tokio::test]
async fn login_survives_restart_without_network() {
    let home = TempDir::new().unwrap();
    let api = Arc::new(StubApi::default());

    let first = workbench(&home, api.clone());
    first.start();
    first.login("alice@example.com", "pw").await.unwrap();
    assert_eq!(api.calls(), 1);

    let raw: toml::Table = std::fs::read_to_string(home.path().join("session.toml"))
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(
        raw.get(ACCESS_TOKEN_KEY).and_then(|v| v.as_str()),
        Some("token-for-alice@example.com")
    );
    assert_eq!(raw.get(USERNAME_KEY).and_then(|v| v.as_str()), Some("alice"));

    let second = workbench(&home, api.clone());
    assert_eq!(
        second.start(),
        SessionState::Authenticated(Session::new("alice", "token-for-alice@example.com"))
    );
    assert_eq!(
        second.navigate(View::Dashboard),
        RouteDecision::Render(View::Dashboard)
    );
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn logout_removes_credential_file() {
    let home = TempDir::new().unwrap();
    let api = Arc::new(StubApi::default());

    let wb = workbench(&home, api.clone());
    wb.start();
    wb.login("alice@example.com", "pw").await.unwrap();
    wb.logout().await.unwrap();

    assert!(!home.path().join("session.toml").exists());
    let restarted = workbench(&home, api);
    assert_eq!(restarted.start(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn export_writes_named_report() {
    let home = TempDir::new().unwrap();
    let api = Arc::new(StubApi::default());

    let wb = workbench(&home, api);
    wb.start();
    wb.login("alice@example.com", "pw").await.unwrap();

    let artifact = wb.history().export_report("42").await.unwrap();

    let expected = home.path().join("downloads").join("equipment_report_42.pdf");
    assert_eq!(artifact.location, expected);
    assert_eq!(std::fs::read(expected).unwrap(), b"%PDF-1.4");

    assert!(wb.history().export_report("7").await.is_err());
    assert!(wb.history().take_notice().await.is_some());
    assert!(
        !home
            .path()
            .join("downloads")
            .join("equipment_report_7.pdf")
            .exists()
    );
}
