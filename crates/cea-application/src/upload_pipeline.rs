//! Upload pipeline: file selection, submission and the latest result.
//!
//! ```text
//! Idle --select--> FileSelected --submit--> Busy --ok--> Idle
//!                       ^                     |
//!                       +-------- error ------+
//! ```

use cea_core::analysis::{ResultView, UploadFile, UploadResult, has_csv_extension};
use cea_core::api::AnalysisApi;
use cea_core::error::{CeaError, Result};
use cea_core::notice::Notice;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::session_store::SessionStore;
use crate::session_watch::SessionWatch;

/// Shown when an upload fails without service-provided text.
pub const UPLOAD_FAILED: &str = "Error uploading file";

const NOT_CSV: &str = "Please select a CSV file";
const NO_FILE: &str = "Please select a file first";
const UPLOADING: &str = "Uploading and processing...";
const UPLOADED: &str = "File uploaded and processed successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    FileSelected,
    Busy,
}

struct PipelineState {
    phase: UploadPhase,
    file: Option<UploadFile>,
    status: Option<Notice>,
    last_result: Option<UploadResult>,
    /// Set when the session changed or the pipeline was cleared mid-upload
    stale: bool,
    watch: SessionWatch,
}

impl PipelineState {
    /// Drops data that belonged to a previous session.
    fn sync_session(&mut self) {
        if !self.watch.transitioned() {
            return;
        }
        self.last_result = None;
        if self.phase == UploadPhase::Busy {
            self.stale = true;
        } else {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.phase = UploadPhase::Idle;
        self.file = None;
        self.status = None;
        self.last_result = None;
        self.stale = false;
    }
}

pub struct UploadPipeline {
    session: Arc<SessionStore>,
    api: Arc<dyn AnalysisApi>,
    state: Mutex<PipelineState>,
}

impl UploadPipeline {
    pub fn new(session: Arc<SessionStore>, api: Arc<dyn AnalysisApi>) -> Self {
        let watch = SessionWatch::new(session.subscribe());
        Self {
            session,
            api,
            state: Mutex::new(PipelineState {
                phase: UploadPhase::Idle,
                file: None,
                status: None,
                last_result: None,
                stale: false,
                watch,
            }),
        }
    }

    /// Holds `file` for the next submit if its name ends in `.csv`.
    ///
    /// A rejected file also drops any file held before.
    pub async fn select_file(&self, file: UploadFile) -> Result<()> {
        let mut state = self.state.lock().await;
        state.sync_session();
        if state.phase == UploadPhase::Busy {
            return Err(CeaError::Busy("upload"));
        }

        if !has_csv_extension(&file.name) {
            tracing::warn!("[Upload] Rejected non-CSV file {}", file.name);
            state.file = None;
            state.phase = UploadPhase::Idle;
            state.status = Some(Notice::error(NOT_CSV));
            return Err(CeaError::validation(NOT_CSV));
        }

        tracing::info!("[Upload] Selected {} ({} bytes)", file.name, file.len());
        state.status = Some(Notice::info(format!("Selected: {}", file.name)));
        state.file = Some(file);
        state.phase = UploadPhase::FileSelected;
        Ok(())
    }

    /// Reads and selects a file from disk. The name is checked before reading.
    pub async fn select_path(&self, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !has_csv_extension(&name) {
            return self.select_file(UploadFile::new(name, Vec::new())).await;
        }
        let file = UploadFile::read(path)?;
        self.select_file(file).await
    }

    /// Sends the held file for analysis.
    ///
    /// Fails without a request when no file is held, no session exists, or
    /// another upload is still running. A failed upload keeps the file.
    pub async fn submit(&self) -> Result<UploadResult> {
        let (session, file) = {
            let mut state = self.state.lock().await;
            state.sync_session();
            if state.phase == UploadPhase::Busy {
                return Err(CeaError::Busy("upload"));
            }
            let Some(file) = state.file.clone() else {
                state.status = Some(Notice::error(NO_FILE));
                return Err(CeaError::validation(NO_FILE));
            };
            let session = self.session.require_session()?;

            state.phase = UploadPhase::Busy;
            state.status = Some(Notice::info(UPLOADING));
            (session, file)
        };

        tracing::info!("[Upload] Submitting {}", file.name);
        let outcome = self.api.upload(Some(&session), &file).await;
        let outcome = outcome.map_err(|e| self.session.observe_failure(e));

        let mut state = self.state.lock().await;
        state.sync_session();
        if state.stale || self.session.session().as_ref() != Some(&session) {
            tracing::debug!("[Upload] Session changed during upload of {}", file.name);
            state.reset();
            return outcome;
        }
        match outcome {
            Ok(result) => {
                tracing::info!(
                    "[Upload] {} processed: {} rows",
                    file.name,
                    result.equipment_data.len()
                );
                state.phase = UploadPhase::Idle;
                state.file = None;
                state.status = Some(Notice::success(UPLOADED));
                state.last_result = Some(result.clone());
                Ok(result)
            }
            Err(e) => {
                tracing::warn!("[Upload] {} failed: {}", file.name, e);
                state.phase = if state.file.is_some() {
                    UploadPhase::FileSelected
                } else {
                    UploadPhase::Idle
                };
                state.status = Some(Notice::error(e.user_message(UPLOAD_FAILED)));
                Err(e)
            }
        }
    }

    pub async fn phase(&self) -> UploadPhase {
        let mut state = self.state.lock().await;
        state.sync_session();
        state.phase
    }

    /// Name of the held file, if any.
    pub async fn selected_file(&self) -> Option<String> {
        let mut state = self.state.lock().await;
        state.sync_session();
        state.file.as_ref().map(|file| file.name.clone())
    }

    /// Last status message.
    pub async fn status(&self) -> Option<Notice> {
        let mut state = self.state.lock().await;
        state.sync_session();
        state.status.clone()
    }

    pub async fn last_result(&self) -> Option<UploadResult> {
        let mut state = self.state.lock().await;
        state.sync_session();
        state.last_result.clone()
    }

    /// Presentation of the last successful upload; `None` when there is none.
    pub async fn result_view(&self) -> Option<ResultView> {
        let mut state = self.state.lock().await;
        state.sync_session();
        ResultView::project(state.last_result.as_ref())
    }

    /// Resets the pipeline, e.g. when leaving the dashboard.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        if state.phase == UploadPhase::Busy {
            state.last_result = None;
            state.stale = true;
            return;
        }
        state.reset();
    }
}
