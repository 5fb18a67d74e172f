//! Local materialization of exported reports.

use std::path::PathBuf;

use crate::error::Result;

/// Extension used when the service does not say otherwise.
pub const DEFAULT_REPORT_EXTENSION: &str = "pdf";

/// Deterministic artifact name: `equipment_report_<id>.<ext>`.
pub fn report_file_name(dataset_id: &str, extension: &str) -> String {
    format!("equipment_report_{}.{}", dataset_id, extension)
}

/// A report saved on the local machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub dataset_id: String,
    pub file_name: String,
    pub location: PathBuf,
    pub size: usize,
}

/// Destination for downloaded reports.
pub trait ReportSink: Send + Sync {
    /// Stores `bytes` under `file_name` and returns where it landed.
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}
