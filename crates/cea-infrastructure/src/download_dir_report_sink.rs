//! Report sink writing into a download directory.

use cea_core::error::Result;
use cea_core::report::ReportSink;
use std::path::{Path, PathBuf};

use crate::storage::write_atomic;

/// Saves exported reports into one directory, replacing files of the same name.
#[derive(Debug, Clone)]
pub struct DownloadDirReportSink {
    dir: PathBuf,
}

impl DownloadDirReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for DownloadDirReportSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        // Names come from the service id; refuse anything that escapes the directory.
        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || file_name == "."
            || file_name == ".."
        {
            return Err(cea_core::CeaError::validation(format!(
                "Invalid report file name: {:?}",
                file_name
            )));
        }

        let target = self.dir.join(file_name);
        write_atomic(&target, bytes, false)?;
        tracing::info!(
            "[Reports] Saved {} ({} bytes)",
            target.display(),
            bytes.len()
        );
        Ok(target)
    }
}
