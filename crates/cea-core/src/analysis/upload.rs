//! Local file selected for upload.

use crate::error::{CeaError, Result};
use std::fmt;
use std::path::Path;

/// The only extension the analysis service accepts.
pub const CSV_EXTENSION: &str = ".csv";

/// Returns true when `file_name` ends in [`CSV_EXTENSION`].
///
/// The comparison is case-sensitive, matching the service's own check.
pub fn has_csv_extension(file_name: &str) -> bool {
    file_name.ends_with(CSV_EXTENSION)
}

/// A file held in memory until it is submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Reads a file from disk, naming it after the final path component.
    pub fn read(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CeaError::validation(format!("Not a file: {}", path.display())))?;
        let contents = std::fs::read(path)?;
        Ok(Self { name, contents })
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("bytes", &self.contents.len())
            .finish()
    }
}
