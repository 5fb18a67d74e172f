//! Application layer for the CEA client.
//!
//! Orchestrates the session lifecycle, the upload pipeline and the dataset
//! history on top of the ports defined in `cea-core`.

pub mod history_store;
pub mod session_store;
mod session_watch;
pub mod upload_pipeline;
pub mod workbench;

#[cfg(test)]
pub(crate) mod test_support;

pub use history_store::HistoryStore;
pub use session_store::SessionStore;
pub use upload_pipeline::{UploadPhase, UploadPipeline};
pub use workbench::Workbench;
