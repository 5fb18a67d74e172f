//! Infrastructure layer for the CEA client: paths, configuration and
//! local persistence.

pub mod config_service;
pub mod download_dir_report_sink;
pub mod paths;
pub mod storage;
pub mod toml_credential_repository;

pub use crate::config_service::ConfigService;
pub use crate::download_dir_report_sink::DownloadDirReportSink;
pub use crate::paths::CeaPaths;
pub use crate::toml_credential_repository::TomlCredentialRepository;
