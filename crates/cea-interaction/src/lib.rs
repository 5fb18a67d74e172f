//! Remote side of the CEA client: the HTTP implementation of
//! [`cea_core::api::AnalysisApi`].

pub mod http_analysis_api;

pub use http_analysis_api::HttpAnalysisApi;
