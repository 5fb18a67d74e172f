//! Analysis domain module.
//!
//! # Module Structure
//!
//! - `model`: wire-shaped records returned by the analysis service
//! - `upload`: the local file handed to the upload pipeline
//! - `view`: presentation projection of an `UploadResult`

mod model;
mod upload;
mod view;

pub use model::{
    AnalysisSummary, AverageValues, DatasetSummary, EquipmentRecord, LatestSummary, UploadResult,
};
pub use upload::{CSV_EXTENSION, UploadFile, has_csv_extension};
pub use view::{BarChart, DataTable, ResultView, SummaryCard, TABLE_COLUMNS, TableRow};
