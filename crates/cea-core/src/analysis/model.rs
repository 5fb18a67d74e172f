//! Records exchanged with the analysis service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mean values of the three measured parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AverageValues {
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// Derived statistics for one uploaded dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_equipment: u64,
    pub average_values: AverageValues,
    #[serde(default)]
    pub type_distribution: BTreeMap<String, u64>,
}

/// One row of the uploaded table.
///
/// The five known columns are typed; anything else the service echoes back
/// is kept in `extra` so no data is dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EquipmentRecord {
    #[serde(rename = "Equipment Name", default, deserialize_with = "text_or_number")]
    pub name: String,
    #[serde(rename = "Type", default, deserialize_with = "text_or_number")]
    pub equipment_type: String,
    #[serde(rename = "Flowrate", default)]
    pub flowrate: Option<f64>,
    #[serde(rename = "Pressure", default)]
    pub pressure: Option<f64>,
    #[serde(rename = "Temperature", default)]
    pub temperature: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Successful response of `POST /upload/`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UploadResult {
    pub summary: AnalysisSummary,
    #[serde(default)]
    pub equipment_data: Vec<EquipmentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_id_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub dataset_id: Option<String>,
}

/// Snapshot of a past analysis, as listed by `GET /history/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    pub upload_timestamp: DateTime<Utc>,
    pub total_equipment: u64,
    pub average_flowrate: f64,
    pub average_pressure: f64,
    pub average_temperature: f64,
    #[serde(default)]
    pub type_distribution: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl DatasetSummary {
    /// Lines shown in the detail view of a selected dataset.
    pub fn detail_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Dataset ID: {}", self.id),
            format!(
                "Upload Date: {}",
                self.upload_timestamp.format("%Y-%m-%d %H:%M:%S")
            ),
            format!("Total Equipment: {}", self.total_equipment),
            format!("Average Flowrate: {:.2}", self.average_flowrate),
            format!("Average Pressure: {:.2}", self.average_pressure),
            format!("Average Temperature: {:.2}", self.average_temperature),
            "Type Distribution:".to_string(),
        ];
        lines.extend(
            self.type_distribution
                .iter()
                .map(|(kind, count)| format!("{}: {}", kind, count)),
        );
        lines
    }
}

/// Response of `GET /summary/`: the most recent dataset of the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSummary {
    #[serde(flatten)]
    pub summary: AnalysisSummary,
    #[serde(default)]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dataset_name: Option<String>,
}

/// Accepts both numeric and string identifiers.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Cell text; numeric-looking columns arrive as JSON numbers.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected text or number, got {}",
            other
        ))),
    }
}

fn optional_id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
