//! Presentation projection of the latest upload.
//!
//! Pure functions only: nothing here fetches or mutates.

use super::model::{EquipmentRecord, UploadResult};

/// One headline figure.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub title: &'static str,
    pub value: String,
}

/// A categorical bar chart with a single series.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: &'static str,
    pub series_label: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl BarChart {
    /// `(label, value)` pairs in display order.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// 1-based position in the uploaded file
    pub index: usize,
    pub name: String,
    pub equipment_type: String,
    pub flowrate: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub columns: [&'static str; 6],
    pub rows: Vec<TableRow>,
}

pub const TABLE_COLUMNS: [&str; 6] = [
    "#",
    "Equipment Name",
    "Type",
    "Flowrate",
    "Pressure",
    "Temperature",
];

/// Everything the dashboard shows for one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub summary_cards: Vec<SummaryCard>,
    pub type_chart: BarChart,
    pub averages_chart: BarChart,
    /// Absent when the upload produced no rows.
    pub table: Option<DataTable>,
}

impl ResultView {
    /// Derives the view, or `None` when there is no result to show.
    pub fn project(result: Option<&UploadResult>) -> Option<Self> {
        let result = result?;
        let summary = &result.summary;
        let averages = summary.average_values;

        let summary_cards = vec![
            SummaryCard {
                title: "Total Equipment",
                value: summary.total_equipment.to_string(),
            },
            SummaryCard {
                title: "Avg Flowrate",
                value: averages.flowrate.to_string(),
            },
            SummaryCard {
                title: "Avg Pressure",
                value: averages.pressure.to_string(),
            },
            SummaryCard {
                title: "Avg Temperature",
                value: averages.temperature.to_string(),
            },
        ];

        // Most common type first; ties stay alphabetical.
        let mut distribution: Vec<(&String, &u64)> = summary.type_distribution.iter().collect();
        distribution.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        let type_chart = BarChart {
            title: "Equipment Type Distribution",
            series_label: "Equipment Count",
            labels: distribution.iter().map(|(kind, _)| (*kind).clone()).collect(),
            values: distribution.iter().map(|(_, count)| **count as f64).collect(),
        };

        let averages_chart = BarChart {
            title: "Average Parameters",
            series_label: "Average Values",
            labels: vec![
                "Flowrate".to_string(),
                "Pressure".to_string(),
                "Temperature".to_string(),
            ],
            values: vec![averages.flowrate, averages.pressure, averages.temperature],
        };

        let table = (!result.equipment_data.is_empty()).then(|| DataTable {
            columns: TABLE_COLUMNS,
            rows: result
                .equipment_data
                .iter()
                .enumerate()
                .map(|(i, record)| to_row(i + 1, record))
                .collect(),
        });

        Some(Self {
            summary_cards,
            type_chart,
            averages_chart,
            table,
        })
    }
}

fn to_row(index: usize, record: &EquipmentRecord) -> TableRow {
    TableRow {
        index,
        name: record.name.clone(),
        equipment_type: record.equipment_type.clone(),
        flowrate: record.flowrate,
        pressure: record.pressure,
        temperature: record.temperature,
    }
}
