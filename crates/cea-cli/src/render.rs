//! Plain-text rendering of analysis results and history.

use cea_core::analysis::{BarChart, DataTable, DatasetSummary, ResultView};
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

pub fn result_view(view: &ResultView) -> String {
    let mut out = String::new();

    for card in &view.summary_cards {
        let _ = writeln!(out, "{:<16} {}", card.title, card.value);
    }
    out.push('\n');
    out.push_str(&bar_chart(&view.type_chart));
    out.push('\n');
    out.push_str(&bar_chart(&view.averages_chart));
    if let Some(table) = &view.table {
        out.push('\n');
        out.push_str(&data_table(table));
    }
    out
}

/// One line per point, bars scaled to the largest value.
pub fn bar_chart(chart: &BarChart) -> String {
    let mut out = format!("{} ({})\n", chart.title, chart.series_label);
    let label_width = chart.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max = chart.values.iter().copied().fold(0.0_f64, f64::max);

    for (label, value) in chart.points() {
        let len = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:<width$}  {:<bar$}  {}",
            label,
            "#".repeat(len),
            value,
            width = label_width,
            bar = BAR_WIDTH
        );
    }
    out
}

pub fn data_table(table: &DataTable) -> String {
    let rows: Vec<[String; 6]> = table
        .rows
        .iter()
        .map(|row| {
            [
                row.index.to_string(),
                row.name.clone(),
                row.equipment_type.clone(),
                optional(row.flowrate),
                optional(row.pressure),
                optional(row.temperature),
            ]
        })
        .collect();

    let mut widths = table.columns.map(|c| c.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = table.columns.iter().map(|c| c.to_string()).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize; 6]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Newest first, as returned by the service.
pub fn dataset_list(datasets: &[DatasetSummary]) -> String {
    let mut out = String::new();
    for dataset in datasets {
        let _ = writeln!(
            out,
            "[{}] {}  {}  {} items",
            dataset.id,
            dataset.name,
            dataset.upload_timestamp.format("%Y-%m-%d %H:%M:%S"),
            dataset.total_equipment
        );
    }
    out
}

pub fn dataset_detail(dataset: &DatasetSummary) -> String {
    let mut out = String::new();
    for line in dataset.detail_lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
