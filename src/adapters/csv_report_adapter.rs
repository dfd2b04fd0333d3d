//! Per-run scan report as `scan_YYYYMMDD.csv`.

use crate::domain::error::SwingError;
use crate::domain::scan::{ScanReport, ScanRow};
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    symbol: &'a str,
    date: String,
    decision: &'static str,
    reason: String,
    close: String,
    rsi7: String,
    rsi14: String,
    rsi30: String,
    volume_multiple: String,
}

fn fixed(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_default()
}

impl<'a> From<&'a ScanRow> for ReportRow<'a> {
    fn from(row: &'a ScanRow) -> Self {
        ReportRow {
            symbol: &row.symbol,
            date: row.date.map(|d| d.to_string()).unwrap_or_default(),
            decision: row.decision_label(),
            reason: row.reason_label(),
            close: fixed(row.close, 2),
            rsi7: fixed(row.rsi7, 2),
            rsi14: fixed(row.rsi14, 2),
            rsi30: fixed(row.rsi30, 2),
            volume_multiple: fixed(row.volume_multiple, 2),
        }
    }
}

fn report_error(e: &dyn std::fmt::Display) -> SwingError {
    SwingError::Report {
        reason: e.to_string(),
    }
}

/// Render the report rows as CSV text with a header line.
pub fn render_csv(report: &ScanReport) -> Result<String, SwingError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if report.rows.is_empty() {
        wtr.write_record([
            "symbol",
            "date",
            "decision",
            "reason",
            "close",
            "rsi7",
            "rsi14",
            "rsi30",
            "volume_multiple",
        ])
        .map_err(|e| report_error(&e))?;
    }
    for row in &report.rows {
        wtr.serialize(ReportRow::from(row))
            .map_err(|e| report_error(&e))?;
    }

    let data = wtr.into_inner().map_err(|e| report_error(&e))?;
    String::from_utf8(data).map_err(|e| report_error(&e))
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn report_path(&self, report: &ScanReport) -> PathBuf {
        self.output_dir
            .join(format!("scan_{}.csv", report.as_of.format("%Y%m%d")))
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &ScanReport) -> Result<PathBuf, SwingError> {
        let content = render_csv(report)?;
        let path = self.report_path(report);

        fs::create_dir_all(&self.output_dir).map_err(|e| SwingError::Report {
            reason: format!("failed to create {}: {}", self.output_dir.display(), e),
        })?;
        fs::write(&path, content).map_err(|e| SwingError::Report {
            reason: format!("failed to write {}: {}", path.display(), e),
        })?;

        Ok(path)
    }
}
