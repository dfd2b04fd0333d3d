//! Scan report port trait.

use crate::domain::error::SwingError;
use crate::domain::scan::ScanReport;
use std::path::PathBuf;

/// Port for persisting the per-run scan rows.
pub trait ReportPort {
    /// Write the report and return where it landed.
    fn write(&self, report: &ScanReport) -> Result<PathBuf, SwingError>;
}
