//! Result export utilities.
//!
//! Ensemble reports export to JSON (the full nested report) or CSV (one row
//! per facility); sweep points export to CSV or JSON with one record per
//! transfer rate.

use std::path::Path;

use crate::metrics::EnsembleReport;
use crate::sweep::SweepPoint;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export an ensemble report to JSON.
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_ensemble_to_json(
    report: &EnsembleReport,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(report, file)
}

/// Export per-facility ensemble statistics to CSV, one row per facility.
///
/// # Errors
///
/// Returns an error if the report has no facilities, or if file creation or
/// CSV writing fails.
pub fn export_ensemble_to_csv(
    report: &EnsembleReport,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::require_records(&report.facilities, "facilities")?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_facilities_impl(report, file)
}

/// Export sweep points to CSV.
///
/// # Errors
///
/// Returns an error if there are no points, or if file creation or CSV
/// writing fails.
pub fn export_sweep_to_csv(
    points: &[SweepPoint],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::require_records(points, "sweep points")?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_sweep_impl(points, file)
}

/// Export sweep points to JSON as an array of objects.
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_sweep_to_json(
    points: &[SweepPoint],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(points, file)
}
