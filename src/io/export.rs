//! CSV exports.
//!
//! - per-concentration results (observed mean/SD, fitted value, residual)
//! - synthetic plates in the same layout `ingest` reads back
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{ConcentrationPoint, FitResult};
use crate::error::AppError;
use crate::report::compute_residuals;

#[derive(Serialize)]
struct ResultRow<'a> {
    concentration: f64,
    units: &'a str,
    mean_response: f64,
    std_response: f64,
    fitted_response: f64,
    residual: f64,
}

/// Write per-concentration results to a CSV file.
pub fn write_results_csv(path: &Path, result: &FitResult, units: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut wtr = csv::Writer::from_writer(file);

    for r in compute_residuals(result) {
        wtr.serialize(ResultRow {
            concentration: r.point.concentration,
            units,
            mean_response: r.point.mean_response,
            std_response: r.point.std_response,
            fitted_response: r.fitted,
            residual: r.residual,
        })
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write a plate (`concentration,r1,r2,...`) with a header row.
pub fn write_plate<W: Write>(writer: W, points: &[ConcentrationPoint]) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    let replicates = points.first().map(|p| p.replicates()).unwrap_or(0);
    let mut header = vec!["concentration".to_string()];
    header.extend((1..=replicates).map(|i| format!("r{i}")));
    wtr.write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write plate header: {e}")))?;

    for p in points {
        let mut row = vec![p.concentration.to_string()];
        row.extend(p.responses.iter().map(|v| v.to_string()));
        wtr.write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write plate row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush plate CSV: {e}")))?;
    Ok(())
}
