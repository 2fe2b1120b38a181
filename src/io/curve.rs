//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted curve:
//! - 4PL parameters, IC50 and fit quality
//! - the aggregated observations the fit was made on
//! - the synthesized curve grid for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{CurveFile, CurveGrid, FitResult};
use crate::error::AppError;

/// Build the JSON document for a fit result.
pub fn curve_file(result: &FitResult, units: &str) -> CurveFile {
    let (concentration, response) = result.curve_samples.iter().copied().unzip();
    CurveFile {
        tool: "ic50".to_string(),
        created_at: Utc::now(),
        units: units.to_string(),
        ic50: result.ic50,
        params: result.params,
        fit_quality: result.quality,
        points: result.points.clone(),
        grid: CurveGrid {
            concentration,
            response,
        },
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, result: &FitResult, units: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &curve_file(result, units))
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    if curve.grid.concentration.len() != curve.grid.response.len() {
        return Err(AppError::new(2, "Invalid curve JSON: grid columns differ in length."));
    }
    Ok(curve)
}
