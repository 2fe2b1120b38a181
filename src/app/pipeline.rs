//! Shared "calculation pipeline" used by the CLI front-end and library callers.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate -> aggregate replicates -> 4PL fit -> curve synthesis
//!
//! Every call is independent: no state survives between calculations, so
//! batches can run in parallel without coordination.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::aggregate::{aggregate, unzip};
use crate::domain::{ConcentrationPoint, FitConfig, FitResult};
use crate::error::Ic50Error;
use crate::fit::{fit_4pl, synthesize_curve};

/// Run the full IC50 calculation for one experiment.
pub fn calculate_ic50(points: &[ConcentrationPoint], config: &FitConfig) -> Result<FitResult, Ic50Error> {
    // 1) Collapse replicates (validates shape before any fitting).
    let aggregated = aggregate(points)?;
    let (x, y, _) = unzip(&aggregated);

    // 2) Fit on the means.
    let fit = fit_4pl(&x, &y, config)?;

    // 3) Dense curve over the observed range.
    let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let curve_samples = synthesize_curve(&fit.params, x_min, x_max, config.curve_samples)?;

    info!(
        ic50 = fit.ic50(),
        r_squared = fit.quality.r_squared,
        evaluations = fit.quality.evaluations,
        "4PL fit converged"
    );

    Ok(FitResult {
        ic50: fit.ic50(),
        params: fit.params,
        quality: fit.quality,
        points: aggregated,
        curve_samples,
    })
}

/// Run independent calculations in parallel; results keep input order.
pub fn calculate_batch(
    experiments: &[Vec<ConcentrationPoint>],
    config: &FitConfig,
) -> Vec<Result<FitResult, Ic50Error>> {
    experiments
        .par_iter()
        .enumerate()
        .map(|(i, points)| {
            let result = calculate_ic50(points, config);
            if let Err(e) = &result {
                warn!(experiment = i + 1, error = %e, "calculation failed");
            }
            result
        })
        .collect()
}
