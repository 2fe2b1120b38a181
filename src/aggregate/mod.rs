//! Replicate aggregation.
//!
//! Collapses each concentration's replicate responses into a mean and a
//! population standard deviation, preserving input order.
//!
//! Input validation happens here, before any fitting:
//! - at least one point, every point with at least one response
//! - concentrations finite and `> 0`, responses finite
//! - one replicate count shared by every point
//! - concentrations distinct

use crate::domain::{AggregatedPoint, ConcentrationPoint};
use crate::error::Ic50Error;
use crate::math::{mean, population_std};

/// Aggregate replicate responses per concentration.
pub fn aggregate(points: &[ConcentrationPoint]) -> Result<Vec<AggregatedPoint>, Ic50Error> {
    validate_points(points)?;

    points
        .iter()
        .map(|p| {
            let mean_response = mean(&p.responses).ok_or_else(|| empty_group(p.concentration))?;
            let std_response = population_std(&p.responses).ok_or_else(|| empty_group(p.concentration))?;
            Ok(AggregatedPoint {
                concentration: p.concentration,
                mean_response,
                std_response,
            })
        })
        .collect()
}

/// Convert `(concentration repeated r times, responses)` groups into explicit points.
///
/// Every concentration entry of a group must be identical to the first, and
/// must pair with exactly one response. Divergent entries are rejected rather
/// than resolved by picking one.
pub fn from_replicate_groups(
    concentration_groups: &[Vec<f64>],
    response_groups: &[Vec<f64>],
) -> Result<Vec<ConcentrationPoint>, Ic50Error> {
    if concentration_groups.len() != response_groups.len() {
        return Err(Ic50Error::invalid(format!(
            "{} concentration group(s) but {} response group(s).",
            concentration_groups.len(),
            response_groups.len()
        )));
    }

    let mut out = Vec::with_capacity(concentration_groups.len());
    for (i, (concs, responses)) in concentration_groups.iter().zip(response_groups).enumerate() {
        let Some(&first) = concs.first() else {
            return Err(Ic50Error::invalid(format!("Group {} is empty.", i + 1)));
        };
        if concs.len() != responses.len() {
            return Err(Ic50Error::invalid(format!(
                "Group {} has {} concentration entries but {} responses.",
                i + 1,
                concs.len(),
                responses.len()
            )));
        }
        if let Some(&other) = concs.iter().find(|&&c| c != first) {
            return Err(Ic50Error::invalid(format!(
                "Group {} mixes concentrations {first} and {other}.",
                i + 1
            )));
        }
        out.push(ConcentrationPoint::new(first, responses.clone()));
    }

    Ok(out)
}

/// Split aggregated points into aligned (concentrations, means, std-devs).
pub fn unzip(points: &[AggregatedPoint]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut concentrations = Vec::with_capacity(points.len());
    let mut means = Vec::with_capacity(points.len());
    let mut stds = Vec::with_capacity(points.len());
    for p in points {
        concentrations.push(p.concentration);
        means.push(p.mean_response);
        stds.push(p.std_response);
    }
    (concentrations, means, stds)
}

fn validate_points(points: &[ConcentrationPoint]) -> Result<(), Ic50Error> {
    let Some(first) = points.first() else {
        return Err(Ic50Error::invalid("No concentrations supplied."));
    };
    let replicates = first.replicates();

    for p in points {
        if !(p.concentration.is_finite() && p.concentration > 0.0) {
            return Err(Ic50Error::invalid(format!(
                "Concentration must be a positive number, got {}.",
                p.concentration
            )));
        }
        if p.responses.is_empty() {
            return Err(empty_group(p.concentration));
        }
        if p.replicates() != replicates {
            return Err(Ic50Error::invalid(format!(
                "Concentration {} has {} replicate(s), expected {replicates}.",
                p.concentration,
                p.replicates()
            )));
        }
        if let Some(bad) = p.responses.iter().find(|v| !v.is_finite()) {
            return Err(Ic50Error::invalid(format!(
                "Concentration {} has a non-finite response ({bad}).",
                p.concentration
            )));
        }
    }

    let mut sorted: Vec<f64> = points.iter().map(|p| p.concentration).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(Ic50Error::invalid(format!("Concentration {} appears more than once.", w[0])));
    }

    Ok(())
}

fn empty_group(concentration: f64) -> Ic50Error {
    Ic50Error::invalid(format!("Concentration {concentration} has no responses."))
}
