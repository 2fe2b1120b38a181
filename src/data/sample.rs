//! Synthetic dose-response plate generation.
//!
//! Responses are drawn as `f(x; a, b, c, d) + ε`, `ε ~ N(0, noise_sd)`,
//! independently for every replicate. Generation is seeded so a given `PlateSpec`
//! always yields the same plate.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ConcentrationPoint, FitParameters};
use crate::error::Ic50Error;
use crate::models::logistic_4p;

/// What to simulate.
#[derive(Debug, Clone)]
pub struct PlateSpec {
    pub params: FitParameters,
    pub concentrations: Vec<f64>,
    pub replicates: usize,
    pub noise_sd: f64,
    pub seed: u64,
}

pub fn simulate_plate(spec: &PlateSpec) -> Result<Vec<ConcentrationPoint>, Ic50Error> {
    if spec.concentrations.is_empty() {
        return Err(Ic50Error::invalid("No concentrations to simulate."));
    }
    if spec.replicates == 0 {
        return Err(Ic50Error::invalid("Replicate count must be > 0."));
    }
    if spec.concentrations.iter().any(|c| !c.is_finite() || *c <= 0.0) {
        return Err(Ic50Error::invalid("Concentrations must be finite and > 0."));
    }
    if !(spec.noise_sd.is_finite() && spec.noise_sd >= 0.0) {
        return Err(Ic50Error::invalid("Noise standard deviation must be finite and >= 0."));
    }
    if !(spec.params.is_finite() && spec.params.c > 0.0) {
        return Err(Ic50Error::invalid("Curve parameters must be finite with c > 0."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = Normal::new(0.0, spec.noise_sd)
        .map_err(|e| Ic50Error::invalid(format!("Noise distribution error: {e}")))?;

    let points = spec
        .concentrations
        .iter()
        .map(|&x| {
            let mean = logistic_4p(x, &spec.params);
            let responses = (0..spec.replicates).map(|_| mean + noise.sample(&mut rng)).collect();
            ConcentrationPoint::new(x, responses)
        })
        .collect();

    Ok(points)
}
