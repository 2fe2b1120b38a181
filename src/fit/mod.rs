//! Curve fitting.
//!
//! Responsibilities:
//!
//! - choose a starting point (`guess`)
//! - fit the 4PL model by nonlinear least squares (`fitter`)
//! - sample the fitted curve for display (`curve`)

pub mod curve;
pub mod fitter;
pub mod guess;

pub use curve::*;
pub use fitter::*;
pub use guess::*;
