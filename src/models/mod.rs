//! Dose-response model implementation.
//!
//! The model is implemented as small, pure functions so that fitting and curve
//! synthesis code can stay simple.

pub mod model;

pub use model::*;
