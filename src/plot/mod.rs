//! Chart output.
//!
//! - `ascii`: deterministic terminal plot
//! - `svg`: stateless Plotters rendering to SVG bytes

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
