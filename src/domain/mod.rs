//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input observations (`ConcentrationPoint`) and their aggregates (`AggregatedPoint`)
//! - fit outputs (`FitParameters`, `FitQuality`, `FitResult`)
//! - run configuration (`FitConfig`, `GuessKind`) and the exported `CurveFile`

pub mod types;

pub use types::*;
