//! Input/output helpers.
//!
//! - form and plate CSV parsing (`ingest`)
//! - result and plate CSV exports (`export`)
//! - curve JSON read/write (`curve`)
//! - optional TOML settings (`config`)

pub mod config;
pub mod curve;
pub mod export;
pub mod ingest;

pub use config::*;
pub use curve::*;
pub use export::*;
pub use ingest::*;
