//! `ic50` library crate.
//!
//! The binary (`ic50`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - a GUI or notebook front-end can call `app::pipeline::calculate_ic50`
//!   directly and render the returned series however it likes

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
