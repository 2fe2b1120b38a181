//! Command-line parsing for the IC50 estimator.
//!
//! Argument parsing and command dispatch stay separate from the fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::GuessKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ic50", version, about = "IC50 estimation by 4PL dose-response fitting")]
pub struct Cli {
    /// Debug-level logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit one or more plate CSV files, print the report and optionally plot/export.
    Fit(FitArgs),
    /// Generate a synthetic plate from known 4PL parameters.
    Simulate(SimulateArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// Options for fitting.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Plate CSV file(s): `concentration,r1,r2,...` per row. Repeat for a batch.
    #[arg(short, long = "input", value_name = "CSV", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Number of replicate responses per concentration.
    #[arg(short = 'n', long)]
    pub replicates: usize,

    /// Initial-guess strategy.
    #[arg(long, value_enum)]
    pub guess: Option<GuessKind>,

    /// Cap on residual evaluations for the optimizer.
    #[arg(long = "max-evals", env = "IC50_MAX_EVALS")]
    pub max_evals: Option<usize>,

    /// Points in the synthesized curve.
    #[arg(long)]
    pub samples: Option<usize>,

    /// Relative convergence tolerance.
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Concentration units label (reporting only).
    #[arg(long, env = "IC50_UNITS")]
    pub units: Option<String>,

    /// Optional TOML settings file.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Print observed vs fitted per concentration.
    #[arg(long)]
    pub residuals: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Write the chart as SVG.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Export the result row to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export curve (params + aggregated points + curve grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Options for synthetic plate generation.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Response as concentration → 0.
    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    pub a: f64,

    /// Hill slope.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub b: f64,

    /// True IC50.
    #[arg(long, default_value_t = 1.0)]
    pub c: f64,

    /// Response as concentration → ∞.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub d: f64,

    /// Comma-separated concentrations.
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [0.001, 0.01, 0.1, 1.0, 10.0, 100.0, 1000.0]
    )]
    pub concentrations: Vec<f64>,

    /// Replicates per concentration.
    #[arg(short = 'n', long, default_value_t = 3)]
    pub replicates: usize,

    /// Gaussian noise standard deviation.
    #[arg(long, default_value_t = 2.0)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV (stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Curve JSON file produced by `ic50 fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
