//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - loads plate files and settings
//! - runs the IC50 pipeline (in parallel for batches)
//! - prints reports/plots
//! - writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{Level, debug, error};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Command, FitArgs, PlotArgs, SimulateArgs};
use crate::data::{PlateSpec, simulate_plate};
use crate::domain::{ConcentrationPoint, DEFAULT_UNITS, FitConfig, FitParameters, FitResult};
use crate::error::AppError;
use crate::io::SettingsFile;

pub mod pipeline;

/// Entry point for the `ic50` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let cli = crate::cli::Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Logging already initialised; keeping the existing subscriber.");
    }
}

/// Output-side options of `fit`, after merging with the settings file.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub units: String,
    pub plot: bool,
    pub residuals: bool,
    pub width: usize,
    pub height: usize,
    pub svg: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let settings = match &args.config {
        Some(path) => crate::io::load_settings(path)?,
        None => SettingsFile::default(),
    };
    let config = fit_config_from_args(&args, &settings);
    let output = output_options_from_args(&args, &settings);
    debug!(?config, "resolved fit configuration");

    let loaded = args
        .inputs
        .iter()
        .map(|path| crate::io::load_plate_csv(path, args.replicates))
        .collect();

    let results = fit_loaded(loaded, &config);
    let batch = results.len() > 1;

    let mut first_failure = None;
    for (i, (path, result)) in args.inputs.iter().zip(results).enumerate() {
        if batch {
            println!("== {} ==", path.display());
        }
        match result {
            Ok(result) => {
                let index = batch.then_some(i);
                write_outputs(&result, &output, index)?;
            }
            Err(e) => {
                error!(input = %path.display(), "{e}");
                println!("Error: {e}\n");
                first_failure.get_or_insert(e);
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Fit every plate that loaded; a load failure stays in its slot as that
/// experiment's error.
pub fn fit_loaded(
    loaded: Vec<Result<Vec<ConcentrationPoint>, AppError>>,
    config: &FitConfig,
) -> Vec<Result<FitResult, AppError>> {
    let plates: Vec<Vec<ConcentrationPoint>> = loaded.iter().flatten().cloned().collect();
    let mut fitted = pipeline::calculate_batch(&plates, config).into_iter();

    loaded
        .into_iter()
        .map(|plate| {
            plate.and_then(|_| {
                fitted
                    .next()
                    .ok_or_else(|| AppError::new(4, "Batch returned fewer results than plates."))?
                    .map_err(AppError::from)
            })
        })
        .collect()
}

fn write_outputs(result: &FitResult, output: &OutputOptions, index: Option<usize>) -> Result<(), AppError> {
    println!("{}", crate::report::format_result(result, &output.units));

    if output.residuals {
        println!("{}", crate::report::format_residual_table(result, &output.units));
    }

    if output.plot {
        println!(
            "{}",
            crate::plot::render_ascii_plot(result, output.width, output.height)
        );
    }

    if let Some(path) = &output.svg {
        let labels = crate::plot::ChartLabels::for_ic50(result.ic50, &output.units);
        let bytes = crate::plot::render_svg(
            &result.curve_samples,
            &result.points,
            &labels,
            crate::plot::DEFAULT_SIZE,
        )?;
        let path = indexed_path(path, index);
        std::fs::write(&path, bytes)
            .map_err(|e| AppError::new(2, format!("Failed to write SVG '{}': {e}", path.display())))?;
    }
    if let Some(path) = &output.export {
        crate::io::write_results_csv(&indexed_path(path, index), result, &output.units)?;
    }
    if let Some(path) = &output.export_curve {
        crate::io::write_curve_json(&indexed_path(path, index), result, &output.units)?;
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let spec = PlateSpec {
        params: FitParameters::new(args.a, args.b, args.c, args.d),
        concentrations: args.concentrations,
        replicates: args.replicates,
        noise_sd: args.noise,
        seed: args.seed,
    };
    let plate = simulate_plate(&spec)?;

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
            crate::io::write_plate(file, &plate)?;
        }
        None => crate::io::write_plate(std::io::stdout().lock(), &plate)?,
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height);

    println!("{plot}");
    Ok(())
}

/// Merge explicit flags over settings-file values over defaults.
pub fn fit_config_from_args(args: &FitArgs, settings: &SettingsFile) -> FitConfig {
    let defaults = FitConfig::default();
    FitConfig {
        max_evaluations: args
            .max_evals
            .or(settings.max_evaluations)
            .unwrap_or(defaults.max_evaluations),
        curve_samples: args
            .samples
            .or(settings.curve_samples)
            .unwrap_or(defaults.curve_samples),
        guess: args.guess.or(settings.guess).unwrap_or(defaults.guess),
        tolerance: args.tolerance.or(settings.tolerance).unwrap_or(defaults.tolerance),
    }
}

pub fn output_options_from_args(args: &FitArgs, settings: &SettingsFile) -> OutputOptions {
    OutputOptions {
        units: args
            .units
            .clone()
            .or_else(|| settings.units.clone())
            .unwrap_or_else(|| DEFAULT_UNITS.to_string()),
        plot: args.plot && !args.no_plot,
        residuals: args.residuals,
        width: args.width,
        height: args.height,
        svg: args.svg.clone(),
        export: args.export.clone(),
        export_curve: args.export_curve.clone(),
    }
}

/// `out.csv` → `out.2.csv` for the third experiment of a batch.
fn indexed_path(path: &Path, index: Option<usize>) -> PathBuf {
    let Some(i) = index else {
        return path.to_path_buf();
    };
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.{i}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{i}"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::GuessKind;

    fn fit_args(extra: &[&str]) -> FitArgs {
        let mut argv = vec!["ic50", "fit", "-i", "plate.csv", "-n", "3"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Fit(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn flags_override_settings_file() {
        let settings = SettingsFile {
            max_evaluations: Some(500),
            guess: Some(GuessKind::Auto),
            units: Some("nM".into()),
            ..SettingsFile::default()
        };
        let args = fit_args(&["--max-evals", "50", "--units", "mM"]);

        let config = fit_config_from_args(&args, &settings);
        assert_eq!(config.max_evaluations, 50);
        assert_eq!(config.guess, GuessKind::Auto);
        assert_eq!(config.curve_samples, FitConfig::default().curve_samples);

        let output = output_options_from_args(&args, &settings);
        assert_eq!(output.units, "mM");
    }

    #[test]
    fn no_plot_wins() {
        let output = output_options_from_args(&fit_args(&["--no-plot"]), &SettingsFile::default());
        assert!(!output.plot);
    }

    #[test]
    fn unreadable_plate_fails_alone() {
        let truth = FitParameters::new(100.0, 1.0, 0.5, 0.0);
        let good: Vec<ConcentrationPoint> = [0.001, 0.01, 0.1, 1.0, 10.0, 100.0]
            .iter()
            .map(|&x| {
                let y = crate::models::logistic_4p(x, &truth);
                ConcentrationPoint::new(x, vec![y - 0.5, y + 0.5])
            })
            .collect();
        let short = good[..2].to_vec();

        let results = fit_loaded(
            vec![
                Err(AppError::new(2, "line 3: Response 'abc' is not a number.")),
                Ok(good),
                Ok(short),
            ],
            &FitConfig::default(),
        );

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap_err().exit_code(), 2);
        assert!((results[1].as_ref().unwrap().ic50 - 0.5).abs() < 1e-6);
        assert_eq!(results[2].as_ref().unwrap_err().exit_code(), 3);
    }

    #[test]
    fn batch_outputs_get_indexed_names() {
        assert_eq!(indexed_path(Path::new("out/res.csv"), None), PathBuf::from("out/res.csv"));
        assert_eq!(indexed_path(Path::new("out/res.csv"), Some(2)), PathBuf::from("out/res.2.csv"));
        assert_eq!(indexed_path(Path::new("chart"), Some(0)), PathBuf::from("chart.0"));
    }
}
