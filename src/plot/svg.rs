//! Plotters-powered dose-response chart rendered to SVG.
//!
//! Rendering is a pure function of its inputs: every call builds its own
//! in-memory SVG document and returns the bytes. Nothing is retained between
//! calls, so the caller owns the image lifetime (write it to disk, embed it,
//! discard it).
//!
//! Chart elements:
//! - observed means with ±SD error bars
//! - the fitted 4PL curve
//! - log10 concentration axis

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::AggregatedPoint;
use crate::error::AppError;

/// Chart size in pixels.
pub const DEFAULT_SIZE: (u32, u32) = (1000, 600);

/// Labels drawn around the chart.
#[derive(Debug, Clone)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl ChartLabels {
    pub fn for_ic50(ic50: f64, units: &str) -> Self {
        Self {
            title: format!("IC50 = {ic50:.2} {units}"),
            x_label: format!("Concentration ({units})"),
            y_label: "Response (%)".to_string(),
        }
    }
}

/// Render the chart and return the SVG document bytes.
pub fn render_svg(
    curve_samples: &[(f64, f64)],
    points: &[AggregatedPoint],
    labels: &ChartLabels,
    size: (u32, u32),
) -> Result<Vec<u8>, AppError> {
    let (x0, x1) = x_bounds(curve_samples, points)
        .ok_or_else(|| AppError::new(4, "Nothing to plot: no positive concentrations."))?;
    let (y0, y1) = y_bounds(curve_samples, points).unwrap_or((0.0, 1.0));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_chart(&root, curve_samples, points, labels, (x0, x1), (y0, y1))
            .map_err(|e| AppError::new(4, format!("Failed to render chart: {e}")))?;
        root.present()
            .map_err(|e| AppError::new(4, format!("Failed to finalize chart: {e}")))?;
    }

    Ok(svg.into_bytes())
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    curve_samples: &[(f64, f64)],
    points: &[AggregatedPoint],
    labels: &ChartLabels,
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&labels.title, ("sans-serif", 24))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d((x0..x1).log_scale(), y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(labels.x_label.as_str())
        .y_desc(labels.y_label.as_str())
        .x_label_formatter(&|v| format!("{v:.3}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    let data_color = RED;
    let curve_color = BLUE;

    // 1) Error bars: mean ± SD.
    chart
        .draw_series(points.iter().map(|p| {
            ErrorBar::new_vertical(
                p.concentration,
                p.mean_response - p.std_response,
                p.mean_response,
                p.mean_response + p.std_response,
                data_color.stroke_width(2),
                10,
            )
        }))?
        .label("Experimental data (mean ± SD)")
        .legend(move |(x, y)| Circle::new((x + 10, y), 4, data_color.filled()));

    // 2) Means as markers on top of the bars.
    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new((p.concentration, p.mean_response), 4, data_color.filled())),
    )?;

    // 3) Fitted curve.
    chart
        .draw_series(LineSeries::new(curve_samples.iter().copied(), curve_color.stroke_width(2)))?
        .label("Fitted curve (4PL)")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], curve_color.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn x_bounds(curve: &[(f64, f64)], points: &[AggregatedPoint]) -> Option<(f64, f64)> {
    let xs = curve
        .iter()
        .map(|&(x, _)| x)
        .chain(points.iter().map(|p| p.concentration))
        .filter(|x| x.is_finite() && *x > 0.0);

    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for x in xs {
        lo = lo.min(x);
        hi = hi.max(x);
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }
    // Half a decade of headroom on each side keeps end markers inside the frame.
    Some((lo / 10f64.sqrt(), hi * 10f64.sqrt()))
}

fn y_bounds(curve: &[(f64, f64)], points: &[AggregatedPoint]) -> Option<(f64, f64)> {
    let ys = curve.iter().map(|&(_, y)| y).chain(
        points
            .iter()
            .flat_map(|p| [p.mean_response - p.std_response, p.mean_response + p.std_response]),
    );

    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for y in ys.filter(|y| y.is_finite()) {
        lo = lo.min(y);
        hi = hi.max(y);
    }
    if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
        return None;
    }
    let pad = (hi - lo) * 0.05;
    Some((lo - pad, hi + pad))
}
