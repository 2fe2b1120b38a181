//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The concentration axis is log10-scaled, matching the usual dose-response
//! convention.
//!
//! Plot elements:
//! - fitted curve: `-` line
//! - observed means: `o`

use crate::domain::{AggregatedPoint, CurveFile, FitResult};

/// Render a plot for an in-memory fit result.
pub fn render_ascii_plot(result: &FitResult, width: usize, height: usize) -> String {
    let range = x_range(result.points.iter().map(|p| p.concentration))
        .or_else(|| x_range(result.curve_samples.iter().map(|&(x, _)| x)));
    let Some((x_min, x_max)) = range else {
        return "Plot: no data\n".to_string();
    };
    render_plot(&result.points, &result.curve_samples, x_min, x_max, width, height)
}

/// Render a plot from a saved curve JSON file (curve plus saved observations).
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    let curve_points: Vec<(f64, f64)> = curve
        .grid
        .concentration
        .iter()
        .zip(curve.grid.response.iter())
        .map(|(&x, &y)| (x, y))
        .collect();

    let Some((x_min, x_max)) = x_range(curve_points.iter().map(|&(x, _)| x)) else {
        return "Plot: no data\n".to_string();
    };
    render_plot(&curve.points, &curve_points, x_min, x_max, width, height)
}

fn render_plot(
    points: &[AggregatedPoint],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(points, curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let lx_min = x_min.log10();
    let lx_max = x_max.log10();

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    draw_curve(&mut grid, curve, lx_min, lx_max, y_min, y_max);

    for p in points {
        let x = map_x(p.concentration.log10(), lx_min, lx_max, width);
        let y = map_y(p.mean_response, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: conc=[{x_min}, {x_max}] (log) | response=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn x_range(xs: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for x in xs.filter(|x| *x > 0.0) {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(points: &[AggregatedPoint], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in points {
        min_y = min_y.min(p.mean_response);
        max_y = max_y.max(p.mean_response);
    }
    for &(_, y) in curve {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(lx: f64, lx_min: f64, lx_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((lx - lx_min) / (lx_max - lx_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], lx_min: f64, lx_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if x <= 0.0 || !y.is_finite() {
            continue;
        }
        let cx = map_x(x.log10(), lx_min, lx_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, cx, cy, '-');
        } else {
            grid[cy][cx] = '-';
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitParameters, FitQuality};

    #[test]
    fn plot_golden_snapshot_small() {
        let result = FitResult {
            ic50: 1.0,
            params: FitParameters::new(100.0, 1.0, 1.0, 0.0),
            quality: FitQuality {
                sse: 0.0,
                rmse: 0.0,
                r_squared: 1.0,
                n: 2,
                evaluations: 1,
            },
            points: vec![
                AggregatedPoint {
                    concentration: 1.0,
                    mean_response: 0.0,
                    std_response: 0.0,
                },
                AggregatedPoint {
                    concentration: 100.0,
                    mean_response: 100.0,
                    std_response: 0.0,
                },
            ],
            curve_samples: vec![(1.0, 50.0), (10.0, 50.0), (100.0, 50.0)],
        };

        let txt = render_ascii_plot(&result, 10, 5);
        let expected = concat!(
            "Plot: conc=[1, 100] (log) | response=[-5.00, 105.00]\n",
            "         o\n",
            "\n",
            "----------\n",
            "\n",
            "o\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_result_renders_placeholder() {
        let result = FitResult {
            ic50: 1.0,
            params: FitParameters::new(1.0, 1.0, 1.0, 0.0),
            quality: FitQuality {
                sse: 0.0,
                rmse: 0.0,
                r_squared: 1.0,
                n: 0,
                evaluations: 0,
            },
            points: vec![],
            curve_samples: vec![],
        };
        assert_eq!(render_ascii_plot(&result, 20, 5), "Plot: no data\n");
    }
}
