//! Text report for a finished calculation.

use crate::domain::FitResult;
use crate::report::compute_residuals;

/// Format the headline IC50, per-concentration statistics and fit diagnostics.
pub fn format_result(result: &FitResult, units: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("IC50 = {:.2} {units}\n", result.ic50));
    out.push('\n');

    out.push_str("Means and standard deviations:\n");
    for p in &result.points {
        out.push_str(&format!(
            "{}: {:.1} ± {:.1}\n",
            p.concentration, p.mean_response, p.std_response
        ));
    }

    out.push_str("\n4PL parameters:\n");
    out.push_str(&format!("- top (a)   : {:.4}\n", result.params.a));
    out.push_str(&format!("- slope (b) : {:.4}\n", result.params.b));
    out.push_str(&format!("- IC50 (c)  : {:.4} {units}\n", result.params.c));
    out.push_str(&format!("- bottom (d): {:.4}\n", result.params.d));

    let q = &result.quality;
    out.push_str("\nFit quality:\n");
    out.push_str(&format!(
        "- SSE={:.4} RMSE={:.4} R²={:.4} n={} evaluations={}\n",
        q.sse, q.rmse, q.r_squared, q.n, q.evaluations
    ));

    out
}

/// Format observed vs fitted values per concentration.
pub fn format_residual_table(result: &FitResult, units: &str) -> String {
    let mut out = String::new();
    let conc_header = format!("conc ({units})");
    out.push_str(
        format!(
            "{:<14} {:>10} {:>8} {:>10} {:>10}\n",
            conc_header, "mean", "sd", "fitted", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<14} {:-<10} {:-<8} {:-<10} {:-<10}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in compute_residuals(result) {
        out.push_str(
            format!(
                "{:<14} {:>10.2} {:>8.2} {:>10.2} {:>10.2}\n",
                r.point.concentration, r.point.mean_response, r.point.std_response, r.fitted, r.residual
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}
