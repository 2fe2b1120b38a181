//! Optional TOML settings file.
//!
//! Every key is optional; values given on the command line (or through the
//! `IC50_*` environment variables) take precedence.
//!
//! ```toml
//! max_evaluations = 10000
//! curve_samples = 100
//! guess = "auto"
//! tolerance = 1e-10
//! units = "nM"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::domain::GuessKind;
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub max_evaluations: Option<usize>,
    pub curve_samples: Option<usize>,
    pub guess: Option<GuessKind>,
    pub tolerance: Option<f64>,
    pub units: Option<String>,
}

pub fn load_settings(path: &Path) -> Result<SettingsFile, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;
    parse_settings(&text).map_err(|e| AppError::new(2, format!("{}: {e}", path.display())))
}

pub fn parse_settings(text: &str) -> Result<SettingsFile, AppError> {
    toml::from_str(text).map_err(|e| AppError::new(2, format!("Invalid config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_parse() {
        let s = parse_settings("guess = \"auto\"\nunits = \"nM\"\n").unwrap();
        assert_eq!(s.guess, Some(GuessKind::Auto));
        assert_eq!(s.units.as_deref(), Some("nM"));
        assert_eq!(s.max_evaluations, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_settings("maxfev = 10").is_err());
    }
}
