//! Error types.
//!
//! Two layers:
//!
//! - [`Ic50Error`]: the calculation taxonomy raised by aggregation, fitting and
//!   curve synthesis. These propagate to the caller untouched; there is never a
//!   partial result.
//! - [`AppError`]: what the binary reports. It carries a process exit code and a
//!   human-readable message, and is also used for I/O and rendering failures that
//!   have nothing to do with the numerics.

use thiserror::Error;

/// Failure of an IC50 calculation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Ic50Error {
    /// Malformed or inconsistent input (wrong replicate count, non-numeric text,
    /// empty input, non-positive concentration, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not enough distinct concentrations to identify four parameters.
    #[error("Insufficient data: {distinct} distinct concentration(s), at least {required} required")]
    InsufficientData { distinct: usize, required: usize },

    /// The optimizer did not converge, or converged to a degenerate result.
    #[error("Fit did not converge: {0}")]
    FitConvergence(String),
}

impl Ic50Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Ic50Error::InvalidInput(message.into())
    }

    pub fn convergence(message: impl Into<String>) -> Self {
        Ic50Error::FitConvergence(message.into())
    }

    /// Exit code used by the binary for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            Ic50Error::InvalidInput(_) => 2,
            Ic50Error::InsufficientData { .. } => 3,
            Ic50Error::FitConvergence(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<Ic50Error> for AppError {
    fn from(err: Ic50Error) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculation_errors_map_to_distinct_exit_codes() {
        let invalid: AppError = Ic50Error::invalid("bad").into();
        let insufficient: AppError = Ic50Error::InsufficientData { distinct: 3, required: 4 }.into();
        let convergence: AppError = Ic50Error::convergence("stuck").into();

        assert_eq!(invalid.exit_code(), 2);
        assert_eq!(insufficient.exit_code(), 3);
        assert_eq!(convergence.exit_code(), 4);
        assert_eq!(
            insufficient.to_string(),
            "Insufficient data: 3 distinct concentration(s), at least 4 required"
        );
    }
}
