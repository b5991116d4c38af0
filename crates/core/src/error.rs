//! Calculation error model.

use thiserror::Error;

/// Result type used across the calculation engine.
pub type CalcResult<T> = Result<T, CalcError>;

/// Engine-level error.
///
/// Only deterministic calculation failures live here (validation, numerical
/// convergence). Legitimate business outcomes such as "never pays back" are
/// represented as sentinel values in the result records instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    /// Inputs or options failed validation. Raised before any computation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A numerical solver did not converge within its iteration bound.
    #[error("{method} did not converge after {iterations} iterations: {reason}")]
    Convergence {
        method: &'static str,
        iterations: u32,
        reason: String,
    },

    /// A single Monte Carlo draw produced a non-finite or invalid outcome.
    ///
    /// Soft: the simulator counts these and never returns them to callers.
    #[error("degenerate sample: {0}")]
    DegenerateSample(String),

    /// A percentage sweep was requested on a variable whose baseline is zero.
    ///
    /// Soft: the sensitivity analyzer switches to an additive sweep.
    #[error("undefined sweep for {0}: baseline is zero")]
    UndefinedSweep(String),
}

impl CalcError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn convergence(method: &'static str, iterations: u32, reason: impl Into<String>) -> Self {
        Self::Convergence {
            method,
            iterations,
            reason: reason.into(),
        }
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateSample(msg.into())
    }

    /// True for failures the caller should surface as a rejected request.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Reject NaN/Infinity and negative values for a named field.
pub fn ensure_non_negative(name: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid(format!("{name} must be a finite number")));
    }
    if value < 0.0 {
        return Err(CalcError::invalid(format!("{name} cannot be negative")));
    }
    Ok(())
}

/// Reject NaN/Infinity and values `<= 0` for a named field.
pub fn ensure_positive(name: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid(format!("{name} must be a finite number")));
    }
    if value <= 0.0 {
        return Err(CalcError::invalid(format!("{name} must be greater than zero")));
    }
    Ok(())
}
