//! Sensitivity analysis: per-variable ROI sweeps, normalized coefficients
//! and break-even values.

pub mod analyzer;

pub use analyzer::{
    analyze_sensitivity, least_squares_slope, SensitivityAnalyzer, SensitivityOptions,
    SensitivityReport, SensitivityResult, SweepPoint, BREAK_EVEN_TOLERANCE,
    MAX_REFINEMENT_ITERATIONS, MAX_STEPS,
};
