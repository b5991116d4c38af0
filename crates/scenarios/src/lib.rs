//! Scenario analysis on top of the ROI engine.
//!
//! - `presets`: named multiplier sets (worst / likely / best)
//! - `what_if`: apply multipliers and diff against the baseline
//! - `breakeven`: month-by-month break-even under scaled savings

pub mod breakeven;
pub mod presets;
pub mod what_if;

pub use breakeven::{
    analyze_breakeven, BreakEvenOptions, BreakEvenResult, BreakEvenScenario, MAX_HORIZON_MONTHS,
};
pub use presets::{validate_multipliers, Multipliers, Preset, ScenarioDefinition, PRESET_TABLE};
pub use what_if::{
    apply_scenario, MetricDelta, RoiDelta, ScenarioComparison, ScenarioResult, WhatIfAnalyzer,
};
