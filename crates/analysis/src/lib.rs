//! `roiforge-analysis`
//!
//! **Responsibility:** job/report boundary over the calculation crates.
//!
//! - Jobs own their inputs and options and never mutate them.
//! - Reports wrap a calculation output with an id, timestamp and timing.
//! - Nothing here persists or renders reports; callers do.

pub mod job;
pub mod jobs;
pub mod report;
pub mod runner;

pub use job::{AnalysisJob, AnalysisKind};
pub use jobs::{
    BreakEvenJob, ComprehensiveAnalysis, ComprehensiveJob, RoiJob, ScenarioComparisonJob,
    SensitivityJob, SimulationJob, DEFAULT_SENSITIVITY_VARIABLES,
};
pub use report::{AnalysisError, AnalysisReport};
pub use runner::{AnalysisRunner, AnalysisScheduler, ReportResult};
