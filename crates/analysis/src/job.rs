use serde::{Deserialize, Serialize};

use roiforge_core::BusinessInputs;

use crate::report::AnalysisError;

/// Which analysis produced a report.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Roi,
    Simulation,
    Sensitivity,
    ScenarioComparison,
    BreakEven,
    Comprehensive,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Roi => "roi",
            AnalysisKind::Simulation => "simulation",
            AnalysisKind::Sensitivity => "sensitivity",
            AnalysisKind::ScenarioComparison => "scenario_comparison",
            AnalysisKind::BreakEven => "break_even",
            AnalysisKind::Comprehensive => "comprehensive",
        }
    }
}

impl core::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A self-contained unit of calculation work.
///
/// Jobs own their inputs and options, so a batch of them can be handed to a
/// thread pool. Running a job never mutates it.
pub trait AnalysisJob: Send + Sync + 'static {
    type Output: Serialize + Send + 'static;

    fn kind(&self) -> AnalysisKind;

    /// The business inputs the analysis runs on.
    fn inputs(&self) -> &BusinessInputs;

    fn run(&self) -> Result<Self::Output, AnalysisError>;
}
