//! Concrete analysis jobs.

use serde::{Deserialize, Serialize};

use roiforge_core::{BusinessInputs, InputField};
use roiforge_engine::{calculate_roi, RoiOptions, RoiResult};
use roiforge_scenarios::{
    analyze_breakeven, BreakEvenOptions, BreakEvenResult, BreakEvenScenario, Preset,
    ScenarioComparison, ScenarioDefinition, WhatIfAnalyzer,
};
use roiforge_sensitivity::{SensitivityAnalyzer, SensitivityOptions, SensitivityReport};
use roiforge_simulation::{MonteCarloSimulator, SimulationResult};

use crate::job::{AnalysisJob, AnalysisKind};
use crate::report::AnalysisError;

/// Variables swept when a caller does not pick any: every cost driver plus
/// the investment.
pub const DEFAULT_SENSITIVITY_VARIABLES: [InputField; 5] = [
    InputField::LaborCosts,
    InputField::ShippingCosts,
    InputField::ErrorCosts,
    InputField::InventoryCosts,
    InputField::ServiceInvestment,
];

#[derive(Debug, Clone)]
pub struct RoiJob {
    inputs: BusinessInputs,
    options: RoiOptions,
}

impl RoiJob {
    pub fn new(inputs: BusinessInputs, options: RoiOptions) -> Self {
        Self { inputs, options }
    }
}

impl AnalysisJob for RoiJob {
    type Output = RoiResult;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Roi
    }

    fn inputs(&self) -> &BusinessInputs {
        &self.inputs
    }

    fn run(&self) -> Result<RoiResult, AnalysisError> {
        Ok(calculate_roi(&self.inputs, &self.options)?)
    }
}

#[derive(Debug, Clone)]
pub struct SimulationJob {
    inputs: BusinessInputs,
    simulator: MonteCarloSimulator,
    iterations: Option<usize>,
}

impl SimulationJob {
    pub fn new(inputs: BusinessInputs, simulator: MonteCarloSimulator) -> Self {
        Self {
            inputs,
            simulator,
            iterations: None,
        }
    }

    /// Override the quick/full iteration count.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }
}

impl AnalysisJob for SimulationJob {
    type Output = SimulationResult;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Simulation
    }

    fn inputs(&self) -> &BusinessInputs {
        &self.inputs
    }

    fn run(&self) -> Result<SimulationResult, AnalysisError> {
        let iterations = self
            .iterations
            .unwrap_or_else(|| self.simulator.default_iterations());
        Ok(self.simulator.run_with_iterations(&self.inputs, iterations)?)
    }
}

#[derive(Debug, Clone)]
pub struct SensitivityJob {
    inputs: BusinessInputs,
    variables: Vec<InputField>,
    options: SensitivityOptions,
}

impl SensitivityJob {
    pub fn new(
        inputs: BusinessInputs,
        variables: Vec<InputField>,
        options: SensitivityOptions,
    ) -> Self {
        Self {
            inputs,
            variables,
            options,
        }
    }
}

impl AnalysisJob for SensitivityJob {
    type Output = SensitivityReport;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Sensitivity
    }

    fn inputs(&self) -> &BusinessInputs {
        &self.inputs
    }

    fn run(&self) -> Result<SensitivityReport, AnalysisError> {
        Ok(SensitivityAnalyzer::new(self.options.clone()).analyze(&self.inputs, &self.variables)?)
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioComparisonJob {
    inputs: BusinessInputs,
    options: RoiOptions,
    scenarios: Vec<ScenarioDefinition>,
}

impl ScenarioComparisonJob {
    pub fn new(
        inputs: BusinessInputs,
        options: RoiOptions,
        scenarios: Vec<ScenarioDefinition>,
    ) -> Self {
        Self {
            inputs,
            options,
            scenarios,
        }
    }

    /// Worst / likely / best presets.
    pub fn presets(inputs: BusinessInputs, options: RoiOptions) -> Self {
        let scenarios = Preset::ALL.iter().map(Preset::definition).collect();
        Self::new(inputs, options, scenarios)
    }
}

impl AnalysisJob for ScenarioComparisonJob {
    type Output = ScenarioComparison;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::ScenarioComparison
    }

    fn inputs(&self) -> &BusinessInputs {
        &self.inputs
    }

    fn run(&self) -> Result<ScenarioComparison, AnalysisError> {
        let analyzer = WhatIfAnalyzer::new(self.inputs.clone(), self.options.clone())?;
        Ok(analyzer.compare(&self.scenarios)?)
    }
}

#[derive(Debug, Clone)]
pub struct BreakEvenJob {
    inputs: BusinessInputs,
    scenarios: Vec<BreakEvenScenario>,
    options: BreakEvenOptions,
}

impl BreakEvenJob {
    pub fn new(
        inputs: BusinessInputs,
        scenarios: Vec<BreakEvenScenario>,
        options: BreakEvenOptions,
    ) -> Self {
        Self {
            inputs,
            scenarios,
            options,
        }
    }
}

impl AnalysisJob for BreakEvenJob {
    type Output = Vec<BreakEvenResult>;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::BreakEven
    }

    fn inputs(&self) -> &BusinessInputs {
        &self.inputs
    }

    fn run(&self) -> Result<Vec<BreakEvenResult>, AnalysisError> {
        Ok(analyze_breakeven(&self.inputs, &self.scenarios, &self.options)?)
    }
}

/// Every analysis for one set of inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    pub roi: RoiResult,
    pub simulation: SimulationResult,
    pub sensitivity: SensitivityReport,
    pub scenarios: ScenarioComparison,
    pub breakeven: Vec<BreakEvenResult>,
}

#[derive(Debug, Clone)]
pub struct ComprehensiveJob {
    roi: RoiJob,
    simulation: SimulationJob,
    sensitivity: SensitivityJob,
    scenarios: ScenarioComparisonJob,
    breakeven: BreakEvenJob,
}

impl ComprehensiveJob {
    pub fn new(
        roi: RoiJob,
        simulation: SimulationJob,
        sensitivity: SensitivityJob,
        scenarios: ScenarioComparisonJob,
        breakeven: BreakEvenJob,
    ) -> Self {
        Self {
            roi,
            simulation,
            sensitivity,
            scenarios,
            breakeven,
        }
    }
}

impl AnalysisJob for ComprehensiveJob {
    type Output = ComprehensiveAnalysis;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Comprehensive
    }

    fn inputs(&self) -> &BusinessInputs {
        self.roi.inputs()
    }

    fn run(&self) -> Result<ComprehensiveAnalysis, AnalysisError> {
        Ok(ComprehensiveAnalysis {
            roi: self.roi.run()?,
            simulation: self.simulation.run()?,
            sensitivity: self.sensitivity.run()?,
            scenarios: self.scenarios.run()?,
            breakeven: self.breakeven.run()?,
        })
    }
}
