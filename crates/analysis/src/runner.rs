use std::time::Instant;

use rayon::prelude::*;

use roiforge_config::Settings;
use roiforge_core::{BatchId, BusinessInputs, InputField};
use roiforge_engine::RoiOptions;
use roiforge_scenarios::{BreakEvenOptions, BreakEvenScenario, ScenarioDefinition};
use roiforge_sensitivity::SensitivityOptions;
use roiforge_simulation::MonteCarloSimulator;

use crate::job::AnalysisJob;
use crate::jobs::{
    BreakEvenJob, ComprehensiveJob, RoiJob, ScenarioComparisonJob, SensitivityJob, SimulationJob,
    DEFAULT_SENSITIVITY_VARIABLES,
};
use crate::report::{AnalysisError, AnalysisReport};

pub type ReportResult<T> = Result<AnalysisReport<T>, AnalysisError>;

/// Executor for analysis jobs.
///
/// Storage and runtime agnostic: reports are returned, never persisted.
pub trait AnalysisScheduler: Send + Sync + 'static {
    fn run<J: AnalysisJob>(&self, job: &J) -> ReportResult<J::Output> {
        let span = tracing::info_span!("analysis_job", kind = %job.kind());
        let _enter = span.enter();

        let started = Instant::now();
        let output = job.run().inspect_err(|err| {
            tracing::warn!(error = %err, "analysis job failed");
        })?;
        let elapsed = started.elapsed();

        tracing::info!(duration_ms = elapsed.as_millis() as u64, "analysis job finished");

        Ok(AnalysisReport::new(job.kind(), output)
            .with_company_name(job.inputs().company_name())
            .with_duration_ms(elapsed.as_millis() as u64))
    }

    /// Run independent jobs on the rayon pool. Results keep the job order.
    fn run_batch<J: AnalysisJob>(&self, jobs: &[J]) -> Vec<ReportResult<J::Output>> {
        let batch_id = BatchId::new();
        tracing::info!(%batch_id, jobs = jobs.len(), "running analysis batch");

        jobs.par_iter()
            .map(|job| self.run(job).map(|report| report.with_batch(batch_id)))
            .collect()
    }
}

/// In-process scheduler that builds jobs from loaded [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisRunner {
    settings: Settings,
}

impl AnalysisRunner {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn roi_options(&self) -> RoiOptions {
        RoiOptions::from_settings(&self.settings.engine)
    }

    pub fn roi_job(&self, inputs: BusinessInputs) -> RoiJob {
        RoiJob::new(inputs, self.roi_options())
    }

    pub fn simulation_job(&self, inputs: BusinessInputs, quick_mode: bool) -> SimulationJob {
        let simulator = MonteCarloSimulator::from_settings(&self.settings)
            .with_options(self.roi_options().with_quick_mode(quick_mode));
        SimulationJob::new(inputs, simulator)
    }

    /// Sweeps the cost drivers and the investment when `variables` is empty.
    pub fn sensitivity_job(
        &self,
        inputs: BusinessInputs,
        variables: &[InputField],
    ) -> SensitivityJob {
        let variables = if variables.is_empty() {
            DEFAULT_SENSITIVITY_VARIABLES.to_vec()
        } else {
            variables.to_vec()
        };
        SensitivityJob::new(inputs, variables, SensitivityOptions::from_settings(&self.settings))
    }

    pub fn scenario_job(
        &self,
        inputs: BusinessInputs,
        scenarios: Vec<ScenarioDefinition>,
    ) -> ScenarioComparisonJob {
        ScenarioComparisonJob::new(inputs, self.roi_options(), scenarios)
    }

    pub fn preset_scenario_job(&self, inputs: BusinessInputs) -> ScenarioComparisonJob {
        ScenarioComparisonJob::presets(inputs, self.roi_options())
    }

    pub fn breakeven_job(&self, inputs: BusinessInputs) -> BreakEvenJob {
        BreakEvenJob::new(
            inputs,
            BreakEvenScenario::from_settings(&self.settings.breakeven),
            BreakEvenOptions::from_settings(&self.settings),
        )
    }

    pub fn comprehensive_job(&self, inputs: BusinessInputs, quick_mode: bool) -> ComprehensiveJob {
        ComprehensiveJob::new(
            self.roi_job(inputs.clone()),
            self.simulation_job(inputs.clone(), quick_mode),
            self.sensitivity_job(inputs.clone(), &[]),
            self.preset_scenario_job(inputs.clone()),
            self.breakeven_job(inputs),
        )
    }
}

impl AnalysisScheduler for AnalysisRunner {}
