//! What-if scenarios: scale inputs, re-run the engine, diff against baseline.

use serde::{Deserialize, Serialize};

use roiforge_core::{BusinessInputs, CalcResult};
use roiforge_engine::{calculate_roi, RoiOptions, RoiResult};

use crate::presets::{validate_multipliers, Multipliers, Preset, ScenarioDefinition};

/// Change of one metric between baseline and scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub baseline: f64,
    pub scenario: f64,
    pub absolute: f64,
    /// Relative to `|baseline|`, in percent; `None` for a zero baseline
    pub percentage: Option<f64>,
}

impl MetricDelta {
    pub fn between(baseline: f64, scenario: f64) -> Self {
        let absolute = scenario - baseline;
        Self {
            baseline,
            scenario,
            absolute,
            percentage: (baseline != 0.0).then(|| absolute / baseline.abs() * 100.0),
        }
    }
}

/// Deltas of the top-level ROI metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiDelta {
    pub annual_savings: MetricDelta,
    pub monthly_savings: MetricDelta,
    /// Only when payback is reachable in both runs
    pub payback_period_months: Option<MetricDelta>,
    pub first_year_roi_percentage: MetricDelta,
    pub npv: MetricDelta,
    /// Only when IRR converged in both runs
    pub irr: Option<MetricDelta>,
    pub three_year_roi_percentage: MetricDelta,
}

impl RoiDelta {
    pub fn between(baseline: &RoiResult, scenario: &RoiResult) -> Self {
        let payback = baseline
            .payback_period
            .months()
            .zip(scenario.payback_period.months())
            .map(|(b, s)| MetricDelta::between(b, s));
        let irr = baseline
            .irr
            .rate()
            .zip(scenario.irr.rate())
            .map(|(b, s)| MetricDelta::between(b, s));

        Self {
            annual_savings: MetricDelta::between(baseline.annual_savings, scenario.annual_savings),
            monthly_savings: MetricDelta::between(
                baseline.monthly_savings,
                scenario.monthly_savings,
            ),
            payback_period_months: payback,
            first_year_roi_percentage: MetricDelta::between(
                baseline.first_year_roi_percentage,
                scenario.first_year_roi_percentage,
            ),
            npv: MetricDelta::between(baseline.npv, scenario.npv),
            irr,
            three_year_roi_percentage: MetricDelta::between(
                baseline.three_year_roi_percentage(),
                scenario.three_year_roi_percentage(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub multipliers: Multipliers,
    pub inputs: BusinessInputs,
    pub result: RoiResult,
    pub delta: RoiDelta,
}

/// Baseline plus a batch of scenarios, with best/worst by first-year ROI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub baseline: RoiResult,
    pub scenarios: Vec<ScenarioResult>,
    pub best: Option<String>,
    pub worst: Option<String>,
}

/// Apply one multiplier set, recomputing the baseline.
pub fn apply_scenario(
    inputs: &BusinessInputs,
    multipliers: &Multipliers,
    options: &RoiOptions,
) -> CalcResult<ScenarioResult> {
    WhatIfAnalyzer::new(inputs.clone(), options.clone())?.apply("custom", multipliers)
}

/// Computes the baseline once and reuses it for every scenario.
#[derive(Debug, Clone)]
pub struct WhatIfAnalyzer {
    inputs: BusinessInputs,
    options: RoiOptions,
    baseline: RoiResult,
}

impl WhatIfAnalyzer {
    pub fn new(inputs: BusinessInputs, options: RoiOptions) -> CalcResult<Self> {
        let baseline = calculate_roi(&inputs, &options)?;
        Ok(Self {
            inputs,
            options,
            baseline,
        })
    }

    pub fn inputs(&self) -> &BusinessInputs {
        &self.inputs
    }

    pub fn baseline(&self) -> &RoiResult {
        &self.baseline
    }

    pub fn apply(&self, name: &str, multipliers: &Multipliers) -> CalcResult<ScenarioResult> {
        validate_multipliers(multipliers)?;
        let inputs = self.inputs.scaled(multipliers)?;
        let result = calculate_roi(&inputs, &self.options)?;
        let delta = RoiDelta::between(&self.baseline, &result);

        tracing::debug!(
            scenario = name,
            roi = result.first_year_roi_percentage,
            roi_delta = delta.first_year_roi_percentage.absolute,
            "scenario applied"
        );

        Ok(ScenarioResult {
            name: name.to_string(),
            multipliers: multipliers.clone(),
            inputs,
            result,
            delta,
        })
    }

    pub fn apply_definition(&self, definition: &ScenarioDefinition) -> CalcResult<ScenarioResult> {
        self.apply(&definition.name, &definition.multipliers)
    }

    pub fn apply_preset(&self, preset: Preset) -> CalcResult<ScenarioResult> {
        self.apply_definition(&preset.definition())
    }

    pub fn compare(&self, definitions: &[ScenarioDefinition]) -> CalcResult<ScenarioComparison> {
        let scenarios = definitions
            .iter()
            .map(|d| self.apply_definition(d))
            .collect::<CalcResult<Vec<_>>>()?;

        let by_roi = |a: &&ScenarioResult, b: &&ScenarioResult| {
            a.result
                .first_year_roi_percentage
                .total_cmp(&b.result.first_year_roi_percentage)
        };
        let best = scenarios.iter().max_by(by_roi).map(|s| s.name.clone());
        let worst = scenarios.iter().min_by(by_roi).map(|s| s.name.clone());

        Ok(ScenarioComparison {
            baseline: self.baseline.clone(),
            scenarios,
            best,
            worst,
        })
    }

    /// Worst / likely / best.
    pub fn compare_presets(&self) -> CalcResult<ScenarioComparison> {
        let definitions: Vec<ScenarioDefinition> =
            Preset::ALL.iter().map(Preset::definition).collect();
        self.compare(&definitions)
    }
}
