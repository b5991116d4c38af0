//! Deterministic ROI engine.
//!
//! Composes the savings model with the financial primitives:
//! - savings breakdown -> monthly/annual savings
//! - payback period (or `Never` when there are no savings)
//! - first-year ROI, 3-year projection, NPV, IRR

use serde::{Deserialize, Serialize};

use roiforge_config::{EngineSettings, IrrSettings, SimulationSettings};
use roiforge_core::{BusinessInputs, CalcError, CalcResult, ReductionTable};
use roiforge_finance::{
    irr, npv, payback_period, project_savings, roi_percentage, IrrMethod, PaybackPeriod,
    YearProjection,
};

use crate::savings::{compute_savings, SavingsBreakdown};

/// Length of the savings projection, in years.
pub const PROJECTION_YEARS: u32 = 3;

/// Per-call engine options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiOptions {
    /// Only selects the Monte Carlo sample count of chained analyses.
    pub quick_mode: bool,
    /// Overrides the default reduction ratios when set.
    pub reduction_table: Option<ReductionTable>,
    pub discount_rate: f64,
    pub growth_rate: f64,
    pub irr: IrrSettings,
}

impl Default for RoiOptions {
    fn default() -> Self {
        Self::from_settings(&EngineSettings::default())
    }
}

impl RoiOptions {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            quick_mode: false,
            reduction_table: Some(settings.reduction),
            discount_rate: settings.discount_rate,
            growth_rate: settings.growth_rate,
            irr: settings.irr.clone(),
        }
    }

    pub fn with_quick_mode(mut self, quick_mode: bool) -> Self {
        self.quick_mode = quick_mode;
        self
    }

    pub fn with_reduction_table(mut self, table: ReductionTable) -> Self {
        self.reduction_table = Some(table);
        self
    }

    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    pub fn with_growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = rate;
        self
    }

    /// Reduction table in effect for this call.
    pub fn reduction_table(&self) -> ReductionTable {
        self.reduction_table.unwrap_or_default()
    }

    /// Monte Carlo sample count implied by `quick_mode`.
    pub fn iterations(&self, simulation: &SimulationSettings) -> usize {
        simulation.iterations_for(self.quick_mode)
    }

    pub fn validate(&self) -> CalcResult<()> {
        for (name, rate) in [
            ("discount_rate", self.discount_rate),
            ("growth_rate", self.growth_rate),
        ] {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(CalcError::invalid(format!(
                    "{name} must be finite and greater than -1, got {rate}"
                )));
            }
        }
        self.reduction_table().validate()
    }
}

/// Outcome of the IRR solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IrrEstimate {
    Converged {
        rate: f64,
        iterations: u32,
        method: IrrMethod,
    },
    /// No rate zeroes NPV inside the solver bounds.
    Undetermined { reason: String },
}

impl IrrEstimate {
    pub fn rate(&self) -> Option<f64> {
        match self {
            IrrEstimate::Converged { rate, .. } => Some(*rate),
            IrrEstimate::Undetermined { .. } => None,
        }
    }
}

/// Output of [`calculate_roi`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub annual_savings: f64,
    pub monthly_savings: f64,
    pub payback_period: PaybackPeriod,
    pub first_year_roi_percentage: f64,
    pub three_year_projection: Vec<YearProjection>,
    pub npv: f64,
    pub irr: IrrEstimate,
    pub savings: SavingsBreakdown,
}

impl RoiResult {
    /// Payback in months, `f64::INFINITY` when never reached.
    pub fn payback_period_months(&self) -> f64 {
        self.payback_period.as_f64()
    }

    /// Cumulative ROI at the end of the projection.
    pub fn three_year_roi_percentage(&self) -> f64 {
        self.three_year_projection
            .last()
            .map(|y| y.cumulative_roi_percentage)
            .unwrap_or(self.first_year_roi_percentage)
    }

    pub fn three_year_savings(&self) -> f64 {
        self.three_year_projection
            .last()
            .map(|y| y.cumulative_savings)
            .unwrap_or(self.annual_savings)
    }
}

/// Run the full deterministic ROI calculation.
///
/// Fails fast with `InvalidInput`; never coerces negative values. An IRR that
/// cannot be determined is reported in the result, not as an error.
pub fn calculate_roi(inputs: &BusinessInputs, options: &RoiOptions) -> CalcResult<RoiResult> {
    inputs.validate()?;
    options.validate()?;

    let investment = inputs.service_investment();
    let savings = compute_savings(inputs, &options.reduction_table())?;
    let monthly_savings = savings.total_monthly();
    let annual_savings = savings.total_annual();

    let payback_period = payback_period(investment, monthly_savings)?;
    let first_year_roi_percentage = roi_percentage(annual_savings, investment)?;
    let three_year_projection =
        project_savings(annual_savings, options.growth_rate, investment, PROJECTION_YEARS)?;

    let annual_flows: Vec<f64> = three_year_projection.iter().map(|y| y.savings).collect();
    let npv = npv(options.discount_rate, investment, &annual_flows)?;

    let mut cash_flows = Vec::with_capacity(annual_flows.len() + 1);
    cash_flows.push(-investment);
    cash_flows.extend_from_slice(&annual_flows);

    let irr = match irr(&cash_flows, &options.irr) {
        Ok(solution) => IrrEstimate::Converged {
            rate: solution.rate,
            iterations: solution.iterations,
            method: solution.method,
        },
        Err(err @ CalcError::Convergence { .. }) => {
            tracing::debug!(error = %err, "irr undetermined");
            IrrEstimate::Undetermined {
                reason: err.to_string(),
            }
        }
        Err(err) => return Err(err),
    };

    tracing::trace!(
        monthly_savings,
        first_year_roi_percentage,
        npv,
        "roi calculated"
    );

    Ok(RoiResult {
        annual_savings,
        monthly_savings,
        payback_period,
        first_year_roi_percentage,
        three_year_projection,
        npv,
        irr,
        savings,
    })
}
