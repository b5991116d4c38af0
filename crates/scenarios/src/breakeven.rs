//! Break-even timing under conservative / realistic / optimistic savings.

use serde::{Deserialize, Serialize};

use roiforge_config::{BreakEvenSettings, Settings};
use roiforge_core::{BusinessInputs, CalcError, CalcResult};
use roiforge_engine::{compute_savings, RoiOptions};

/// Longest horizon the month-by-month scan accepts.
pub const MAX_HORIZON_MONTHS: u32 = 600;

/// Relative slack when comparing cumulative savings to the investment.
const BREAKEVEN_TOLERANCE: f64 = 1e-9;

/// Savings scaling factor with a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenScenario {
    pub name: String,
    pub factor: f64,
}

impl BreakEvenScenario {
    pub fn new(name: impl Into<String>, factor: f64) -> Self {
        Self {
            name: name.into(),
            factor,
        }
    }

    /// Conservative 0.8, realistic 1.0, optimistic 1.2.
    pub fn standard() -> Vec<Self> {
        Self::from_settings(&BreakEvenSettings::default())
    }

    pub fn from_settings(settings: &BreakEvenSettings) -> Vec<Self> {
        vec![
            Self::new("conservative", settings.conservative_factor),
            Self::new("realistic", settings.realistic_factor),
            Self::new("optimistic", settings.optimistic_factor),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenOptions {
    pub roi: RoiOptions,
    pub horizon_months: u32,
}

impl Default for BreakEvenOptions {
    fn default() -> Self {
        Self {
            roi: RoiOptions::default(),
            horizon_months: BreakEvenSettings::default().horizon_months,
        }
    }
}

impl BreakEvenOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            roi: RoiOptions::from_settings(&settings.engine),
            horizon_months: settings.breakeven.horizon_months,
        }
    }

    pub fn with_horizon(mut self, horizon_months: u32) -> Self {
        self.horizon_months = horizon_months;
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.horizon_months == 0 || self.horizon_months > MAX_HORIZON_MONTHS {
            return Err(CalcError::invalid(format!(
                "horizon_months must be in [1, {MAX_HORIZON_MONTHS}], got {}",
                self.horizon_months
            )));
        }
        self.roi.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenResult {
    pub scenario: String,
    pub factor: f64,
    /// Baseline monthly savings times `factor`
    pub monthly_savings: f64,
    pub investment: f64,
    pub horizon_months: u32,
    /// First month (1-based) whose cumulative savings cover the investment
    pub breakeven_month: Option<u32>,
    /// `investment / monthly_savings`; `None` without savings
    pub exact_months: Option<f64>,
    /// At the break-even month, or at the horizon when it is not reached
    pub cumulative_savings: f64,
    /// Monthly order volume whose proportional savings repay the investment
    /// within the first year
    pub monthly_orders_threshold: Option<f64>,
    /// Same threshold expressed as annual revenue
    pub annual_revenue_threshold: Option<f64>,
}

/// Month-by-month break-even for each scenario.
pub fn analyze_breakeven(
    inputs: &BusinessInputs,
    scenarios: &[BreakEvenScenario],
    options: &BreakEvenOptions,
) -> CalcResult<Vec<BreakEvenResult>> {
    if scenarios.is_empty() {
        return Err(CalcError::invalid("at least one break-even scenario is required"));
    }
    options.validate()?;
    for scenario in scenarios {
        if !scenario.factor.is_finite() || scenario.factor < 0.0 {
            return Err(CalcError::invalid(format!(
                "scenario '{}' factor must be finite and >= 0, got {}",
                scenario.name, scenario.factor
            )));
        }
    }

    let span = tracing::info_span!(
        "breakeven",
        scenarios = scenarios.len(),
        horizon_months = options.horizon_months
    );
    let _enter = span.enter();

    let base_monthly = compute_savings(inputs, &options.roi.reduction_table())?.total_monthly();
    let investment = inputs.service_investment();

    let results = scenarios
        .iter()
        .map(|scenario| {
            let monthly_savings = base_monthly * scenario.factor;
            let (breakeven_month, cumulative) =
                scan_months(investment, monthly_savings, options.horizon_months);

            let annual = monthly_savings * 12.0;
            let volume_ratio = (annual > 0.0).then(|| investment / annual);

            tracing::debug!(
                scenario = %scenario.name,
                monthly_savings,
                breakeven_month = ?breakeven_month,
                "break-even scanned"
            );

            BreakEvenResult {
                scenario: scenario.name.clone(),
                factor: scenario.factor,
                monthly_savings,
                investment,
                horizon_months: options.horizon_months,
                breakeven_month,
                exact_months: (monthly_savings > 0.0).then(|| investment / monthly_savings),
                cumulative_savings: cumulative,
                monthly_orders_threshold: volume_ratio.map(|r| inputs.monthly_orders() * r),
                annual_revenue_threshold: volume_ratio.map(|r| inputs.annual_revenue() * r),
            }
        })
        .collect();

    Ok(results)
}

/// Returns the break-even month and the cumulative savings at the last
/// scanned month.
fn scan_months(investment: f64, monthly_savings: f64, horizon: u32) -> (Option<u32>, f64) {
    let target = investment * (1.0 - BREAKEVEN_TOLERANCE);
    let mut cumulative = 0.0;
    for month in 1..=horizon {
        cumulative += monthly_savings;
        if cumulative >= target {
            return (Some(month), cumulative);
        }
    }
    (None, cumulative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roiforge_core::InputField;

    fn example_inputs() -> BusinessInputs {
        BusinessInputs::builder()
            .annual_revenue(2_000_000.0)
            .monthly_orders(5_000.0)
            .avg_order_value(33.33)
            .labor_costs(8_000.0)
            .shipping_costs(5_000.0)
            .error_costs(2_000.0)
            .inventory_costs(3_000.0)
            .service_investment(50_000.0)
            .build()
            .unwrap()
    }

    fn standard(inputs: &BusinessInputs) -> Vec<BreakEvenResult> {
        analyze_breakeven(inputs, &BreakEvenScenario::standard(), &BreakEvenOptions::default())
            .unwrap()
    }

    #[test]
    fn worked_example_breaks_even_in_month_six() {
        let results = standard(&example_inputs());
        let months: Vec<Option<u32>> = results.iter().map(|r| r.breakeven_month).collect();
        // 6,840 / 8,550 / 10,260 per month against 50,000
        assert_eq!(months, vec![Some(8), Some(6), Some(5)]);

        let realistic = &results[1];
        assert_eq!(realistic.scenario, "realistic");
        assert!((realistic.exact_months.unwrap() - 50_000.0 / 8_550.0).abs() < 1e-12);
        assert!((realistic.cumulative_savings - 51_300.0).abs() < 1e-6);
    }

    #[test]
    fn exact_multiple_breaks_even_on_that_month() {
        // 10,000 monthly savings against 50,000: cumulative hits the target at month 5.
        let inputs = example_inputs()
            .with_field(InputField::LaborCosts, 0.0)
            .unwrap()
            .with_field(InputField::ShippingCosts, 0.0)
            .unwrap()
            .with_field(InputField::InventoryCosts, 0.0)
            .unwrap()
            .with_field(InputField::ErrorCosts, 12_500.0)
            .unwrap();
        let results = standard(&inputs);
        assert_eq!(results[1].breakeven_month, Some(5));
    }

    #[test]
    fn no_savings_never_breaks_even() {
        let inputs = example_inputs()
            .scaled(InputField::COSTS.iter().map(|f| (f, &0.0)))
            .unwrap();

        for result in standard(&inputs) {
            assert_eq!(result.breakeven_month, None);
            assert_eq!(result.exact_months, None);
            assert_eq!(result.monthly_orders_threshold, None);
            assert_eq!(result.cumulative_savings, 0.0);
        }
    }

    #[test]
    fn horizon_cuts_off_slow_payback() {
        let options = BreakEvenOptions::default().with_horizon(5);
        let results =
            analyze_breakeven(&example_inputs(), &BreakEvenScenario::standard(), &options)
                .unwrap();
        assert_eq!(results[0].breakeven_month, None);
        assert_eq!(results[2].breakeven_month, Some(5));
    }

    #[test]
    fn volume_thresholds_scale_with_investment() {
        let realistic = &standard(&example_inputs())[1];
        let ratio = 50_000.0 / 102_600.0;
        assert!((realistic.monthly_orders_threshold.unwrap() - 5_000.0 * ratio).abs() < 1e-9);
        assert!((realistic.annual_revenue_threshold.unwrap() - 2_000_000.0 * ratio).abs() < 1e-6);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let scenarios = BreakEvenScenario::standard();
        for horizon in [0, 601] {
            let options = BreakEvenOptions::default().with_horizon(horizon);
            assert!(analyze_breakeven(&example_inputs(), &scenarios, &options)
                .unwrap_err()
                .is_invalid_input());
        }
        assert!(analyze_breakeven(&example_inputs(), &[], &BreakEvenOptions::default()).is_err());
        let negative = [BreakEvenScenario::new("bad", -0.1)];
        assert!(
            analyze_breakeven(&example_inputs(), &negative, &BreakEvenOptions::default()).is_err()
        );
    }
}
