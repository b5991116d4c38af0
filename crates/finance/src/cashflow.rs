//! Discounting, payback and projection formulas.

use serde::{Deserialize, Serialize};

use roiforge_core::{ensure_non_negative, ensure_positive, CalcError, CalcResult};

/// Months until cumulative savings cover the investment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "months", rename_all = "snake_case")]
pub enum PaybackPeriod {
    Months(f64),
    /// Monthly savings are zero: the investment is never recovered.
    Never,
}

impl PaybackPeriod {
    pub fn months(&self) -> Option<f64> {
        match self {
            PaybackPeriod::Months(m) => Some(*m),
            PaybackPeriod::Never => None,
        }
    }

    /// `f64::INFINITY` for [`PaybackPeriod::Never`].
    pub fn as_f64(&self) -> f64 {
        self.months().unwrap_or(f64::INFINITY)
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, PaybackPeriod::Months(_))
    }
}

/// One year of the savings projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: u32,
    pub savings: f64,
    pub cumulative_savings: f64,
    /// Cumulative ROI against the single upfront investment (percent)
    pub cumulative_roi_percentage: f64,
}

fn ensure_rate(name: &str, rate: f64) -> CalcResult<()> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(CalcError::invalid(format!(
            "{name} must be finite and greater than -1, got {rate}"
        )));
    }
    Ok(())
}

/// `1 / (1 + rate)^period`.
pub fn discount_factor(rate: f64, period: u32) -> f64 {
    1.0 / (1.0 + rate).powi(period as i32)
}

/// NPV of a series whose first element occurs at t = 0.
///
/// No validation: this is the hot path of the IRR solver.
pub fn npv_of_series(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf * discount_factor(rate, t as u32))
        .sum()
}

/// Net present value of annual flows received at the end of years 1..=n,
/// minus an upfront investment.
pub fn npv(rate: f64, investment: f64, annual_flows: &[f64]) -> CalcResult<f64> {
    ensure_rate("discount_rate", rate)?;
    ensure_non_negative("investment", investment)?;

    let discounted: f64 = annual_flows
        .iter()
        .enumerate()
        .map(|(i, cf)| cf * discount_factor(rate, i as u32 + 1))
        .sum();

    Ok(discounted - investment)
}

/// `(gain - cost) / cost * 100`.
pub fn roi_percentage(gain: f64, cost: f64) -> CalcResult<f64> {
    ensure_positive("cost", cost)?;
    Ok((gain - cost) / cost * 100.0)
}

/// Simple payback: `investment / monthly_savings`, or `Never` when savings
/// are not positive.
pub fn payback_period(investment: f64, monthly_savings: f64) -> CalcResult<PaybackPeriod> {
    ensure_positive("investment", investment)?;
    if !monthly_savings.is_finite() {
        return Err(CalcError::invalid("monthly_savings must be a finite number"));
    }
    if monthly_savings <= 0.0 {
        return Ok(PaybackPeriod::Never);
    }
    Ok(PaybackPeriod::Months(investment / monthly_savings))
}

/// Year N savings = `first_year * (1 + growth)^(N-1)`, with cumulative ROI.
pub fn project_savings(
    first_year: f64,
    growth_rate: f64,
    investment: f64,
    years: u32,
) -> CalcResult<Vec<YearProjection>> {
    ensure_rate("growth_rate", growth_rate)?;
    ensure_non_negative("first_year_savings", first_year)?;
    ensure_positive("investment", investment)?;

    let mut cumulative = 0.0;
    let projection = (1..=years)
        .map(|year| {
            let savings = first_year * (1.0 + growth_rate).powi(year as i32 - 1);
            cumulative += savings;
            YearProjection {
                year,
                savings,
                cumulative_savings: cumulative,
                cumulative_roi_percentage: (cumulative - investment) / investment * 100.0,
            }
        })
        .collect();

    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npv_matches_hand_computation() {
        // -1000 + 500/1.1 + 500/1.21 + 500/1.331
        let value = npv(0.10, 1_000.0, &[500.0, 500.0, 500.0]).unwrap();
        assert!((value - 243.4260).abs() < 1e-3, "npv = {value}");
    }

    #[test]
    fn npv_at_zero_rate_is_plain_sum() {
        let value = npv(0.0, 100.0, &[40.0, 40.0, 40.0]).unwrap();
        assert!((value - 20.0).abs() < 1e-12);
    }

    #[test]
    fn npv_rejects_rate_at_minus_one() {
        assert!(npv(-1.0, 100.0, &[10.0]).is_err());
        assert!(npv(f64::NAN, 100.0, &[10.0]).is_err());
    }

    #[test]
    fn series_npv_counts_first_flow_undiscounted() {
        let value = npv_of_series(0.5, &[-100.0, 150.0]);
        assert!(value.abs() < 1e-12);
    }

    #[test]
    fn payback_is_never_for_zero_savings() {
        assert_eq!(payback_period(50_000.0, 0.0).unwrap(), PaybackPeriod::Never);
        assert_eq!(payback_period(50_000.0, -10.0).unwrap(), PaybackPeriod::Never);
        assert_eq!(PaybackPeriod::Never.as_f64(), f64::INFINITY);
    }

    #[test]
    fn payback_divides_investment_by_monthly_savings() {
        let period = payback_period(50_000.0, 8_550.0).unwrap();
        let months = period.months().unwrap();
        assert!((months - 5.847953).abs() < 1e-6);
    }

    #[test]
    fn projection_without_growth_is_flat() {
        let years = project_savings(102_600.0, 0.0, 50_000.0, 3).unwrap();
        assert_eq!(years.len(), 3);
        assert!(years.iter().all(|y| y.savings == 102_600.0));
        assert!((years[2].cumulative_savings - 307_800.0).abs() < 1e-6);
        assert!((years[0].cumulative_roi_percentage - 105.2).abs() < 1e-9);
        assert!((years[2].cumulative_roi_percentage - 515.6).abs() < 1e-9);
    }

    #[test]
    fn projection_compounds_growth() {
        let years = project_savings(1_000.0, 0.10, 500.0, 3).unwrap();
        assert!((years[1].savings - 1_100.0).abs() < 1e-9);
        assert!((years[2].savings - 1_210.0).abs() < 1e-9);
    }

    #[test]
    fn roi_percentage_of_zero_gain_is_minus_hundred() {
        assert_eq!(roi_percentage(0.0, 50_000.0).unwrap(), -100.0);
        assert!(roi_percentage(10.0, 0.0).is_err());
    }

    #[test]
    fn payback_serializes_with_status_tag() {
        let json = serde_json::to_value(PaybackPeriod::Never).unwrap();
        assert_eq!(json, serde_json::json!({"status": "never"}));
        let json = serde_json::to_value(PaybackPeriod::Months(6.0)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "months", "months": 6.0}));
    }
}
