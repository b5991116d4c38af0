//! Internal rate of return.
//!
//! Newton-Raphson from the configured guess; when Newton stalls (flat
//! derivative, leaves the bracket, or runs out of iterations) the solver falls
//! back to bisection over a sign-changing bracket inside
//! `[lower_bound, upper_bound]`.

use serde::{Deserialize, Serialize};

use roiforge_core::{CalcError, CalcResult};

use crate::cashflow::npv_of_series;

const METHOD: &str = "irr";

/// Bounds for the IRR root finder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrSettings {
    #[serde(default = "default_irr_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_irr_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_irr_initial_guess")]
    pub initial_guess: f64,
    #[serde(default = "default_irr_lower_bound")]
    pub lower_bound: f64,
    #[serde(default = "default_irr_upper_bound")]
    pub upper_bound: f64,
}

impl Default for IrrSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_irr_max_iterations(),
            tolerance: default_irr_tolerance(),
            initial_guess: default_irr_initial_guess(),
            lower_bound: default_irr_lower_bound(),
            upper_bound: default_irr_upper_bound(),
        }
    }
}

fn default_irr_max_iterations() -> u32 {
    100
}

fn default_irr_tolerance() -> f64 {
    1e-7
}

fn default_irr_initial_guess() -> f64 {
    0.10
}

fn default_irr_lower_bound() -> f64 {
    -0.99
}

fn default_irr_upper_bound() -> f64 {
    10.0
}

/// Grid resolution used to look for a sign change when the bracket
/// endpoints share a sign.
const BRACKET_SCAN_POINTS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrMethod {
    Newton,
    Bisection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    pub rate: f64,
    pub iterations: u32,
    pub method: IrrMethod,
}

/// Solve `NPV(rate) = 0` for flows where `cash_flows[0]` occurs at t = 0.
pub fn irr(cash_flows: &[f64], settings: &IrrSettings) -> CalcResult<IrrSolution> {
    if cash_flows.len() < 2 {
        return Err(CalcError::invalid("IRR requires at least 2 cash flows"));
    }
    if cash_flows.iter().any(|cf| !cf.is_finite()) {
        return Err(CalcError::invalid("IRR cash flows must be finite"));
    }

    let has_positive = cash_flows.iter().any(|cf| *cf > 0.0);
    let has_negative = cash_flows.iter().any(|cf| *cf < 0.0);
    if !(has_positive && has_negative) {
        return Err(CalcError::convergence(
            METHOD,
            0,
            "cash flows never change sign",
        ));
    }

    let scale = cash_flows.iter().fold(1.0_f64, |acc, cf| acc.max(cf.abs()));
    let npv_tolerance = settings.tolerance * scale;

    if let Some(solution) = newton(cash_flows, settings, npv_tolerance) {
        return Ok(solution);
    }

    tracing::trace!("newton did not converge for irr, falling back to bisection");
    bisection(cash_flows, settings, npv_tolerance)
}

fn npv_derivative(rate: f64, cash_flows: &[f64]) -> f64 {
    let one_plus_r = 1.0 + rate;
    cash_flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, cf)| -(t as f64) * cf / one_plus_r.powi(t as i32 + 1))
        .sum()
}

fn newton(cash_flows: &[f64], settings: &IrrSettings, npv_tolerance: f64) -> Option<IrrSolution> {
    let mut rate = settings.initial_guess;

    for iteration in 1..=settings.max_iterations {
        let value = npv_of_series(rate, cash_flows);
        if value.abs() <= npv_tolerance {
            return Some(IrrSolution {
                rate,
                iterations: iteration,
                method: IrrMethod::Newton,
            });
        }

        let slope = npv_derivative(rate, cash_flows);
        if slope == 0.0 || !slope.is_finite() {
            return None;
        }

        let next = rate - value / slope;
        if !next.is_finite() || next <= settings.lower_bound || next >= settings.upper_bound {
            return None;
        }

        if (next - rate).abs() <= settings.tolerance {
            return Some(IrrSolution {
                rate: next,
                iterations: iteration,
                method: IrrMethod::Newton,
            });
        }
        rate = next;
    }

    None
}

fn find_bracket(cash_flows: &[f64], lower: f64, upper: f64) -> Option<(f64, f64)> {
    let step = (upper - lower) / BRACKET_SCAN_POINTS as f64;
    let mut lo = lower;
    let mut lo_value = npv_of_series(lo, cash_flows);

    for i in 1..=BRACKET_SCAN_POINTS {
        let hi = lower + step * i as f64;
        let hi_value = npv_of_series(hi, cash_flows);
        if lo_value == 0.0 {
            return Some((lo, lo));
        }
        if lo_value.signum() != hi_value.signum() {
            return Some((lo, hi));
        }
        lo = hi;
        lo_value = hi_value;
    }

    None
}

fn bisection(
    cash_flows: &[f64],
    settings: &IrrSettings,
    npv_tolerance: f64,
) -> CalcResult<IrrSolution> {
    let Some((mut lo, mut hi)) =
        find_bracket(cash_flows, settings.lower_bound, settings.upper_bound)
    else {
        return Err(CalcError::convergence(
            METHOD,
            settings.max_iterations,
            format!(
                "no sign change of NPV within [{}, {}]",
                settings.lower_bound, settings.upper_bound
            ),
        ));
    };

    let mut lo_value = npv_of_series(lo, cash_flows);

    for iteration in 1..=settings.max_iterations {
        let mid = 0.5 * (lo + hi);
        let mid_value = npv_of_series(mid, cash_flows);

        if mid_value.abs() <= npv_tolerance || 0.5 * (hi - lo) <= settings.tolerance {
            return Ok(IrrSolution {
                rate: mid,
                iterations: iteration,
                method: IrrMethod::Bisection,
            });
        }

        if lo_value.signum() == mid_value.signum() {
            lo = mid;
            lo_value = mid_value;
        } else {
            hi = mid;
        }
    }

    Err(CalcError::convergence(
        METHOD,
        settings.max_iterations,
        format!("bracket [{lo}, {hi}] still wider than tolerance"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> IrrSettings {
        IrrSettings::default()
    }

    #[test]
    fn single_period_irr_is_exact() {
        let solution = irr(&[-100.0, 110.0], &settings()).unwrap();
        assert!((solution.rate - 0.10).abs() < 1e-7);
    }

    #[test]
    fn irr_zeroes_npv() {
        let flows = [-50_000.0, 102_600.0, 102_600.0, 102_600.0];
        let solution = irr(&flows, &settings()).unwrap();
        assert!(npv_of_series(solution.rate, &flows).abs() < 0.05);
        assert!(solution.rate > 1.5 && solution.rate < 2.5, "rate = {}", solution.rate);
    }

    #[test]
    fn no_sign_change_is_a_convergence_error() {
        let err = irr(&[-50_000.0, 0.0, 0.0, 0.0], &settings()).unwrap_err();
        assert!(matches!(err, CalcError::Convergence { method: "irr", .. }));
    }

    #[test]
    fn bisection_takes_over_when_newton_cannot_start() {
        // Guess far outside where Newton can make progress with a tiny budget.
        let tight = IrrSettings {
            max_iterations: 200,
            initial_guess: 9.9,
            ..IrrSettings::default()
        };
        let flows = [-1_000.0, 100.0, 100.0, 1_100.0];
        let solution = irr(&flows, &tight).unwrap();
        assert!((solution.rate - 0.10).abs() < 1e-6, "rate = {}", solution.rate);
    }

    #[test]
    fn root_outside_bounds_is_undetermined() {
        // IRR is 1999% here, far beyond the upper bound of 1000%.
        let err = irr(&[-1.0, 20.0], &settings()).unwrap_err();
        assert!(matches!(err, CalcError::Convergence { .. }));
    }

    #[test]
    fn too_few_flows_is_invalid() {
        assert!(irr(&[-1.0], &settings()).unwrap_err().is_invalid_input());
    }

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: whenever the solver returns a rate, NPV at that rate is ~0.
        #[test]
        fn returned_rate_is_a_root(
            investment in 1_000.0f64..100_000.0f64,
            ratio in 0.05f64..3.0f64,
        ) {
            let annual = investment * ratio;
            let flows = [-investment, annual, annual, annual];
            let solution = irr(&flows, &settings()).unwrap();
            let residual = npv_of_series(solution.rate, &flows);
            prop_assert!(residual.abs() <= 1e-5 * investment.max(annual), "residual {}", residual);
        }
    }
}
