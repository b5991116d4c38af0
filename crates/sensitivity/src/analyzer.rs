//! One-at-a-time sensitivity sweeps.
//!
//! Each variable is swept around its baseline while every other input stays
//! fixed. The ROI engine is re-run at every point.

use serde::{Deserialize, Serialize};

use roiforge_config::{SensitivitySettings, Settings};
use roiforge_core::{BusinessInputs, CalcError, CalcResult, InputField};
use roiforge_engine::{calculate_roi, RoiOptions};

/// `|ROI|` (percentage points) accepted as a break-even root.
pub const BREAK_EVEN_TOLERANCE: f64 = 1e-9;

/// Bound on regula falsi refinements per variable.
pub const MAX_REFINEMENT_ITERATIONS: u32 = 100;

/// Maximum increments on each side of the baseline.
pub const MAX_STEPS: usize = 100;

/// Below this `|ROI_base|` the coefficient is not normalized by it.
const ZERO_BASE_ROI: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityOptions {
    pub roi: RoiOptions,
    /// Sweep half-width as a fraction, in (0, 1)
    pub range_pct: f64,
    /// Increments on each side of the baseline, in [1, 100]
    pub steps: usize,
    /// Additive sweep width for variables whose baseline is zero
    pub additive_span: f64,
}

impl Default for SensitivityOptions {
    fn default() -> Self {
        Self::from_parts(RoiOptions::default(), &SensitivitySettings::default())
    }
}

impl SensitivityOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_parts(
            RoiOptions::from_settings(&settings.engine),
            &settings.sensitivity,
        )
    }

    fn from_parts(roi: RoiOptions, settings: &SensitivitySettings) -> Self {
        Self {
            roi,
            range_pct: settings.range_pct,
            steps: settings.steps,
            additive_span: settings.additive_span,
        }
    }

    pub fn with_range(mut self, range_pct: f64, steps: usize) -> Self {
        self.range_pct = range_pct;
        self.steps = steps;
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        if !(self.range_pct > 0.0 && self.range_pct < 1.0) {
            return Err(CalcError::invalid(format!(
                "range_pct must be in (0, 1), got {}",
                self.range_pct
            )));
        }
        if self.steps == 0 || self.steps > MAX_STEPS {
            return Err(CalcError::invalid(format!(
                "steps must be in [1, {MAX_STEPS}], got {}",
                self.steps
            )));
        }
        if !self.additive_span.is_finite() || self.additive_span <= 0.0 {
            return Err(CalcError::invalid(format!(
                "additive_span must be finite and > 0, got {}",
                self.additive_span
            )));
        }
        self.roi.validate()
    }
}

/// One evaluated point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Fractional change for relative sweeps, absolute delta otherwise
    pub change: f64,
    pub value: f64,
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub variable: InputField,
    pub base_value: f64,
    pub base_roi: f64,
    /// `false` when the baseline was zero and an additive sweep was used
    pub relative_sweep: bool,
    pub points: Vec<SweepPoint>,
    /// Least-squares slope of ROI (pp) against the normalized change
    pub raw_slope: f64,
    pub sensitivity_coefficient: f64,
    /// Variable value at which first-year ROI crosses zero, if in range
    pub break_even_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_roi: f64,
    pub range_pct: f64,
    pub steps: usize,
    /// Ordered by `|sensitivity_coefficient|`, largest first
    pub results: Vec<SensitivityResult>,
}

impl SensitivityReport {
    pub fn get(&self, variable: InputField) -> Option<&SensitivityResult> {
        self.results.iter().find(|r| r.variable == variable)
    }

    pub fn most_sensitive(&self) -> Option<&SensitivityResult> {
        self.results.first()
    }
}

/// Sweep `variables` by `±range_pct` in `steps` increments per side, using
/// default engine options.
pub fn analyze_sensitivity(
    inputs: &BusinessInputs,
    variables: &[InputField],
    range_pct: f64,
    steps: usize,
) -> CalcResult<SensitivityReport> {
    SensitivityAnalyzer::new(SensitivityOptions::default().with_range(range_pct, steps))
        .analyze(inputs, variables)
}

#[derive(Debug, Clone, Default)]
pub struct SensitivityAnalyzer {
    options: SensitivityOptions,
}

impl SensitivityAnalyzer {
    pub fn new(options: SensitivityOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SensitivityOptions {
        &self.options
    }

    pub fn analyze(
        &self,
        inputs: &BusinessInputs,
        variables: &[InputField],
    ) -> CalcResult<SensitivityReport> {
        if variables.is_empty() {
            return Err(CalcError::invalid("at least one variable is required"));
        }
        self.options.validate()?;
        inputs.validate()?;

        let mut unique: Vec<InputField> = Vec::with_capacity(variables.len());
        for variable in variables {
            if !unique.contains(variable) {
                unique.push(*variable);
            }
        }

        let span = tracing::info_span!(
            "sensitivity",
            variables = unique.len(),
            range_pct = self.options.range_pct,
            steps = self.options.steps
        );
        let _enter = span.enter();

        let base_roi = calculate_roi(inputs, &self.options.roi)?.first_year_roi_percentage;

        let mut results = unique
            .into_iter()
            .map(|variable| self.sweep(inputs, variable, base_roi))
            .collect::<CalcResult<Vec<_>>>()?;

        results.sort_by(|a, b| {
            b.sensitivity_coefficient
                .abs()
                .total_cmp(&a.sensitivity_coefficient.abs())
        });

        Ok(SensitivityReport {
            base_roi,
            range_pct: self.options.range_pct,
            steps: self.options.steps,
            results,
        })
    }

    fn sweep(
        &self,
        inputs: &BusinessInputs,
        variable: InputField,
        base_roi: f64,
    ) -> CalcResult<SensitivityResult> {
        let base_value = inputs.get(variable);
        let relative_sweep = base_value != 0.0;
        let steps = self.options.steps as f64;

        // (change, value, regression abscissa)
        let grid: Vec<(f64, f64, f64)> = if relative_sweep {
            let range = self.options.range_pct;
            (-(self.options.steps as i64)..=self.options.steps as i64)
                .map(|k| {
                    let pct = range * k as f64 / steps;
                    (pct, base_value * (1.0 + pct), pct)
                })
                .collect()
        } else {
            tracing::debug!(
                reason = %CalcError::UndefinedSweep(variable.to_string()),
                "falling back to additive sweep"
            );
            let span = self.options.additive_span;
            (0..=2 * self.options.steps)
                .map(|k| {
                    let delta = span * k as f64 / (2.0 * steps);
                    (delta, delta, delta / span)
                })
                .collect()
        };

        let mut points = Vec::with_capacity(grid.len());
        let mut xs = Vec::with_capacity(grid.len());
        for (change, value, x) in grid {
            let roi = self.roi_at(inputs, variable, value)?;
            points.push(SweepPoint { change, value, roi });
            xs.push(x);
        }

        let ys: Vec<f64> = points.iter().map(|p| p.roi).collect();
        let raw_slope = least_squares_slope(&xs, &ys);
        let sensitivity_coefficient = if base_roi.abs() < ZERO_BASE_ROI {
            raw_slope / 100.0
        } else {
            raw_slope / base_roi.abs()
        };

        let break_even_value = self.break_even(inputs, variable, &points)?;

        tracing::debug!(
            variable = %variable,
            relative_sweep,
            raw_slope,
            sensitivity_coefficient,
            break_even_value = ?break_even_value,
            "variable swept"
        );

        Ok(SensitivityResult {
            variable,
            base_value,
            base_roi,
            relative_sweep,
            points,
            raw_slope,
            sensitivity_coefficient,
            break_even_value,
        })
    }

    fn roi_at(&self, inputs: &BusinessInputs, variable: InputField, value: f64) -> CalcResult<f64> {
        let modified = inputs.with_field(variable, value)?;
        Ok(calculate_roi(&modified, &self.options.roi)?.first_year_roi_percentage)
    }

    /// First zero crossing along the sweep, refined on the engine.
    fn break_even(
        &self,
        inputs: &BusinessInputs,
        variable: InputField,
        points: &[SweepPoint],
    ) -> CalcResult<Option<f64>> {
        for pair in points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if lo.roi == 0.0 {
                return Ok(Some(lo.value));
            }
            if hi.roi == 0.0 {
                return Ok(Some(hi.value));
            }
            if lo.roi.signum() != hi.roi.signum() {
                let root = illinois(
                    |v| self.roi_at(inputs, variable, v),
                    (lo.value, lo.roi),
                    (hi.value, hi.roi),
                )?;
                return Ok(Some(root));
            }
        }
        Ok(None)
    }
}

/// Ordinary least-squares slope of `ys` on `xs`; 0 when `xs` has no spread.
pub fn least_squares_slope(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let x_mean = xs[..n].iter().sum::<f64>() / n as f64;
    let y_mean = ys[..n].iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let x_diff = x - x_mean;
        numerator += x_diff * (y - y_mean);
        denominator += x_diff * x_diff;
    }

    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Illinois-modified regula falsi on a sign-changing bracket.
///
/// Starts from the linear interpolation of the bracket. Returns the last
/// estimate when the iteration bound is hit.
fn illinois<F>(f: F, (mut a, mut fa): (f64, f64), (mut b, mut fb): (f64, f64)) -> CalcResult<f64>
where
    F: Fn(f64) -> CalcResult<f64>,
{
    let mut side = 0i8;
    let mut c = (a * fb - b * fa) / (fb - fa);

    for _ in 0..MAX_REFINEMENT_ITERATIONS {
        let fc = f(c)?;
        if fc.abs() < BREAK_EVEN_TOLERANCE {
            return Ok(c);
        }

        if fc.signum() == fb.signum() {
            b = c;
            fb = fc;
            if side == -1 {
                fa *= 0.5;
            }
            side = -1;
        } else {
            a = c;
            fa = fc;
            if side == 1 {
                fb *= 0.5;
            }
            side = 1;
        }

        let next = (a * fb - b * fa) / (fb - fa);
        if next == c {
            return Ok(c);
        }
        c = next;
    }

    tracing::debug!(estimate = c, "break-even refinement hit iteration bound");
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

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

    /// Same costs, investment close to annual savings: ROI base ~2.6%.
    fn marginal_inputs() -> BusinessInputs {
        example_inputs()
            .with_field(InputField::ServiceInvestment, 100_000.0)
            .unwrap()
    }

    #[test]
    fn sweep_has_two_steps_plus_one_points() {
        let report =
            analyze_sensitivity(&example_inputs(), &[InputField::LaborCosts], 0.5, 5).unwrap();
        let labor = report.get(InputField::LaborCosts).unwrap();

        assert_eq!(labor.points.len(), 11);
        assert!(labor.relative_sweep);
        let middle = labor.points[5];
        assert_eq!(middle.change, 0.0);
        assert_eq!(middle.value, 8_000.0);
        assert!((middle.roi - report.base_roi).abs() < 1e-9);
        assert!((labor.points[0].value - 4_000.0).abs() < 1e-9);
        assert!((labor.points[10].value - 12_000.0).abs() < 1e-9);
    }

    #[test]
    fn investment_has_negative_sensitivity() {
        let report = analyze_sensitivity(
            &example_inputs(),
            &[InputField::ServiceInvestment, InputField::LaborCosts],
            0.5,
            5,
        )
        .unwrap();

        assert!(report.get(InputField::ServiceInvestment).unwrap().sensitivity_coefficient < 0.0);
        assert!(report.get(InputField::LaborCosts).unwrap().sensitivity_coefficient > 0.0);
    }

    #[test]
    fn labor_slope_is_exact_for_linear_response() {
        // ROI is linear in labor: d(ROI)/d(pct) = 8000 * 0.6 * 12 / 50000 * 100
        let report =
            analyze_sensitivity(&example_inputs(), &[InputField::LaborCosts], 0.5, 5).unwrap();
        let labor = report.get(InputField::LaborCosts).unwrap();
        assert!((labor.raw_slope - 115.2).abs() < 1e-9, "{}", labor.raw_slope);
        assert!((labor.sensitivity_coefficient - 115.2 / 105.2).abs() < 1e-9);
    }

    #[test]
    fn break_even_value_zeroes_roi() {
        let inputs = marginal_inputs();
        let report = analyze_sensitivity(&inputs, &[InputField::LaborCosts], 0.5, 5).unwrap();
        let labor = report.get(InputField::LaborCosts).unwrap();

        let value = labor.break_even_value.expect("crossing inside ±50%");
        // 45,000 from other categories; labor must supply 55,000 a year.
        assert!((value - 55_000.0 / 12.0 / 0.6).abs() < 1e-6, "{value}");

        let at_root = inputs.with_field(InputField::LaborCosts, value).unwrap();
        let roi = calculate_roi(&at_root, &RoiOptions::default())
            .unwrap()
            .first_year_roi_percentage;
        assert!(roi.abs() < 1e-6, "roi at break-even = {roi}");
    }

    #[test]
    fn nonlinear_break_even_is_refined() {
        // ROI is hyperbolic in the investment; the root is at annual savings.
        let inputs = example_inputs()
            .with_field(InputField::ServiceInvestment, 90_000.0)
            .unwrap();
        let report =
            analyze_sensitivity(&inputs, &[InputField::ServiceInvestment], 0.5, 5).unwrap();
        let value = report.results[0].break_even_value.unwrap();
        assert!((value - 102_600.0).abs() < 1e-4, "{value}");
    }

    #[test]
    fn no_crossing_gives_none() {
        let report =
            analyze_sensitivity(&example_inputs(), &[InputField::ShippingCosts], 0.5, 5).unwrap();
        assert_eq!(report.results[0].break_even_value, None);
    }

    #[test]
    fn zero_base_uses_additive_sweep() {
        let inputs = example_inputs()
            .with_field(InputField::ErrorCosts, 0.0)
            .unwrap();
        let report = analyze_sensitivity(&inputs, &[InputField::ErrorCosts], 0.5, 5).unwrap();
        let errors = &report.results[0];

        assert!(!errors.relative_sweep);
        assert_eq!(errors.points.len(), 11);
        assert_eq!(errors.points[0].value, 0.0);
        assert!((errors.points[10].value - 1_000.0).abs() < 1e-9);
        assert!((errors.points[10].change - 1_000.0).abs() < 1e-9);
        // 1,000 extra error costs = 800 * 12 savings on a 50,000 investment
        assert!((errors.raw_slope - 19.2).abs() < 1e-9, "{}", errors.raw_slope);
    }

    #[test]
    fn revenue_fields_have_zero_sensitivity() {
        let report = analyze_sensitivity(
            &example_inputs(),
            &[InputField::AnnualRevenue, InputField::LaborCosts],
            0.5,
            5,
        )
        .unwrap();
        let revenue = report.get(InputField::AnnualRevenue).unwrap();
        assert!(revenue.raw_slope.abs() < 1e-9);
        assert_eq!(report.results[1].variable, InputField::AnnualRevenue);
    }

    #[test]
    fn results_are_ranked_and_deduplicated() {
        let report = analyze_sensitivity(
            &example_inputs(),
            &[
                InputField::InventoryCosts,
                InputField::LaborCosts,
                InputField::InventoryCosts,
                InputField::ShippingCosts,
            ],
            0.3,
            3,
        )
        .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.most_sensitive().unwrap().variable, InputField::LaborCosts);
        let coefficients: Vec<f64> = report
            .results
            .iter()
            .map(|r| r.sensitivity_coefficient.abs())
            .collect();
        assert!(coefficients.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let inputs = example_inputs();
        let labor = [InputField::LaborCosts];
        for (range, steps) in [(0.0, 5), (1.0, 5), (-0.2, 5), (0.5, 0), (0.5, 101)] {
            let err = analyze_sensitivity(&inputs, &labor, range, steps).unwrap_err();
            assert!(err.is_invalid_input(), "({range}, {steps})");
        }
        assert!(analyze_sensitivity(&inputs, &[], 0.5, 5).unwrap_err().is_invalid_input());
    }

    #[test]
    fn slope_of_flat_abscissa_is_zero() {
        assert_eq!(least_squares_slope(&[1.0, 1.0], &[2.0, 5.0]), 0.0);
        assert_eq!(least_squares_slope(&[1.0], &[2.0]), 0.0);
        assert!((least_squares_slope(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]) - 2.0).abs() < 1e-12);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: any reported break-even value actually zeroes ROI.
        #[test]
        fn reported_break_even_is_a_root(
            investment in 40_000.0f64..200_000.0,
            labor in 1_000.0f64..20_000.0,
        ) {
            let inputs = example_inputs()
                .with_field(InputField::ServiceInvestment, investment).unwrap()
                .with_field(InputField::LaborCosts, labor).unwrap();
            let report = analyze_sensitivity(
                &inputs,
                &[InputField::LaborCosts, InputField::ServiceInvestment],
                0.5,
                4,
            )
            .unwrap();

            for result in &report.results {
                if let Some(value) = result.break_even_value {
                    let roi = calculate_roi(
                        &inputs.with_field(result.variable, value).unwrap(),
                        &RoiOptions::default(),
                    )
                    .unwrap()
                    .first_year_roi_percentage;
                    prop_assert!(
                        roi.abs() < 1e-6,
                        "{:?}: roi {} at {}",
                        result.variable,
                        roi,
                        value
                    );
                }
            }
        }
    }
}
