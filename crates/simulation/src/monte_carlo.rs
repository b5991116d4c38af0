//! Monte Carlo ROI simulation.
//!
//! Every iteration draws a market scenario and three Normal(1, sd) noise
//! multipliers (revenue group, cost group, investment), re-runs the ROI engine
//! on the perturbed inputs and records the first-year ROI.

use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use roiforge_config::{MarketScenarioSettings, NumericBackend, Settings, SimulationSettings};
use roiforge_core::{BusinessInputs, CalcError, CalcResult, InputField};
use roiforge_engine::{calculate_roi, RoiOptions};

use crate::backend;
use crate::seed::{iteration_rng, random_seed};
use crate::stats::{percentile, probability_above, sorted, summarize_sorted, Percentiles};

/// A named market condition and its draw weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketScenario {
    pub name: String,
    pub probability: f64,
    /// Multiplier applied to the cost group on top of the noise
    pub factor: f64,
}

impl From<&MarketScenarioSettings> for MarketScenario {
    fn from(s: &MarketScenarioSettings) -> Self {
        Self {
            name: s.name.clone(),
            probability: s.probability,
            factor: s.factor,
        }
    }
}

/// Randomness model of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    pub revenue_sd: f64,
    pub cost_sd: f64,
    pub investment_sd: f64,
    pub scenarios: Vec<MarketScenario>,
    /// Fixed base seed; a random one is drawn (and reported) when absent.
    pub seed: Option<u64>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self::from_settings(&SimulationSettings::default())
    }
}

impl NoiseConfig {
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self {
            revenue_sd: settings.revenue_noise_sd,
            cost_sd: settings.cost_noise_sd,
            investment_sd: settings.investment_noise_sd,
            scenarios: settings.scenarios.iter().map(MarketScenario::from).collect(),
            seed: settings.seed,
        }
    }

    /// No noise and a single neutral scenario: every draw equals the baseline.
    pub fn deterministic() -> Self {
        Self {
            revenue_sd: 0.0,
            cost_sd: 0.0,
            investment_sd: 0.0,
            scenarios: vec![MarketScenario {
                name: "baseline".to_string(),
                probability: 1.0,
                factor: 1.0,
            }],
            seed: Some(0),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_scenarios(mut self, scenarios: Vec<MarketScenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        for (name, sd) in [
            ("revenue_sd", self.revenue_sd),
            ("cost_sd", self.cost_sd),
            ("investment_sd", self.investment_sd),
        ] {
            if !sd.is_finite() || sd < 0.0 {
                return Err(CalcError::invalid(format!(
                    "{name} must be finite and >= 0, got {sd}"
                )));
            }
        }
        if self.scenarios.is_empty() {
            return Err(CalcError::invalid("at least one market scenario is required"));
        }
        for scenario in &self.scenarios {
            if !scenario.factor.is_finite() || scenario.factor < 0.0 {
                return Err(CalcError::invalid(format!(
                    "scenario '{}' factor must be finite and >= 0, got {}",
                    scenario.name, scenario.factor
                )));
            }
        }
        Ok(())
    }
}

/// Tail and threshold probabilities of the ROI distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub probability_positive_roi: f64,
    pub probability_above_target: f64,
    pub target_roi_percentage: f64,
    /// 5th percentile ROI
    pub value_at_risk_p5: f64,
}

/// How often each market scenario was drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDraws {
    pub name: String,
    pub draws: usize,
    /// Mean ROI over this scenario's valid draws
    pub mean_roi: Option<f64>,
}

/// Aggregated output of a simulation run.
///
/// Probabilities and moments are taken over the valid samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub iterations: usize,
    pub invalid_samples: usize,
    pub seed: u64,
    pub backend: NumericBackend,
    /// Valid first-year ROI draws, in iteration order
    pub samples: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    pub risk: RiskMetrics,
    pub scenario_draws: Vec<ScenarioDraws>,
}

impl SimulationResult {
    pub fn valid_samples(&self) -> usize {
        self.samples.len()
    }
}

/// Configured simulator. Cheap to clone; holds no run state.
#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    options: RoiOptions,
    noise: NoiseConfig,
    backend: NumericBackend,
    target_roi_percentage: f64,
    quick_iterations: usize,
    full_iterations: usize,
    min_iterations: usize,
    max_iterations: usize,
}

impl Default for MonteCarloSimulator {
    fn default() -> Self {
        Self::new(RoiOptions::default())
    }
}

impl MonteCarloSimulator {
    pub fn new(options: RoiOptions) -> Self {
        Self::with_simulation_settings(options, &SimulationSettings::default())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_simulation_settings(
            RoiOptions::from_settings(&settings.engine),
            &settings.simulation,
        )
    }

    fn with_simulation_settings(options: RoiOptions, settings: &SimulationSettings) -> Self {
        Self {
            options,
            noise: NoiseConfig::from_settings(settings),
            backend: settings.backend,
            target_roi_percentage: settings.target_roi_percentage,
            quick_iterations: settings.quick_iterations,
            full_iterations: settings.full_iterations,
            min_iterations: settings.min_iterations,
            max_iterations: settings.max_iterations,
        }
    }

    pub fn with_options(mut self, options: RoiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise.seed = Some(seed);
        self
    }

    pub fn with_backend(mut self, backend: NumericBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_target_roi(mut self, target_roi_percentage: f64) -> Self {
        self.target_roi_percentage = target_roi_percentage;
        self
    }

    pub fn options(&self) -> &RoiOptions {
        &self.options
    }

    pub fn noise(&self) -> &NoiseConfig {
        &self.noise
    }

    pub fn backend(&self) -> NumericBackend {
        self.backend
    }

    /// Sample count selected by `quick_mode`.
    pub fn default_iterations(&self) -> usize {
        if self.options.quick_mode {
            self.quick_iterations
        } else {
            self.full_iterations
        }
    }

    pub fn run(&self, inputs: &BusinessInputs) -> CalcResult<SimulationResult> {
        self.run_with_iterations(inputs, self.default_iterations())
    }

    pub fn run_with_iterations(
        &self,
        inputs: &BusinessInputs,
        iterations: usize,
    ) -> CalcResult<SimulationResult> {
        if iterations < self.min_iterations || iterations > self.max_iterations {
            return Err(CalcError::invalid(format!(
                "iterations must be in [{}, {}], got {iterations}",
                self.min_iterations, self.max_iterations
            )));
        }
        if !self.target_roi_percentage.is_finite() {
            return Err(CalcError::invalid("target_roi_percentage must be finite"));
        }
        inputs.validate()?;
        self.options.validate()?;
        let sampler = Sampler::new(&self.noise)?;
        let seed = self.noise.seed.unwrap_or_else(random_seed);

        let span = tracing::info_span!(
            "monte_carlo",
            iterations,
            seed,
            backend = ?self.backend
        );
        let _enter = span.enter();

        let draws = backend::evaluate(self.backend, iterations, |i| {
            sampler.draw(inputs, &self.options, seed, i)
        });

        self.aggregate(iterations, seed, draws)
    }

    fn aggregate(
        &self,
        iterations: usize,
        seed: u64,
        draws: Vec<Draw>,
    ) -> CalcResult<SimulationResult> {
        let mut samples = Vec::with_capacity(draws.len());
        let mut per_scenario = vec![(0usize, 0usize, 0.0f64); self.noise.scenarios.len()];
        let mut invalid_samples = 0usize;
        let mut first_error = None;

        for draw in draws {
            let slot = &mut per_scenario[draw.scenario];
            slot.0 += 1;
            match draw.roi {
                Ok(roi) => {
                    slot.1 += 1;
                    slot.2 += roi;
                    samples.push(roi);
                }
                Err(err) => {
                    invalid_samples += 1;
                    first_error.get_or_insert(err);
                }
            }
        }

        if invalid_samples > 0 {
            tracing::warn!(
                invalid_samples,
                iterations,
                first_error = ?first_error,
                "degenerate draws excluded from aggregation"
            );
        }

        let ordered = sorted(&samples);
        let summary = summarize_sorted(&ordered).ok_or_else(|| {
            CalcError::invalid(format!(
                "all {iterations} simulation draws were degenerate"
            ))
        })?;

        let risk = RiskMetrics {
            probability_positive_roi: probability_above(&samples, 0.0),
            probability_above_target: probability_above(&samples, self.target_roi_percentage),
            target_roi_percentage: self.target_roi_percentage,
            value_at_risk_p5: percentile(&ordered, 5.0),
        };

        let scenario_draws = self
            .noise
            .scenarios
            .iter()
            .zip(per_scenario)
            .map(|(scenario, (draws, valid, sum))| ScenarioDraws {
                name: scenario.name.clone(),
                draws,
                mean_roi: (valid > 0).then(|| sum / valid as f64),
            })
            .collect();

        tracing::debug!(
            mean = summary.mean,
            std_dev = summary.std_dev,
            p50 = summary.percentiles.p50,
            probability_positive_roi = risk.probability_positive_roi,
            "simulation complete"
        );

        Ok(SimulationResult {
            iterations,
            invalid_samples,
            seed,
            backend: self.backend,
            samples,
            mean: summary.mean,
            std_dev: summary.std_dev,
            min: summary.min,
            max: summary.max,
            percentiles: summary.percentiles,
            risk,
            scenario_draws,
        })
    }
}

/// Run a simulation with default engine options on the sequential backend.
pub fn run_simulation(
    inputs: &BusinessInputs,
    iterations: usize,
    noise: &NoiseConfig,
) -> CalcResult<SimulationResult> {
    MonteCarloSimulator::default()
        .with_noise(noise.clone())
        .with_backend(NumericBackend::Sequential)
        .run_with_iterations(inputs, iterations)
}

struct Draw {
    scenario: usize,
    roi: CalcResult<f64>,
}

/// Distributions built once per run, shared by all iterations.
struct Sampler {
    scenarios: WeightedIndex<f64>,
    factors: Vec<f64>,
    revenue: Option<Normal>,
    cost: Option<Normal>,
    investment: Option<Normal>,
}

impl Sampler {
    fn new(noise: &NoiseConfig) -> CalcResult<Self> {
        noise.validate()?;
        let scenarios = WeightedIndex::new(noise.scenarios.iter().map(|s| s.probability))
            .map_err(|e| CalcError::invalid(format!("invalid scenario probabilities: {e}")))?;

        Ok(Self {
            scenarios,
            factors: noise.scenarios.iter().map(|s| s.factor).collect(),
            revenue: unit_normal(noise.revenue_sd)?,
            cost: unit_normal(noise.cost_sd)?,
            investment: unit_normal(noise.investment_sd)?,
        })
    }

    fn draw(&self, inputs: &BusinessInputs, options: &RoiOptions, seed: u64, i: usize) -> Draw {
        let mut rng = iteration_rng(seed, i);
        let scenario = self.scenarios.sample(&mut rng);

        let revenue = multiplier(self.revenue.as_ref(), &mut rng);
        let cost = multiplier(self.cost.as_ref(), &mut rng) * self.factors[scenario];
        let investment = multiplier(self.investment.as_ref(), &mut rng);

        let factors: Vec<(InputField, f64)> = InputField::REVENUE
            .iter()
            .map(|&f| (f, revenue))
            .chain(InputField::COSTS.iter().map(|&f| (f, cost)))
            .chain(std::iter::once((InputField::ServiceInvestment, investment)))
            .collect();

        let roi = inputs
            .scaled(factors.iter().map(|(f, m)| (f, m)))
            .and_then(|perturbed| calculate_roi(&perturbed, options))
            .map_err(|e| CalcError::degenerate(e.to_string()))
            .and_then(|result| {
                let roi = result.first_year_roi_percentage;
                if roi.is_finite() {
                    Ok(roi)
                } else {
                    Err(CalcError::degenerate(format!("non-finite roi {roi}")))
                }
            });

        Draw { scenario, roi }
    }
}

fn unit_normal(sd: f64) -> CalcResult<Option<Normal>> {
    if sd == 0.0 {
        return Ok(None);
    }
    Normal::new(1.0, sd)
        .map(Some)
        .map_err(|e| CalcError::invalid(format!("invalid noise sd {sd}: {e}")))
}

fn multiplier<R: rand::Rng>(normal: Option<&Normal>, rng: &mut R) -> f64 {
    normal.map_or(1.0, |n| n.sample(rng).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn same_seed_same_result() {
        let noise = NoiseConfig::default().with_seed(1234);
        let a = run_simulation(&example_inputs(), 1_000, &noise).unwrap();
        let b = run_simulation(&example_inputs(), 1_000, &noise).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed, 1234);
        assert_eq!(a.samples.len() + a.invalid_samples, 1_000);
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let sim = MonteCarloSimulator::default().with_seed(99);
        let seq = sim
            .clone()
            .with_backend(NumericBackend::Sequential)
            .run_with_iterations(&example_inputs(), 2_000)
            .unwrap();
        let par = sim
            .with_backend(NumericBackend::Parallel)
            .run_with_iterations(&example_inputs(), 2_000)
            .unwrap();

        assert_eq!(seq.samples, par.samples);
        assert_eq!(seq.percentiles, par.percentiles);
        assert_eq!(seq.scenario_draws, par.scenario_draws);
    }

    #[test]
    fn unseeded_run_reports_its_seed() {
        let mut noise = NoiseConfig::default();
        noise.seed = None;
        let first = run_simulation(&example_inputs(), 500, &noise).unwrap();
        let replay = run_simulation(&example_inputs(), 500, &noise.with_seed(first.seed)).unwrap();
        assert_eq!(first.samples, replay.samples);
    }

    #[test]
    fn zero_noise_collapses_to_baseline() {
        let baseline = calculate_roi(&example_inputs(), &RoiOptions::default())
            .unwrap()
            .first_year_roi_percentage;
        let result = run_simulation(&example_inputs(), 100, &NoiseConfig::deterministic()).unwrap();

        assert_eq!(result.invalid_samples, 0);
        assert!(result.samples.iter().all(|&r| r == baseline));
        assert_eq!(result.std_dev, 0.0);
        assert_eq!(result.mean, baseline);
        assert_eq!(result.percentiles.p10, baseline);
        assert_eq!(result.percentiles.p90, baseline);
    }

    #[test]
    fn distribution_centers_near_baseline() {
        let result = run_simulation(
            &example_inputs(),
            10_000,
            &NoiseConfig::default().with_seed(7),
        )
        .unwrap();

        let p = result.percentiles;
        assert!(p.p10 <= p.p25 && p.p25 <= p.p50 && p.p50 <= p.p75 && p.p75 <= p.p90);
        assert!(result.min <= p.p10 && p.p90 <= result.max);
        assert!(result.risk.value_at_risk_p5 <= p.p10);
        // Baseline ROI is 105.2%; scenario weights are symmetric around 1.0.
        assert!((result.mean - 105.2).abs() < 15.0, "mean = {}", result.mean);
        assert!(result.std_dev > 0.0);
        assert!(result.risk.probability_positive_roi > 0.9);
        assert!((0.0..=1.0).contains(&result.risk.probability_above_target));
    }

    #[test]
    fn scenario_draw_counts_follow_weights() {
        let result = run_simulation(
            &example_inputs(),
            10_000,
            &NoiseConfig::default().with_seed(11),
        )
        .unwrap();

        let total: usize = result.scenario_draws.iter().map(|s| s.draws).sum();
        assert_eq!(total, 10_000);
        let realistic = result
            .scenario_draws
            .iter()
            .find(|s| s.name == "realistic")
            .unwrap();
        let share = realistic.draws as f64 / 10_000.0;
        assert!((share - 0.5).abs() < 0.03, "share = {share}");
    }

    #[test]
    fn iteration_bounds_are_enforced() {
        let noise = NoiseConfig::default().with_seed(1);
        for bad in [0, 99, 50_001] {
            let err = run_simulation(&example_inputs(), bad, &noise).unwrap_err();
            assert!(err.is_invalid_input(), "{bad}: {err}");
        }
        assert!(run_simulation(&example_inputs(), 100, &noise).is_ok());
    }

    #[test]
    fn zero_investment_draws_are_counted_invalid() {
        // N(1, 2) falls below zero about a third of the time; the clamped
        // investment then fails validation.
        let noise = NoiseConfig {
            investment_sd: 2.0,
            ..NoiseConfig::deterministic()
        };

        let result = run_simulation(&example_inputs(), 1_000, &noise).unwrap();
        assert!(result.invalid_samples > 200, "{}", result.invalid_samples);
        assert_eq!(result.samples.len() + result.invalid_samples, 1_000);
        assert!(result.samples.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn all_degenerate_draws_fail() {
        let sim = MonteCarloSimulator::default();
        let draws = (0..3)
            .map(|scenario| Draw {
                scenario,
                roi: Err(CalcError::degenerate("zero investment")),
            })
            .collect();

        let err = sim.aggregate(3, 0, draws).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn bad_noise_is_rejected() {
        let mut noise = NoiseConfig::default().with_seed(1);
        noise.cost_sd = -0.1;
        assert!(run_simulation(&example_inputs(), 100, &noise).is_err());

        let noise = NoiseConfig::default().with_seed(1).with_scenarios(vec![]);
        assert!(run_simulation(&example_inputs(), 100, &noise).is_err());
    }

    #[test]
    fn quick_mode_selects_iteration_count() {
        let sim = MonteCarloSimulator::new(RoiOptions::default().with_quick_mode(true));
        assert_eq!(sim.default_iterations(), 1_000);
        let sim = MonteCarloSimulator::default();
        assert_eq!(sim.default_iterations(), 10_000);
    }
}
