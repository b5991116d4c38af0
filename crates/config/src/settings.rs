//! Engine settings
//!
//! Every assumption the engine makes (reduction ratios, discount rate, noise
//! parameters, sweep ranges) is a setting with a documented default.

use serde::{Deserialize, Serialize};

use roiforge_core::ReductionTable;
pub use roiforge_finance::IrrSettings;

use crate::ConfigError;

/// Root settings object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub sensitivity: SensitivitySettings,
    #[serde(default)]
    pub breakeven: BreakEvenSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// ROI engine assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Category reduction ratios
    #[serde(default)]
    pub reduction: ReductionTable,

    /// Annual discount rate used for NPV (fraction)
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,

    /// Year-over-year savings growth (fraction)
    #[serde(default)]
    pub growth_rate: f64,

    #[serde(default)]
    pub irr: IrrSettings,
}

/// How Monte Carlo iterations are evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericBackend {
    /// Plain loop on the calling thread.
    #[default]
    Sequential,
    /// Batch evaluation on the rayon thread pool.
    Parallel,
}

impl core::str::FromStr for NumericBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(NumericBackend::Sequential),
            "parallel" => Ok(NumericBackend::Parallel),
            other => Err(ConfigError::InvalidValue {
                field: "simulation.backend".to_string(),
                message: format!("unknown backend '{other}' (expected sequential|parallel)"),
            }),
        }
    }
}

/// One market scenario the simulator draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketScenarioSettings {
    pub name: String,
    /// Draw probability (weights are normalized, they need not sum to 1)
    pub probability: f64,
    /// Multiplier applied to cost-side inputs
    pub factor: f64,
}

/// Monte Carlo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_quick_iterations")]
    pub quick_iterations: usize,
    #[serde(default = "default_full_iterations")]
    pub full_iterations: usize,
    #[serde(default = "default_min_iterations")]
    pub min_iterations: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Std-dev of the Normal(1, sd) multiplier on revenue-side inputs
    #[serde(default = "default_revenue_noise_sd")]
    pub revenue_noise_sd: f64,
    /// Std-dev of the Normal(1, sd) multiplier on cost-side inputs
    #[serde(default = "default_cost_noise_sd")]
    pub cost_noise_sd: f64,
    /// Std-dev of the Normal(1, sd) multiplier on the investment
    #[serde(default = "default_investment_noise_sd")]
    pub investment_noise_sd: f64,

    /// ROI threshold (percent) reported as `probability_above_target`
    #[serde(default = "default_target_roi")]
    pub target_roi_percentage: f64,

    #[serde(default)]
    pub backend: NumericBackend,

    /// Fixed seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_market_scenarios")]
    pub scenarios: Vec<MarketScenarioSettings>,
}

/// Sensitivity sweep settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySettings {
    /// Sweep half-width as a fraction (0.5 = ±50%)
    #[serde(default = "default_range_pct")]
    pub range_pct: f64,
    /// Increments on each side of the baseline
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// Absolute span used when a variable's baseline is zero
    #[serde(default = "default_additive_span")]
    pub additive_span: f64,
}

/// Break-even settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenSettings {
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,
    #[serde(default = "default_conservative_factor")]
    pub conservative_factor: f64,
    #[serde(default = "default_realistic_factor")]
    pub realistic_factor: f64,
    #[serde(default = "default_optimistic_factor")]
    pub optimistic_factor: f64,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

// Default values
fn default_discount_rate() -> f64 {
    0.10
}

fn default_quick_iterations() -> usize {
    1_000
}

fn default_full_iterations() -> usize {
    10_000
}

fn default_min_iterations() -> usize {
    100
}

fn default_max_iterations() -> usize {
    50_000
}

fn default_revenue_noise_sd() -> f64 {
    0.10
}

fn default_cost_noise_sd() -> f64 {
    0.15
}

fn default_investment_noise_sd() -> f64 {
    0.10
}

fn default_target_roi() -> f64 {
    50.0
}

fn default_market_scenarios() -> Vec<MarketScenarioSettings> {
    vec![
        MarketScenarioSettings {
            name: "conservative".to_string(),
            probability: 0.25,
            factor: 0.8,
        },
        MarketScenarioSettings {
            name: "realistic".to_string(),
            probability: 0.50,
            factor: 1.0,
        },
        MarketScenarioSettings {
            name: "optimistic".to_string(),
            probability: 0.25,
            factor: 1.2,
        },
    ]
}

fn default_range_pct() -> f64 {
    0.5
}

fn default_steps() -> usize {
    5
}

fn default_additive_span() -> f64 {
    1_000.0
}

fn default_horizon_months() -> u32 {
    120
}

fn default_conservative_factor() -> f64 {
    0.8
}

fn default_realistic_factor() -> f64 {
    1.0
}

fn default_optimistic_factor() -> f64 {
    1.2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reduction: ReductionTable::default(),
            discount_rate: default_discount_rate(),
            growth_rate: 0.0,
            irr: IrrSettings::default(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            quick_iterations: default_quick_iterations(),
            full_iterations: default_full_iterations(),
            min_iterations: default_min_iterations(),
            max_iterations: default_max_iterations(),
            revenue_noise_sd: default_revenue_noise_sd(),
            cost_noise_sd: default_cost_noise_sd(),
            investment_noise_sd: default_investment_noise_sd(),
            target_roi_percentage: default_target_roi(),
            backend: NumericBackend::default(),
            seed: None,
            scenarios: default_market_scenarios(),
        }
    }
}

impl Default for SensitivitySettings {
    fn default() -> Self {
        Self {
            range_pct: default_range_pct(),
            steps: default_steps(),
            additive_span: default_additive_span(),
        }
    }
}

impl Default for BreakEvenSettings {
    fn default() -> Self {
        Self {
            horizon_months: default_horizon_months(),
            conservative_factor: default_conservative_factor(),
            realistic_factor: default_realistic_factor(),
            optimistic_factor: default_optimistic_factor(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl SimulationSettings {
    /// Iteration count for quick or full mode.
    pub fn iterations_for(&self, quick_mode: bool) -> usize {
        if quick_mode {
            self.quick_iterations
        } else {
            self.full_iterations
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

fn check_rate(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= -1.0 {
        return Err(invalid(field, format!("must be finite and > -1, got {value}")));
    }
    Ok(())
}

fn check_sd(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, format!("must be finite and >= 0, got {value}")));
    }
    Ok(())
}

fn check_factor(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, format!("must be finite and >= 0, got {value}")));
    }
    Ok(())
}

impl Settings {
    /// Check every section; the first offending field is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.simulation.validate()?;
        self.sensitivity.validate()?;
        self.breakeven.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(invalid("logging.level", "cannot be empty"));
        }
        Ok(())
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reduction
            .validate()
            .map_err(|e| invalid("engine.reduction", e.to_string()))?;
        check_rate("engine.discount_rate", self.discount_rate)?;
        check_rate("engine.growth_rate", self.growth_rate)?;

        let irr = &self.irr;
        if irr.max_iterations == 0 {
            return Err(invalid("engine.irr.max_iterations", "must be at least 1"));
        }
        if !(irr.tolerance.is_finite() && irr.tolerance > 0.0) {
            return Err(invalid("engine.irr.tolerance", "must be a finite positive number"));
        }
        check_rate("engine.irr.lower_bound", irr.lower_bound)?;
        if !irr.upper_bound.is_finite() || irr.upper_bound <= irr.lower_bound {
            return Err(invalid("engine.irr.upper_bound", "must be greater than lower_bound"));
        }
        if !(irr.lower_bound..=irr.upper_bound).contains(&irr.initial_guess) {
            return Err(invalid(
                "engine.irr.initial_guess",
                "must lie within [lower_bound, upper_bound]",
            ));
        }
        Ok(())
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_iterations == 0 || self.min_iterations > self.max_iterations {
            return Err(invalid(
                "simulation.min_iterations",
                "must be at least 1 and not above max_iterations",
            ));
        }
        for (field, value) in [
            ("simulation.quick_iterations", self.quick_iterations),
            ("simulation.full_iterations", self.full_iterations),
        ] {
            if value < self.min_iterations || value > self.max_iterations {
                return Err(invalid(
                    field,
                    format!(
                        "must lie within [{}, {}], got {value}",
                        self.min_iterations, self.max_iterations
                    ),
                ));
            }
        }
        check_sd("simulation.revenue_noise_sd", self.revenue_noise_sd)?;
        check_sd("simulation.cost_noise_sd", self.cost_noise_sd)?;
        check_sd("simulation.investment_noise_sd", self.investment_noise_sd)?;
        if !self.target_roi_percentage.is_finite() {
            return Err(invalid("simulation.target_roi_percentage", "must be finite"));
        }

        if self.scenarios.is_empty() {
            return Err(invalid("simulation.scenarios", "at least one scenario is required"));
        }
        let mut total = 0.0;
        for scenario in &self.scenarios {
            if !scenario.probability.is_finite() || scenario.probability < 0.0 {
                return Err(invalid(
                    "simulation.scenarios.probability",
                    format!("scenario '{}' has an invalid probability", scenario.name),
                ));
            }
            check_factor("simulation.scenarios.factor", scenario.factor)?;
            total += scenario.probability;
        }
        if total <= 0.0 {
            return Err(invalid(
                "simulation.scenarios.probability",
                "probabilities must not all be zero",
            ));
        }
        Ok(())
    }
}

impl SensitivitySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.range_pct.is_finite() && self.range_pct > 0.0 && self.range_pct < 1.0) {
            return Err(invalid("sensitivity.range_pct", "must lie strictly between 0 and 1"));
        }
        if !(1..=100).contains(&self.steps) {
            return Err(invalid("sensitivity.steps", "must lie within [1, 100]"));
        }
        if !(self.additive_span.is_finite() && self.additive_span > 0.0) {
            return Err(invalid("sensitivity.additive_span", "must be a finite positive number"));
        }
        Ok(())
    }
}

impl BreakEvenSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=600).contains(&self.horizon_months) {
            return Err(invalid("breakeven.horizon_months", "must lie within [1, 600]"));
        }
        check_factor("breakeven.conservative_factor", self.conservative_factor)?;
        check_factor("breakeven.realistic_factor", self.realistic_factor)?;
        check_factor("breakeven.optimistic_factor", self.optimistic_factor)?;
        Ok(())
    }
}
