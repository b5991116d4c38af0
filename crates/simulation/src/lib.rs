//! Monte Carlo simulation over the ROI engine.
//!
//! - `monte_carlo`: noise model, simulator, aggregated results
//! - `backend`: sequential / rayon batch evaluation
//! - `stats`: moments and interpolated percentiles (statrs)
//! - `seed`: per-iteration seed derivation

pub mod backend;
pub mod monte_carlo;
pub mod seed;
pub mod stats;

pub use backend::NumericBackend;
pub use monte_carlo::{
    run_simulation, MarketScenario, MonteCarloSimulator, NoiseConfig, RiskMetrics,
    ScenarioDraws, SimulationResult,
};
pub use stats::{percentile, summarize, DistributionSummary, Percentiles};
