//! Configuration for the calculation engine
//!
//! Supports loading configuration from:
//! - TOML/YAML files
//! - Environment variables (`ROIFORGE_` prefix)
//! - Programmatic construction (every section implements `Default`)

pub mod loader;
pub mod settings;

pub use loader::{load_settings, ENV_PREFIX};
pub use settings::{
    BreakEvenSettings, EngineSettings, IrrSettings, LogFormat, LoggingSettings,
    MarketScenarioSettings, NumericBackend, SensitivitySettings, Settings, SimulationSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}
