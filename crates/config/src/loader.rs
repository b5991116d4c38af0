//! Settings loading
//!
//! Sources, applied in order: file (TOML or YAML), then `ROIFORGE_*`
//! environment variables, then validation.

use std::path::Path;

use crate::settings::{LogFormat, NumericBackend, Settings};
use crate::ConfigError;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ROIFORGE_";

impl Settings {
    /// Parse settings from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse settings from a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(ConfigError::ParseError(format!(
                "unsupported settings file extension: {}",
                path.display()
            ))),
        }
    }

    /// Apply `ROIFORGE_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let vars = std::env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX));
        self.apply_overrides(vars)
    }

    /// Apply `(KEY, value)` overrides. Unknown `ROIFORGE_*` keys are ignored
    /// with a warning.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match name {
                "DISCOUNT_RATE" => self.engine.discount_rate = parse_f64(key, value)?,
                "GROWTH_RATE" => self.engine.growth_rate = parse_f64(key, value)?,
                "QUICK_ITERATIONS" => self.simulation.quick_iterations = parse_usize(key, value)?,
                "FULL_ITERATIONS" => self.simulation.full_iterations = parse_usize(key, value)?,
                "TARGET_ROI" => self.simulation.target_roi_percentage = parse_f64(key, value)?,
                "SIMULATION_BACKEND" => {
                    self.simulation.backend = value.parse::<NumericBackend>()?;
                }
                "SIMULATION_SEED" => {
                    let seed = value.parse::<u64>().map_err(|e| env_error(key, e))?;
                    self.simulation.seed = Some(seed);
                }
                "SENSITIVITY_RANGE" => self.sensitivity.range_pct = parse_f64(key, value)?,
                "SENSITIVITY_STEPS" => self.sensitivity.steps = parse_usize(key, value)?,
                "BREAKEVEN_HORIZON" => {
                    self.breakeven.horizon_months =
                        value.parse::<u32>().map_err(|e| env_error(key, e))?;
                }
                "LOG_LEVEL" => self.logging.level = value.to_string(),
                "LOG_FORMAT" => self.logging.format = parse_log_format(key, value)?,
                _ => tracing::warn!(variable = key, "ignoring unknown settings override"),
            }
        }
        Ok(())
    }
}

/// Load settings: optional file, then environment overrides, then validation.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.apply_env_overrides()?;
    settings.validate()?;
    tracing::debug!(
        file = ?path,
        backend = ?settings.simulation.backend,
        "settings loaded"
    );
    Ok(settings)
}

fn env_error(key: &str, err: impl core::fmt::Display) -> ConfigError {
    ConfigError::Environment(format!("{key}: {err}"))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|e| env_error(key, e))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|e| env_error(key, e))
}

fn parse_log_format(key: &str, value: &str) -> Result<LogFormat, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormat::Json),
        "pretty" => Ok(LogFormat::Pretty),
        "compact" => Ok(LogFormat::Compact),
        other => Err(env_error(key, format!("unknown log format '{other}'"))),
    }
}
