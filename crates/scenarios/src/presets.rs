//! Named multiplier sets.

use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use roiforge_core::{CalcError, CalcResult, InputField};

/// Per-field multipliers. Fields that are absent stay unchanged.
pub type Multipliers = BTreeMap<InputField, f64>;

pub fn validate_multipliers(multipliers: &Multipliers) -> CalcResult<()> {
    for (field, factor) in multipliers {
        if !factor.is_finite() || *factor < 0.0 {
            return Err(CalcError::invalid(format!(
                "multiplier for {field} must be finite and >= 0, got {factor}"
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Worst,
    Likely,
    Best,
}

/// Preset table: (preset, cost factor, revenue factor, investment factor).
///
/// Worst case: the optimization removes less cost, volume dips and the
/// project runs over budget. Best case is the mirror image.
pub const PRESET_TABLE: [(Preset, f64, f64, f64); 3] = [
    (Preset::Worst, 0.8, 0.9, 1.2),
    (Preset::Likely, 1.0, 1.0, 1.0),
    (Preset::Best, 1.2, 1.1, 0.9),
];

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Worst, Preset::Likely, Preset::Best];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Worst => "worst",
            Preset::Likely => "likely",
            Preset::Best => "best",
        }
    }

    pub fn multipliers(&self) -> Multipliers {
        let (_, cost, revenue, investment) = PRESET_TABLE
            .iter()
            .copied()
            .find(|(preset, ..)| preset == self)
            .unwrap_or((*self, 1.0, 1.0, 1.0));

        InputField::COSTS
            .iter()
            .map(|&f| (f, cost))
            .chain(InputField::REVENUE.iter().map(|&f| (f, revenue)))
            .chain(std::iter::once((InputField::ServiceInvestment, investment)))
            .collect()
    }

    pub fn definition(&self) -> ScenarioDefinition {
        ScenarioDefinition::new(self.as_str(), self.multipliers())
    }
}

impl core::fmt::Display for Preset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "worst" | "worst_case" => Ok(Preset::Worst),
            "likely" | "most_likely" | "base" => Ok(Preset::Likely),
            "best" | "best_case" => Ok(Preset::Best),
            other => Err(CalcError::invalid(format!("unknown scenario preset '{other}'"))),
        }
    }
}

/// A named what-if scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    #[serde(default)]
    pub multipliers: Multipliers,
}

impl ScenarioDefinition {
    pub fn new(name: impl Into<String>, multipliers: Multipliers) -> Self {
        Self {
            name: name.into(),
            multipliers,
        }
    }

    pub fn with_multiplier(mut self, field: InputField, factor: f64) -> Self {
        self.multipliers.insert(field, factor);
        self
    }
}
