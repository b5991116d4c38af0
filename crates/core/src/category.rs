//! Savings categories and the reduction-ratio table.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::inputs::InputField;

/// Operating-cost category that optimization reduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    Labor,
    Shipping,
    Errors,
    Inventory,
}

impl CostCategory {
    pub const ALL: [CostCategory; 4] = [
        CostCategory::Labor,
        CostCategory::Shipping,
        CostCategory::Errors,
        CostCategory::Inventory,
    ];

    pub fn input_field(&self) -> InputField {
        match self {
            CostCategory::Labor => InputField::LaborCosts,
            CostCategory::Shipping => InputField::ShippingCosts,
            CostCategory::Errors => InputField::ErrorCosts,
            CostCategory::Inventory => InputField::InventoryCosts,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CostCategory::Labor => "labor",
            CostCategory::Shipping => "shipping",
            CostCategory::Errors => "errors",
            CostCategory::Inventory => "inventory",
        }
    }
}

impl core::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fraction of each category's cost removed by the optimization.
///
/// The defaults (60/25/80/30%) are configurable assumptions, not measured data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReductionTable {
    #[serde(default = "default_labor")]
    pub labor: f64,
    #[serde(default = "default_shipping")]
    pub shipping: f64,
    #[serde(default = "default_errors")]
    pub errors: f64,
    #[serde(default = "default_inventory")]
    pub inventory: f64,
}

fn default_labor() -> f64 {
    0.60
}

fn default_shipping() -> f64 {
    0.25
}

fn default_errors() -> f64 {
    0.80
}

fn default_inventory() -> f64 {
    0.30
}

impl Default for ReductionTable {
    fn default() -> Self {
        Self {
            labor: default_labor(),
            shipping: default_shipping(),
            errors: default_errors(),
            inventory: default_inventory(),
        }
    }
}

impl ReductionTable {
    pub fn ratio(&self, category: CostCategory) -> f64 {
        match category {
            CostCategory::Labor => self.labor,
            CostCategory::Shipping => self.shipping,
            CostCategory::Errors => self.errors,
            CostCategory::Inventory => self.inventory,
        }
    }

    pub fn with_ratio(mut self, category: CostCategory, ratio: f64) -> Self {
        match category {
            CostCategory::Labor => self.labor = ratio,
            CostCategory::Shipping => self.shipping = ratio,
            CostCategory::Errors => self.errors = ratio,
            CostCategory::Inventory => self.inventory = ratio,
        }
        self
    }

    /// Every ratio must be a finite fraction in `[0, 1]`.
    pub fn validate(&self) -> CalcResult<()> {
        for category in CostCategory::ALL {
            let ratio = self.ratio(category);
            if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
                return Err(CalcError::invalid(format!(
                    "reduction ratio for {category} must be within [0, 1], got {ratio}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_ratios() {
        let table = ReductionTable::default();
        assert_eq!(table.ratio(CostCategory::Labor), 0.60);
        assert_eq!(table.ratio(CostCategory::Shipping), 0.25);
        assert_eq!(table.ratio(CostCategory::Errors), 0.80);
        assert_eq!(table.ratio(CostCategory::Inventory), 0.30);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let table = ReductionTable::default().with_ratio(CostCategory::Shipping, 1.5);
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("shipping"));

        let table = ReductionTable::default().with_ratio(CostCategory::Labor, f64::NAN);
        assert!(table.validate().is_err());
    }

    #[test]
    fn partial_table_deserializes_with_defaults() {
        let table: ReductionTable = serde_json::from_str(r#"{"labor": 0.5}"#).unwrap();
        assert_eq!(table.labor, 0.5);
        assert_eq!(table.errors, 0.80);
    }

    #[test]
    fn categories_map_to_cost_fields() {
        for category in CostCategory::ALL {
            assert_eq!(category.input_field().cost_category(), Some(category));
        }
    }
}
