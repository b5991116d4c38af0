//! Cost/savings model.

use serde::{Deserialize, Serialize};

use roiforge_core::{BusinessInputs, CalcResult, CostCategory, ReductionTable};

/// Savings estimate for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategorySavings {
    pub category: CostCategory,
    pub monthly_amount: f64,
    pub annual_amount: f64,
    /// Applied reduction ratio, in percent
    pub reduction_percentage: f64,
}

/// Per-category savings plus totals.
///
/// Always derived from inputs and a reduction table; there is no way to edit
/// one category in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsBreakdown {
    categories: Vec<CategorySavings>,
    total_monthly: f64,
    total_annual: f64,
}

impl SavingsBreakdown {
    /// Categories in the fixed order labor, shipping, errors, inventory.
    pub fn categories(&self) -> &[CategorySavings] {
        &self.categories
    }

    pub fn get(&self, category: CostCategory) -> Option<&CategorySavings> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn total_monthly(&self) -> f64 {
        self.total_monthly
    }

    pub fn total_annual(&self) -> f64 {
        self.total_annual
    }

    /// Category contributing the most savings (first one on ties).
    pub fn largest_category(&self) -> Option<&CategorySavings> {
        self.categories.iter().fold(None, |best: Option<&CategorySavings>, c| match best {
            Some(b) if b.monthly_amount >= c.monthly_amount => Some(b),
            _ => Some(c),
        })
    }
}

/// `monthly = cost * ratio`, `annual = monthly * 12`, for every category.
pub fn compute_savings(
    inputs: &BusinessInputs,
    table: &ReductionTable,
) -> CalcResult<SavingsBreakdown> {
    inputs.validate()?;
    table.validate()?;

    let categories: Vec<CategorySavings> = CostCategory::ALL
        .iter()
        .map(|&category| {
            let ratio = table.ratio(category);
            let monthly_amount = inputs.cost(category) * ratio;
            CategorySavings {
                category,
                monthly_amount,
                annual_amount: monthly_amount * 12.0,
                reduction_percentage: ratio * 100.0,
            }
        })
        .collect();

    let total_monthly = categories.iter().map(|c| c.monthly_amount).sum();
    let total_annual = categories.iter().map(|c| c.annual_amount).sum();

    Ok(SavingsBreakdown {
        categories,
        total_monthly,
        total_annual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roiforge_core::CalcError;

    fn inputs() -> BusinessInputs {
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
    fn default_ratios_produce_expected_categories() {
        let breakdown = compute_savings(&inputs(), &ReductionTable::default()).unwrap();

        let expected = [
            (CostCategory::Labor, 4_800.0, 60.0),
            (CostCategory::Shipping, 1_250.0, 25.0),
            (CostCategory::Errors, 1_600.0, 80.0),
            (CostCategory::Inventory, 900.0, 30.0),
        ];
        for (category, monthly, pct) in expected {
            let c = breakdown.get(category).unwrap();
            assert!((c.monthly_amount - monthly).abs() < 1e-9, "{category}");
            assert!((c.annual_amount - monthly * 12.0).abs() < 1e-9, "{category}");
            assert!((c.reduction_percentage - pct).abs() < 1e-9, "{category}");
        }
        assert!((breakdown.total_monthly() - 8_550.0).abs() < 1e-9);
        assert!((breakdown.total_annual() - 102_600.0).abs() < 1e-6);
    }

    #[test]
    fn custom_table_overrides_defaults() {
        let table = ReductionTable::default().with_ratio(CostCategory::Labor, 0.0);
        let breakdown = compute_savings(&inputs(), &table).unwrap();
        assert_eq!(breakdown.get(CostCategory::Labor).unwrap().monthly_amount, 0.0);
        assert!((breakdown.total_monthly() - 3_750.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_table_is_rejected() {
        let table = ReductionTable::default().with_ratio(CostCategory::Inventory, -0.1);
        let err = compute_savings(&inputs(), &table).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(_)));
    }

    #[test]
    fn largest_category_is_labor_for_sample() {
        let breakdown = compute_savings(&inputs(), &ReductionTable::default()).unwrap();
        assert_eq!(breakdown.largest_category().unwrap().category, CostCategory::Labor);
    }
}
