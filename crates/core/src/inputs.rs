//! Business input record: the single value every calculation starts from.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::category::CostCategory;
use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};

/// Numeric field of [`BusinessInputs`] that analyses can vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    AnnualRevenue,
    MonthlyOrders,
    AvgOrderValue,
    LaborCosts,
    ShippingCosts,
    ErrorCosts,
    InventoryCosts,
    ServiceInvestment,
}

impl InputField {
    pub const ALL: [InputField; 8] = [
        InputField::AnnualRevenue,
        InputField::MonthlyOrders,
        InputField::AvgOrderValue,
        InputField::LaborCosts,
        InputField::ShippingCosts,
        InputField::ErrorCosts,
        InputField::InventoryCosts,
        InputField::ServiceInvestment,
    ];

    /// Revenue-side fields (perturbed together by the simulator).
    pub const REVENUE: [InputField; 3] = [
        InputField::AnnualRevenue,
        InputField::MonthlyOrders,
        InputField::AvgOrderValue,
    ];

    /// Cost-side fields (the four savings categories).
    pub const COSTS: [InputField; 4] = [
        InputField::LaborCosts,
        InputField::ShippingCosts,
        InputField::ErrorCosts,
        InputField::InventoryCosts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputField::AnnualRevenue => "annual_revenue",
            InputField::MonthlyOrders => "monthly_orders",
            InputField::AvgOrderValue => "avg_order_value",
            InputField::LaborCosts => "labor_costs",
            InputField::ShippingCosts => "shipping_costs",
            InputField::ErrorCosts => "error_costs",
            InputField::InventoryCosts => "inventory_costs",
            InputField::ServiceInvestment => "service_investment",
        }
    }

    /// Savings category fed by this field, if it is a cost field.
    pub fn cost_category(&self) -> Option<CostCategory> {
        match self {
            InputField::LaborCosts => Some(CostCategory::Labor),
            InputField::ShippingCosts => Some(CostCategory::Shipping),
            InputField::ErrorCosts => Some(CostCategory::Errors),
            InputField::InventoryCosts => Some(CostCategory::Inventory),
            _ => None,
        }
    }
}

impl core::fmt::Display for InputField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputField {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InputField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| CalcError::invalid(format!("unknown input field: {s}")))
    }
}

/// Validated business inputs.
///
/// Cost fields are monthly amounts; `annual_revenue` is yearly. All numeric
/// fields are finite and non-negative, and `service_investment` is strictly
/// positive. Values are only obtainable through validation (builder, `TryFrom`,
/// or deserialization), so every engine entry point can rely on the invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InputsRecord")]
pub struct BusinessInputs {
    annual_revenue: f64,
    monthly_orders: f64,
    avg_order_value: f64,
    labor_costs: f64,
    shipping_costs: f64,
    error_costs: f64,
    inventory_costs: f64,
    service_investment: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    industry: Option<String>,
}

impl BusinessInputs {
    pub fn builder() -> BusinessInputsBuilder {
        BusinessInputsBuilder::default()
    }

    pub fn annual_revenue(&self) -> f64 {
        self.annual_revenue
    }

    pub fn monthly_orders(&self) -> f64 {
        self.monthly_orders
    }

    pub fn avg_order_value(&self) -> f64 {
        self.avg_order_value
    }

    pub fn labor_costs(&self) -> f64 {
        self.labor_costs
    }

    pub fn shipping_costs(&self) -> f64 {
        self.shipping_costs
    }

    pub fn error_costs(&self) -> f64 {
        self.error_costs
    }

    pub fn inventory_costs(&self) -> f64 {
        self.inventory_costs
    }

    pub fn service_investment(&self) -> f64 {
        self.service_investment
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    pub fn industry(&self) -> Option<&str> {
        self.industry.as_deref()
    }

    /// Monthly cost for a savings category.
    pub fn cost(&self, category: CostCategory) -> f64 {
        self.get(category.input_field())
    }

    pub fn get(&self, field: InputField) -> f64 {
        match field {
            InputField::AnnualRevenue => self.annual_revenue,
            InputField::MonthlyOrders => self.monthly_orders,
            InputField::AvgOrderValue => self.avg_order_value,
            InputField::LaborCosts => self.labor_costs,
            InputField::ShippingCosts => self.shipping_costs,
            InputField::ErrorCosts => self.error_costs,
            InputField::InventoryCosts => self.inventory_costs,
            InputField::ServiceInvestment => self.service_investment,
        }
    }

    /// Copy with one field replaced. The copy is re-validated.
    pub fn with_field(&self, field: InputField, value: f64) -> CalcResult<Self> {
        let mut builder = self.to_builder();
        builder.set(field, value);
        builder.build()
    }

    /// Copy with each listed field multiplied by its factor. Re-validated.
    pub fn scaled<'a, I>(&self, factors: I) -> CalcResult<Self>
    where
        I: IntoIterator<Item = (&'a InputField, &'a f64)>,
    {
        let mut builder = self.to_builder();
        for (field, factor) in factors {
            builder.set(*field, self.get(*field) * *factor);
        }
        builder.build()
    }

    /// Re-check the invariants (used by callers holding deserialized copies).
    pub fn validate(&self) -> CalcResult<()> {
        for field in InputField::ALL {
            let value = self.get(field);
            if field == InputField::ServiceInvestment {
                ensure_positive(field.as_str(), value)?;
            } else {
                ensure_non_negative(field.as_str(), value)?;
            }
        }
        Ok(())
    }

    pub fn to_builder(&self) -> BusinessInputsBuilder {
        BusinessInputsBuilder {
            annual_revenue: self.annual_revenue,
            monthly_orders: self.monthly_orders,
            avg_order_value: self.avg_order_value,
            labor_costs: self.labor_costs,
            shipping_costs: self.shipping_costs,
            error_costs: self.error_costs,
            inventory_costs: self.inventory_costs,
            service_investment: self.service_investment,
            company_name: self.company_name.clone(),
            industry: self.industry.clone(),
        }
    }
}

/// Wire shape of [`BusinessInputs`]: every numeric field is required and
/// unknown keys are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputsRecord {
    annual_revenue: f64,
    monthly_orders: f64,
    avg_order_value: f64,
    labor_costs: f64,
    shipping_costs: f64,
    error_costs: f64,
    inventory_costs: f64,
    service_investment: f64,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

impl TryFrom<InputsRecord> for BusinessInputs {
    type Error = CalcError;

    fn try_from(record: InputsRecord) -> Result<Self, Self::Error> {
        BusinessInputsBuilder {
            annual_revenue: record.annual_revenue,
            monthly_orders: record.monthly_orders,
            avg_order_value: record.avg_order_value,
            labor_costs: record.labor_costs,
            shipping_costs: record.shipping_costs,
            error_costs: record.error_costs,
            inventory_costs: record.inventory_costs,
            service_investment: record.service_investment,
            company_name: record.company_name,
            industry: record.industry,
        }
        .build()
    }
}

/// Unvalidated input record for programmatic construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessInputsBuilder {
    pub annual_revenue: f64,
    pub monthly_orders: f64,
    pub avg_order_value: f64,
    pub labor_costs: f64,
    pub shipping_costs: f64,
    pub error_costs: f64,
    pub inventory_costs: f64,
    pub service_investment: f64,
    pub company_name: Option<String>,
    pub industry: Option<String>,
}

impl BusinessInputsBuilder {
    pub fn annual_revenue(mut self, value: f64) -> Self {
        self.annual_revenue = value;
        self
    }

    pub fn monthly_orders(mut self, value: f64) -> Self {
        self.monthly_orders = value;
        self
    }

    pub fn avg_order_value(mut self, value: f64) -> Self {
        self.avg_order_value = value;
        self
    }

    pub fn labor_costs(mut self, value: f64) -> Self {
        self.labor_costs = value;
        self
    }

    pub fn shipping_costs(mut self, value: f64) -> Self {
        self.shipping_costs = value;
        self
    }

    pub fn error_costs(mut self, value: f64) -> Self {
        self.error_costs = value;
        self
    }

    pub fn inventory_costs(mut self, value: f64) -> Self {
        self.inventory_costs = value;
        self
    }

    pub fn service_investment(mut self, value: f64) -> Self {
        self.service_investment = value;
        self
    }

    pub fn company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    pub fn industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn set(&mut self, field: InputField, value: f64) {
        match field {
            InputField::AnnualRevenue => self.annual_revenue = value,
            InputField::MonthlyOrders => self.monthly_orders = value,
            InputField::AvgOrderValue => self.avg_order_value = value,
            InputField::LaborCosts => self.labor_costs = value,
            InputField::ShippingCosts => self.shipping_costs = value,
            InputField::ErrorCosts => self.error_costs = value,
            InputField::InventoryCosts => self.inventory_costs = value,
            InputField::ServiceInvestment => self.service_investment = value,
        }
    }

    pub fn build(self) -> CalcResult<BusinessInputs> {
        let inputs = BusinessInputs {
            annual_revenue: self.annual_revenue,
            monthly_orders: self.monthly_orders,
            avg_order_value: self.avg_order_value,
            labor_costs: self.labor_costs,
            shipping_costs: self.shipping_costs,
            error_costs: self.error_costs,
            inventory_costs: self.inventory_costs,
            service_investment: self.service_investment,
            company_name: self.company_name,
            industry: self.industry,
        };
        inputs.validate()?;
        Ok(inputs)
    }
}

impl TryFrom<BusinessInputsBuilder> for BusinessInputs {
    type Error = CalcError;

    fn try_from(value: BusinessInputsBuilder) -> Result<Self, Self::Error> {
        value.build()
    }
}
