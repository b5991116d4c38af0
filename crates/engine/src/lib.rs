//! ROI engine: cost/savings model + deterministic ROI calculation.
//!
//! Pure calculation logic only: no IO, no global state. The optional
//! [`memo::MemoizedEngine`] is an explicit, caller-owned cache.

pub mod memo;
pub mod roi;
pub mod savings;

pub use memo::{cache_key, MemoizedEngine};
pub use roi::{calculate_roi, IrrEstimate, RoiOptions, RoiResult, PROJECTION_YEARS};
pub use savings::{compute_savings, CategorySavings, SavingsBreakdown};

pub use roiforge_finance::{PaybackPeriod, YearProjection};
