//! Financial math primitives (NPV, IRR, payback, projections).
//!
//! Pure functions only: no state, no IO.

pub mod cashflow;
pub mod irr;

pub use cashflow::{
    discount_factor, npv, npv_of_series, payback_period, project_savings, roi_percentage,
    PaybackPeriod, YearProjection,
};
pub use irr::{irr, IrrMethod, IrrSettings, IrrSolution};
