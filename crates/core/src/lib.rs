//! `roiforge-core`: shared calculation building blocks.
//!
//! This crate contains the **pure data model** of the engine (no IO, no
//! configuration loading, no logging setup): validated business inputs, the
//! savings categories, and the error type every other crate returns.

pub mod category;
pub mod error;
pub mod id;
pub mod inputs;

pub use category::{CostCategory, ReductionTable};
pub use error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
pub use id::{BatchId, ReportId};
pub use inputs::{BusinessInputs, BusinessInputsBuilder, InputField};
