use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roiforge_core::{BatchId, CalcError, ReportId};

use crate::job::AnalysisKind;

/// Result of running an [`AnalysisJob`](crate::AnalysisJob).
///
/// The envelope is what callers persist or render; the engine itself keeps no
/// record of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport<T> {
    pub id: ReportId,
    /// Set when the report was produced as part of a batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,
    pub kind: AnalysisKind,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub duration_ms: u64,
    pub output: T,
}

impl<T> AnalysisReport<T> {
    pub fn new(kind: AnalysisKind, output: T) -> Self {
        Self {
            id: ReportId::new(),
            batch_id: None,
            kind,
            generated_at: Utc::now(),
            company_name: None,
            duration_ms: 0,
            output,
        }
    }

    pub fn with_company_name(mut self, company_name: Option<&str>) -> Self {
        self.company_name = company_name.map(str::to_string);
        self
    }

    pub fn with_batch(mut self, batch_id: BatchId) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

impl<T: Serialize> AnalysisReport<T> {
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value, AnalysisError> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("calculation failed: {0}")]
    Calculation(#[from] CalcError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AnalysisError::Calculation(e) if e.is_invalid_input())
    }
}
