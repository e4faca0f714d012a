use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::OutputFormat;
use super::tenant::TenantId;

/// Immutable, append-only record of one transformation execution.
///
/// Exactly one row is created per `execute()` call, including on failure
/// (error recorded, zero token/cost fields). This is an audit ledger —
/// rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationResult {
    /// UUID v4 identifier.
    pub id: String,
    pub tenant_id: Option<TenantId>,
    pub transformation_id: String,
    /// Version of the transformation at execution time.
    pub transformation_version: u32,
    pub source_id: Option<String>,
    pub source_version: Option<u32>,
    /// Normalized output content (raw output on parse failure).
    pub output: String,
    pub output_format: OutputFormat,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Estimated cost in dollars.
    pub cost: f64,
    pub duration_ms: u64,
    pub model_used: String,
    /// Set when the model invocation or template rendering failed.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransformationResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.output.is_empty()
    }

    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}
