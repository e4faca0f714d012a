use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tenant::TenantId;
use crate::errors::PrismResult;
use crate::traits::JobPriority;

/// The source content a transformation operates on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

/// Context object a prompt template is rendered against.
///
/// `extra` carries arbitrary additional template variables; it is flattened
/// so templates address them as top-level names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformationContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl TransformationContext {
    pub fn for_source(source: SourceRef, tenant_id: TenantId) -> Self {
        Self {
            source: Some(source),
            tenant_id: Some(tenant_id),
            extra: serde_json::Map::new(),
        }
    }

    /// Add an extra top-level template variable.
    pub fn with_var(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub fn to_value(&self) -> PrismResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Per-call execution options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionOptions {
    /// Overrides the transformation's model and the service default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_override: Option<String>,
    /// Priority for the async job path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<JobPriority>,
}
