use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::OutputFormat;
use super::tenant::TenantId;

/// A named, versioned prompt template.
///
/// At most one transformation exists per (tenant-or-default, name) scope.
/// Edits bump `version` in place; rows are soft-disabled via `is_enabled`,
/// never hard-deleted during normal operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transformation {
    /// UUID v4 identifier.
    pub id: String,
    /// Owning tenant; `None` marks a system default.
    pub tenant_id: Option<TenantId>,
    /// Unique name within the tenant-or-default scope.
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Prompt template rendered against the transformation context.
    pub prompt_template: String,
    pub output_format: OutputFormat,
    /// JSON schema, required when `output_format` is structured.
    pub output_schema: Option<serde_json::Value>,
    /// Auto-apply on source ingestion.
    pub apply_default: bool,
    pub model_id: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ingestion types this transformation applies to. Empty = universal.
    pub applicable_ingestion_types: Vec<String>,
    pub is_enabled: bool,
    /// Monotonic, incremented on every edit.
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transformation {
    pub fn new(
        tenant_id: Option<TenantId>,
        name: impl Into<String>,
        prompt_template: impl Into<String>,
        output_format: OutputFormat,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id,
            name: name.into(),
            title: None,
            description: None,
            prompt_template: prompt_template.into(),
            output_format,
            output_schema: None,
            apply_default: false,
            model_id: None,
            temperature: None,
            max_tokens: None,
            applicable_ingestion_types: Vec::new(),
            is_enabled: true,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_system_default(&self) -> bool {
        self.tenant_id.is_none()
    }

    /// Whether this transformation applies to the given ingestion type.
    /// An empty applicability list means universal.
    pub fn applies_to(&self, ingestion_type: &str) -> bool {
        self.applicable_ingestion_types.is_empty()
            || self
                .applicable_ingestion_types
                .iter()
                .any(|t| t == ingestion_type)
    }

    /// Record an in-place edit: bump the version and touch `updated_at`.
    pub fn bump_version(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_applicability_is_universal() {
        let t = Transformation::new(None, "system:summary", "{{ source.content }}", OutputFormat::Markdown);
        assert!(t.applies_to("document"));
        assert!(t.applies_to("note"));
    }

    #[test]
    fn applicability_filters_by_membership() {
        let mut t = Transformation::new(None, "system:summary", "x", OutputFormat::Markdown);
        t.applicable_ingestion_types = vec!["article".to_string()];
        assert!(t.applies_to("article"));
        assert!(!t.applies_to("note"));
    }

    #[test]
    fn bump_version_is_monotonic() {
        let mut t = Transformation::new(None, "n", "x", OutputFormat::Json);
        assert_eq!(t.version, 1);
        t.bump_version();
        t.bump_version();
        assert_eq!(t.version, 3);
    }
}
