use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::Confidence;
use super::insight_type::InsightType;
use super::tenant::TenantId;

/// Provenance marker for an insight.
///
/// `L3` = machine-asserted (AI-generated). `U1` = user-reviewed/promoted.
/// Transitions only move forward from L3 to U1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TruthLevel {
    L3,
    U1,
}

/// A typed, per-source derived insight.
///
/// Generation is append-only (a new row per run); promotion and invalidation
/// mutate the existing row in place. This mixed lifecycle is deliberate:
/// consumers must not assume full immutability. The "current" insight of a
/// type is the most recent row with no `invalidated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInsight {
    /// UUID v4 identifier.
    pub id: String,
    pub tenant_id: TenantId,
    pub source_id: String,
    pub insight_type: InsightType,
    pub content: String,
    /// Structured payload for JSON/structured outputs.
    pub parsed_content: Option<serde_json::Value>,
    /// Transformation that generated this insight.
    pub transformation_id: Option<String>,
    /// Execution record that generated this insight.
    pub transformation_result_id: Option<String>,
    pub confidence: Confidence,
    pub truth_level: TruthLevel,
    pub reviewed: bool,
    pub reviewed_by: Option<String>,
    pub promoted_by: Option<String>,
    pub promoted_at: Option<DateTime<Utc>>,
    /// Monotonic: once set, never cleared.
    pub invalidated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SourceInsight {
    pub fn new(
        tenant_id: TenantId,
        source_id: impl Into<String>,
        insight_type: InsightType,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id,
            source_id: source_id.into(),
            insight_type,
            content: content.into(),
            parsed_content: None,
            transformation_id: None,
            transformation_result_id: None,
            confidence: Confidence::default(),
            truth_level: TruthLevel::L3,
            reviewed: false,
            reviewed_by: None,
            promoted_by: None,
            promoted_at: None,
            invalidated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach provenance links to the generating transformation and result.
    pub fn with_provenance(
        mut self,
        transformation_id: impl Into<String>,
        transformation_result_id: impl Into<String>,
    ) -> Self {
        self.transformation_id = Some(transformation_id.into());
        self.transformation_result_id = Some(transformation_result_id.into());
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_parsed_content(mut self, parsed: serde_json::Value) -> Self {
        self.parsed_content = Some(parsed);
        self
    }

    /// Promote to user-reviewed truth. Idempotent in effect: promoting an
    /// already-U1 insight refreshes `promoted_by`/`promoted_at`.
    pub fn promote(&mut self, user_id: &str) {
        let now = Utc::now();
        self.truth_level = TruthLevel::U1;
        self.reviewed = true;
        self.reviewed_by = Some(user_id.to_string());
        self.promoted_by = Some(user_id.to_string());
        self.promoted_at = Some(now);
        self.updated_at = now;
    }

    /// Mark the insight stale. Returns false if it was already invalidated
    /// (the timestamp is monotonic and never refreshed).
    pub fn invalidate(&mut self) -> bool {
        if self.invalidated_at.is_some() {
            return false;
        }
        let now = Utc::now();
        self.invalidated_at = Some(now);
        self.updated_at = now;
        true
    }

    pub fn is_current(&self) -> bool {
        self.invalidated_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insight() -> SourceInsight {
        SourceInsight::new(TenantId::from("t1"), "s1", InsightType::Summary, "text")
    }

    #[test]
    fn starts_machine_asserted() {
        let i = insight();
        assert_eq!(i.truth_level, TruthLevel::L3);
        assert!(!i.reviewed);
        assert!(i.is_current());
    }

    #[test]
    fn promote_is_idempotent_in_effect() {
        let mut i = insight();
        i.promote("user-1");
        let first_at = i.promoted_at;
        i.promote("user-2");
        assert_eq!(i.truth_level, TruthLevel::U1);
        assert_eq!(i.promoted_by.as_deref(), Some("user-2"));
        assert!(i.promoted_at >= first_at);
    }

    #[test]
    fn invalidation_is_monotonic() {
        let mut i = insight();
        assert!(i.invalidate());
        let stamped = i.invalidated_at;
        assert!(!i.invalidate());
        assert_eq!(i.invalidated_at, stamped);
        assert!(!i.is_current());
    }
}
