use async_trait::async_trait;

use crate::errors::PrismResult;
use crate::models::{
    InsightType, SourceInsight, TenantId, Transformation, TransformationConfig,
    TransformationResult,
};

/// CRUD + scope queries for prompt templates.
///
/// Persistence technology is out of scope for this core; implementations
/// own their own locking discipline.
#[async_trait]
pub trait TransformationRepository: Send + Sync {
    async fn get(&self, id: &str) -> PrismResult<Option<Transformation>>;

    /// Lookup by name within a tenant scope; `None` = system-default scope.
    async fn get_by_name(
        &self,
        name: &str,
        tenant_id: Option<&TenantId>,
    ) -> PrismResult<Option<Transformation>>;

    /// All transformations visible to a tenant: its own rows plus system
    /// defaults. Shadowing by name is the caller's concern.
    async fn get_for_tenant(&self, tenant_id: &TenantId) -> PrismResult<Vec<Transformation>>;

    /// Auto-apply transformations visible to a tenant.
    async fn get_defaults_for_ingestion(
        &self,
        tenant_id: &TenantId,
    ) -> PrismResult<Vec<Transformation>>;

    async fn save(&self, transformation: &Transformation) -> PrismResult<Transformation>;

    async fn delete(&self, id: &str) -> PrismResult<()>;
}

/// Append-only execution ledger.
#[async_trait]
pub trait TransformationResultRepository: Send + Sync {
    async fn get(&self, id: &str) -> PrismResult<Option<TransformationResult>>;

    async fn get_by_source(&self, source_id: &str) -> PrismResult<Vec<TransformationResult>>;

    async fn get_by_transformation(
        &self,
        transformation_id: &str,
    ) -> PrismResult<Vec<TransformationResult>>;

    async fn get_latest(
        &self,
        source_id: &str,
        transformation_id: &str,
    ) -> PrismResult<Option<TransformationResult>>;

    async fn create(&self, result: &TransformationResult) -> PrismResult<TransformationResult>;
}

/// Insight rows: append-only on generation, updated in place for
/// promotion/invalidation.
#[async_trait]
pub trait SourceInsightRepository: Send + Sync {
    async fn get(&self, id: &str) -> PrismResult<Option<SourceInsight>>;

    async fn get_by_source(&self, source_id: &str) -> PrismResult<Vec<SourceInsight>>;

    async fn find_by_tenant(&self, tenant_id: &TenantId) -> PrismResult<Vec<SourceInsight>>;

    async fn find_by_insight_type(
        &self,
        insight_type: InsightType,
        tenant_id: &TenantId,
    ) -> PrismResult<Vec<SourceInsight>>;

    async fn save(&self, insight: &SourceInsight) -> PrismResult<SourceInsight>;

    async fn update(&self, insight: &SourceInsight) -> PrismResult<SourceInsight>;

    async fn delete_by_source(&self, source_id: &str) -> PrismResult<()>;
}

/// Per-tenant quota and behavior settings.
#[async_trait]
pub trait TransformationConfigRepository: Send + Sync {
    async fn get(&self, tenant_id: &TenantId) -> PrismResult<Option<TransformationConfig>>;

    async fn save(&self, config: &TransformationConfig) -> PrismResult<TransformationConfig>;

    /// Atomic increment owned by the storage layer. Returns the new count.
    /// Implementations that need hard quotas should make this a single
    /// check-and-increment operation.
    async fn increment_daily_usage(&self, tenant_id: &TenantId) -> PrismResult<u32>;

    async fn reset_daily_usage(&self, tenant_id: &TenantId) -> PrismResult<()>;
}
