//! In-memory repository implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use prism_core::errors::{InsightError, PrismResult};
use prism_core::models::{
    InsightType, SourceInsight, TenantId, Transformation, TransformationConfig,
    TransformationResult,
};
use prism_core::traits::{
    SourceInsightRepository, TransformationConfigRepository, TransformationRepository,
    TransformationResultRepository,
};

#[derive(Default)]
pub struct InMemoryTransformationRepo {
    rows: Mutex<Vec<Transformation>>,
}

impl InMemoryTransformationRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Transformation>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl TransformationRepository for InMemoryTransformationRepo {
    async fn get(&self, id: &str) -> PrismResult<Option<Transformation>> {
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn get_by_name(
        &self,
        name: &str,
        tenant_id: Option<&TenantId>,
    ) -> PrismResult<Option<Transformation>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.name == name && t.tenant_id.as_ref() == tenant_id)
            .cloned())
    }

    async fn get_for_tenant(&self, tenant_id: &TenantId) -> PrismResult<Vec<Transformation>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.tenant_id.is_none() || t.tenant_id.as_ref() == Some(tenant_id))
            .cloned()
            .collect())
    }

    async fn get_defaults_for_ingestion(
        &self,
        tenant_id: &TenantId,
    ) -> PrismResult<Vec<Transformation>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.tenant_id.is_none() || t.tenant_id.as_ref() == Some(tenant_id))
            .filter(|t| t.apply_default && t.is_enabled)
            .cloned()
            .collect())
    }

    async fn save(&self, transformation: &Transformation) -> PrismResult<Transformation> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter_mut().find(|t| t.id == transformation.id) {
            *existing = transformation.clone();
        } else {
            rows.push(transformation.clone());
        }
        Ok(transformation.clone())
    }

    async fn delete(&self, id: &str) -> PrismResult<()> {
        self.rows.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryResultRepo {
    rows: Mutex<Vec<TransformationResult>>,
}

impl InMemoryResultRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row created so far, in insertion order.
    pub fn all(&self) -> Vec<TransformationResult> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransformationResultRepository for InMemoryResultRepo {
    async fn get(&self, id: &str) -> PrismResult<Option<TransformationResult>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn get_by_source(&self, source_id: &str) -> PrismResult<Vec<TransformationResult>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.source_id.as_deref() == Some(source_id))
            .cloned()
            .collect())
    }

    async fn get_by_transformation(
        &self,
        transformation_id: &str,
    ) -> PrismResult<Vec<TransformationResult>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.transformation_id == transformation_id)
            .cloned()
            .collect())
    }

    async fn get_latest(
        &self,
        source_id: &str,
        transformation_id: &str,
    ) -> PrismResult<Option<TransformationResult>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.source_id.as_deref() == Some(source_id)
                    && r.transformation_id == transformation_id
            })
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn create(&self, result: &TransformationResult) -> PrismResult<TransformationResult> {
        self.rows.lock().unwrap().push(result.clone());
        Ok(result.clone())
    }
}

#[derive(Default)]
pub struct InMemoryInsightRepo {
    rows: Mutex<Vec<SourceInsight>>,
}

impl InMemoryInsightRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<SourceInsight> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceInsightRepository for InMemoryInsightRepo {
    async fn get(&self, id: &str) -> PrismResult<Option<SourceInsight>> {
        Ok(self.rows.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn get_by_source(&self, source_id: &str) -> PrismResult<Vec<SourceInsight>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.source_id == source_id)
            .cloned()
            .collect())
    }

    async fn find_by_tenant(&self, tenant_id: &TenantId) -> PrismResult<Vec<SourceInsight>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|i| &i.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn find_by_insight_type(
        &self,
        insight_type: InsightType,
        tenant_id: &TenantId,
    ) -> PrismResult<Vec<SourceInsight>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.insight_type == insight_type && &i.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn save(&self, insight: &SourceInsight) -> PrismResult<SourceInsight> {
        self.rows.lock().unwrap().push(insight.clone());
        Ok(insight.clone())
    }

    async fn update(&self, insight: &SourceInsight) -> PrismResult<SourceInsight> {
        let mut rows = self.rows.lock().unwrap();
        let existing = rows
            .iter_mut()
            .find(|i| i.id == insight.id)
            .ok_or_else(|| InsightError::InsightNotFound {
                id: insight.id.clone(),
            })?;
        *existing = insight.clone();
        Ok(insight.clone())
    }

    async fn delete_by_source(&self, source_id: &str) -> PrismResult<()> {
        self.rows.lock().unwrap().retain(|i| i.source_id != source_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryConfigRepo {
    rows: Mutex<HashMap<String, TransformationConfig>>,
}

impl InMemoryConfigRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TransformationConfig) -> Self {
        let repo = Self::default();
        repo.rows
            .lock()
            .unwrap()
            .insert(config.tenant_id.to_string(), config);
        repo
    }
}

#[async_trait]
impl TransformationConfigRepository for InMemoryConfigRepo {
    async fn get(&self, tenant_id: &TenantId) -> PrismResult<Option<TransformationConfig>> {
        Ok(self.rows.lock().unwrap().get(tenant_id.as_str()).cloned())
    }

    async fn save(&self, config: &TransformationConfig) -> PrismResult<TransformationConfig> {
        self.rows
            .lock()
            .unwrap()
            .insert(config.tenant_id.to_string(), config.clone());
        Ok(config.clone())
    }

    async fn increment_daily_usage(&self, tenant_id: &TenantId) -> PrismResult<u32> {
        let mut rows = self.rows.lock().unwrap();
        let config = rows
            .entry(tenant_id.to_string())
            .or_insert_with(|| TransformationConfig::for_tenant(tenant_id.clone()));
        config.daily_used += 1;
        Ok(config.daily_used)
    }

    async fn reset_daily_usage(&self, tenant_id: &TenantId) -> PrismResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(config) = rows.get_mut(tenant_id.as_str()) {
            config.daily_used = 0;
        }
        Ok(())
    }
}
