//! Content pipeline adapter.
//!
//! Bridges source ingestion events to insight generation. Handlers never
//! propagate errors back into the pipeline: failures go to the observer,
//! which falls back to logging.

use std::sync::Arc;

use async_trait::async_trait;
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{InsightType, TenantId};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::service::{InsightGenerationResult, InsightRequest, InsightService, RegenerateOptions};

/// Source ingestion event.
#[derive(Debug, Clone)]
pub struct SourceIngestedEvent {
    pub source_id: String,
    pub tenant_id: TenantId,
    pub content: String,
    pub title: Option<String>,
    pub source_type: Option<String>,
    pub metadata: Option<Value>,
    pub version: Option<u32>,
    /// Update to an existing source rather than a new one.
    pub is_update: bool,
}

impl SourceIngestedEvent {
    pub fn new(
        source_id: impl Into<String>,
        tenant_id: TenantId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            tenant_id,
            content: content.into(),
            title: None,
            source_type: None,
            metadata: None,
            version: None,
            is_update: false,
        }
    }
}

/// Receives pipeline outcomes. Default implementations log, so absence of a
/// custom observer never means silent failure.
#[async_trait]
pub trait PipelineObserver: Send + Sync {
    async fn on_insights_generated(&self, source_id: &str, result: &InsightGenerationResult) {
        info!(
            source_id,
            count = result.count,
            failed = result.errors.len(),
            "insights generated"
        );
    }

    async fn on_error(&self, source_id: &str, error: &PrismError) {
        error!(source_id, error = %error, "insight generation failed");
    }
}

/// Observer that only logs. Used when no custom observer is installed.
pub struct LoggingObserver;

#[async_trait]
impl PipelineObserver for LoggingObserver {}

/// Adapter wiring ingestion events to the insight service.
pub struct ContentPipeline {
    insight_service: Arc<InsightService>,
    auto_generate: bool,
    observer: Arc<dyn PipelineObserver>,
}

impl ContentPipeline {
    pub fn new(insight_service: Arc<InsightService>) -> Self {
        Self {
            insight_service,
            auto_generate: true,
            observer: Arc::new(LoggingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_auto_generate(mut self, auto_generate: bool) -> Self {
        self.auto_generate = auto_generate;
        self
    }

    pub fn set_auto_generate(&mut self, enabled: bool) {
        self.auto_generate = enabled;
    }

    /// Gated on both the pipeline's flag and the insight service's flag.
    pub fn is_auto_generate_enabled(&self) -> bool {
        self.auto_generate && self.insight_service.should_auto_generate()
    }

    /// Handle a source ingestion event. On updates, current insights are
    /// invalidated first, then new ones generated — two sequential steps. A
    /// crash between them leaves the source with zero current insights,
    /// which is recoverable (insights are derivable from the source again).
    pub async fn on_source_ingested(&self, event: &SourceIngestedEvent) {
        if !self.is_auto_generate_enabled() {
            return;
        }

        if event.is_update {
            if let Err(e) = self
                .insight_service
                .invalidate_source_insights(&event.source_id, &event.tenant_id)
                .await
            {
                self.observer.on_error(&event.source_id, &e).await;
                return;
            }
        }

        let request = InsightRequest {
            source_id: event.source_id.clone(),
            tenant_id: event.tenant_id.clone(),
            content: event.content.clone(),
            title: event.title.clone(),
            source_type: event.source_type.clone(),
            metadata: event.metadata.clone(),
            insight_types: None,
            model_override: None,
        };

        let result = self.insight_service.generate_insights(&request).await;

        self.observer
            .on_insights_generated(&event.source_id, &result)
            .await;

        if !result.errors.is_empty() {
            warn!(
                source_id = %event.source_id,
                failed = result.errors.len(),
                "insight generation partial failure"
            );
        }
    }

    /// An update is an ingestion with `is_update` forced on.
    pub async fn on_source_updated(&self, event: &SourceIngestedEvent) {
        let mut event = event.clone();
        event.is_update = true;
        self.on_source_ingested(&event).await;
    }

    /// Cleanup hook. Insight rows cascade with the source in storage; this
    /// only records the event.
    pub async fn on_source_deleted(&self, source_id: &str, tenant_id: &TenantId) {
        info!(source_id, tenant_id = %tenant_id, "source deleted, insights cascade with it");
    }

    /// Manually regenerate insights for a source, invalidating the current
    /// ones first.
    pub async fn regenerate_insights(
        &self,
        source_id: &str,
        tenant_id: &TenantId,
        content: &str,
        insight_types: Option<Vec<InsightType>>,
    ) -> PrismResult<InsightGenerationResult> {
        self.insight_service
            .regenerate_insights(
                source_id,
                tenant_id,
                content,
                RegenerateOptions {
                    insight_types,
                    invalidate_old: true,
                },
            )
            .await
    }
}
