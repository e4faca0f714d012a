//! Insight generation and lifecycle management.

use std::collections::HashMap;
use std::sync::Arc;

use prism_core::errors::{InsightError, PrismResult};
use prism_core::models::{
    Confidence, ExecutionOptions, InsightType, SourceInsight, SourceRef, TenantId,
    Transformation, TransformationContext, TruthLevel,
};
use prism_core::traits::{SourceInsightRepository, TransformationRepository};
use prism_transform::{ExecutionResult, TransformationService};
use serde_json::Value;
use tracing::{debug, info};

/// Request to generate insights for one source.
#[derive(Debug, Clone)]
pub struct InsightRequest {
    pub source_id: String,
    pub tenant_id: TenantId,
    pub content: String,
    pub title: Option<String>,
    pub source_type: Option<String>,
    pub metadata: Option<Value>,
    /// Insight types to generate; `None` means the service defaults.
    pub insight_types: Option<Vec<InsightType>>,
    pub model_override: Option<String>,
}

impl InsightRequest {
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
            insight_types: None,
            model_override: None,
        }
    }

    pub fn with_insight_types(mut self, types: Vec<InsightType>) -> Self {
        self.insight_types = Some(types);
        self
    }

    fn to_context(&self) -> TransformationContext {
        TransformationContext::for_source(
            SourceRef {
                id: self.source_id.clone(),
                content: self.content.clone(),
                title: self.title.clone(),
                source_type: self.source_type.clone(),
                metadata: self.metadata.clone(),
                version: None,
            },
            self.tenant_id.clone(),
        )
    }
}

/// Per-type soft failure inside a generation batch.
#[derive(Debug, Clone)]
pub struct InsightTypeError {
    pub insight_type: InsightType,
    pub error: String,
}

/// Aggregate outcome of one generation batch. Callers rely on this shape to
/// report partial success: errors never abort the batch.
#[derive(Debug, Clone, Default)]
pub struct InsightGenerationResult {
    pub insights: Vec<SourceInsight>,
    pub count: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub errors: Vec<InsightTypeError>,
}

/// Options for `regenerate_insights`.
#[derive(Debug, Clone)]
pub struct RegenerateOptions {
    pub insight_types: Option<Vec<InsightType>>,
    /// Invalidate the current insights before generating. Defaults to true.
    pub invalidate_old: bool,
}

impl Default for RegenerateOptions {
    fn default() -> Self {
        Self {
            insight_types: None,
            invalidate_old: true,
        }
    }
}

/// Dashboard aggregation over a tenant's insights.
#[derive(Debug, Clone, Default)]
pub struct InsightSummary {
    pub total_insights: usize,
    pub by_type: HashMap<InsightType, usize>,
    pub promoted_count: usize,
    pub invalidated_count: usize,
}

/// Generates insights through the transformation service and manages their
/// lifecycle: current-row queries, promotion to user truth, invalidation
/// and regeneration.
pub struct InsightService {
    transformation_service: Arc<TransformationService>,
    insights: Arc<dyn SourceInsightRepository>,
    transformations: Arc<dyn TransformationRepository>,
    auto_generate: bool,
    default_insight_types: Vec<InsightType>,
}

impl InsightService {
    pub fn new(
        transformation_service: Arc<TransformationService>,
        insights: Arc<dyn SourceInsightRepository>,
        transformations: Arc<dyn TransformationRepository>,
    ) -> Self {
        Self {
            transformation_service,
            insights,
            transformations,
            auto_generate: true,
            default_insight_types: InsightType::DEFAULT_SET.to_vec(),
        }
    }

    pub fn with_auto_generate(mut self, auto_generate: bool) -> Self {
        self.auto_generate = auto_generate;
        self
    }

    pub fn with_default_insight_types(mut self, types: Vec<InsightType>) -> Self {
        self.default_insight_types = types;
        self
    }

    /// Generate insights for a source, one per requested type.
    ///
    /// Each type is failure-isolated: an unresolvable transformation, a
    /// failed execution or a persistence error records a per-type entry in
    /// `errors` and the batch continues.
    pub async fn generate_insights(&self, request: &InsightRequest) -> InsightGenerationResult {
        let insight_types = request
            .insight_types
            .clone()
            .unwrap_or_else(|| self.default_insight_types.clone());
        let context = request.to_context();

        let mut batch = InsightGenerationResult::default();

        for insight_type in insight_types {
            match self.generate_one(insight_type, request, &context).await {
                Ok((insight, tokens, cost)) => {
                    batch.insights.push(insight);
                    batch.total_tokens += u64::from(tokens);
                    batch.total_cost += cost;
                }
                Err(error) => {
                    debug!(
                        source_id = %request.source_id,
                        insight_type = %insight_type,
                        error = %error,
                        "insight generation failed for type"
                    );
                    batch.errors.push(InsightTypeError {
                        insight_type,
                        error,
                    });
                }
            }
        }

        batch.count = batch.insights.len();
        info!(
            source_id = %request.source_id,
            generated = batch.count,
            failed = batch.errors.len(),
            "insight generation batch complete"
        );
        batch
    }

    async fn generate_one(
        &self,
        insight_type: InsightType,
        request: &InsightRequest,
        context: &TransformationContext,
    ) -> Result<(SourceInsight, u32, f64), String> {
        let name = insight_type.transformation_name();
        let transformation = self
            .find_transformation(name, &request.tenant_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("No transformation found for insight type: {insight_type}"))?;

        let options = ExecutionOptions {
            model_override: request.model_override.clone(),
            priority: None,
        };
        let result = self
            .transformation_service
            .execute(&transformation.id, context, &options)
            .await
            .map_err(|e| e.to_string())?;

        if !result.success {
            return Err(result.error.unwrap_or_else(|| "Unknown error".to_string()));
        }

        let mut insight = SourceInsight::new(
            request.tenant_id.clone(),
            request.source_id.clone(),
            insight_type,
            result.result.output.clone(),
        )
        .with_provenance(transformation.id.clone(), result.result.id.clone())
        .with_confidence(Self::calculate_confidence(&result));
        if let Some(parsed) = result.parsed.clone() {
            insight = insight.with_parsed_content(parsed);
        }

        let saved = self.insights.save(&insight).await.map_err(|e| e.to_string())?;
        Ok((saved, result.result.total_tokens(), result.result.cost))
    }

    /// All insights for a source within a tenant, current or not.
    pub async fn get_insights_for_source(
        &self,
        source_id: &str,
        tenant_id: &TenantId,
    ) -> PrismResult<Vec<SourceInsight>> {
        let all = self.insights.get_by_source(source_id).await?;
        Ok(all
            .into_iter()
            .filter(|i| &i.tenant_id == tenant_id)
            .collect())
    }

    /// The current insight of one type: the most recent non-invalidated row.
    pub async fn get_insight(
        &self,
        source_id: &str,
        tenant_id: &TenantId,
        insight_type: InsightType,
    ) -> PrismResult<Option<SourceInsight>> {
        let insights = self.get_insights_for_source(source_id, tenant_id).await?;
        Ok(insights
            .into_iter()
            .filter(|i| i.insight_type == insight_type && i.is_current())
            .max_by_key(|i| i.created_at))
    }

    /// Promote an insight to user-reviewed truth. The row is updated in
    /// place — a deliberate exception to the append-only generation pattern.
    pub async fn promote_insight(
        &self,
        insight_id: &str,
        tenant_id: &TenantId,
        user_id: &str,
    ) -> PrismResult<SourceInsight> {
        let mut insight = self
            .insights
            .get(insight_id)
            .await?
            .ok_or_else(|| InsightError::InsightNotFound {
                id: insight_id.to_string(),
            })?;

        if &insight.tenant_id != tenant_id {
            return Err(InsightError::TenantMismatch {
                id: insight_id.to_string(),
                tenant: tenant_id.to_string(),
            }
            .into());
        }

        insight.promote(user_id);
        self.insights.update(&insight).await
    }

    /// Mark one insight stale. Missing rows and tenant mismatches are
    /// silently ignored; re-invalidating is a no-op.
    pub async fn invalidate_insight(
        &self,
        insight_id: &str,
        tenant_id: &TenantId,
    ) -> PrismResult<()> {
        let Some(mut insight) = self.insights.get(insight_id).await? else {
            return Ok(());
        };
        if &insight.tenant_id != tenant_id {
            return Ok(());
        }

        if insight.invalidate() {
            self.insights.update(&insight).await?;
        }
        Ok(())
    }

    /// Invalidate every current insight for a source. Returns how many rows
    /// were newly invalidated; already-stale rows don't re-count.
    pub async fn invalidate_source_insights(
        &self,
        source_id: &str,
        tenant_id: &TenantId,
    ) -> PrismResult<usize> {
        let insights = self.insights.get_by_source(source_id).await?;
        let mut count = 0;

        for mut insight in insights {
            if &insight.tenant_id == tenant_id && insight.invalidate() {
                self.insights.update(&insight).await?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Invalidate current insights (unless opted out) and generate fresh
    /// ones from new content. Old and new rows coexist; only non-invalidated
    /// rows are current.
    pub async fn regenerate_insights(
        &self,
        source_id: &str,
        tenant_id: &TenantId,
        content: &str,
        options: RegenerateOptions,
    ) -> PrismResult<InsightGenerationResult> {
        if options.invalidate_old {
            self.invalidate_source_insights(source_id, tenant_id).await?;
        }

        let mut request = InsightRequest::new(source_id, tenant_id.clone(), content);
        request.insight_types = options.insight_types;
        Ok(self.generate_insights(&request).await)
    }

    /// Full scan aggregation for dashboards.
    pub async fn get_insight_summary(&self, tenant_id: &TenantId) -> PrismResult<InsightSummary> {
        let insights = self.insights.find_by_tenant(tenant_id).await?;

        let mut summary = InsightSummary {
            total_insights: insights.len(),
            ..InsightSummary::default()
        };
        for insight in &insights {
            *summary.by_type.entry(insight.insight_type).or_insert(0) += 1;
            if insight.truth_level == TruthLevel::U1 {
                summary.promoted_count += 1;
            }
            if !insight.is_current() {
                summary.invalidated_count += 1;
            }
        }
        Ok(summary)
    }

    pub fn should_auto_generate(&self) -> bool {
        self.auto_generate
    }

    pub fn default_insight_types(&self) -> &[InsightType] {
        &self.default_insight_types
    }

    /// Resolve a transformation by name: the tenant's own catalog first,
    /// then the tenant's applicable defaults.
    async fn find_transformation(
        &self,
        name: &str,
        tenant_id: &TenantId,
    ) -> PrismResult<Option<Transformation>> {
        let visible = self.transformations.get_for_tenant(tenant_id).await?;
        if let Some(found) = visible
            .into_iter()
            .find(|t| t.name == name && t.tenant_id.as_ref() == Some(tenant_id))
        {
            return Ok(Some(found));
        }

        let defaults = self
            .transformations
            .get_defaults_for_ingestion(tenant_id)
            .await?;
        Ok(defaults.into_iter().find(|t| t.name == name))
    }

    /// Confidence heuristic: base 0.8, minus 0.3 on parse failure, plus
    /// 0.05 when combined tokens exceed 1000, clamped to the scoring band.
    fn calculate_confidence(result: &ExecutionResult) -> Confidence {
        let mut confidence = Confidence::BASE;
        if !result.success {
            confidence -= 0.3;
        }
        if result.result.total_tokens() > 1000 {
            confidence += 0.05;
        }
        Confidence::banded(confidence)
    }
}
