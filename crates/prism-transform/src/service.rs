//! Transformation execution orchestration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use prism_core::errors::{PrismResult, TransformError};
use prism_core::models::{
    ExecutionOptions, TenantId, Transformation, TransformationConfig, TransformationContext,
    TransformationResult,
};
use prism_core::traits::{
    ChatMessage, ChatRequest, Job, JobOptions, JobRunner, ModelClient, Role,
    TransformationConfigRepository, TransformationRepository, TransformationResultRepository,
};
use prism_parser::OutputParser;
use prism_template::{estimate_tokens, TemplateRenderer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cost::estimate_cost;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Job type under which async executions are enqueued.
pub const TRANSFORMATION_JOB_TYPE: &str = "transformation";

/// Outcome of one `execute` call.
///
/// `result` is the persisted ledger row. `success` reflects parse validity,
/// not persistence: a model reply that fails to parse still produces a row.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub result: TransformationResult,
    pub parsed: Option<Value>,
    pub success: bool,
    pub error: Option<String>,
}

/// Dry-run output of `preview`.
#[derive(Debug, Clone)]
pub struct PreviewResult {
    pub prompt: String,
    pub estimated_tokens: usize,
}

/// Result of `validate_template`.
#[derive(Debug, Clone)]
pub struct TemplateReport {
    pub valid: bool,
    pub error: Option<String>,
    /// Root variables the template references. Empty when invalid.
    pub variables: Vec<String>,
}

/// Executes transformations end to end: resolve, render, invoke the model,
/// parse, persist, account cost. Dependencies are injected; the service
/// itself holds no mutable state and can be shared across tasks.
pub struct TransformationService {
    model_client: Arc<dyn ModelClient>,
    job_runner: Option<Arc<dyn JobRunner>>,
    transformations: Arc<dyn TransformationRepository>,
    results: Arc<dyn TransformationResultRepository>,
    configs: Option<Arc<dyn TransformationConfigRepository>>,
    renderer: TemplateRenderer,
    parser: OutputParser,
    default_model: String,
}

impl TransformationService {
    pub fn new(
        model_client: Arc<dyn ModelClient>,
        transformations: Arc<dyn TransformationRepository>,
        results: Arc<dyn TransformationResultRepository>,
    ) -> Self {
        Self {
            model_client,
            job_runner: None,
            transformations,
            results,
            configs: None,
            renderer: TemplateRenderer::new(),
            parser: OutputParser::new(),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Enable the async execution path.
    pub fn with_job_runner(mut self, job_runner: Arc<dyn JobRunner>) -> Self {
        self.job_runner = Some(job_runner);
        self
    }

    /// Enable tenant quota checks.
    pub fn with_config_repo(mut self, configs: Arc<dyn TransformationConfigRepository>) -> Self {
        self.configs = Some(configs);
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Execute a transformation synchronously.
    ///
    /// Fatal errors (unknown id, quota exceeded) propagate. Rendering and
    /// model failures are caught and recorded: exactly one result row is
    /// persisted per call, success or not.
    pub async fn execute(
        &self,
        transformation_id: &str,
        context: &TransformationContext,
        options: &ExecutionOptions,
    ) -> PrismResult<ExecutionResult> {
        let started = Instant::now();

        let transformation = self
            .transformations
            .get(transformation_id)
            .await?
            .ok_or_else(|| TransformError::TransformationNotFound {
                id: transformation_id.to_string(),
            })?;

        if let Some(tenant_id) = &context.tenant_id {
            self.check_tenant_limits(tenant_id).await?;
        }

        let model = options
            .model_override
            .clone()
            .or_else(|| transformation.model_id.clone())
            .unwrap_or_else(|| self.default_model.clone());

        debug!(
            transformation = %transformation.name,
            model = %model,
            "executing transformation"
        );

        match self.invoke_model(&transformation, context, &model).await {
            Ok((response, prompt_estimate)) => {
                let output_content = response.first_content().to_string();
                let parse = self.parser.parse(
                    &output_content,
                    transformation.output_format,
                    transformation.output_schema.as_ref(),
                );

                let usage = response.usage.unwrap_or_default();
                let input_tokens = usage.prompt_tokens.unwrap_or(prompt_estimate as u32);
                let output_tokens = usage
                    .completion_tokens
                    .unwrap_or(estimate_tokens(&output_content) as u32);
                let parse_error = parse.joined_errors();

                let result = TransformationResult {
                    id: uuid::Uuid::new_v4().to_string(),
                    tenant_id: context.tenant_id.clone(),
                    transformation_id: transformation.id.clone(),
                    transformation_version: transformation.version,
                    source_id: context.source.as_ref().map(|s| s.id.clone()),
                    source_version: context.source.as_ref().and_then(|s| s.version),
                    output: parse.content.clone(),
                    output_format: transformation.output_format,
                    input_tokens,
                    output_tokens,
                    cost: estimate_cost(&model, input_tokens, output_tokens),
                    duration_ms: started.elapsed().as_millis() as u64,
                    model_used: model,
                    error: parse_error.clone(),
                    created_at: Utc::now(),
                };
                let saved = self.results.create(&result).await?;

                Ok(ExecutionResult {
                    result: saved,
                    parsed: parse.parsed,
                    success: parse.valid,
                    error: parse_error,
                })
            }
            Err(e) => {
                warn!(
                    transformation = %transformation.name,
                    error = %e,
                    "transformation execution failed"
                );

                let result = TransformationResult {
                    id: uuid::Uuid::new_v4().to_string(),
                    tenant_id: context.tenant_id.clone(),
                    transformation_id: transformation.id.clone(),
                    transformation_version: transformation.version,
                    source_id: context.source.as_ref().map(|s| s.id.clone()),
                    source_version: context.source.as_ref().and_then(|s| s.version),
                    output: String::new(),
                    output_format: transformation.output_format,
                    input_tokens: 0,
                    output_tokens: 0,
                    cost: 0.0,
                    duration_ms: started.elapsed().as_millis() as u64,
                    model_used: model,
                    error: Some(e.to_string()),
                    created_at: Utc::now(),
                };
                let saved = self.results.create(&result).await?;

                Ok(ExecutionResult {
                    result: saved,
                    parsed: None,
                    success: false,
                    error: Some(e.to_string()),
                })
            }
        }
    }

    /// Render the prompt and call the model. Returns the response together
    /// with the local prompt-token estimate, used when the provider reports
    /// no usage.
    async fn invoke_model(
        &self,
        transformation: &Transformation,
        context: &TransformationContext,
        model: &str,
    ) -> PrismResult<(prism_core::traits::ChatResponse, usize)> {
        let rendered = self.renderer.render(&transformation.prompt_template, context)?;

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: transformation.output_format.system_prompt().to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: rendered.content,
                },
            ],
            temperature: Some(transformation.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            max_tokens: Some(transformation.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
        };

        let response = self.model_client.chat(request).await?;
        Ok((response, rendered.estimated_tokens))
    }

    /// Enqueue an execution on the job runner instead of running inline.
    pub async fn execute_async(
        &self,
        transformation_id: &str,
        context: &TransformationContext,
        options: &ExecutionOptions,
    ) -> PrismResult<Job> {
        let runner = self
            .job_runner
            .as_ref()
            .ok_or(TransformError::JobRunnerNotConfigured)?;

        let payload = serde_json::json!({
            "transformation_id": transformation_id,
            "context": context,
            "options": options,
        });

        runner
            .enqueue(
                TRANSFORMATION_JOB_TYPE,
                payload,
                JobOptions {
                    priority: options.priority.unwrap_or_default(),
                    ..JobOptions::default()
                },
            )
            .await
    }

    /// Execute several transformations against the same context. Each id is
    /// independent: one failure never cancels or rolls back the others, so
    /// every slot carries its own result.
    pub async fn execute_multiple(
        &self,
        transformation_ids: &[String],
        context: &TransformationContext,
        options: &ExecutionOptions,
        parallel: bool,
    ) -> Vec<PrismResult<ExecutionResult>> {
        if parallel {
            return futures::future::join_all(
                transformation_ids
                    .iter()
                    .map(|id| self.execute(id, context, options)),
            )
            .await;
        }

        let mut results = Vec::with_capacity(transformation_ids.len());
        for id in transformation_ids {
            results.push(self.execute(id, context, options).await);
        }
        results
    }

    /// Transformations visible to a tenant: system defaults shadowed by
    /// same-named tenant entries, disabled rows dropped, and filtered by
    /// ingestion type when one is given. Sorted by name.
    pub async fn get_available_transformations(
        &self,
        tenant_id: &TenantId,
        ingestion_type: Option<&str>,
    ) -> PrismResult<Vec<Transformation>> {
        let all = self.transformations.get_for_tenant(tenant_id).await?;

        let mut by_name: HashMap<String, Transformation> = HashMap::new();
        for t in all.iter().filter(|t| t.is_system_default()) {
            by_name.insert(t.name.clone(), t.clone());
        }
        for t in all
            .into_iter()
            .filter(|t| t.tenant_id.as_ref() == Some(tenant_id))
        {
            by_name.insert(t.name.clone(), t);
        }

        let mut available: Vec<Transformation> = by_name
            .into_values()
            .filter(|t| t.is_enabled)
            .filter(|t| ingestion_type.map_or(true, |it| t.applies_to(it)))
            .collect();
        available.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(available)
    }

    /// All persisted results for a source, scoped to a tenant.
    pub async fn get_results_for_source(
        &self,
        source_id: &str,
        tenant_id: &TenantId,
    ) -> PrismResult<Vec<TransformationResult>> {
        let all = self.results.get_by_source(source_id).await?;
        Ok(all
            .into_iter()
            .filter(|r| r.tenant_id.as_ref() == Some(tenant_id))
            .collect())
    }

    /// Most recent result for a transformation/source pair within a tenant.
    pub async fn get_latest_result(
        &self,
        transformation_id: &str,
        source_id: &str,
        tenant_id: &TenantId,
    ) -> PrismResult<Option<TransformationResult>> {
        let results = self.results.get_by_transformation(transformation_id).await?;
        Ok(results
            .into_iter()
            .filter(|r| {
                r.source_id.as_deref() == Some(source_id)
                    && r.tenant_id.as_ref() == Some(tenant_id)
            })
            .max_by_key(|r| r.created_at))
    }

    /// Render the prompt without calling the model.
    pub async fn preview(
        &self,
        transformation_id: &str,
        context: &TransformationContext,
    ) -> PrismResult<PreviewResult> {
        let transformation = self
            .transformations
            .get(transformation_id)
            .await?
            .ok_or_else(|| TransformError::TransformationNotFound {
                id: transformation_id.to_string(),
            })?;

        let rendered = self.renderer.render(&transformation.prompt_template, context)?;
        Ok(PreviewResult {
            prompt: rendered.content,
            estimated_tokens: rendered.estimated_tokens,
        })
    }

    /// Syntax-check a template and report the variables it references.
    pub fn validate_template(&self, template: &str) -> TemplateReport {
        let validation = self.renderer.validate(template);
        if !validation.valid {
            return TemplateReport {
                valid: false,
                error: validation.error,
                variables: Vec::new(),
            };
        }

        TemplateReport {
            valid: true,
            error: None,
            variables: self.renderer.extract_variables(template),
        }
    }

    /// Quota gate. A plain read-then-compare: the increment is owned by the
    /// storage layer, so concurrent executions can race past this check.
    async fn check_tenant_limits(&self, tenant_id: &TenantId) -> PrismResult<()> {
        let Some(configs) = &self.configs else {
            return Ok(());
        };

        let config = configs
            .get(tenant_id)
            .await?
            .unwrap_or_else(|| TransformationConfig::for_tenant(tenant_id.clone()));

        if config.is_over_limit() {
            return Err(TransformError::TenantQuotaExceeded {
                tenant: tenant_id.to_string(),
                limit: config.daily_limit,
            }
            .into());
        }
        Ok(())
    }
}
