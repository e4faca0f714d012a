//! Pipeline adapter behavior on ingestion events.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prism_core::errors::PrismError;
use prism_core::models::{InsightType, OutputFormat, TenantId, Transformation};
use prism_insight::{
    ContentPipeline, InsightGenerationResult, InsightService, PipelineObserver,
    SourceIngestedEvent,
};
use prism_testkit::{InMemoryInsightRepo, InMemoryResultRepo, InMemoryTransformationRepo, MockModelClient};
use prism_transform::TransformationService;

fn tenant() -> TenantId {
    TenantId::from("t1")
}

fn summary_default() -> Transformation {
    let mut t = Transformation::new(
        None,
        "system:summary",
        "Summarize: {{ source.content }}",
        OutputFormat::Markdown,
    );
    t.apply_default = true;
    t
}

#[derive(Default)]
struct RecordingObserver {
    generated: Mutex<Vec<(String, usize, usize)>>,
    errors: Mutex<Vec<String>>,
}

#[async_trait]
impl PipelineObserver for RecordingObserver {
    async fn on_insights_generated(&self, source_id: &str, result: &InsightGenerationResult) {
        self.generated.lock().unwrap().push((
            source_id.to_string(),
            result.count,
            result.errors.len(),
        ));
    }

    async fn on_error(&self, source_id: &str, _error: &PrismError) {
        self.errors.lock().unwrap().push(source_id.to_string());
    }
}

struct Harness {
    pipeline: ContentPipeline,
    service: Arc<InsightService>,
    insights: Arc<InMemoryInsightRepo>,
    model: Arc<MockModelClient>,
    observer: Arc<RecordingObserver>,
}

fn harness() -> Harness {
    let model = Arc::new(MockModelClient::new().with_reply("Generated content"));
    let insights = Arc::new(InMemoryInsightRepo::new());
    let repo = Arc::new(InMemoryTransformationRepo::with_rows(vec![summary_default()]));
    let transformation_service = Arc::new(TransformationService::new(
        model.clone(),
        repo.clone(),
        Arc::new(InMemoryResultRepo::new()),
    ));
    let service = Arc::new(
        InsightService::new(transformation_service, insights.clone(), repo)
            .with_default_insight_types(vec![InsightType::Summary]),
    );
    let observer = Arc::new(RecordingObserver::default());
    let pipeline = ContentPipeline::new(service.clone()).with_observer(observer.clone());
    Harness {
        pipeline,
        service,
        insights,
        model,
        observer,
    }
}

fn event() -> SourceIngestedEvent {
    SourceIngestedEvent::new("s1", tenant(), "Freshly ingested content.")
}

#[tokio::test]
async fn ingestion_generates_insights_and_notifies() {
    let h = harness();
    h.pipeline.on_source_ingested(&event()).await;

    assert_eq!(h.insights.all().len(), 1);
    let notifications = h.observer.generated.lock().unwrap().clone();
    assert_eq!(notifications, vec![("s1".to_string(), 1, 0)]);
}

#[tokio::test]
async fn updates_invalidate_before_regenerating() {
    let h = harness();
    h.pipeline.on_source_ingested(&event()).await;

    h.model.push_reply("Updated summary");
    h.pipeline.on_source_updated(&event()).await;

    let rows = h.insights.all();
    assert_eq!(rows.len(), 2);
    assert!(!rows[0].is_current());
    assert!(rows[1].is_current());
    assert_eq!(rows[1].content, "Updated summary");

    let current = h
        .service
        .get_insight("s1", &tenant(), InsightType::Summary)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.content, "Updated summary");
}

#[tokio::test]
async fn disabled_auto_generate_skips_the_event() {
    let h = harness();
    let pipeline = ContentPipeline::new(h.service.clone()).with_auto_generate(false);
    pipeline.on_source_ingested(&event()).await;
    assert!(h.insights.all().is_empty());

    let mut pipeline = pipeline;
    assert!(!pipeline.is_auto_generate_enabled());
    pipeline.set_auto_generate(true);
    assert!(pipeline.is_auto_generate_enabled());
}

#[tokio::test]
async fn service_level_flag_also_gates_generation() {
    let model = Arc::new(MockModelClient::new());
    let insights = Arc::new(InMemoryInsightRepo::new());
    let repo = Arc::new(InMemoryTransformationRepo::with_rows(vec![summary_default()]));
    let transformation_service = Arc::new(TransformationService::new(
        model,
        repo.clone(),
        Arc::new(InMemoryResultRepo::new()),
    ));
    let service = Arc::new(
        InsightService::new(transformation_service, insights.clone(), repo)
            .with_auto_generate(false),
    );
    let pipeline = ContentPipeline::new(service);

    assert!(!pipeline.is_auto_generate_enabled());
    pipeline.on_source_ingested(&event()).await;
    assert!(insights.all().is_empty());
}

#[tokio::test]
async fn partial_failures_still_notify_with_error_counts() {
    let h = harness();
    let mut event = event();
    event.is_update = false;
    h.model.push_failure("provider down");

    h.pipeline.on_source_ingested(&event).await;

    let notifications = h.observer.generated.lock().unwrap().clone();
    assert_eq!(notifications, vec![("s1".to_string(), 0, 1)]);
    // Soft failures are reported through the result, not on_error.
    assert!(h.observer.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn manual_regeneration_invalidates_old_rows() {
    let h = harness();
    h.pipeline.on_source_ingested(&event()).await;

    h.model.push_reply("Regenerated");
    let result = h
        .pipeline
        .regenerate_insights("s1", &tenant(), "new content", Some(vec![InsightType::Summary]))
        .await
        .unwrap();

    assert_eq!(result.count, 1);
    let rows = h.insights.all();
    assert_eq!(rows.iter().filter(|i| i.is_current()).count(), 1);
}
