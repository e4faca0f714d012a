//! # prism-insight
//!
//! Insight lifecycle on top of the transformation service: typed insight
//! generation with per-type failure isolation, current-row queries,
//! promotion to user truth, invalidation, regeneration, and the content
//! pipeline adapter that drives all of it from ingestion events.

mod pipeline;
mod service;

pub use pipeline::{ContentPipeline, LoggingObserver, PipelineObserver, SourceIngestedEvent};
pub use service::{
    InsightGenerationResult, InsightRequest, InsightService, InsightSummary, InsightTypeError,
    RegenerateOptions,
};
