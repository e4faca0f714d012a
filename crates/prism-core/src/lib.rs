//! # prism-core
//!
//! Foundation crate for the Prism transformation engine.
//! Defines all models, traits, errors, and value types.
//! Every other crate in the workspace depends on this.

pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use errors::{PrismError, PrismResult};
pub use models::{
    Confidence, ExecutionOptions, InsightType, OutputFormat, SourceInsight, SourceRef, TenantId,
    Transformation, TransformationConfig, TransformationContext, TransformationResult, TruthLevel,
};
