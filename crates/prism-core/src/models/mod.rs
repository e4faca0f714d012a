mod config;
mod confidence;
mod context;
mod format;
mod insight;
mod insight_type;
mod result;
mod tenant;
mod transformation;

pub use config::TransformationConfig;
pub use confidence::Confidence;
pub use context::{ExecutionOptions, SourceRef, TransformationContext};
pub use format::OutputFormat;
pub use insight::{SourceInsight, TruthLevel};
pub use insight_type::InsightType;
pub use result::TransformationResult;
pub use tenant::TenantId;
pub use transformation::Transformation;
