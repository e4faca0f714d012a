mod catalog_error;
mod insight_error;
mod template_error;
mod transform_error;

pub use catalog_error::CatalogError;
pub use insight_error::InsightError;
pub use template_error::TemplateError;
pub use transform_error::TransformError;

/// Top-level error type aggregating every domain error in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum PrismError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Insight(#[from] InsightError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PrismResult<T> = Result<T, PrismError>;
