//! # prism-transform
//!
//! Executes transformations end to end: resolve the template, render the
//! prompt, invoke the model, parse the output, persist the result and
//! account its cost. Also loads the built-in transformation catalog.

mod catalog;
mod cost;
mod service;

pub use catalog::{load_catalog_dir, CatalogLoad};
pub use cost::estimate_cost;
pub use service::{
    ExecutionResult, PreviewResult, TemplateReport, TransformationService, DEFAULT_MODEL,
    TRANSFORMATION_JOB_TYPE,
};
