//! # prism-template
//!
//! Sandboxed prompt-template renderer. Templates are evaluated in memory
//! against a JSON context with an explicit allow-list of filters and
//! globals — no filesystem includes, no module loading, no generic eval.
//! Auto-escaping is disabled: output is a prompt, not HTML.

mod ast;
mod filters;
mod parse;
mod render;
mod variables;

use std::collections::HashMap;
use std::sync::Arc;

use prism_core::errors::{PrismResult, TemplateError};
use prism_core::models::TransformationContext;
use serde_json::Value;

pub use ast::Literal;
pub use variables::extract_variables;

/// Custom filter: value in, value out, literal arguments only.
pub type CustomFilter =
    Arc<dyn Fn(Value, &[Literal]) -> Result<Value, TemplateError> + Send + Sync>;

/// Result of rendering a template.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub content: String,
    /// Heuristic: roughly 4 characters per token.
    pub estimated_tokens: usize,
}

/// Result of validating a template.
#[derive(Debug, Clone)]
pub struct TemplateValidation {
    pub valid: bool,
    pub error: Option<String>,
}

pub fn estimate_tokens(content: &str) -> usize {
    content.len().div_ceil(4)
}

/// The template renderer. Cheap to construct; holds only configuration and
/// registered extensions, no per-render state.
pub struct TemplateRenderer {
    strict: bool,
    custom_filters: HashMap<String, CustomFilter>,
    globals: HashMap<String, Value>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            strict: false,
            custom_filters: HashMap::new(),
            globals: HashMap::new(),
        }
    }

    /// In strict mode, outputting an undefined (or null) variable is an
    /// error instead of rendering nothing.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register a custom filter under the same sandboxing rules as the
    /// built-ins: literal arguments only.
    pub fn add_filter(
        &mut self,
        name: impl Into<String>,
        filter: impl Fn(Value, &[Literal]) -> Result<Value, TemplateError> + Send + Sync + 'static,
    ) {
        self.custom_filters.insert(name.into(), Arc::new(filter));
    }

    /// Register a static global value, addressable as a top-level name.
    pub fn add_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Render a template against a transformation context.
    pub fn render(
        &self,
        template: &str,
        context: &TransformationContext,
    ) -> PrismResult<RenderResult> {
        let value = context.to_value()?;
        let content = self.render_value(template, &value)?;
        Ok(RenderResult {
            estimated_tokens: estimate_tokens(&content),
            content,
        })
    }

    /// Render a template against an arbitrary JSON object.
    pub fn render_value(&self, template: &str, context: &Value) -> Result<String, TemplateError> {
        let nodes = parse::parse(template)?;
        render::Evaluator::new(context, &self.globals, &self.custom_filters, self.strict)
            .render(&nodes)
    }

    /// Check a template for syntax errors by rendering it against an empty
    /// context. Unbound variables are not syntax errors: an
    /// undefined-variable failure still counts as valid.
    pub fn validate(&self, template: &str) -> TemplateValidation {
        match self.render_value(template, &Value::Object(serde_json::Map::new())) {
            Ok(_) => TemplateValidation {
                valid: true,
                error: None,
            },
            Err(TemplateError::UndefinedVariable { .. }) => TemplateValidation {
                valid: true,
                error: None,
            },
            Err(e) => TemplateValidation {
                valid: false,
                error: Some(e.to_string()),
            },
        }
    }

    /// Best-effort static scan for root variables. See [`extract_variables`].
    pub fn extract_variables(&self, template: &str) -> Vec<String> {
        variables::extract_variables(template)
    }
}
