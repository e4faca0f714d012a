//! # prism-parser
//!
//! Normalizes raw model output into the shape a transformation declared:
//! markdown cleanup, JSON extraction with a fixed candidate order, JSON
//! Schema validation, heuristic repair, and dot-path field projection.

mod extract;
mod fields;
mod repair;
mod schema;

use std::sync::OnceLock;

use prism_core::models::OutputFormat;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

pub use fields::extract_fields;
pub use schema::{validate_schema, SchemaValidation};

/// Result of parsing model output.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// Normalized content. For valid JSON this is the pretty-printed form;
    /// for parse failures it is the raw input.
    pub content: String,
    pub parsed: Option<Value>,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ParseOutcome {
    fn ok(content: String, parsed: Option<Value>) -> Self {
        Self {
            content,
            parsed,
            valid: true,
            errors: Vec::new(),
        }
    }

    fn invalid(content: String, parsed: Option<Value>, errors: Vec<String>) -> Self {
        Self {
            content,
            parsed,
            valid: false,
            errors,
        }
    }

    /// All errors joined into one message, for persistence on a result row.
    pub fn joined_errors(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("; "))
        }
    }
}

fn markdown_fence_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^```markdown\n?").expect("static regex"))
}

fn markdown_fence_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n?```$").expect("static regex"))
}

/// Parser for model responses. Stateless; one instance can be shared.
#[derive(Debug, Default, Clone)]
pub struct OutputParser;

impl OutputParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse `content` according to the declared output format. Never fails:
    /// problems are reported through `valid`/`errors` so the raw output can
    /// still be persisted alongside them.
    pub fn parse(&self, content: &str, format: OutputFormat, schema: Option<&Value>) -> ParseOutcome {
        match format {
            OutputFormat::Markdown => self.parse_markdown(content),
            OutputFormat::Json => self.parse_json(content, schema),
            // Structured requires a schema; without one it degrades to
            // plain JSON parsing.
            OutputFormat::Structured => self.parse_json(content, schema),
        }
    }

    fn parse_markdown(&self, content: &str) -> ParseOutcome {
        let stripped = markdown_fence_open_re().replace(content, "");
        let stripped = markdown_fence_close_re().replace(&stripped, "");
        let cleaned = extract::strip_thinking_tags(stripped.trim());
        ParseOutcome::ok(cleaned, None)
    }

    fn parse_json(&self, content: &str, schema: Option<&Value>) -> ParseOutcome {
        let Some(json_string) = extract::extract_json(content) else {
            debug!(len = content.len(), "no json candidate found in output");
            return ParseOutcome::invalid(
                content.to_string(),
                None,
                vec!["No valid JSON found in output".to_string()],
            );
        };

        let parsed: Value = match serde_json::from_str(&json_string) {
            Ok(parsed) => parsed,
            Err(e) => {
                return ParseOutcome::invalid(
                    content.to_string(),
                    None,
                    vec![format!("JSON parse error: {e}")],
                )
            }
        };

        if let Some(schema) = schema {
            let validation = schema::validate_schema(&parsed, schema);
            if !validation.valid {
                return ParseOutcome::invalid(json_string, Some(parsed), validation.errors);
            }
        }

        let pretty = serde_json::to_string_pretty(&parsed).unwrap_or(json_string);
        ParseOutcome::ok(pretty, Some(parsed))
    }

    /// Heuristic repair of almost-JSON. Returns the repaired string only if
    /// it parses. Lossy for apostrophes inside string values.
    pub fn repair_json(&self, content: &str) -> Option<String> {
        repair::repair_json(content)
    }

    /// Dot-path projection over parsed output. Missing paths are omitted.
    pub fn extract_fields(&self, data: &Value, paths: &[&str]) -> serde_json::Map<String, Value> {
        fields::extract_fields(data, paths)
    }
}
