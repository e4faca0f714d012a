//! JSON Schema validation in all-errors mode.

use jsonschema::JSONSchema;
use serde_json::Value;

/// Outcome of validating parsed data against a schema.
#[derive(Debug, Clone)]
pub struct SchemaValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Validate `data` against `schema`, collecting every violation rather than
/// stopping at the first. Each violation is formatted as `<path>: <message>`
/// with `/` standing in for the document root.
pub fn validate_schema(data: &Value, schema: &Value) -> SchemaValidation {
    let compiled = match JSONSchema::compile(schema) {
        Ok(compiled) => compiled,
        Err(e) => {
            return SchemaValidation {
                valid: false,
                errors: vec![format!("invalid schema: {e}")],
            }
        }
    };

    // The error iterator borrows `compiled`; collect before it drops.
    let errors: Vec<String> = match compiled.validate(data) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|err| {
                let path = err.instance_path.to_string();
                let path = if path.is_empty() { "/" } else { &path };
                format!("{path}: {err}")
            })
            .collect(),
    };

    SchemaValidation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["summary", "confidence"],
            "properties": {
                "summary": { "type": "string" },
                "confidence": { "type": "number" }
            }
        })
    }

    #[test]
    fn accepts_conforming_data() {
        let result = validate_schema(&json!({"summary": "ok", "confidence": 0.9}), &schema());
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn collects_all_violations() {
        let result = validate_schema(&json!({"confidence": "high"}), &schema());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn root_violations_use_slash_path() {
        let result = validate_schema(&json!("not an object"), &schema());
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("/: "));
    }

    #[test]
    fn nested_violations_carry_pointer_paths() {
        let result = validate_schema(&json!({"summary": 3, "confidence": 0.5}), &schema());
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.starts_with("/summary: ")));
    }
}
