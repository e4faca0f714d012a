//! Built-in template filters. This is the full allow-list — templates have
//! no other way to transform values.

use std::sync::OnceLock;

use prism_core::errors::TemplateError;
use regex::Regex;
use serde_json::Value;

use crate::ast::Literal;
use crate::render::stringify;

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]+").expect("static regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn arg_error(filter: &str, message: impl Into<String>) -> TemplateError {
    TemplateError::FilterArgument {
        filter: filter.to_string(),
        message: message.into(),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => stringify(other),
    }
}

fn int_arg(filter: &str, args: &[Literal], idx: usize) -> Result<Option<i64>, TemplateError> {
    match args.get(idx) {
        None => Ok(None),
        Some(Literal::Int(n)) => Ok(Some(*n)),
        Some(Literal::Float(f)) => Ok(Some(*f as i64)),
        Some(other) => Err(arg_error(filter, format!("expected number, got {other:?}"))),
    }
}

fn str_arg<'a>(
    filter: &str,
    args: &'a [Literal],
    idx: usize,
) -> Result<Option<&'a str>, TemplateError> {
    match args.get(idx) {
        None => Ok(None),
        Some(Literal::Str(s)) => Ok(Some(s)),
        Some(other) => Err(arg_error(filter, format!("expected string, got {other:?}"))),
    }
}

/// Apply a built-in filter. Returns `Ok(None)` when the name is not a
/// built-in, so the caller can fall through to custom filters.
pub fn apply_builtin(
    name: &str,
    value: Value,
    args: &[Literal],
) -> Result<Option<Value>, TemplateError> {
    let result = match name {
        "truncate" => truncate(value, args)?,
        "wordcount" => wordcount(value),
        "tokencount" => tokencount(value),
        "firstsentences" => firstsentences(value, args)?,
        "cleantext" => cleantext(value),
        "aslist" => aslist(value, args)?,
        "formatdate" => formatdate(value, args)?,
        "tojson" => tojson(value, args)?,
        _ => return Ok(None),
    };
    Ok(Some(result))
}

fn truncate(value: Value, args: &[Literal]) -> Result<Value, TemplateError> {
    let max = int_arg("truncate", args, 0)?
        .ok_or_else(|| arg_error("truncate", "missing length argument"))? as usize;
    let end = str_arg("truncate", args, 1)?.unwrap_or("...");

    let text = as_text(&value);
    if text.chars().count() <= max {
        return Ok(Value::String(text));
    }
    let keep = max.saturating_sub(end.chars().count());
    let truncated: String = text.chars().take(keep).collect();
    Ok(Value::String(format!("{truncated}{end}")))
}

fn wordcount(value: Value) -> Value {
    let count = as_text(&value).split_whitespace().count();
    Value::from(count as u64)
}

fn tokencount(value: Value) -> Value {
    // Heuristic: roughly 4 characters per token.
    Value::from(as_text(&value).len().div_ceil(4) as u64)
}

fn firstsentences(value: Value, args: &[Literal]) -> Result<Value, TemplateError> {
    let count = int_arg("firstsentences", args, 0)?.unwrap_or(3).max(0) as usize;
    let text = as_text(&value);
    let sentences: Vec<&str> = sentence_re()
        .find_iter(&text)
        .take(count)
        .map(|m| m.as_str().trim())
        .collect();
    Ok(Value::String(sentences.join(" ")))
}

fn cleantext(value: Value) -> Value {
    let text = as_text(&value);
    let collapsed = whitespace_re().replace_all(&text, " ");
    Value::String(collapsed.trim().to_string())
}

fn aslist(value: Value, args: &[Literal]) -> Result<Value, TemplateError> {
    let prefix = str_arg("aslist", args, 0)?.unwrap_or("- ");
    let Value::Array(items) = value else {
        return Ok(Value::String(String::new()));
    };
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("{prefix}{}", as_text(item)))
        .collect();
    Ok(Value::String(lines.join("\n")))
}

fn formatdate(value: Value, args: &[Literal]) -> Result<Value, TemplateError> {
    let style = str_arg("formatdate", args, 0)?.unwrap_or("short");
    let text = as_text(&value);
    if text.is_empty() {
        return Ok(Value::String(String::new()));
    }

    let date = chrono::DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.date_naive())
        .or_else(|_| chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d"));
    let Ok(date) = date else {
        // Unparseable input passes through untouched.
        return Ok(Value::String(text));
    };

    let formatted = match style {
        "long" => date.format("%A, %B %d, %Y").to_string(),
        "iso" => date.format("%Y-%m-%d").to_string(),
        _ => date.format("%m/%d/%Y").to_string(),
    };
    Ok(Value::String(formatted))
}

fn tojson(value: Value, args: &[Literal]) -> Result<Value, TemplateError> {
    let indent = int_arg("tojson", args, 0)?.unwrap_or(2);
    let rendered = if indent <= 0 {
        serde_json::to_string(&value)
    } else {
        serde_json::to_string_pretty(&value)
    }
    .map_err(|e| arg_error("tojson", e.to_string()))?;
    Ok(Value::String(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncate_keeps_short_strings() {
        let out = apply_builtin("truncate", json!("short"), &[Literal::Int(10)])
            .unwrap()
            .unwrap();
        assert_eq!(out, json!("short"));
    }

    #[test]
    fn truncate_appends_ellipsis() {
        let out = apply_builtin("truncate", json!("Hello World!"), &[Literal::Int(10)])
            .unwrap()
            .unwrap();
        assert_eq!(out, json!("Hello W..."));
    }

    #[test]
    fn wordcount_ignores_extra_whitespace() {
        let out = apply_builtin("wordcount", json!("  a  b\n c "), &[])
            .unwrap()
            .unwrap();
        assert_eq!(out, json!(3));
    }

    #[test]
    fn tokencount_rounds_up() {
        let out = apply_builtin("tokencount", json!("abcde"), &[])
            .unwrap()
            .unwrap();
        assert_eq!(out, json!(2));
    }

    #[test]
    fn firstsentences_takes_n() {
        let text = "One. Two! Three? Four.";
        let out = apply_builtin("firstsentences", json!(text), &[Literal::Int(2)])
            .unwrap()
            .unwrap();
        assert_eq!(out, json!("One. Two!"));
    }

    #[test]
    fn aslist_formats_items() {
        let out = apply_builtin("aslist", json!(["one", "two"]), &[])
            .unwrap()
            .unwrap();
        assert_eq!(out, json!("- one\n- two"));
    }

    #[test]
    fn aslist_on_non_array_is_empty() {
        let out = apply_builtin("aslist", json!("nope"), &[]).unwrap().unwrap();
        assert_eq!(out, json!(""));
    }

    #[test]
    fn formatdate_iso() {
        let out = apply_builtin(
            "formatdate",
            json!("2026-08-23T10:00:00Z"),
            &[Literal::Str("iso".to_string())],
        )
        .unwrap()
        .unwrap();
        assert_eq!(out, json!("2026-08-23"));
    }

    #[test]
    fn unknown_filter_falls_through() {
        assert!(apply_builtin("nope", json!(1), &[]).unwrap().is_none());
    }
}
