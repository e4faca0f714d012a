//! JSON extraction from raw model output.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn thinking_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<think>.*?</think>|<thinking>.*?</thinking>|<reasoning>.*?</reasoning>")
            .expect("static regex")
    })
}

fn code_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("static regex"))
}

fn object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex"))
}

fn array_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("static regex"))
}

/// Strip `<think>`, `<thinking>` and `<reasoning>` blocks, then trim.
pub(crate) fn strip_thinking_tags(content: &str) -> String {
    thinking_re().replace_all(content, "").trim().to_string()
}

pub(crate) fn is_valid_json(candidate: &str) -> bool {
    serde_json::from_str::<Value>(candidate).is_ok()
}

/// Pull a JSON payload out of model output. Candidates are tried in a fixed
/// order: fenced code block, greedy `{...}` span, greedy `[...]` span, the
/// whole trimmed string. The first candidate that parses wins.
pub(crate) fn extract_json(content: &str) -> Option<String> {
    let content = strip_thinking_tags(content);

    if let Some(captures) = code_block_re().captures(&content) {
        let candidate = captures[1].trim();
        if is_valid_json(candidate) {
            return Some(candidate.to_string());
        }
    }

    if let Some(m) = object_re().find(&content) {
        if is_valid_json(m.as_str()) {
            return Some(m.as_str().to_string());
        }
    }

    if let Some(m) = array_re().find(&content) {
        if is_valid_json(m.as_str()) {
            return Some(m.as_str().to_string());
        }
    }

    let trimmed = content.trim();
    if is_valid_json(trimmed) {
        return Some(trimmed.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_thinking_blocks_case_insensitively() {
        let input = "<THINK>internal</THINK>answer<reasoning>\nmore\n</reasoning>";
        assert_eq!(strip_thinking_tags(input), "answer");
    }

    #[test]
    fn prefers_fenced_block() {
        let input = "prose {\"ignored\": true} ```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json(input), Some("{\"a\": 1}".to_string()));
    }

    #[test]
    fn falls_back_to_object_span() {
        let input = "Here is the result: {\"a\": 1} done";
        assert_eq!(extract_json(input), Some("{\"a\": 1}".to_string()));
    }

    #[test]
    fn falls_back_to_array_span() {
        let input = "tags: [\"one\", \"two\"] end";
        assert_eq!(extract_json(input), Some("[\"one\", \"two\"]".to_string()));
    }

    #[test]
    fn whole_string_as_last_resort() {
        assert_eq!(extract_json("  42  "), Some("42".to_string()));
    }

    #[test]
    fn none_when_nothing_parses() {
        assert_eq!(extract_json("just prose, no data"), None);
    }
}
