//! Heuristic repair of almost-JSON.

use std::sync::OnceLock;

use regex::Regex;

use crate::extract::is_valid_json;

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([\]}])").expect("static regex"))
}

fn bare_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").expect("static regex"))
}

/// Apply three regex fixups: drop trailing commas, quote bare object keys,
/// turn single quotes into double quotes. The repaired string is returned
/// only if it parses; anything else is `None`.
///
/// The quote rewrite is lossy for apostrophes inside string values. That is
/// a known limitation of the heuristic, not something to guess around.
pub(crate) fn repair_json(content: &str) -> Option<String> {
    let repaired = trailing_comma_re().replace_all(content, "$1");
    let repaired = bare_key_re().replace_all(&repaired, "${1}\"${2}\":");
    let repaired = repaired.replace('\'', "\"");

    if is_valid_json(&repaired) {
        Some(repaired)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_trailing_commas() {
        assert_eq!(
            repair_json("{\"a\": [1, 2,], }"),
            Some("{\"a\": [1, 2]}".to_string())
        );
    }

    #[test]
    fn quotes_bare_keys() {
        assert_eq!(
            repair_json("{name: \"x\", count: 2}"),
            Some("{\"name\": \"x\", \"count\": 2}".to_string())
        );
    }

    #[test]
    fn converts_single_quotes() {
        assert_eq!(
            repair_json("{'a': 'b'}"),
            Some("{\"a\": \"b\"}".to_string())
        );
    }

    #[test]
    fn rejects_unrepairable_input() {
        assert_eq!(repair_json("{\"a\": }"), None);
    }

    #[test]
    fn apostrophes_in_values_stay_broken() {
        // "it's" becomes "it"s", which no longer parses.
        assert_eq!(repair_json("{\"note\": \"it's fine\"}"), None);
    }
}
