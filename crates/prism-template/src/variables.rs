//! Best-effort static variable extraction.
//!
//! A regex scan for root identifiers in `{{ x.y }}`, `{% for i in x %}` and
//! `{% if x %}` constructs. This is not a full parse: nested or computed
//! expressions may be missed. That limitation is deliberate — the scan only
//! feeds template authoring hints, never rendering.

use std::sync::OnceLock;

use regex::Regex;

fn output_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)").expect("static regex"))
}

fn for_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{%\s*for\s+\w+\s+in\s+([A-Za-z_][A-Za-z0-9_.]*)").expect("static regex")
    })
}

fn if_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{%\s*if\s+([A-Za-z_][A-Za-z0-9_.]*)").expect("static regex"))
}

/// Root identifiers referenced by a template, in first-appearance order.
pub fn extract_variables(template: &str) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();

    for re in [output_re(), for_re(), if_re()] {
        for capture in re.captures_iter(template) {
            let root = capture[1].split('.').next().unwrap_or("").to_string();
            if !root.is_empty() && !variables.contains(&root) {
                variables.push(root);
            }
        }
    }

    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_roots_from_outputs_and_tags() {
        let template =
            "{{ source.content }} {% if source.title %}{{ tenant_id }}{% endif %} {% for t in tags %}{{ t }}{% endfor %}";
        let vars = extract_variables(template);
        assert_eq!(vars, vec!["source", "tenant_id", "t", "tags"]);
    }

    #[test]
    fn deduplicates_roots() {
        let vars = extract_variables("{{ a.b }} {{ a.c }} {{ a }}");
        assert_eq!(vars, vec!["a"]);
    }
}
