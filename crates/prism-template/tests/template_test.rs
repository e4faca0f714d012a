//! End-to-end rendering tests against realistic transformation contexts.

use prism_core::errors::TemplateError;
use prism_core::models::{SourceRef, TenantId, TransformationContext};
use prism_template::TemplateRenderer;
use serde_json::json;

fn context() -> TransformationContext {
    TransformationContext::for_source(
        SourceRef {
            id: "src-1".to_string(),
            content: "First sentence. Second sentence. Third sentence.".to_string(),
            title: Some("My Document".to_string()),
            source_type: Some("article".to_string()),
            metadata: None,
            version: Some(2),
        },
        TenantId::from("tenant-1"),
    )
}

#[test]
fn renders_simple_variables() {
    let renderer = TemplateRenderer::new();
    let ctx = TransformationContext::default().with_var("name", json!("World"));
    let result = renderer.render("Hello {{ name }}!", &ctx).unwrap();
    assert_eq!(result.content, "Hello World!");
}

#[test]
fn renders_nested_paths() {
    let renderer = TemplateRenderer::new();
    let result = renderer
        .render("Source: {{ source.title }} ({{ source.type }})", &context())
        .unwrap();
    assert_eq!(result.content, "Source: My Document (article)");
}

#[test]
fn estimates_tokens_from_rendered_length() {
    let renderer = TemplateRenderer::new();
    let ctx = TransformationContext::default().with_var("content", json!("a".repeat(100)));
    let result = renderer.render("{{ content }}", &ctx).unwrap();
    assert_eq!(result.estimated_tokens, 25);
}

#[test]
fn undefined_variables_render_empty_by_default() {
    let renderer = TemplateRenderer::new();
    let result = renderer
        .render("[{{ missing }}]", &TransformationContext::default())
        .unwrap();
    assert_eq!(result.content, "[]");
}

#[test]
fn strict_mode_rejects_undefined_output() {
    let renderer = TemplateRenderer::new().with_strict(true);
    let err = renderer
        .render_value("{{ missing.var }}", &json!({}))
        .unwrap_err();
    match err {
        TemplateError::UndefinedVariable { name } => assert_eq!(name, "missing.var"),
        other => panic!("expected undefined variable error, got {other}"),
    }
}

#[test]
fn filters_chain_through_the_pipeline() {
    let renderer = TemplateRenderer::new();
    let result = renderer
        .render(
            "{{ source.content | firstsentences(2) | wordcount }}",
            &context(),
        )
        .unwrap();
    assert_eq!(result.content, "4");
}

#[test]
fn for_loops_iterate_arrays() {
    let renderer = TemplateRenderer::new();
    let ctx = TransformationContext::default().with_var("tags", json!(["rust", "ai"]));
    let result = renderer
        .render("{% for tag in tags %}#{{ tag }} {% endfor %}", &ctx)
        .unwrap();
    assert_eq!(result.content, "#rust #ai ");
}

#[test]
fn if_blocks_branch_on_truthiness() {
    let renderer = TemplateRenderer::new();
    let template = "{% if source.title %}{{ source.title }}{% else %}untitled{% endif %}";
    let with_title = renderer.render(template, &context()).unwrap();
    assert_eq!(with_title.content, "My Document");

    let without = renderer
        .render(template, &TransformationContext::default())
        .unwrap();
    assert_eq!(without.content, "untitled");
}

#[test]
fn aslist_formats_arrays() {
    let renderer = TemplateRenderer::new();
    let ctx = TransformationContext::default().with_var("items", json!(["one", "two", "three"]));
    let result = renderer.render("{{ items | aslist }}", &ctx).unwrap();
    assert_eq!(result.content, "- one\n- two\n- three");
}

#[test]
fn today_global_is_a_date() {
    let renderer = TemplateRenderer::new();
    let result = renderer
        .render("{{ today() }}", &TransformationContext::default())
        .unwrap();
    assert_eq!(result.content.len(), 10);
    assert_eq!(result.content.matches('-').count(), 2);
}

#[test]
fn custom_filters_participate_in_the_allow_list() {
    let mut renderer = TemplateRenderer::new();
    renderer.add_filter("shout", |value, _args| {
        Ok(json!(value.as_str().unwrap_or_default().to_uppercase()))
    });
    let ctx = TransformationContext::default().with_var("word", json!("quiet"));
    let result = renderer.render("{{ word | shout }}", &ctx).unwrap();
    assert_eq!(result.content, "QUIET");
}

#[test]
fn unknown_filter_is_an_error() {
    let renderer = TemplateRenderer::new();
    let err = renderer
        .render_value("{{ x | nonsense }}", &json!({"x": 1}))
        .unwrap_err();
    assert!(matches!(err, TemplateError::UnknownFilter { .. }));
}

#[test]
fn custom_globals_resolve_as_top_level_names() {
    let mut renderer = TemplateRenderer::new();
    renderer.add_global("system_name", json!("prism"));
    let result = renderer
        .render_value("run by {{ system_name }}", &json!({}))
        .unwrap();
    assert_eq!(result, "run by prism");
}

#[test]
fn validate_accepts_unbound_variables() {
    let renderer = TemplateRenderer::new().with_strict(true);
    let validation = renderer.validate("Hello {{ not_bound }}");
    assert!(validation.valid);
    assert!(validation.error.is_none());
}

#[test]
fn validate_rejects_syntax_errors() {
    let renderer = TemplateRenderer::new();
    let validation = renderer.validate("{% if x %}no end");
    assert!(!validation.valid);
    assert!(validation.error.is_some());
}

#[test]
fn extract_variables_reports_roots() {
    let renderer = TemplateRenderer::new();
    let vars = renderer.extract_variables("{{ source.content }} {% if tenant_id %}x{% endif %}");
    assert!(vars.contains(&"source".to_string()));
    assert!(vars.contains(&"tenant_id".to_string()));
}
