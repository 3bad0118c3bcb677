//! Integration tests for name resolution, caching and lazy compilation

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;

use tmpl_resolver::{
    CompileError, CompiledTemplate, DelimiterCompiler, LookupError, ResolverConfig, Resolved,
    StaticLookup, TemplateCompiler, TemplateError, TemplateResolver, TemplateSettings,
};

/// Delegates to the default compiler and counts calls
#[derive(Clone, Default)]
struct CountingCompiler {
    calls: Rc<Cell<usize>>,
}

impl TemplateCompiler for CountingCompiler {
    fn compile(
        &self,
        source: &str,
        settings: &TemplateSettings,
    ) -> Result<CompiledTemplate, Vec<CompileError>> {
        self.calls.set(self.calls.get() + 1);
        DelimiterCompiler.compile(source, settings)
    }
}

/// Element lookup that records every key it is asked for
fn recording_lookup(
    markup: &'static str,
) -> (
    impl Fn(&str) -> Result<String, LookupError>,
    Rc<RefCell<Vec<String>>>,
) {
    let keys = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&keys);
    let lookup = move |key: &str| -> Result<String, LookupError> {
        seen.borrow_mut().push(key.to_string());
        Ok(markup.to_string())
    };
    (lookup, keys)
}

#[test]
fn test_idempotent_registration() {
    let mut templates = TemplateResolver::new(StaticLookup::new());

    templates
        .resolve("x", None, Some("<p>{{ data.v }}</p>"))
        .unwrap();
    templates
        .resolve("x", None, Some("<p>{{ data.v }}</p>"))
        .unwrap();
    let html = templates
        .resolve("x", Some(&json!({ "v": "hi" })), None)
        .unwrap()
        .into_rendered();
    assert_eq!(html.as_deref(), Some("<p>hi</p>"));

    // A different source for a bound name changes nothing
    let html = templates
        .resolve("x", Some(&json!({ "v": "hi" })), Some("<h1>{{ data.v }}</h1>"))
        .unwrap()
        .into_rendered();
    assert_eq!(html.as_deref(), Some("<p>hi</p>"));
    assert_eq!(templates.renderers().len(), 1);
}

#[test]
fn test_reregistration_before_first_render_keeps_original_source() {
    let mut templates = TemplateResolver::new(StaticLookup::new());
    templates.register("x", "first {{ data }}");
    templates.register("x", "second {{ data }}");

    assert_eq!(
        templates.pending_sources().get("x").as_deref(),
        Some("first {{ data }}")
    );
    assert_eq!(templates.render("x", &json!(1)).unwrap(), "first 1");
}

#[test]
fn test_lazy_single_compile() {
    let compiler = CountingCompiler::default();
    let calls = Rc::clone(&compiler.calls);
    let mut templates =
        TemplateResolver::with_compiler(ResolverConfig::default(), StaticLookup::new(), compiler);

    let src = "<b>{{ data.v }}</b>";
    templates.resolve("x", None, Some(src)).unwrap();
    assert_eq!(templates.pending_sources().get("x").as_deref(), Some(src));
    assert_eq!(calls.get(), 0);

    templates
        .resolve("x", Some(&json!({ "v": 1 })), None)
        .unwrap();
    assert!(!templates.pending_sources().contains("x"));
    assert_eq!(calls.get(), 1);

    for v in 0..5 {
        templates.render("x", &json!({ "v": v })).unwrap();
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_external_path_uses_prefix_once() {
    let (lookup, keys) = recording_lookup("<div class=\"attachment\">{{ data.id }}</div>");
    let mut templates = TemplateResolver::new(lookup);

    for id in 0..3 {
        let html = templates
            .resolve("attachment", Some(&json!({ "id": id })), None)
            .unwrap()
            .into_rendered();
        assert_eq!(
            html,
            Some(format!("<div class=\"attachment\">{}</div>", id))
        );
    }

    assert_eq!(*keys.borrow(), vec!["tmpl-attachment".to_string()]);
}

#[test]
fn test_custom_prefix() {
    let (lookup, keys) = recording_lookup("ok");
    let config = ResolverConfig::new().with_prefix("wp-tmpl-");
    let mut templates = TemplateResolver::with_config(config, lookup);

    assert_eq!(templates.render("media", &json!({})).unwrap(), "ok");
    assert_eq!(*keys.borrow(), vec!["wp-tmpl-media".to_string()]);
}

#[test]
fn test_renderer_returned_without_data() {
    let mut templates = TemplateResolver::new(StaticLookup::new());
    let resolved = templates
        .resolve("x", None, Some("<b>{{ data.v }}</b>"))
        .unwrap();
    let renderer = match resolved {
        Resolved::Renderer(renderer) => renderer,
        Resolved::Rendered(html) => panic!("Expected a renderer, got {:?}", html),
    };

    assert_eq!(renderer.render(&json!({ "v": "a" })).unwrap(), "<b>a</b>");
    assert_eq!(renderer.render(&json!({ "v": "b" })).unwrap(), "<b>b</b>");
    assert_eq!(renderer.name(), "x");
    assert_eq!(templates.renderers().len(), 1);
}

#[test]
fn test_same_renderer_for_every_resolution() {
    let mut templates = TemplateResolver::new(StaticLookup::new());
    let first = templates
        .resolve("x", None, Some("{{ data }}"))
        .unwrap()
        .into_renderer()
        .expect("Should return renderer");
    let second = templates
        .resolve("x", None, None)
        .unwrap()
        .into_renderer()
        .expect("Should return renderer");
    assert!(first.ptr_eq(&second));
    assert!(first.ptr_eq(templates.renderers().get("x").unwrap()));
}

#[test]
fn test_lookup_failure_surfaces_on_render_only() {
    let mut templates = TemplateResolver::new(StaticLookup::new());

    // Binding succeeds; the lookup runs on first render
    let renderer = templates.get("missing");
    assert!(templates.renderers().has("missing"));

    let err = renderer.render(&json!({})).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::Lookup(LookupError::NotFound { ref key }) if key == "tmpl-missing"
    ));
}

#[test]
fn test_custom_lookup_error_passes_through() {
    let lookup = |_: &str| -> Result<String, LookupError> {
        Err(LookupError::Other("document not ready".to_string()))
    };
    let mut templates = TemplateResolver::new(lookup);
    let err = templates.render("x", &json!({})).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::Lookup(LookupError::Other(ref msg)) if msg == "document not ready"
    ));
}

#[test]
fn test_compile_failure_is_retried() {
    let compiler = CountingCompiler::default();
    let calls = Rc::clone(&compiler.calls);
    let mut templates =
        TemplateResolver::with_compiler(ResolverConfig::default(), StaticLookup::new(), compiler);

    let renderer = templates.register("broken", "<# if (data.v) { #>unclosed");
    for attempt in 1..=2 {
        let err = renderer.render(&json!({ "v": true })).unwrap_err();
        assert!(matches!(err, TemplateError::Compile(_)));
        assert_eq!(calls.get(), attempt);
    }

    // Source stays pending until a compile succeeds
    assert!(templates.pending_sources().contains("broken"));
    assert!(!renderer.is_compiled());
}

#[test]
fn test_external_compile_failure_refetches() {
    let (lookup, keys) = recording_lookup("{{ data. }}");
    let mut templates = TemplateResolver::new(lookup);

    assert!(templates.render("bad", &json!({})).is_err());
    assert!(templates.render("bad", &json!({})).is_err());
    assert_eq!(keys.borrow().len(), 2);
}

#[test]
fn test_render_error_does_not_uncompile() {
    let compiler = CountingCompiler::default();
    let calls = Rc::clone(&compiler.calls);
    let mut templates =
        TemplateResolver::with_compiler(ResolverConfig::default(), StaticLookup::new(), compiler);

    templates.register("x", "{{ data.a.b }}");
    let err = templates.render("x", &json!({})).unwrap_err();
    assert!(matches!(err, TemplateError::Render(_)));
    assert_eq!(
        templates.render("x", &json!({ "a": { "b": "ok" } })).unwrap(),
        "ok"
    );
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_inline_and_external_names_are_independent() {
    let lookup = StaticLookup::new().with("tmpl-page", "page:{{ data.v }}");
    let mut templates = TemplateResolver::new(lookup);

    templates.register("inline", "inline:{{ data.v }}");
    let data = json!({ "v": 7 });
    assert_eq!(templates.render("inline", &data).unwrap(), "inline:7");
    assert_eq!(templates.render("page", &data).unwrap(), "page:7");

    let mut names: Vec<_> = templates.renderers().names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["inline", "page"]);
}

#[test]
fn test_external_binding_ignores_later_inline_source() {
    let lookup = StaticLookup::new().with("tmpl-x", "from page");
    let mut templates = TemplateResolver::new(lookup);

    templates.get("x");
    let html = templates
        .resolve("x", Some(&json!({})), Some("from inline"))
        .unwrap()
        .into_rendered();
    assert_eq!(html.as_deref(), Some("from page"));
    assert!(templates.pending_sources().is_empty());
}
