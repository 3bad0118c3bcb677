//! Integration tests for the template delimiter syntax

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use tmpl_resolver::{compile, HtmlDocumentLookup, TemplateResolver};

fn render(source: &str, data: Value) -> String {
    compile(source)
        .expect("Should compile")
        .render(&data)
        .expect("Should render")
}

#[test]
fn test_escape_vs_interpolate() {
    let data = json!({ "v": "<i>x</i>" });
    assert_eq!(render("{{ data.v }}", data.clone()), "&lt;i&gt;x&lt;/i&gt;");
    assert_eq!(render("{{{ data.v }}}", data), "<i>x</i>");
}

#[test]
fn test_evaluate_block_executes_logic() {
    let source = "<# if (data.v) { #>yes<# } #>";
    assert_eq!(render(source, json!({ "v": true })), "yes");
    assert_eq!(render(source, json!({ "v": false })), "");
}

#[test]
fn test_default_erb_delimiters_are_plain_text() {
    assert_eq!(
        render("<% data.v %> <%= data.v %>", json!({ "v": 1 })),
        "<% data.v %> <%= data.v %>"
    );
}

#[test]
fn test_attachment_template() {
    let source = r#"<div class="attachment <# if ( data.selected ) { #>selected<# } #>">
<# if ( data.uploading ) { #><div class="progress">{{ data.percent }}%</div><# } else { #><img src="{{ data.url }}" alt="{{ data.alt }}"><# } #>
</div>"#;

    let html = render(
        source,
        json!({
            "selected": true,
            "uploading": false,
            "url": "/a.png",
            "alt": "\"quoted\"",
        }),
    );
    insta::assert_snapshot!(html, @r###"
    <div class="attachment selected">
    <img src="/a.png" alt="&quot;quoted&quot;">
    </div>
    "###);
}

#[test]
fn test_nested_each() {
    let source = "<# _.each( data.groups, function( group ) { #>[{{ group.name }}:<# _.each( group.items, function( item ) { #> {{ item }}<# } ); #>]<# } ); #>";
    let html = render(
        source,
        json!({
            "groups": [
                { "name": "a", "items": [1, 2] },
                { "name": "b", "items": [] },
            ]
        }),
    );
    insta::assert_snapshot!(html, @"[a: 1 2][b:]");
}

#[test]
fn test_page_templates_through_resolver() {
    let page = HtmlDocumentLookup::from_html(
        r#"<html><body>
<script type="text/html" id="tmpl-greeting"><h1>{{ data.title }}</h1><# if ( data.body ) { #><p>{{{ data.body }}}</p><# } #></script>
</body></html>"#,
    );
    let mut templates = TemplateResolver::new(page);

    assert_eq!(
        templates
            .render("greeting", &json!({ "title": "Hi & bye", "body": "<em>x</em>" }))
            .unwrap(),
        "<h1>Hi &amp; bye</h1><p><em>x</em></p>"
    );
    assert_eq!(
        templates.render("greeting", &json!({ "title": "T" })).unwrap(),
        "<h1>T</h1>"
    );
}

#[test]
fn test_compile_error_diagnostic() {
    let source = "<p>{{ data. }}</p>";
    let errors = compile(source).unwrap_err();
    let report = errors[0].format(source, "tmpl-broken");
    assert!(report.contains("tmpl-broken"));
    assert!(report.contains("Unexpected"));
}
