//! Template compiler and evaluator
//!
//! [`DelimiterCompiler`] turns template source into a [`CompiledTemplate`],
//! which renders a data value to a string any number of times.

mod eval;
pub mod value;

use serde_json::Value;

use crate::error::{CompileError, RenderError};
use crate::parser::{parse, Program, TemplateSettings};

/// Turns template source into a reusable renderer
pub trait TemplateCompiler {
    fn compile(
        &self,
        source: &str,
        settings: &TemplateSettings,
    ) -> Result<CompiledTemplate, Vec<CompileError>>;
}

/// Compiler for the `<# #>` / `{{{ }}}` / `{{ }}` delimiter syntax
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimiterCompiler;

impl TemplateCompiler for DelimiterCompiler {
    fn compile(
        &self,
        source: &str,
        settings: &TemplateSettings,
    ) -> Result<CompiledTemplate, Vec<CompileError>> {
        let program = parse(source, settings)?;
        Ok(CompiledTemplate::new(program, settings.variable()))
    }
}

/// A parsed template ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    program: Program,
    variable: &'static str,
}

impl CompiledTemplate {
    pub fn new(program: Program, variable: &'static str) -> Self {
        Self { program, variable }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Render with `data` bound to the template variable
    pub fn render(&self, data: &Value) -> Result<String, RenderError> {
        eval::render_program(&self.program, self.variable, data)
    }
}

/// Compile `source` with the default settings
pub fn compile(source: &str) -> Result<CompiledTemplate, Vec<CompileError>> {
    DelimiterCompiler.compile(source, &TemplateSettings::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(source: &str, data: Value) -> String {
        compile(source)
            .expect("Should compile")
            .render(&data)
            .expect("Should render")
    }

    #[test]
    fn test_escape_block_escapes_html() {
        assert_eq!(
            render("{{ data.v }}", json!({ "v": "<i>x</i>" })),
            "&lt;i&gt;x&lt;/i&gt;"
        );
    }

    #[test]
    fn test_interpolate_block_is_raw() {
        assert_eq!(render("{{{ data.v }}}", json!({ "v": "<i>x</i>" })), "<i>x</i>");
    }

    #[test]
    fn test_evaluate_block_runs_logic() {
        let source = "<# if (data.v) { #>yes<# } #>";
        assert_eq!(render(source, json!({ "v": true })), "yes");
        assert_eq!(render(source, json!({ "v": false })), "");
    }

    #[test]
    fn test_else_if_chain() {
        let source = "<# if (data.n > 10) { #>big<# } else if (data.n > 0) { #>small<# } else { #>none<# } #>";
        assert_eq!(render(source, json!({ "n": 20 })), "big");
        assert_eq!(render(source, json!({ "n": 3 })), "small");
        assert_eq!(render(source, json!({ "n": 0 })), "none");
    }

    #[test]
    fn test_each_over_array_and_object() {
        let list = "<ul><# _.each( data.items, function( item, i ) { #><li>{{ i }}:{{ item }}</li><# } ); #></ul>";
        assert_eq!(
            render(list, json!({ "items": ["a", "b"] })),
            "<ul><li>0:a</li><li>1:b</li></ul>"
        );

        let attrs = "<# _.each( data.attrs, function( value, key ) { #> {{ key }}=\"{{ value }}\"<# } ); #>";
        assert_eq!(
            render(attrs, json!({ "attrs": { "id": "main" } })),
            " id=\"main\""
        );
    }

    #[test]
    fn test_null_and_missing_values_print_nothing() {
        assert_eq!(render("[{{ data.missing }}]", json!({})), "[]");
        assert_eq!(render("[{{{ data.none }}}]", json!({ "none": null })), "[]");
    }

    #[test]
    fn test_numbers_print_like_script_numbers() {
        assert_eq!(render("{{ data.n + 1 }}", json!({ "n": 1.0 })), "2");
        assert_eq!(render("{{ data.n / 4 }}", json!({ "n": 1 })), "0.25");
    }

    #[test]
    fn test_string_concatenation_and_ternary() {
        assert_eq!(
            render(
                "{{ data.first + ' ' + data.last }} ({{ data.admin ? 'admin' : 'user' }})",
                json!({ "first": "Ada", "last": "Lovelace", "admin": false })
            ),
            "Ada Lovelace (user)"
        );
    }

    #[test]
    fn test_var_and_print() {
        assert_eq!(
            render(
                "<# var label = data.name || 'anonymous'; print( label ); #>",
                json!({ "name": "" })
            ),
            "anonymous"
        );
    }

    #[test]
    fn test_builtins() {
        assert_eq!(
            render("{{{ _.escape( data.html ) }}}", json!({ "html": "<b>" })),
            "&lt;b&gt;"
        );
        assert_eq!(
            render(
                "<# if ( _.isEmpty( data.list ) ) { #>empty<# } #>",
                json!({ "list": [] })
            ),
            "empty"
        );
        assert_eq!(
            render("{{ _.has( data, 'x' ) }}", json!({ "x": 1 })),
            "true"
        );
    }

    #[test]
    fn test_index_and_length() {
        assert_eq!(
            render(
                "{{ data.items[1] }}/{{ data.items.length }}",
                json!({ "items": ["a", "b", "c"] })
            ),
            "b/3"
        );
    }

    #[test]
    fn test_undefined_variable_is_render_error() {
        let template = compile("{{ missing }}").expect("Should compile");
        let err = template.render(&json!({})).unwrap_err();
        assert!(matches!(err, RenderError::UndefinedVariable { ref name, .. } if name == "missing"));
    }

    #[test]
    fn test_property_of_null_is_render_error() {
        let template = compile("{{ data.a.b }}").expect("Should compile");
        let err = template.render(&json!({})).unwrap_err();
        assert!(matches!(err, RenderError::NullAccess { ref property, .. } if property == "b"));
    }

    #[test]
    fn test_unknown_function_is_render_error() {
        let template = compile("{{ alert( 1 ) }}").expect("Should compile");
        let err = template.render(&json!({})).unwrap_err();
        assert!(matches!(err, RenderError::UnknownFunction { ref name, .. } if name == "alert"));
    }

    #[test]
    fn test_compiled_template_is_reusable() {
        let template = compile("<b>{{ data.v }}</b>").expect("Should compile");
        assert_eq!(template.render(&json!({ "v": "a" })).unwrap(), "<b>a</b>");
        assert_eq!(template.render(&json!({ "v": "b" })).unwrap(), "<b>b</b>");
    }

    #[test]
    fn test_comments_and_exponents_in_code() {
        assert_eq!(render("<# /* c **/ #>z", json!({})), "z");
        assert_eq!(render("{{ 1e3 }} {{ 25e-1 }}", json!({})), "1000 2.5");
    }
}
