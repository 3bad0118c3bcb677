//! Template Resolver - named, lazily compiled HTML templates
//!
//! Resolves a template name to a renderer. The template body comes either
//! from an inline string given on first use or from an element lookup keyed
//! by `prefix + name` (`tmpl-` by default). Renderers are cached per name and
//! compile on their first render.
//!
//! Templates use the `wp.template()` delimiter syntax:
//! `<# code #>`, `{{{ raw }}}` and `{{ escaped }}`, with the render input
//! bound to `data`.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tmpl_resolver::{HtmlDocumentLookup, TemplateResolver};
//!
//! let page = HtmlDocumentLookup::from_html(
//!     r#"<script type="text/html" id="tmpl-item"><li>{{ data.name }}</li></script>"#,
//! );
//! let mut templates = TemplateResolver::new(page);
//!
//! let html = templates.render("item", &json!({ "name": "<b>" })).unwrap();
//! assert_eq!(html, "<li>&lt;b&gt;</li>");
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod renderer;
pub mod template;

pub use config::{ConfigError, ResolverConfig, DEFAULT_PREFIX};
pub use error::{CompileError, RenderError};
pub use parser::{parse, TemplateSettings};
pub use renderer::{compile, CompiledTemplate, DelimiterCompiler, TemplateCompiler};
pub use template::{
    ElementLookup, HtmlDocumentLookup, LookupError, PendingSources, Renderer, RendererCache,
    Resolved, StaticLookup, TemplateResolver,
};

use thiserror::Error;

/// Errors surfaced when a renderer runs
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template source was rejected by the compiler
    #[error("compile errors: {}", format_compile_errors(.0))]
    Compile(Vec<CompileError>),

    /// Element lookup failed
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Evaluating the compiled template failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Inline renderer ran without a pending source
    #[error("no pending source for template {name}")]
    MissingSource { name: String },
}

impl From<Vec<CompileError>> for TemplateError {
    fn from(errors: Vec<CompileError>) -> Self {
        TemplateError::Compile(errors)
    }
}

fn format_compile_errors(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_error_message() {
        let mut templates = TemplateResolver::new(StaticLookup::new());
        let err = templates
            .resolve("broken", Some(&json!({})), Some("{{ data. }}"))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Compile(_)));
        assert!(err.to_string().starts_with("compile errors: syntax error"));
    }

    #[test]
    fn test_lookup_error_is_transparent() {
        let mut templates = TemplateResolver::new(StaticLookup::new());
        let err = templates.render("absent", &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "no element with id: tmpl-absent");
    }

    #[test]
    fn test_render_error_is_transparent() {
        let mut templates = TemplateResolver::new(StaticLookup::new());
        let err = templates
            .resolve("x", Some(&json!({})), Some("{{ nope }}"))
            .unwrap_err();
        assert_eq!(err.to_string(), "nope is not defined");
    }
}
