//! Delimiter syntax recognised in template source

/// Opening and closing marker of one block kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    open: &'static str,
    close: &'static str,
}

impl Delimiter {
    const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }

    pub fn open(&self) -> &'static str {
        self.open
    }

    pub fn close(&self) -> &'static str {
        self.close
    }
}

/// Block syntax and data variable used by every compiled template
///
/// Mustache-style markers compatible with templates written for
/// WordPress' `wp.template()`:
///
/// - evaluate: `<# code #>`
/// - interpolate: `{{{ expr }}}` (raw)
/// - escape: `{{ expr }}` (HTML-escaped, never matches a `{{{ }}}` block)
///
/// The renderer input is bound to the variable `data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSettings {
    evaluate: Delimiter,
    interpolate: Delimiter,
    escape: Delimiter,
    variable: &'static str,
}

impl TemplateSettings {
    pub const DEFAULT: TemplateSettings = TemplateSettings {
        evaluate: Delimiter::new("<#", "#>"),
        interpolate: Delimiter::new("{{{", "}}}"),
        escape: Delimiter::new("{{", "}}"),
        variable: "data",
    };

    pub fn evaluate(&self) -> Delimiter {
        self.evaluate
    }

    pub fn interpolate(&self) -> Delimiter {
        self.interpolate
    }

    pub fn escape(&self) -> Delimiter {
        self.escape
    }

    /// Name the renderer input is bound to
    pub fn variable(&self) -> &'static str {
        self.variable
    }
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}
