//! Element lookup: fetching template markup by element id

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use thiserror::Error;

/// Errors produced by element lookups
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LookupError {
    /// No element carries the requested id
    #[error("no element with id: {key}")]
    NotFound { key: String },

    /// Error reading a document from disk
    #[error("error reading document {path}: {message}")]
    FileReadError { path: PathBuf, message: String },

    /// Failure reported by a custom lookup
    #[error("{0}")]
    Other(String),
}

/// Resolves a lookup key (prefix + template name) to raw template markup
pub trait ElementLookup {
    fn lookup(&self, key: &str) -> Result<String, LookupError>;
}

impl<F> ElementLookup for F
where
    F: Fn(&str) -> Result<String, LookupError>,
{
    fn lookup(&self, key: &str) -> Result<String, LookupError> {
        self(key)
    }
}

/// Lookup backed by an in-memory map
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    elements: HashMap<String, String>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element
    pub fn with(mut self, key: impl Into<String>, markup: impl Into<String>) -> Self {
        self.insert(key, markup);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, markup: impl Into<String>) {
        self.elements.insert(key.into(), markup.into());
    }
}

impl ElementLookup for StaticLookup {
    fn lookup(&self, key: &str) -> Result<String, LookupError> {
        self.elements
            .get(key)
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                key: key.to_string(),
            })
    }
}

/// Lookup over the `<script id="...">` and `<template id="...">` elements
/// of an HTML document
///
/// ```html
/// <script type="text/html" id="tmpl-greeting">
///     <h1>{{ data.title }}</h1>
/// </script>
/// ```
#[derive(Debug, Clone, Default)]
pub struct HtmlDocumentLookup {
    elements: HashMap<String, String>,
}

impl HtmlDocumentLookup {
    /// Index every script/template element that has an id
    pub fn from_html(html: &str) -> Self {
        let mut elements = HashMap::new();
        collect_elements(html, &mut elements);
        Self { elements }
    }

    /// Load and index an HTML file
    pub fn from_file(path: &Path) -> Result<Self, LookupError> {
        let html = std::fs::read_to_string(path).map_err(|e| LookupError::FileReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::from_html(&html))
    }

    /// Get all element ids
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(|s| s.as_str())
    }
}

impl ElementLookup for HtmlDocumentLookup {
    fn lookup(&self, key: &str) -> Result<String, LookupError> {
        self.elements
            .get(key)
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                key: key.to_string(),
            })
    }
}

/// Opening `<script ...>` or `<template ...>` tag; quoted attribute values
/// may contain `>`
static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<(script|template)\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("valid open tag pattern")
});

/// One attribute: a name, optionally `=` and a quoted or bare value
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("valid attribute pattern")
});

/// Collect `<tag ... id="x">inner</tag>` pairs; first occurrence of an id wins
fn collect_elements(html: &str, elements: &mut HashMap<String, String>) {
    // ASCII lowercasing keeps byte offsets aligned with `html`
    let lower = html.to_ascii_lowercase();
    let mut pos = 0;

    while let Some(caps) = OPEN_TAG_RE.captures_at(html, pos) {
        let (Some(open), Some(tag), Some(attrs)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };
        let close = format!("</{}", tag.as_str().to_ascii_lowercase());
        let inner_start = open.end();
        let Some(inner_end) = lower[inner_start..].find(&close).map(|i| inner_start + i) else {
            break;
        };

        if let Some(id) = attribute(attrs.as_str(), "id") {
            elements
                .entry(id.to_string())
                .or_insert_with(|| html[inner_start..inner_end].to_string());
        }
        pos = inner_end + close.len();
    }
}

/// Value of attribute `name` inside an opening tag's attribute text
fn attribute<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    ATTRIBUTE_RE
        .captures_iter(attrs)
        .find(|caps| caps.get(1).is_some_and(|m| m.as_str().eq_ignore_ascii_case(name)))
        .and_then(|caps| caps.get(2).or(caps.get(3)).or(caps.get(4)))
        .map(|value| value.as_str())
}
