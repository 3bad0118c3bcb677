//! Renderers that compile their template on first use

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::cache::PendingSources;
use super::lookup::ElementLookup;
use crate::parser::TemplateSettings;
use crate::renderer::{CompiledTemplate, TemplateCompiler};
use crate::TemplateError;

/// Where a renderer gets its source from on first use
pub(crate) enum Origin {
    /// Taken from the pending source cache under the renderer's name
    Inline { sources: Rc<PendingSources> },
    /// Fetched from the element lookup under `key`
    External {
        lookup: Rc<dyn ElementLookup>,
        key: String,
    },
}

impl Origin {
    fn label(&self) -> &'static str {
        match self {
            Origin::Inline { .. } => "inline",
            Origin::External { .. } => "external",
        }
    }
}

struct LazyTemplate {
    name: String,
    origin: Origin,
    compiler: Rc<dyn TemplateCompiler>,
    settings: TemplateSettings,
    /// Empty until the first successful compile
    compiled: RefCell<Option<Rc<CompiledTemplate>>>,
}

impl LazyTemplate {
    fn compile(&self) -> Result<CompiledTemplate, TemplateError> {
        match &self.origin {
            Origin::Inline { sources } => {
                let source = sources
                    .take(&self.name)
                    .ok_or_else(|| TemplateError::MissingSource {
                        name: self.name.clone(),
                    })?;
                debug!(name = %self.name, origin = "inline", "compiling template");

                match self.compiler.compile(&source, &self.settings) {
                    Ok(compiled) => Ok(compiled),
                    Err(errors) => {
                        warn!(name = %self.name, errors = errors.len(), "template failed to compile");
                        // Keep the source so the next render retries
                        sources.put(&self.name, &source);
                        Err(TemplateError::Compile(errors))
                    }
                }
            }
            Origin::External { lookup, key } => {
                debug!(name = %self.name, origin = "external", key = %key, "compiling template");
                let markup = lookup.lookup(key)?;
                self.compiler
                    .compile(&markup, &self.settings)
                    .map_err(|errors| {
                        warn!(name = %self.name, key = %key, errors = errors.len(), "template failed to compile");
                        TemplateError::Compile(errors)
                    })
            }
        }
    }
}

/// Handle to a named, lazily compiled template
///
/// Clones share one compile slot: the source is compiled on the first
/// [`render`](Renderer::render) and reused for every later call. A failed
/// compile leaves the slot empty, so the next render tries again.
#[derive(Clone)]
pub struct Renderer {
    inner: Rc<LazyTemplate>,
}

impl Renderer {
    pub(crate) fn new(
        name: &str,
        origin: Origin,
        compiler: Rc<dyn TemplateCompiler>,
        settings: TemplateSettings,
    ) -> Self {
        Self {
            inner: Rc::new(LazyTemplate {
                name: name.to_string(),
                origin,
                compiler,
                settings,
                compiled: RefCell::new(None),
            }),
        }
    }

    /// Template name this renderer is bound to
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether the first compile has happened
    pub fn is_compiled(&self) -> bool {
        self.inner.compiled.borrow().is_some()
    }

    /// Check if two handles share the same compile slot
    pub fn ptr_eq(&self, other: &Renderer) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Render `data`, compiling the template first if needed
    pub fn render(&self, data: &Value) -> Result<String, TemplateError> {
        let compiled = self.compiled()?;
        Ok(compiled.render(data)?)
    }

    fn compiled(&self) -> Result<Rc<CompiledTemplate>, TemplateError> {
        if let Some(compiled) = self.inner.compiled.borrow().as_ref() {
            trace!(name = %self.inner.name, "using compiled template");
            return Ok(Rc::clone(compiled));
        }

        let compiled = Rc::new(self.inner.compile()?);
        *self.inner.compiled.borrow_mut() = Some(Rc::clone(&compiled));
        Ok(compiled)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("name", &self.inner.name)
            .field("origin", &self.inner.origin.label())
            .field("compiled", &self.is_compiled())
            .finish()
    }
}
