//! Template resolution - binds names to lazily compiled renderers

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use super::cache::{Memoize, PendingSources, RendererCache};
use super::lazy::{Origin, Renderer};
use super::lookup::ElementLookup;
use crate::config::ResolverConfig;
use crate::parser::TemplateSettings;
use crate::renderer::{DelimiterCompiler, TemplateCompiler};
use crate::TemplateError;

/// Result of [`TemplateResolver::resolve`]
#[derive(Debug, Clone)]
pub enum Resolved {
    /// Data was given: the rendered markup
    Rendered(String),
    /// No data: the renderer itself, for rendering later
    Renderer(Renderer),
}

impl Resolved {
    pub fn into_rendered(self) -> Option<String> {
        match self {
            Resolved::Rendered(html) => Some(html),
            Resolved::Renderer(_) => None,
        }
    }

    pub fn into_renderer(self) -> Option<Renderer> {
        match self {
            Resolved::Renderer(renderer) => Some(renderer),
            Resolved::Rendered(_) => None,
        }
    }
}

/// Resolves template names to renderers
///
/// A name is bound once, on first resolution: to its inline source if one is
/// given, otherwise to the element `prefix + name` of the element lookup.
/// Later resolutions of the same name reuse that binding and ignore any
/// source passed with them. Templates compile on first render, never at
/// registration.
///
/// ```rust
/// use serde_json::json;
/// use tmpl_resolver::{StaticLookup, TemplateResolver};
///
/// let lookup = StaticLookup::new().with("tmpl-card", "<div>{{ data.title }}</div>");
/// let mut templates = TemplateResolver::new(lookup);
///
/// let hello = templates.register("hello", "<h1>{{ data.hello }}</h1>");
/// assert_eq!(hello.render(&json!({ "hello": "Hello" })).unwrap(), "<h1>Hello</h1>");
///
/// let card = templates.render("card", &json!({ "title": "Card" })).unwrap();
/// assert_eq!(card, "<div>Card</div>");
/// ```
pub struct TemplateResolver {
    config: ResolverConfig,
    renderers: RendererCache,
    sources: Rc<PendingSources>,
    inline: Memoize<Renderer>,
    external: Memoize<Renderer>,
}

impl TemplateResolver {
    /// Create a resolver with the default configuration and compiler
    pub fn new(lookup: impl ElementLookup + 'static) -> Self {
        Self::with_config(ResolverConfig::default(), lookup)
    }

    /// Create a resolver with a custom configuration
    pub fn with_config(config: ResolverConfig, lookup: impl ElementLookup + 'static) -> Self {
        Self::with_compiler(config, lookup, DelimiterCompiler)
    }

    /// Create a resolver with a custom configuration and compiler
    pub fn with_compiler(
        config: ResolverConfig,
        lookup: impl ElementLookup + 'static,
        compiler: impl TemplateCompiler + 'static,
    ) -> Self {
        let compiler: Rc<dyn TemplateCompiler> = Rc::new(compiler);
        let lookup: Rc<dyn ElementLookup> = Rc::new(lookup);
        let sources = Rc::new(PendingSources::new());
        let settings = TemplateSettings::DEFAULT;

        let inline = {
            let sources = Rc::clone(&sources);
            let compiler = Rc::clone(&compiler);
            Memoize::new(move |name: &str| {
                let origin = Origin::Inline {
                    sources: Rc::clone(&sources),
                };
                Renderer::new(name, origin, Rc::clone(&compiler), settings)
            })
        };

        let external = {
            let config = config.clone();
            Memoize::new(move |name: &str| {
                let origin = Origin::External {
                    lookup: Rc::clone(&lookup),
                    key: config.lookup_key(name),
                };
                Renderer::new(name, origin, Rc::clone(&compiler), settings)
            })
        };

        Self {
            config,
            renderers: RendererCache::new(),
            sources,
            inline,
            external,
        }
    }

    /// Resolve `name`, binding it on first use.
    ///
    /// - `source`: inline template markup, only consulted when `name` is not
    ///   bound yet. An empty source counts as none.
    /// - `data`: when given, the renderer is invoked and the markup returned;
    ///   otherwise the renderer itself is returned.
    ///
    /// Compile and lookup failures surface from the first render, not from
    /// binding.
    pub fn resolve(
        &mut self,
        name: &str,
        data: Option<&Value>,
        source: Option<&str>,
    ) -> Result<Resolved, TemplateError> {
        let renderer = self.bind(name, source);
        match data {
            Some(data) => renderer.render(data).map(Resolved::Rendered),
            None => Ok(Resolved::Renderer(renderer)),
        }
    }

    /// Bind `name` to an inline source unless it is already bound
    pub fn register(&mut self, name: &str, source: &str) -> Renderer {
        self.bind(name, Some(source))
    }

    /// Renderer for `name`, bound to the element lookup if not yet bound
    pub fn get(&mut self, name: &str) -> Renderer {
        self.bind(name, None)
    }

    /// Render `name` with `data`
    pub fn render(&mut self, name: &str, data: &Value) -> Result<String, TemplateError> {
        self.get(name).render(data)
    }

    fn bind(&mut self, name: &str, source: Option<&str>) -> Renderer {
        if let Some(renderer) = self.renderers.get(name) {
            if source.is_some() {
                trace!(name, "template already bound, ignoring inline source");
            }
            return renderer.clone();
        }

        let renderer = match source.filter(|s| !s.is_empty()) {
            Some(source) => {
                self.sources.put(name, source);
                debug!(name, origin = "inline", "binding template");
                self.inline.get(name)
            }
            None => {
                debug!(name, origin = "external", key = %self.config.lookup_key(name), "binding template");
                self.external.get(name)
            }
        };

        self.renderers.set(name, renderer.clone());
        renderer
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Delimiter syntax every template is compiled with
    pub fn settings(&self) -> &'static TemplateSettings {
        &TemplateSettings::DEFAULT
    }

    /// Bound renderers
    pub fn renderers(&self) -> &RendererCache {
        &self.renderers
    }

    /// Inline sources awaiting their first compile
    pub fn pending_sources(&self) -> &PendingSources {
        &self.sources
    }
}

impl std::fmt::Debug for TemplateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateResolver")
            .field("config", &self.config)
            .field("renderers", &self.renderers)
            .field("pending_sources", &self.sources)
            .finish()
    }
}
