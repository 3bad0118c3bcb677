//! Named template resolution with lazy compilation
//!
//! Three layers cooperate:
//!
//! - [`RendererCache`]: name → [`Renderer`], the binding callers see
//! - [`PendingSources`]: name → inline source, held until its first compile
//! - two memoized renderer factories, one reading [`PendingSources`] and one
//!   fetching `prefix + name` from an [`ElementLookup`]
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tmpl_resolver::{Resolved, StaticLookup, TemplateResolver};
//!
//! let mut templates = TemplateResolver::new(StaticLookup::new());
//!
//! // Register and render in one call
//! let html = templates
//!     .resolve("hello-world", Some(&json!({ "hello": "Hello World" })), Some("<h1>{{ data.hello }}</h1>"))
//!     .unwrap();
//! assert!(matches!(html, Resolved::Rendered(ref s) if s == "<h1>Hello World</h1>"));
//!
//! // Cached: the name alone is enough now
//! let html = templates
//!     .resolve("hello-world", Some(&json!({ "hello": "Hello Universe" })), None)
//!     .unwrap()
//!     .into_rendered();
//! assert_eq!(html.as_deref(), Some("<h1>Hello Universe</h1>"));
//! ```

mod cache;
mod lazy;
mod lookup;
mod resolver;

pub use cache::{Memoize, PendingSources, RendererCache};
pub use lazy::Renderer;
pub use lookup::{ElementLookup, HtmlDocumentLookup, LookupError, StaticLookup};
pub use resolver::{Resolved, TemplateResolver};
