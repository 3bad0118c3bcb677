//! Name-keyed stores backing the resolver
//!
//! - [`RendererCache`]: template name → renderer, never evicted
//! - [`PendingSources`]: template name → inline source awaiting its first compile
//! - [`Memoize`]: name → value built once by a factory

use std::cell::RefCell;
use std::collections::HashMap;

use super::lazy::Renderer;

/// Renderers bound by name for the lifetime of the resolver
#[derive(Debug, Default)]
pub struct RendererCache {
    renderers: HashMap<String, Renderer>,
}

impl RendererCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a renderer is bound to `name`
    pub fn has(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Renderer> {
        self.renderers.get(name)
    }

    /// Bind `name`. Callers check [`has`](Self::has) first; a bound name is
    /// never rebound.
    pub(crate) fn set(&mut self, name: &str, renderer: Renderer) {
        debug_assert!(!self.has(name), "renderer for {} is already bound", name);
        self.renderers
            .entry(name.to_string())
            .or_insert(renderer);
    }

    /// Get all bound names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

/// Inline sources registered but not yet compiled
///
/// Shared between the resolver, which puts sources, and inline renderers,
/// which take them on first render.
#[derive(Debug, Default)]
pub struct PendingSources {
    sources: RefCell<HashMap<String, String>>,
}

impl PendingSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, name: &str, source: &str) {
        self.sources
            .borrow_mut()
            .insert(name.to_string(), source.to_string());
    }

    /// Remove and return the source for `name`
    pub fn take(&self, name: &str) -> Option<String> {
        self.sources.borrow_mut().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.borrow().contains_key(name)
    }

    /// Copy of the pending source for `name`
    pub fn get(&self, name: &str) -> Option<String> {
        self.sources.borrow().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.sources.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.borrow().is_empty()
    }
}

/// Memoize a factory by key: the first call for a key builds the value,
/// later calls return clones of it.
pub struct Memoize<V> {
    entries: HashMap<String, V>,
    produce: Box<dyn Fn(&str) -> V>,
}

impl<V: Clone> Memoize<V> {
    pub fn new(produce: impl Fn(&str) -> V + 'static) -> Self {
        Self {
            entries: HashMap::new(),
            produce: Box::new(produce),
        }
    }

    pub fn get(&mut self, key: &str) -> V {
        if let Some(value) = self.entries.get(key) {
            return value.clone();
        }
        let value = (self.produce)(key);
        self.entries.insert(key.to_string(), value.clone());
        value
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> std::fmt::Debug for Memoize<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memoize")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_pending_take_removes_entry() {
        let sources = PendingSources::new();
        sources.put("x", "<p>{{ data.v }}</p>");
        assert!(sources.contains("x"));
        assert_eq!(sources.take("x").as_deref(), Some("<p>{{ data.v }}</p>"));
        assert!(!sources.contains("x"));
        assert_eq!(sources.take("x"), None);
    }

    #[test]
    fn test_memoize_calls_factory_once_per_key() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut memo = Memoize::new(move |key: &str| {
            counter.set(counter.get() + 1);
            Rc::new(key.to_uppercase())
        });
        assert!(memo.is_empty());

        let first = memo.get("a");
        let second = memo.get("a");
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);

        memo.get("b");
        assert_eq!(calls.get(), 2);
        assert_eq!(memo.len(), 2);
        assert!(memo.contains("b"));
        assert!(!memo.is_empty());
    }
}
