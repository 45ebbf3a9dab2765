//! Anchor registry: where each entity landed, and which lookups missed.

use std::collections::{BTreeSet, HashMap};

use crate::types::Anchor;

/// Maps anchors to the 1-based page they were last placed on.
///
/// Lives for one generation run. Entries are only ever overwritten, never
/// removed, so the second pass can use page assignments made by the first.
/// The unresolved set is scoped to a single pass.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    /// Page number per anchor.
    pages: HashMap<Anchor, u32>,
    /// Anchors looked up during the current pass before being registered.
    unresolved: BTreeSet<Anchor>,
}

impl AnchorRegistry {
    /// Empty the unresolved set. Registered pages are kept.
    pub fn clear_unresolved(&mut self) {
        self.unresolved.clear();
    }

    /// Number of registered anchors.
    pub fn len(&self) -> usize {
        return self.pages.len();
    }

    /// Whether no anchor has been registered yet.
    pub fn is_empty(&self) -> bool {
        return self.pages.is_empty();
    }

    /// Page the anchor was placed on, if known.
    pub fn lookup(&self, anchor: &Anchor) -> Option<u32> {
        return self.pages.get(anchor).copied();
    }

    /// Like [`Self::lookup`], but remembers misses so the orchestrator knows a
    /// repeat pass is needed.
    pub fn lookup_or_flag(&mut self, anchor: &Anchor) -> Option<u32> {
        let page = self.lookup(anchor);
        if page.is_none() {
            tracing::debug!(%anchor, "unresolved page reference");
            self.unresolved.insert(anchor.clone());
        }
        return page;
    }

    /// Record the page an anchor was placed on, replacing any earlier value.
    pub fn register(&mut self, anchor: Anchor, page: u32) {
        tracing::debug!(%anchor, page, "registered anchor");
        self.pages.insert(anchor, page);
    }

    /// Anchors missed during the current pass, sorted.
    pub fn unresolved(&self) -> Vec<Anchor> {
        return self.unresolved.iter().cloned().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(name: &str) -> Anchor {
        Anchor(name.to_string())
    }

    #[test]
    fn register_then_lookup() {
        let mut registry = AnchorRegistry::default();
        registry.register(anchor("classmod-Foo"), 3);
        assert_eq!(registry.lookup(&anchor("classmod-Foo")), Some(3));
        assert_eq!(registry.lookup(&anchor("classmod-Bar")), None);
    }

    #[test]
    fn plain_lookup_does_not_flag() {
        let registry = AnchorRegistry::default();
        assert_eq!(registry.lookup(&anchor("x")), None);
        assert!(registry.unresolved().is_empty());
    }

    #[test]
    fn lookup_or_flag_records_misses_once() {
        let mut registry = AnchorRegistry::default();
        assert_eq!(registry.lookup_or_flag(&anchor("classmod-B")), None);
        assert_eq!(registry.lookup_or_flag(&anchor("classmod-B")), None);
        assert_eq!(registry.unresolved(), vec![anchor("classmod-B")]);

        registry.register(anchor("classmod-B"), 2);
        assert_eq!(registry.lookup_or_flag(&anchor("classmod-B")), Some(2));
    }

    #[test]
    fn clear_unresolved_keeps_pages() {
        let mut registry = AnchorRegistry::default();
        registry.register(anchor("a"), 1);
        let _ = registry.lookup_or_flag(&anchor("b"));
        registry.clear_unresolved();
        assert!(registry.unresolved().is_empty());
        assert_eq!(registry.lookup(&anchor("a")), Some(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_overwrites() {
        let mut registry = AnchorRegistry::default();
        registry.register(anchor("a"), 1);
        registry.register(anchor("a"), 4);
        assert_eq!(registry.lookup(&anchor("a")), Some(4));
    }
}
