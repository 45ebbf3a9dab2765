//! Multi-pass generation driver.
//!
//! Page numbers of forward references are only known once their target has
//! been laid out, so the document is rendered again with the registry filled
//! by the first pass. Anything still unknown after the last pass is reported,
//! not fatal.

use crate::backend::LayoutBackend;
use crate::config::RenderOptions;
use crate::error::Error;
use crate::markup::RenderState;
use crate::model::Documentation;
use crate::registry::AnchorRegistry;
use crate::resolver::NameResolver;
use crate::types::Anchor;
use crate::walker::DocumentWalker;

/// Upper bound on rendering passes.
pub const MAX_PASSES: u32 = 2;

/// Outcome of a generation run.
#[derive(Debug)]
pub struct Generation<B> {
    /// Backend holding the final pass, pages numbered.
    pub backend: B,
    /// Passes actually rendered.
    pub passes: u32,
    /// Anchors referenced in the final pass whose page was never placed.
    pub unresolved: Vec<Anchor>,
}

/// Render `doc` with as many passes as needed, up to [`MAX_PASSES`].
///
/// `new_backend` is called once per pass; only the last backend is kept.
/// The anchor registry survives between passes, so the second pass sees
/// every page recorded by the first.
///
/// # Errors
///
/// Returns the first error raised while walking the document. Unresolved
/// references are returned in [`Generation::unresolved`] instead.
pub fn generate<'a, B, F>(
    doc: &'a Documentation,
    resolver: &dyn NameResolver<'a>,
    options: RenderOptions,
    main_page: Option<&str>,
    mut new_backend: F,
) -> Result<Generation<B>, Error>
where
    B: LayoutBackend,
    F: FnMut() -> B,
{
    let mut registry = AnchorRegistry::default();
    let mut state = RenderState::default();
    let mut pass: u32 = 0;

    loop {
        pass = pass.saturating_add(1);
        registry.clear_unresolved();
        state.reset();
        let mut backend = new_backend();

        tracing::info!(pass, "rendering document");
        DocumentWalker::new(doc, resolver, &mut registry, &mut backend, &mut state, options, main_page).walk()?;

        if !state.is_balanced() {
            tracing::warn!(pass, depth = state.depth(), "lists left open at end of pass");
        }
        let unresolved = registry.unresolved();
        tracing::debug!(pass, anchors = registry.len(), unresolved = unresolved.len(), "pass complete");

        if unresolved.is_empty() || pass >= MAX_PASSES {
            for anchor in &unresolved {
                tracing::warn!(%anchor, "reference target was never placed");
            }
            backend.number_pages();
            return Ok(Generation { backend, passes: pass, unresolved });
        }
        tracing::info!(count = unresolved.len(), "forward references found, rendering again");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaperSize;
    use crate::layout::PagedLayout;
    use crate::resolver::ModelIndex;

    fn options() -> RenderOptions {
        RenderOptions { hyperlink_all: false, show_hash: false, show_pages: true }
    }

    fn mentions(from: &str, to: &str) -> String {
        format!(
            r#"{{"full_name": "{from}", "kind": "class", "description": [
                {{"type": "paragraph", "text": [{{"text": "See {to} for more."}}]}}
            ]}}"#
        )
    }

    #[test]
    fn backward_references_need_one_pass() {
        let doc = Documentation::parse(&format!(
            r#"{{"classes": [{}, {{"full_name": "A", "kind": "class"}}]}}"#,
            mentions("B", "A")
        ))
        .unwrap();
        let index = ModelIndex::new(&doc);
        let mut backends = 0;

        let generation = generate(&doc, &index, options(), None, || {
            backends += 1;
            PagedLayout::new(PaperSize::A4)
        })
        .unwrap();

        assert_eq!(generation.passes, 1);
        assert_eq!(backends, 1);
        assert!(generation.unresolved.is_empty());
        let out = generation.backend.finish();
        assert!(out.page_text(2).contains("See \\hyperref[classmod-A]{A} [p.~\\hyperref[classmod-A]{1}] for more."));
    }

    #[test]
    fn forward_references_resolve_on_second_pass() {
        let doc = Documentation::parse(&format!(
            r#"{{"classes": [{}, {{"full_name": "B", "kind": "class"}}]}}"#,
            mentions("A", "B")
        ))
        .unwrap();
        let index = ModelIndex::new(&doc);

        let generation = generate(&doc, &index, options(), None, || PagedLayout::new(PaperSize::A4)).unwrap();

        assert_eq!(generation.passes, 2);
        assert!(generation.unresolved.is_empty());
        let out = generation.backend.finish();
        assert_eq!(out.destinations.get("classmod-B"), Some(&2));
        let text = out.page_text(1);
        assert!(text.contains("See \\hyperref[classmod-B]{B} [p.~\\hyperref[classmod-B]{2}] for more."));
        assert!(!text.contains("???"));
        assert_eq!(out.pages[0].footer.as_deref(), Some("1"));
    }

    #[test]
    fn never_placed_targets_are_reported_after_last_pass() {
        // The index knows `Ghost`, the walked model doesn't.
        let indexed = Documentation::parse(r#"{"classes": [{"full_name": "Ghost", "kind": "class"}]}"#).unwrap();
        let doc = Documentation::parse(&format!(r#"{{"classes": [{}]}}"#, mentions("A", "Ghost"))).unwrap();
        let index = ModelIndex::new(&indexed);
        let mut backends = 0;

        let generation = generate(&doc, &index, options(), None, || {
            backends += 1;
            PagedLayout::new(PaperSize::A4)
        })
        .unwrap();

        assert_eq!(generation.passes, MAX_PASSES);
        assert_eq!(backends, 2);
        assert_eq!(generation.unresolved, vec![Anchor("classmod-Ghost".to_string())]);
        assert!(generation.backend.finish().page_text(1).contains("Ghost [p.~???]"));
    }

    #[test]
    fn walk_errors_abort_generation() {
        let doc = Documentation::parse(r#"{"pages": [{"name": "p", "body": [{"type": "paragraph", "text": [{"text": "x"}]}]}]}"#)
            .unwrap();
        let index = ModelIndex::new(&doc);

        // Lines can never fit on a page this short.
        let result = generate(&doc, &index, options(), None, || PagedLayout::with_size(400.0, 10.0));
        assert!(matches!(result, Err(Error::Backend { .. })));
    }
}
