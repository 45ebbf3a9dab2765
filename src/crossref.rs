//! Cross-reference resolution inside prose.
//!
//! Plain text runs are scanned for words that look like references to
//! documented entities. Each candidate is resolved through the model's
//! [`NameResolver`]; resolved targets become page-numbered links via the
//! [`AnchorRegistry`], everything else falls back to escaped literal text.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::RenderOptions;
use crate::inline::{InlineHandler, escape, hyphenate_namespaces};
use crate::model::ClassModule;
use crate::registry::AnchorRegistry;
use crate::resolver::NameResolver;

/// Reference candidates in prose. The `pre` group is the whitespace or
/// opening parenthesis that must precede a candidate; it is output as text.
///
/// Alternatives, in priority order: `Class::Path@Section`,
/// `Class::Path.meth` / `#meth` / `::meth`,
/// `#meth`, `::meth`, `Class::Path`, file names, bare words.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    let method = r"(?:[a-z_]\w*[!?=]?|\[\]=?|<<|>>|===?|%)(?:\([\w.+*/=<>, -]*\))?";
    let class = r"(?:::)?[A-Z]\w*(?:::[A-Z]\w*)*";
    let pattern = format!(
        r"(?P<pre>^|[\s(])(?P<ref>\\?(?:{class}@[\w+]+|{class}(?:[.#]|::){method}|#{method}|::{method}|{class}|[\w-]+(?:/[\w-]+)*\.[a-z]+|[a-z_]\w*[!?=]?))"
    );
    return Regex::new(&pattern).expect("valid regex");
});

/// Inline handler that turns references into page-numbered links.
///
/// One instance is created per rendered entity, so `context` is the class or
/// module relative names are resolved against.
pub struct CrossReferencer<'r, 'a> {
    /// Namespace of the text being rendered; `None` on free pages.
    context: Option<&'a ClassModule>,
    /// Display switches.
    options: RenderOptions,
    /// Anchor pages, shared across the whole run.
    registry: &'r mut AnchorRegistry,
    /// Name lookup over the documentation model.
    resolver: &'r dyn NameResolver<'a>,
}

impl<'r, 'a> CrossReferencer<'r, 'a> {
    /// Handle one candidate found by the prose scanner.
    fn candidate(&mut self, raw: &str) -> String {
        // `\Foo` opts out of linking.
        if let Some(literal) = raw.strip_prefix('\\') {
            return escape(literal);
        }
        if !self.options.hyperlink_all && is_plain_word(raw) {
            return escape(raw);
        }
        return self.make_crossref(raw, None);
    }

    /// Resolve `name` and render it as a link.
    ///
    /// Names that don't denote an entity come back as escaped text. Targets
    /// whose page isn't known yet are flagged in the registry so another
    /// pass can fill them in.
    pub fn make_crossref(&mut self, name: &str, label: Option<&str>) -> String {
        let display = match label {
            Some(label) => label,
            None if !self.options.show_hash => name.strip_prefix('#').unwrap_or(name),
            None => name,
        };

        let Some(entity) = self.resolver.resolve(name, self.context) else {
            return escape(display);
        };

        let anchor = entity.anchor();
        let shown = hyphenate_namespaces(&escape(display));
        return match (self.registry.lookup_or_flag(&anchor), self.options.show_pages) {
            (Some(page), true) => format!("\\hyperref[{anchor}]{{{shown}}} [p.~\\hyperref[{anchor}]{{{page}}}]"),
            (None, true) => format!("{shown} [p.~???]"),
            (Some(_) | None, false) => format!("\\hyperref[{anchor}]{{{shown}}}"),
        };
    }

    /// A resolver for text belonging to `context`.
    pub fn new(
        resolver: &'r dyn NameResolver<'a>,
        registry: &'r mut AnchorRegistry,
        options: RenderOptions,
        context: Option<&'a ClassModule>,
    ) -> Self {
        return Self { context, options, registry, resolver };
    }
}

impl InlineHandler for CrossReferencer<'_, '_> {
    fn reference(&mut self, name: &str, label: Option<&str>) -> String {
        return self.make_crossref(name, label);
    }

    fn text(&mut self, run: &str) -> String {
        let mut out = String::with_capacity(run.len());
        let mut last = 0;

        for caps in CANDIDATE.captures_iter(run) {
            let Some(found) = caps.name("ref") else {
                continue;
            };
            out.push_str(&escape(run.get(last..found.start()).unwrap_or("")));
            out.push_str(&self.candidate(found.as_str()));
            last = found.end();
        }

        out.push_str(&escape(run.get(last..).unwrap_or("")));
        return out;
    }
}

/// An all-lowercase word with no sigil, like `new` or `the`.
fn is_plain_word(raw: &str) -> bool {
    return !raw.is_empty() && raw.chars().all(|c| return c.is_ascii_lowercase());
}
