//! Document walker: lays out free pages, the method overview, and every
//! class and module with its members, registering each entity's anchor at
//! the page it starts on.

use crate::backend::{BASE_FONT_SIZE, Font, LayoutBackend, Point, TextStyle};
use crate::config::RenderOptions;
use crate::crossref::CrossReferencer;
use crate::error::Error;
use crate::inline::{BOLD, EMPHASIS, TELETYPE, escape, hyphenate_namespaces};
use crate::markup::{BlockRenderer, RenderState};
use crate::model::{Block, ClassModule, Documentation, Method, MethodKind, Page, Visibility};
use crate::registry::AnchorRegistry;
use crate::resolver::NameResolver;
use crate::types::Entity;

/// Indentation of member descriptions.
pub const METHOD_INDENTATION: f32 = 40.0;

/// Style of the "Class" / "Module" caption above a container heading.
const CAPTION: TextStyle = TextStyle { font: Font::SerifCaps, size: 14.0 };

/// Constant values longer than this are cut off.
const CONSTANT_VALUE_CHARS: usize = 20;

/// Space between a method's top rule and its name.
const METHOD_HEADER_GAP: f32 = 3.0;

/// Thickness of the rule above each method.
const METHOD_RULE_WEIGHT: f32 = 4.0;

/// Style of the method overview's header row.
const OVERVIEW_HEADER: TextStyle = TextStyle { font: Font::Sans, size: BASE_FONT_SIZE + 1.0 };

/// Walks one documentation model top to bottom for a single pass.
pub struct DocumentWalker<'w, 'a> {
    /// Layout engine of this pass.
    backend: &'w mut dyn LayoutBackend,
    /// The model being rendered.
    doc: &'a Documentation,
    /// Free page to put first.
    main_page: Option<&'w str>,
    /// Cross-reference display switches.
    options: RenderOptions,
    /// Anchor pages for the whole run.
    registry: &'w mut AnchorRegistry,
    /// Name lookup over the model.
    resolver: &'w dyn NameResolver<'a>,
    /// List state of this pass.
    state: &'w mut RenderState,
}

impl<'w, 'a> DocumentWalker<'w, 'a> {
    /// Lay out one attribute: name with its access marker, then the indented description.
    fn attribute(&mut self, entity: Entity<'a>, name: &str, rw: &str, description: &[Block]) -> Result<(), Error> {
        self.place(entity);
        let line = format!("{}{}{} [{}]", BOLD.0, escape(name), BOLD.1, escape(rw));
        self.backend.text(&line, TextStyle { font: Font::Sans, size: BASE_FONT_SIZE })?;
        return self.indented(entity, description);
    }

    /// A class or module page: caption, heading, overview, sections, then
    /// mixins, constants, attributes, and method groups.
    fn classmod(&mut self, classmod: &'a ClassModule) -> Result<(), Error> {
        self.fresh_page();
        let entity = Entity::ClassModule(classmod);
        self.place(entity);
        tracing::debug!(name = classmod.full_name, page = self.backend.page_number(), "documenting container");

        self.backend.text(if classmod.is_module() { "Module" } else { "Class" }, CAPTION)?;
        self.heading(1, &hyphenate_namespaces(&escape(&classmod.full_name)))?;
        self.describe(entity, &classmod.description)?;

        for section in &classmod.sections {
            let entity = Entity::Section { parent: classmod, section };
            self.place(entity);
            self.heading(2, &escape(&section.title))?;
            self.describe(entity, &section.description)?;
        }

        if !classmod.includes.is_empty() {
            self.heading(2, "Includes")?;
            for include in &classmod.includes {
                let link = self.crossref(classmod, include, None);
                self.backend.text(&link, TextStyle::BODY)?;
            }
            self.backend.text("\n", TextStyle::BODY)?;
        }

        if !classmod.constants.is_empty() {
            self.heading(2, "Constants")?;
            for constant in &classmod.constants {
                let entity = Entity::Constant { constant, parent: classmod };
                self.place(entity);
                let line = format!(
                    "{open}{}{close} = {open}{}{close}",
                    escape(&constant.name),
                    escape(&truncate_value(&constant.value)),
                    open = TELETYPE.0,
                    close = TELETYPE.1,
                );
                self.backend.text(&line, TextStyle::MONO)?;
                self.indented(entity, &constant.description)?;
            }
            self.backend.text("\n", TextStyle::BODY)?;
        }

        if !classmod.attributes.is_empty() {
            self.heading(2, "Attributes")?;
            let mut attributes: Vec<_> = classmod.attributes.iter().collect();
            attributes.sort_by(|a, b| return a.name.cmp(&b.name));
            for attribute in attributes {
                let entity = Entity::Attribute { attribute, parent: classmod };
                self.attribute(entity, &attribute.name, &attribute.rw, &attribute.description)?;
            }
            self.backend.text("\n", TextStyle::BODY)?;
        }

        for kind in [MethodKind::Class, MethodKind::Instance] {
            for visibility in Visibility::ALL {
                let methods = classmod.methods_of(kind, visibility);
                if methods.is_empty() {
                    continue;
                }
                self.heading(2, &format!("{} {} methods", visibility.label(), kind.label()))?;
                for method in methods {
                    self.method(method, classmod)?;
                }
            }
        }
        return Ok(());
    }

    /// Render `name` as a cross-reference from inside `context`.
    fn crossref(&mut self, context: &'a ClassModule, name: &str, label: Option<&str>) -> String {
        let mut xref = CrossReferencer::new(self.resolver, self.registry, self.options, Some(context));
        return xref.make_crossref(name, label);
    }

    /// Render an entity's block markup with its own namespace and heading base.
    fn describe(&mut self, entity: Entity<'a>, blocks: &[Block]) -> Result<(), Error> {
        let anchor = entity.anchor();
        let mut xref = CrossReferencer::new(self.resolver, self.registry, self.options, entity.namespace());
        let mut renderer =
            BlockRenderer::new(self.backend, self.state, &mut xref, entity.heading_base(), anchor.as_str());
        return renderer.render(blocks);
    }

    /// Continue on a new page unless the current one is still empty.
    fn fresh_page(&mut self) {
        if !self.backend.is_page_blank() {
            self.backend.start_new_page();
        }
    }

    /// A structural heading at an absolute level, followed by a blank line.
    fn heading(&mut self, level: u8, markup: &str) -> Result<(), Error> {
        let style = TextStyle::heading(level).unwrap_or(TextStyle::BODY);
        self.backend.text(markup, style)?;
        return self.backend.text("\n", TextStyle::BODY);
    }

    /// Member description shifted right by [`METHOD_INDENTATION`].
    fn indented(&mut self, entity: Entity<'a>, blocks: &[Block]) -> Result<(), Error> {
        self.backend.add_padding(METHOD_INDENTATION, 0.0);
        self.describe(entity, blocks)?;
        return self.backend.subtract_padding(METHOD_INDENTATION, 0.0);
    }

    /// A method: thick rule, name and call sequence, then the indented body.
    /// Alias methods only point at the method they alias.
    fn method(&mut self, method: &'a Method, parent: &'a ClassModule) -> Result<(), Error> {
        self.backend.horizontal_rule(METHOD_RULE_WEIGHT);
        self.backend.move_down(METHOD_HEADER_GAP);

        let entity = Entity::for_method(method, parent);
        self.place(entity);

        let width = self.backend.bounds().width;
        let top = self.backend.cursor();
        let name = format!("{}{}{}", BOLD.0, escape(&method.name), BOLD.1);
        let call_seq = escape(method.call_seq.as_deref().unwrap_or(&method.name));
        self.backend.draw_text(Point { x: 0.0, y: top }, &name, TextStyle::BODY);
        self.backend.draw_text(Point { x: width / 2.0, y: top }, &call_seq, TextStyle::MONO);
        let header = self.backend.text_height(&call_seq, TextStyle::MONO);
        self.backend.move_down(header + METHOD_HEADER_GAP);

        let rule_at = self.backend.cursor();
        self.backend.stroke_line(
            Point { x: METHOD_INDENTATION, y: rule_at },
            Point { x: width, y: rule_at },
        );

        self.backend.add_padding(METHOD_INDENTATION, 0.0);
        if let Some(target) = &method.is_alias_for {
            let target = format!("{}{target}", method.kind.sigil());
            let link = self.crossref(parent, &target, None);
            self.backend.text(&format!("{}Alias for {link}{}", EMPHASIS.0, EMPHASIS.1), TextStyle::BODY)?;
        } else {
            self.describe(entity, &method.description)?;
            if !method.aliases.is_empty() {
                let mut aliases = method.aliases.clone();
                aliases.sort();
                let links: Vec<String> = aliases
                    .iter()
                    .map(|alias| {
                        let name = format!("{}{alias}", method.kind.sigil());
                        return self.crossref(parent, &name, None);
                    })
                    .collect();
                self.backend.text("\n", TextStyle::BODY)?;
                self.backend.text(
                    &format!("{}Also aliased as: {}{}", EMPHASIS.0, links.join(", "), EMPHASIS.1),
                    TextStyle::BODY,
                )?;
            }
        }
        self.backend.subtract_padding(METHOD_INDENTATION, 0.0)?;
        return self.backend.text("\n", TextStyle::BODY);
    }

    /// Table of every method with the page it is documented on. Page numbers
    /// go through the registry like any reference, so a forward lookup here
    /// triggers the second pass.
    fn method_overview(&mut self) -> Result<(), Error> {
        let rows: Vec<(&'a ClassModule, &'a Method)> = self
            .doc
            .sorted_classes()
            .into_iter()
            .flat_map(|classmod| return overview_order(classmod).into_iter().map(move |m| return (classmod, m)))
            .collect();
        if rows.is_empty() {
            return Ok(());
        }

        self.fresh_page();
        self.backend.text(
            &format!("{}Method name{} \\hfill {}p.{}", BOLD.0, BOLD.1, BOLD.0, BOLD.1),
            OVERVIEW_HEADER,
        )?;
        self.backend.horizontal_rule(1.0);

        for (parent, method) in rows {
            let anchor = Entity::for_method(method, parent).anchor();
            let full_name = format!("{}{}", parent.full_name, method.pretty_name());
            let page = match self.registry.lookup_or_flag(&anchor) {
                Some(page) => format!("\\hyperref[{anchor}]{{{page}}}"),
                None => "???".to_string(),
            };
            let row = format!(
                "{}{}{} \\hfill {page}",
                TELETYPE.0,
                hyphenate_namespaces(&escape(&full_name)),
                TELETYPE.1
            );
            self.backend.text(&row, TextStyle::MONO)?;
        }
        return Ok(());
    }

    /// A walker for one pass over `doc`.
    pub fn new(
        doc: &'a Documentation,
        resolver: &'w dyn NameResolver<'a>,
        registry: &'w mut AnchorRegistry,
        backend: &'w mut dyn LayoutBackend,
        state: &'w mut RenderState,
        options: RenderOptions,
        main_page: Option<&'w str>,
    ) -> Self {
        return Self { backend, doc, main_page, options, registry, resolver, state };
    }

    /// A free-standing page.
    fn page(&mut self, page: &'a Page) -> Result<(), Error> {
        self.fresh_page();
        let entity = Entity::FreePage(page);
        self.place(entity);
        return self.describe(entity, &page.body);
    }

    /// Record that `entity` starts on the current page.
    fn place(&mut self, entity: Entity<'a>) {
        let anchor = entity.anchor();
        self.backend.add_destination(anchor.as_str());
        self.registry.register(anchor, self.backend.page_number());
    }

    /// Render the whole document: free pages, method overview, then classes
    /// and modules by qualified name.
    ///
    /// # Errors
    ///
    /// Returns the first backend or structural error; the pass is then unusable.
    pub fn walk(&mut self) -> Result<(), Error> {
        for page in self.doc.ordered_pages(self.main_page) {
            self.page(page)?;
        }
        self.method_overview()?;
        for classmod in self.doc.sorted_classes() {
            self.classmod(classmod)?;
        }
        return Ok(());
    }
}

/// Methods of a container in overview order: class methods before instance
/// methods, each group by name.
pub fn overview_order(classmod: &ClassModule) -> Vec<&Method> {
    let mut methods: Vec<&Method> = classmod.methods.iter().collect();
    methods.sort_by(|a, b| return (a.kind, &a.name).cmp(&(b.kind, &b.name)));
    return methods;
}

/// Shorten a constant's source value for display.
fn truncate_value(value: &str) -> String {
    if value.chars().count() <= CONSTANT_VALUE_CHARS {
        return value.to_string();
    }
    let mut short: String = value.chars().take(CONSTANT_VALUE_CHARS).collect();
    short.push('\u{2026}');
    return short;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaperSize;
    use crate::layout::{LayoutDocument, PagedLayout};
    use crate::resolver::ModelIndex;
    use crate::types::Anchor;

    fn walk(doc: &Documentation, main_page: Option<&str>, registry: &mut AnchorRegistry) -> LayoutDocument {
        let index = ModelIndex::new(doc);
        let mut layout = PagedLayout::new(PaperSize::A4);
        let mut state = RenderState::default();
        let options = RenderOptions { hyperlink_all: false, show_hash: false, show_pages: true };
        DocumentWalker::new(doc, &index, registry, &mut layout, &mut state, options, main_page)
            .walk()
            .unwrap();
        assert!(state.is_balanced());
        layout.finish()
    }

    #[test]
    fn class_methods_sort_before_instance_methods() {
        let doc = Documentation::parse(
            r#"{"classes": [{"full_name": "C", "kind": "class", "methods": [
                {"name": "foo", "kind": "instance"},
                {"name": "bar", "kind": "instance"},
                {"name": "foo", "kind": "class"}
            ]}]}"#,
        )
        .unwrap();
        let order: Vec<String> = overview_order(&doc.classes[0]).iter().map(|m| m.pretty_name()).collect();
        assert_eq!(order, ["::foo", "#bar", "#foo"]);
    }

    #[test]
    fn places_pages_overview_and_classes_in_order() {
        let doc = Documentation::parse(
            r#"{
                "pages": [
                    {"name": "intro.rdoc", "body": [{"type": "paragraph", "text": [{"text": "Intro."}]}]},
                    {"name": "README.rdoc", "body": [{"type": "paragraph", "text": [{"text": "Read me."}]}]}
                ],
                "classes": [
                    {"full_name": "Zed", "kind": "module"},
                    {"full_name": "Alpha", "kind": "class", "methods": [{"name": "run"}]}
                ]
            }"#,
        )
        .unwrap();
        let mut registry = AnchorRegistry::default();
        let out = walk(&doc, Some("README.rdoc"), &mut registry);

        let page_of = |name: &str| registry.lookup(&Anchor(name.to_string()));
        assert_eq!(page_of("toplevel-README.rdoc"), Some(1));
        assert_eq!(page_of("toplevel-intro.rdoc"), Some(2));
        // Page 3 is the method overview.
        assert_eq!(page_of("classmod-Alpha"), Some(4));
        assert_eq!(page_of("method-Alpha-#run"), Some(4));
        assert_eq!(page_of("classmod-Zed"), Some(5));
        assert_eq!(out.pages.len(), 5);
        assert_eq!(out.destinations.get("classmod-Zed"), Some(&5));

        // The overview ran before Alpha was placed.
        assert_eq!(registry.unresolved(), vec![Anchor("method-Alpha-#run".to_string())]);
        assert!(out.page_text(3).contains("\\texttt{Alpha\\#run} \\hfill ???"));
    }

    #[test]
    fn overview_links_known_pages() {
        let doc = Documentation::parse(
            r#"{"classes": [{"full_name": "A::B", "kind": "class", "methods": [{"name": "new", "kind": "class"}]}]}"#,
        )
        .unwrap();
        let mut registry = AnchorRegistry::default();
        registry.register(Anchor("method-A::B-::new".to_string()), 2);
        let out = walk(&doc, None, &mut registry);
        assert!(
            out.page_text(1)
                .contains("\\texttt{A\\-::B\\-::new} \\hfill \\hyperref[method-A::B-::new]{2}")
        );
    }

    #[test]
    fn class_page_lists_members() {
        let doc = Documentation::parse(
            r#"{"classes": [{
                "full_name": "Shape", "kind": "class",
                "includes": ["Comparable"],
                "sections": [{"title": "Usage", "description": [{"type": "paragraph", "text": [{"text": "Draw it."}]}]}],
                "constants": [{"name": "DEFAULT_NAME", "value": "\"an unreasonably long default\""}],
                "attributes": [{"name": "width", "rw": "R"}, {"name": "height"}],
                "methods": [
                    {"name": "area", "call_seq": "area -> Float"},
                    {"name": "size", "is_alias_for": "area"},
                    {"name": "secret", "visibility": "private"}
                ]
            }]}"#,
        )
        .unwrap();
        let mut registry = AnchorRegistry::default();
        let out = walk(&doc, None, &mut registry);

        // Overview on page 1, Shape on page 2.
        let text = out.page_text(2);
        assert!(text.starts_with("Class\nShape"));
        assert!(text.contains("Usage"));
        assert!(text.contains("Includes\n\nComparable"));
        assert!(text.contains("\\texttt{DEFAULT\\textunderscore{}NAME} = \\texttt{\"an unreasonably lon\u{2026}}"));
        let height = text.find("\\textbf{height} [RW]").unwrap();
        let width = text.find("\\textbf{width} [R]").unwrap();
        assert!(height < width);
        assert!(text.contains("Public Instance methods"));
        assert!(text.contains("Private Instance methods"));
        assert!(text.contains("area -> Float"));
        assert!(text.contains("\\textit{Alias for \\hyperref[method-Shape-#area]{area} [p.~\\hyperref[method-Shape-#area]{2}]}"));

        assert_eq!(registry.lookup(&Anchor("section-Shape-Usage".to_string())), Some(2));
        assert_eq!(registry.lookup(&Anchor("const-Shape-DEFAULT_NAME".to_string())), Some(2));
        assert_eq!(registry.lookup(&Anchor("attr-Shape-#width".to_string())), Some(2));
        assert_eq!(registry.lookup(&Anchor("alias-Shape-#size".to_string())), Some(2));
    }

    #[test]
    fn original_lists_its_aliases() {
        let doc = Documentation::parse(
            r#"{"classes": [{"full_name": "Shape", "kind": "class", "methods": [
                {"name": "area", "aliases": ["size", "extent"]},
                {"name": "extent", "is_alias_for": "area"},
                {"name": "size", "is_alias_for": "area"}
            ]}]}"#,
        )
        .unwrap();
        let mut registry = AnchorRegistry::default();
        let out = walk(&doc, None, &mut registry);
        // Aliases come after the original alphabetically, so they are unplaced in one pass.
        assert!(out.page_text(2).contains("\\textit{Also aliased as: extent [p.~???], size [p.~???]}"));
    }

    #[test]
    fn long_constants_are_truncated() {
        assert_eq!(truncate_value("short"), "short");
        assert_eq!(truncate_value("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmnopqrst\u{2026}");
    }
}
