//! Documentation model consumed by the renderer: entities plus their markup trees.
//!
//! The model is produced by an external documentation extractor and read here as
//! JSON. It is immutable for the whole generation run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Attribute accessor (`attr_reader`, `attr_accessor`, ...).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Attribute {
    /// Markup describing the attribute.
    #[serde(default)]
    pub description: Vec<Block>,
    /// Attribute name without sigil.
    pub name: String,
    /// Read/write marker as printed, e.g. `R`, `W`, `RW`.
    #[serde(default = "default_rw")]
    pub rw: String,
}

/// Block-level markup node.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Paragraph separator.
    BlankLine,
    /// Heading whose level is relative to the surrounding entity.
    Heading {
        /// User-requested level, 1-based.
        level: u8,
        /// Heading content.
        text: Vec<Inline>,
    },
    /// A list of one of the fixed list kinds.
    List {
        /// Items in document order.
        items: Vec<ListItem>,
        /// Kind of every item in this list.
        kind: ListKind,
    },
    /// Flowing text with inline markup.
    Paragraph {
        /// Paragraph content.
        text: Vec<Inline>,
    },
    /// Backend-native markup passed through untouched.
    Raw {
        /// Raw backend markup.
        text: String,
    },
    /// Horizontal rule.
    Rule {
        /// Line thickness in points.
        weight: u8,
    },
    /// Monospaced preformatted text.
    Verbatim {
        /// Text, line breaks preserved.
        text: String,
    },
}

/// A documented class or module.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassModule {
    /// Attribute accessors in source order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Constants in source order.
    #[serde(default)]
    pub constants: Vec<Constant>,
    /// Overview markup.
    #[serde(default)]
    pub description: Vec<Block>,
    /// Fully qualified name, e.g. `Net::HTTP`.
    pub full_name: String,
    /// Names of included mixins as written in the source.
    #[serde(default)]
    pub includes: Vec<String>,
    /// Class or module.
    pub kind: ContainerKind,
    /// Methods, including alias methods.
    #[serde(default)]
    pub methods: Vec<Method>,
    /// Titled sections of the overview.
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl ClassModule {
    /// Whether this container is a module rather than a class.
    pub fn is_module(&self) -> bool {
        return self.kind == ContainerKind::Module;
    }

    /// Methods of one kind and visibility, sorted by name.
    pub fn methods_of(&self, kind: MethodKind, visibility: Visibility) -> Vec<&Method> {
        let mut methods: Vec<&Method> = self
            .methods
            .iter()
            .filter(|m| return m.kind == kind && m.visibility == visibility)
            .collect();
        methods.sort_by(|a, b| return a.name.cmp(&b.name));
        return methods;
    }
}

/// A documented constant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Constant {
    /// Markup describing the constant.
    #[serde(default)]
    pub description: Vec<Block>,
    /// Constant name.
    pub name: String,
    /// Source text of the assigned value.
    #[serde(default)]
    pub value: String,
}

/// Distinguishes classes from modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// A class.
    Class,
    /// A module.
    Module,
}

/// The complete model handed over by the documentation extractor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Documentation {
    /// All classes and modules, in any order.
    #[serde(default)]
    pub classes: Vec<ClassModule>,
    /// Free-standing pages in the order they were given.
    #[serde(default)]
    pub pages: Vec<Page>,
    /// Title of the documented project.
    #[serde(default)]
    pub title: Option<String>,
}

impl Documentation {
    /// Read a model from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelNotFound` if the file doesn't exist, `Error::Io` on
    /// other read failures, or `Error::Json` if the content is malformed
    /// (including unknown list kinds).
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ModelNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse a model from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the content is malformed.
    pub fn parse(content: &str) -> Result<Self, Error> {
        return Ok(serde_json::from_str(content)?);
    }

    /// Classes and modules merged and sorted by qualified name.
    pub fn sorted_classes(&self) -> Vec<&ClassModule> {
        let mut sorted: Vec<&ClassModule> = self.classes.iter().collect();
        sorted.sort_by(|a, b| return a.full_name.cmp(&b.full_name));
        return sorted;
    }

    /// Free pages with `main_page` (if present) moved to the front.
    pub fn ordered_pages(&self, main_page: Option<&str>) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.pages.iter().collect();
        let main_index = main_page.and_then(|main| return pages.iter().position(|p| return p.name == main));
        if let Some(index) = main_index {
            let main = pages.remove(index);
            pages.insert(0, main);
        }
        return pages;
    }
}

/// Inline markup token inside a text run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    /// Bold span.
    Bold(Vec<Inline>),
    /// Monospaced span; never scanned for references.
    Code(String),
    /// Italic span.
    Emphasis(Vec<Inline>),
    /// External hyperlink.
    Hyperlink {
        /// Optional label; the URL itself is shown otherwise.
        #[serde(default)]
        label: Option<String>,
        /// Target URL, scheme optional.
        url: String,
    },
    /// Explicit reference to a documented entity.
    Reference {
        /// Display-name override.
        #[serde(default)]
        label: Option<String>,
        /// Name to resolve, e.g. `Foo#bar`.
        name: String,
    },
    /// Plain prose, scanned for reference candidates.
    Text(String),
}

/// One item of a list block.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListItem {
    /// Item content.
    #[serde(default)]
    pub body: Vec<Block>,
    /// Label for label and note lists.
    #[serde(default)]
    pub label: Option<Vec<Inline>>,
}

/// The closed set of list kinds the model may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Unordered list with bullet glyphs.
    Bullet,
    /// Definition list with labels.
    Label,
    /// Ordered list labelled `a.`, `b.`, ...
    Lalpha,
    /// Definition list rendered like `Label`.
    Note,
    /// Ordered list labelled `1.`, `1.2.`, ...
    Number,
    /// Ordered list labelled `A.`, `B.`, ...
    Ualpha,
}

impl ListKind {
    /// Label and note lists carry a label box and a right margin.
    pub const fn is_labelled(self) -> bool {
        return matches!(self, Self::Label | Self::Note);
    }
}

/// A documented method or alias method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Method {
    /// Names of methods that alias this one.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Call signature text, e.g. `foo(a, b) -> String`.
    #[serde(default)]
    pub call_seq: Option<String>,
    /// Markup describing the method.
    #[serde(default)]
    pub description: Vec<Block>,
    /// Name of the method this one aliases.
    #[serde(default)]
    pub is_alias_for: Option<String>,
    /// Class or instance method.
    #[serde(default)]
    pub kind: MethodKind,
    /// Method name without sigil.
    pub name: String,
    /// Visibility.
    #[serde(default)]
    pub visibility: Visibility,
}

impl Method {
    /// Name with its kind sigil: `::name` or `#name`.
    pub fn pretty_name(&self) -> String {
        return format!("{}{}", self.kind.sigil(), self.name);
    }
}

/// Class-level versus instance-level method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Singleton/class method; sorts first.
    Class,
    /// Instance method.
    #[default]
    Instance,
}

impl MethodKind {
    /// Heading word used in group titles.
    pub const fn label(self) -> &'static str {
        return match self {
            Self::Class => "Class",
            Self::Instance => "Instance",
        };
    }

    /// Separator between owner and method name.
    pub const fn sigil(self) -> &'static str {
        return match self {
            Self::Class => "::",
            Self::Instance => "#",
        };
    }
}

/// A free-standing documentation page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page content.
    #[serde(default)]
    pub body: Vec<Block>,
    /// Page name, usually the source file name such as `README.rdoc`.
    pub name: String,
}

/// A titled section inside a class or module overview.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Section {
    /// Section content.
    #[serde(default)]
    pub description: Vec<Block>,
    /// Section title.
    pub title: String,
}

/// Method visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Private.
    Private,
    /// Protected.
    Protected,
    /// Public.
    #[default]
    Public,
}

impl Visibility {
    /// Group order used when listing methods.
    pub const ALL: [Self; 3] = [Self::Public, Self::Protected, Self::Private];

    /// Heading word used in group titles.
    pub const fn label(self) -> &'static str {
        return match self {
            Self::Private => "Private",
            Self::Protected => "Protected",
            Self::Public => "Public",
        };
    }
}

/// Default accessor marker for attributes that omit it.
fn default_rw() -> String {
    return "RW".to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_model() {
        let doc = Documentation::parse(
            r#"{
                "pages": [{"name": "README.rdoc", "body": [
                    {"type": "paragraph", "text": [{"text": "Hello"}, {"bold": [{"text": "world"}]}]}
                ]}],
                "classes": [{"full_name": "Foo", "kind": "class", "methods": [
                    {"name": "bar"}, {"name": "new", "kind": "class"}
                ]}]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.pages.len(), 1);
        let foo = &doc.classes[0];
        assert_eq!(foo.methods[0].kind, MethodKind::Instance);
        assert_eq!(foo.methods[0].visibility, Visibility::Public);
        assert_eq!(foo.methods[1].pretty_name(), "::new");
    }

    #[test]
    fn rejects_unknown_list_kind() {
        let result = Documentation::parse(
            r#"{"pages": [{"name": "x", "body": [{"type": "list", "kind": "zigzag", "items": []}]}]}"#,
        );
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn main_page_moves_to_front() {
        let doc = Documentation::parse(
            r#"{"pages": [{"name": "a"}, {"name": "b"}, {"name": "c"}]}"#,
        )
        .unwrap();
        let names: Vec<&str> = doc.ordered_pages(Some("c")).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
        let names: Vec<&str> = doc.ordered_pages(Some("zzz")).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn classes_and_modules_sort_by_full_name() {
        let doc = Documentation::parse(
            r#"{"classes": [
                {"full_name": "Zeta", "kind": "module"},
                {"full_name": "Alpha::Beta", "kind": "class"},
                {"full_name": "Alpha", "kind": "module"}
            ]}"#,
        )
        .unwrap();
        let names: Vec<&str> = doc.sorted_classes().iter().map(|c| c.full_name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Alpha::Beta", "Zeta"]);
    }
}
