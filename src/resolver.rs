use std::collections::HashMap;

use crate::model::{ClassModule, Documentation, MethodKind, Page};
use crate::types::Entity;

/// Method kinds to try, in order, when the reference doesn't say.
const ANY_INSTANCE_FIRST: &[MethodKind] = &[MethodKind::Instance, MethodKind::Class];

/// Method kinds to try for `Foo.bar`, which usually names a class method.
const ANY_CLASS_FIRST: &[MethodKind] = &[MethodKind::Class, MethodKind::Instance];

/// Resolves a reference name to the entity it denotes.
///
/// This is the documentation model's name lookup; the cross-referencer only
/// ever talks to it through this trait.
pub trait NameResolver<'a> {
    /// Resolve `name` relative to `context` (the class or module the text
    /// belongs to, `None` on free pages). Returns `None` when the name
    /// doesn't denote any documented entity.
    fn resolve(&self, name: &str, context: Option<&'a ClassModule>) -> Option<Entity<'a>>;
}

/// Lookup tables over one [`Documentation`].
pub struct ModelIndex<'a> {
    /// Classes and modules by qualified name.
    classes: HashMap<&'a str, &'a ClassModule>,
    /// The indexed model.
    doc: &'a Documentation,
    /// Free pages by name.
    pages: HashMap<&'a str, &'a Page>,
}

/// A reference name split into what it addresses.
#[derive(Debug, PartialEq, Eq)]
enum NameQuery<'n> {
    /// `Foo::Bar` or `::Foo`. May also be a constant.
    Container(&'n str),
    /// `Foo#bar`, `#bar`, `::bar`, `Foo.bar`, `Foo::bar`, or a bare word.
    Member {
        /// Owning container path, `None` for the current context.
        container: Option<&'n str>,
        /// Method kinds to try in order.
        kinds: &'static [MethodKind],
        /// Member name.
        member: &'n str,
    },
    /// `Foo@Section` or `@Section`.
    Section {
        /// Owning container path, `None` for the current context.
        container: Option<&'n str>,
        /// Section title, `+` standing for a space.
        label: &'n str,
    },
}

impl<'a> ModelIndex<'a> {
    /// Every entity that can be referenced, in rendering order.
    pub fn entities(&self) -> Vec<Entity<'a>> {
        let mut out: Vec<Entity<'a>> = self.doc.pages.iter().map(Entity::FreePage).collect();
        for classmod in self.doc.sorted_classes() {
            out.push(Entity::ClassModule(classmod));
            out.extend(classmod.sections.iter().map(|section| {
                return Entity::Section { parent: classmod, section };
            }));
            out.extend(classmod.constants.iter().map(|constant| {
                return Entity::Constant { constant, parent: classmod };
            }));
            out.extend(classmod.attributes.iter().map(|attribute| {
                return Entity::Attribute { attribute, parent: classmod };
            }));
            out.extend(classmod.methods.iter().map(|method| return Entity::for_method(method, classmod)));
        }
        return out;
    }

    /// Find a class or module by path, searching from the innermost enclosing
    /// namespace of `context` outward. A leading `::` makes the path absolute.
    fn find_container(&self, path: &str, context: Option<&'a ClassModule>) -> Option<&'a ClassModule> {
        if let Some(absolute) = path.strip_prefix("::") {
            return self.classes.get(absolute).copied();
        }

        for namespace in enclosing_namespaces(context) {
            let candidate = format!("{namespace}::{path}");
            if let Some(found) = self.classes.get(candidate.as_str()).copied() {
                return Some(found);
            }
        }
        return self.classes.get(path).copied();
    }

    /// Find a member of a container: methods by kind preference, then
    /// attributes, then constants.
    fn find_member(
        container: &'a ClassModule,
        member: &str,
        kinds: &[MethodKind],
    ) -> Option<Entity<'a>> {
        for kind in kinds {
            let method = container.methods.iter().find(|m| return m.name == member && m.kind == *kind);
            if let Some(method) = method {
                return Some(Entity::for_method(method, container));
            }
        }

        if kinds.contains(&MethodKind::Instance)
            && let Some(attribute) = container.attributes.iter().find(|a| return a.name == member)
        {
            return Some(Entity::Attribute { attribute, parent: container });
        }

        return container
            .constants
            .iter()
            .find(|c| return c.name == member)
            .map(|constant| return Entity::Constant { constant, parent: container });
    }

    /// Index a model.
    pub fn new(doc: &'a Documentation) -> Self {
        let classes = doc.classes.iter().map(|c| return (c.full_name.as_str(), c)).collect();
        let pages = doc.pages.iter().map(|p| return (p.name.as_str(), p)).collect();
        return Self { classes, doc, pages };
    }

    /// Resolve a bare constant name against the context and its enclosing
    /// namespaces.
    fn resolve_constant(&self, name: &str, context: Option<&'a ClassModule>) -> Option<Entity<'a>> {
        for namespace in enclosing_namespaces(context) {
            let Some(container) = self.classes.get(namespace).copied() else {
                continue;
            };
            if let Some(constant) = container.constants.iter().find(|c| return c.name == name) {
                return Some(Entity::Constant { constant, parent: container });
            }
        }
        return None;
    }
}

impl<'a> NameResolver<'a> for ModelIndex<'a> {
    fn resolve(&self, name: &str, context: Option<&'a ClassModule>) -> Option<Entity<'a>> {
        if let Some(page) = self.pages.get(name).copied() {
            return Some(Entity::FreePage(page));
        }

        match parse_name(name) {
            NameQuery::Container(path) => {
                if let Some(classmod) = self.find_container(path, context) {
                    return Some(Entity::ClassModule(classmod));
                }
                // `Foo::BAR` or bare `BAR` may be a constant.
                return match path.trim_start_matches("::").rsplit_once("::") {
                    None => self.resolve_constant(path.trim_start_matches("::"), context),
                    Some((owner, constant)) => {
                        let container = self.find_container(owner, context)?;
                        Self::find_member(container, constant, &[])
                    },
                };
            },
            NameQuery::Member { container, kinds, member } => {
                let owner = match container {
                    None => context?,
                    Some(path) => self.find_container(path, context)?,
                };
                return Self::find_member(owner, member, kinds);
            },
            NameQuery::Section { container, label } => {
                let owner = match container {
                    None => context?,
                    Some(path) => self.find_container(path, context)?,
                };
                let title = label.replace('+', " ");
                return owner
                    .sections
                    .iter()
                    .find(|s| return s.title == title)
                    .map(|section| return Entity::Section { parent: owner, section });
            },
        }
    }
}

/// `A::B::C` yields `A::B::C`, `A::B`, `A`.
fn enclosing_namespaces(context: Option<&ClassModule>) -> Vec<&str> {
    let Some(context) = context else {
        return Vec::new();
    };
    let mut namespaces = Vec::new();
    let mut current = context.full_name.as_str();
    loop {
        namespaces.push(current);
        match current.rsplit_once("::") {
            None => break,
            Some((outer, _)) => current = outer,
        }
    }
    return namespaces;
}

/// Whether a path segment starts like a method name rather than a constant.
fn is_method_name(segment: &str) -> bool {
    return segment.chars().next().is_some_and(|c| return c.is_lowercase() || c == '_');
}

/// Split a reference name into container and member parts.
fn parse_name(raw: &str) -> NameQuery<'_> {
    // Argument lists such as `foo(a, b)` don't take part in lookup.
    let name = match raw.find('(') {
        Some(pos) if raw.ends_with(')') => raw.get(..pos).unwrap_or(raw),
        _ => raw,
    };

    if let Some((owner, label)) = name.split_once('@') {
        let container = if owner.is_empty() { None } else { Some(owner) };
        return NameQuery::Section { container, label };
    }

    if let Some((owner, member)) = name.rsplit_once('#') {
        let container = if owner.is_empty() { None } else { Some(owner) };
        return NameQuery::Member { container, kinds: &[MethodKind::Instance], member };
    }

    if let Some((owner, member)) = name.rsplit_once('.')
        && !owner.is_empty()
    {
        return NameQuery::Member { container: Some(owner), kinds: ANY_CLASS_FIRST, member };
    }

    if let Some((owner, member)) = name.rsplit_once("::")
        && is_method_name(member)
    {
        let container = if owner.is_empty() { None } else { Some(owner) };
        return NameQuery::Member { container, kinds: &[MethodKind::Class], member };
    }

    if is_method_name(name) {
        return NameQuery::Member { container: None, kinds: ANY_INSTANCE_FIRST, member: name };
    }

    return NameQuery::Container(name);
}
