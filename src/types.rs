/// Core domain types: anchors and the entity adapter over the documentation model.
use std::fmt;

use crate::model::{Attribute, ClassModule, Constant, Method, Page, Section};

/// Stable identifier of a documented entity. Used both as the named
/// destination in the output and as the registry key for page lookup.
/// Newtype prevents mixing with display names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Anchor(
    /// The destination name.
    pub String,
);

impl Anchor {
    /// Borrow the destination name.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for Anchor {
    /// Write the bare destination name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// A renderable entity, wrapping the model types it is built from.
///
/// Every operation that differs by entity kind matches exhaustively on this
/// type, so a new kind cannot be added without deciding its anchor and
/// heading level.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    /// Method that aliases another method.
    Alias {
        /// The alias method itself.
        method: &'a Method,
        /// Owning class or module.
        parent: &'a ClassModule,
    },
    /// Attribute accessor.
    Attribute {
        /// The attribute.
        attribute: &'a Attribute,
        /// Owning class or module.
        parent: &'a ClassModule,
    },
    /// Class or module.
    ClassModule(&'a ClassModule),
    /// Constant.
    Constant {
        /// The constant.
        constant: &'a Constant,
        /// Owning class or module.
        parent: &'a ClassModule,
    },
    /// Free-standing page.
    FreePage(&'a Page),
    /// Regular method.
    Method {
        /// The method.
        method: &'a Method,
        /// Owning class or module.
        parent: &'a ClassModule,
    },
    /// Titled section of a class or module overview.
    Section {
        /// Owning class or module.
        parent: &'a ClassModule,
        /// The section.
        section: &'a Section,
    },
}

impl<'a> Entity<'a> {
    /// Derive the destination name. Pure: depends only on entity identity.
    pub fn anchor(&self) -> Anchor {
        let name = match self {
            Self::Alias { method, parent } => format!("alias-{}-{}", parent.full_name, method.pretty_name()),
            Self::Attribute { attribute, parent } => {
                format!("attr-{}-#{}", parent.full_name, attribute.name)
            },
            Self::ClassModule(classmod) => format!("classmod-{}", classmod.full_name),
            Self::Constant { constant, parent } => format!("const-{}-{}", parent.full_name, constant.name),
            Self::FreePage(page) => format!("toplevel-{}", page.name),
            Self::Method { method, parent } => {
                format!("method-{}-{}", parent.full_name, method.pretty_name())
            },
            Self::Section { parent, section } => format!("section-{}-{}", parent.full_name, section.title),
        };
        return Anchor(name);
    }

    /// Base level added to headings requested inside this entity's markup.
    pub const fn heading_base(&self) -> u8 {
        return match self {
            Self::FreePage(_) => 0,
            Self::ClassModule(_) => 1,
            Self::Section { .. } => 2,
            Self::Alias { .. } | Self::Attribute { .. } | Self::Constant { .. } | Self::Method { .. } => 3,
        };
    }

    /// Wrap a method, choosing the alias variant when it aliases another method.
    pub const fn for_method(method: &'a Method, parent: &'a ClassModule) -> Self {
        if method.is_alias_for.is_some() {
            return Self::Alias { method, parent };
        }
        return Self::Method { method, parent };
    }

    /// The class or module that relative names are resolved against.
    pub const fn namespace(&self) -> Option<&'a ClassModule> {
        return match *self {
            Self::FreePage(_) => None,
            Self::ClassModule(classmod) => Some(classmod),
            Self::Alias { parent, .. }
            | Self::Attribute { parent, .. }
            | Self::Constant { parent, .. }
            | Self::Method { parent, .. }
            | Self::Section { parent, .. } => Some(parent),
        };
    }
}
