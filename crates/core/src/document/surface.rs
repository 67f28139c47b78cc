//! Drawing surfaces and their resource tables.

use std::fmt;

use crate::model::ObjRef;

/// Identity of a drawing surface: a page or a Form XObject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceId {
    /// Page `number` (1-based) stored at `obj`.
    Page { number: u32, obj: ObjRef },
    /// Form XObject stream at `obj`.
    Form { obj: ObjRef },
}

impl SurfaceId {
    pub const fn page(number: u32, obj: ObjRef) -> Self {
        Self::Page { number, obj }
    }

    pub const fn form(obj: ObjRef) -> Self {
        Self::Form { obj }
    }

    /// Object holding the surface dictionary.
    pub const fn obj(&self) -> ObjRef {
        match self {
            Self::Page { obj, .. } | Self::Form { obj } => *obj,
        }
    }

    pub const fn is_page(&self) -> bool {
        matches!(self, Self::Page { .. })
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page { number, obj } => write!(f, "page {number} (object {obj})"),
            Self::Form { obj } => write!(f, "form object {obj}"),
        }
    }
}

/// What a named XObject resource is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A Form XObject, itself a drawing surface.
    Form(ObjRef),
    /// Images and anything else; never inspected.
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub name: String,
    pub kind: ResourceKind,
}

impl ResourceEntry {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Named XObject resources of a surface, in dictionary order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTable {
    entries: Vec<ResourceEntry>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceEntry> {
        self.entries.iter()
    }

    /// `(name, surface)` for every form entry, in enumeration order.
    pub fn form_entries(&self) -> impl Iterator<Item = (&str, SurfaceId)> + '_ {
        self.entries.iter().filter_map(|entry| match entry.kind {
            ResourceKind::Form(obj) => Some((entry.name.as_str(), SurfaceId::form(obj))),
            ResourceKind::Opaque => None,
        })
    }
}

impl FromIterator<ResourceEntry> for ResourceTable {
    fn from_iter<I: IntoIterator<Item = ResourceEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
