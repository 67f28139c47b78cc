//! PDF object identity.

use std::fmt;

/// PDF indirect object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef {
    /// Object ID
    pub objid: u32,
    /// Generation number
    pub genno: u16,
}

impl ObjRef {
    /// Create a new object reference.
    pub const fn new(objid: u32, genno: u16) -> Self {
        Self { objid, genno }
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.objid, self.genno)
    }
}

impl From<lopdf::ObjectId> for ObjRef {
    fn from((objid, genno): lopdf::ObjectId) -> Self {
        Self { objid, genno }
    }
}

impl From<ObjRef> for lopdf::ObjectId {
    fn from(r: ObjRef) -> Self {
        (r.objid, r.genno)
    }
}
