//! Property descriptors: stored attributes and virtual getter/setter pairs.
//!
//! A `GetterSetter` entry sits in the class property table exactly like a
//! stored attribute; callers cannot tell the difference. Reads go through the
//! getter, writes through the setter, and a missing setter makes the property
//! immutable from the outside.

use crate::core::value::{Handle, Visibility};
use crate::runtime::context::ExecutionContext;
use crate::runtime::error::VmError;

pub type GetterFn = fn(&mut ExecutionContext, Handle) -> Result<Handle, VmError>;
pub type SetterFn = fn(&mut ExecutionContext, Handle, Handle) -> Result<(), VmError>;

#[derive(Debug, Clone, Copy)]
pub enum PropertyEntry {
    Stored {
        visibility: Visibility,
    },
    GetterSetter {
        visibility: Visibility,
        getter: GetterFn,
        setter: Option<SetterFn>,
    },
}

impl PropertyEntry {
    pub fn visibility(&self) -> Visibility {
        match self {
            PropertyEntry::Stored { visibility } => *visibility,
            PropertyEntry::GetterSetter { visibility, .. } => *visibility,
        }
    }
}

/// Property declaration consumed by `ClassRegistry::define_class`.
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub name: Vec<u8>,
    pub entry: PropertyEntry,
}
