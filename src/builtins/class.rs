//! Plain core classes with no native behavior.

use crate::core::interner::Interner;
use crate::runtime::error::VmError;
use crate::runtime::registry::{ClassDecl, ClassRegistry};

/// `stdClass` is the bag-of-dynamic-attributes class; incomplete-class
/// instances come out of unserializing a class that is no longer defined.
pub fn register(registry: &mut ClassRegistry, interner: &mut Interner) -> Result<(), VmError> {
    registry.define_class(interner, ClassDecl::new(b"stdClass"))?;
    registry.define_class(interner, ClassDecl::new(b"__PHP_Incomplete_Class"))?;
    Ok(())
}
