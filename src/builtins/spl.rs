//! SPL interfaces: iterator contracts and Countable.
//!
//! Every method here is a body-less stub. Registering a class that implements
//! one of these without overriding a stub succeeds; calling the stub is what
//! fails, with a fatal error naming the declaring interface.

use crate::core::interner::Interner;
use crate::runtime::error::VmError;
use crate::runtime::method::{MethodDecl, MethodSignature, ParamType};
use crate::runtime::registry::{ClassDecl, ClassRegistry};

pub fn register(registry: &mut ClassRegistry, interner: &mut Interner) -> Result<(), VmError> {
    let iterator = registry.define_class(
        interner,
        ClassDecl::new(b"Iterator")
            .interface()
            .method(MethodDecl::abstract_stub(b"current", MethodSignature::new()))
            .method(MethodDecl::abstract_stub(b"next", MethodSignature::new()))
            .method(MethodDecl::abstract_stub(b"key", MethodSignature::new()))
            .method(MethodDecl::abstract_stub(b"rewind", MethodSignature::new()))
            .method(MethodDecl::abstract_stub(b"valid", MethodSignature::new())),
    )?;

    registry.define_class(
        interner,
        ClassDecl::new(b"SeekableIterator")
            .interface()
            .implements(iterator)
            .method(MethodDecl::abstract_stub(
                b"seek",
                MethodSignature::new().param(ParamType::Int),
            )),
    )?;

    registry.define_class(
        interner,
        ClassDecl::new(b"RecursiveIterator")
            .interface()
            .implements(iterator)
            .method(MethodDecl::abstract_stub(
                b"hasChildren",
                MethodSignature::new(),
            ))
            .method(MethodDecl::abstract_stub(
                b"getChildren",
                MethodSignature::new(),
            )),
    )?;

    registry.define_class(
        interner,
        ClassDecl::new(b"Countable")
            .interface()
            .method(MethodDecl::abstract_stub(b"count", MethodSignature::new())),
    )?;
    Ok(())
}
