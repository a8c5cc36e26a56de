mod common;

use common::int_of;
use php_object::core::value::Handle;
use php_object::runtime::context::ExecutionContext;
use php_object::runtime::error::VmError;
use php_object::runtime::method::{MethodDecl, MethodSignature};
use php_object::runtime::registry::ClassDecl;

fn count_three(
    ctx: &mut ExecutionContext,
    _this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    Ok(ctx.new_int(3))
}

#[test]
fn registering_an_incomplete_implementor_succeeds() {
    let mut ctx = ExecutionContext::new();
    let iterator = ctx.registry.lookup(b"Iterator").unwrap();
    ctx.define_class(ClassDecl::new(b"LazyIter").implements(iterator))
        .unwrap();
    assert!(ctx.instantiate_by_name(b"LazyIter", &[]).is_ok());
}

#[test]
fn calling_an_unoverridden_stub_is_fatal_and_names_the_interface() {
    let mut ctx = ExecutionContext::new();
    let iterator = ctx.registry.lookup(b"Iterator").unwrap();
    ctx.define_class(ClassDecl::new(b"LazyIter").implements(iterator))
        .unwrap();
    let obj = ctx.instantiate_by_name(b"LazyIter", &[]).unwrap();
    let err = ctx.call_method(obj, b"current", &[]).unwrap_err();
    assert_eq!(
        err,
        VmError::Fatal("Cannot call abstract method Iterator::current()".to_string())
    );
}

#[test]
fn a_concrete_override_shadows_the_stub() {
    let mut ctx = ExecutionContext::new();
    let countable = ctx.registry.lookup(b"Countable").unwrap();
    ctx.define_class(
        ClassDecl::new(b"Triple")
            .implements(countable)
            .method(MethodDecl::native(b"count", MethodSignature::new(), count_three)),
    )
    .unwrap();
    let obj = ctx.instantiate_by_name(b"Triple", &[]).unwrap();
    let result = ctx.call_method(obj, b"count", &[]).unwrap();
    assert_eq!(int_of(&ctx, result), 3);
}

#[test]
fn seekable_iterator_inherits_the_iterator_stubs() {
    let mut ctx = ExecutionContext::new();
    let seekable = ctx.registry.lookup(b"SeekableIterator").unwrap();
    ctx.define_class(ClassDecl::new(b"Cursor").implements(seekable))
        .unwrap();
    let obj = ctx.instantiate_by_name(b"Cursor", &[]).unwrap();

    let err = ctx.call_method(obj, b"rewind", &[]).unwrap_err();
    assert_eq!(
        err,
        VmError::Fatal("Cannot call abstract method Iterator::rewind()".to_string())
    );
    let pos = ctx.new_int(5);
    let err = ctx.call_method(obj, b"seek", &[pos]).unwrap_err();
    assert_eq!(
        err,
        VmError::Fatal("Cannot call abstract method SeekableIterator::seek()".to_string())
    );
}

#[test]
fn abstract_class_stubs_behave_like_interface_stubs() {
    let mut ctx = ExecutionContext::new();
    ctx.define_class(
        ClassDecl::new(b"Shape")
            .abstract_class()
            .method(MethodDecl::abstract_stub(b"area", MethodSignature::new())),
    )
    .unwrap();
    let shape = ctx.registry.lookup(b"Shape").unwrap();
    ctx.define_class(ClassDecl::new(b"Blob").extends(shape))
        .unwrap();
    let obj = ctx.instantiate_by_name(b"Blob", &[]).unwrap();
    let err = ctx.call_method(obj, b"area", &[]).unwrap_err();
    assert_eq!(
        err,
        VmError::Fatal("Cannot call abstract method Shape::area()".to_string())
    );
}
