mod common;

use php_object::runtime::context::{ContextBuilder, ExecutionContext};
use php_object::runtime::core_extension::CoreExtension;
use php_object::runtime::error::VmError;
use php_object::runtime::registry::ClassDecl;
use php_object::runtime::spl_extension::SplExtension;

#[test]
fn default_context_loads_core_and_spl() {
    let ctx = ExecutionContext::new();
    assert!(ctx.extension_loaded("Core"));
    assert!(ctx.extension_loaded("SPL"));
    assert!(!ctx.extension_loaded("gd"));
}

#[test]
fn builtin_classes_resolve_case_insensitively() {
    let ctx = ExecutionContext::new();
    assert!(ctx.registry.lookup(b"EXCEPTION").is_some());
    assert_eq!(
        ctx.registry.lookup(b"reflectionclass"),
        ctx.registry.lookup(b"ReflectionClass")
    );
    assert!(ctx.registry.lookup(b"Countable").is_some());
    assert!(ctx.registry.lookup(b"__PHP_Incomplete_Class").is_some());
}

#[test]
fn redeclaring_a_builtin_is_fatal() {
    let mut ctx = ExecutionContext::new();
    let err = ctx.define_class(ClassDecl::new(b"exception")).unwrap_err();
    assert_eq!(
        err,
        VmError::Fatal("Cannot redeclare class exception".to_string())
    );
}

#[test]
fn duplicate_extension_registration_is_rejected() {
    let err = ContextBuilder::new()
        .with_extension(CoreExtension)
        .with_extension(CoreExtension)
        .build()
        .unwrap_err();
    assert_eq!(err, "Extension 'Core' is already registered");
}

#[test]
fn spl_requires_core() {
    let err = ContextBuilder::new()
        .with_extension(SplExtension)
        .build()
        .unwrap_err();
    assert_eq!(err, "Extension 'SPL' depends on 'Core' which is not loaded");
}

#[test]
fn contexts_share_no_state() {
    let mut a = ExecutionContext::new();
    let b = ExecutionContext::new();
    a.define_class(ClassDecl::new(b"OnlyHere")).unwrap();
    assert!(a.registry.lookup(b"OnlyHere").is_some());
    assert!(b.registry.lookup(b"OnlyHere").is_none());
    assert_eq!(b.arena.len(), 0);
}
