//! ReflectionClass: runtime introspection and name-driven construction.

use crate::core::interner::Interner;
use crate::core::value::{Handle, Symbol, Val, Visibility};
use crate::runtime::context::ExecutionContext;
use crate::runtime::error::VmError;
use crate::runtime::method::{MethodDecl, MethodSignature, ParamType};
use crate::runtime::registry::{ClassDecl, ClassRegistry};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Per-instance reflection state. `target` stays unresolved until the
/// constructor binds a class; `name` holds the registered spelling.
pub struct ReflectionData {
    pub name: RefCell<Vec<u8>>,
    pub target: Cell<Option<Symbol>>,
}

fn reflection_factory(_ctx: &mut ExecutionContext) -> Rc<dyn Any> {
    Rc::new(ReflectionData {
        name: RefCell::new(Vec::new()),
        target: Cell::new(None),
    })
}

fn broken_reflection() -> VmError {
    VmError::Fatal("Internal error: Failed to retrieve the reflection object".to_string())
}

fn reflection_payload(
    ctx: &ExecutionContext,
    this: Handle,
) -> Result<Rc<ReflectionData>, VmError> {
    ctx.instance_payload::<ReflectionData>(this)
        .ok_or_else(broken_reflection)
}

/// Bound class of a reflection instance; fatal if the constructor never
/// resolved one.
fn refl_target(ctx: &ExecutionContext, this: Handle) -> Result<Symbol, VmError> {
    reflection_payload(ctx, this)?
        .target
        .get()
        .ok_or_else(broken_reflection)
}

fn reflection_construct(
    ctx: &mut ExecutionContext,
    this: Handle,
    args: &[Handle],
) -> Result<Handle, VmError> {
    let requested = ctx.string_of(args[0]).unwrap_or_default();
    let Some(class) = ctx.registry.lookup(&requested) else {
        return Err(broken_reflection());
    };
    let payload = reflection_payload(ctx, this)?;
    payload.target.set(Some(class));
    let display = ctx
        .interner
        .lookup(class)
        .map(<[u8]>::to_vec)
        .unwrap_or(requested);
    *payload.name.borrow_mut() = display;
    Ok(ctx.new_null())
}

fn reflection_get_name(
    ctx: &mut ExecutionContext,
    this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    reflection_name_getter(ctx, this)
}

fn reflection_new_instance(
    ctx: &mut ExecutionContext,
    this: Handle,
    args: &[Handle],
) -> Result<Handle, VmError> {
    let target = refl_target(ctx, this)?;
    ctx.instantiate(target, args)
}

fn reflection_new_instance_args(
    ctx: &mut ExecutionContext,
    this: Handle,
    args: &[Handle],
) -> Result<Handle, VmError> {
    let target = refl_target(ctx, this)?;
    let forwarded = ctx.value_to_arg_list(args[0])?;
    ctx.instantiate(target, &forwarded)
}

/// Backs the read-only `$name` property.
fn reflection_name_getter(ctx: &mut ExecutionContext, this: Handle) -> Result<Handle, VmError> {
    let payload = reflection_payload(ctx, this)?;
    if payload.target.get().is_none() {
        return Err(broken_reflection());
    }
    let name = payload.name.borrow().clone();
    Ok(ctx.new_str(&name))
}

pub fn register(registry: &mut ClassRegistry, interner: &mut Interner) -> Result<(), VmError> {
    let reflection = interner.intern(b"ReflectionClass");
    let this = || MethodSignature::new().receiver(reflection);

    let decl = ClassDecl::new(b"ReflectionClass")
        .instance_factory(reflection_factory)
        .getter_setter(b"name", Visibility::Public, reflection_name_getter, None)
        .method(MethodDecl::native(
            b"__construct",
            this().param(ParamType::Str),
            reflection_construct,
        ))
        .method(MethodDecl::native(b"getName", this(), reflection_get_name))
        .method(MethodDecl::native(
            b"newInstance",
            this().variadic(),
            reflection_new_instance,
        ))
        .method(MethodDecl::native(
            b"newInstanceArgs",
            this().optional(ParamType::Any, Val::Null),
            reflection_new_instance_args,
        ));
    registry.define_class(interner, decl)?;
    Ok(())
}
