//! Native method declaration, argument binding and dispatch.
//!
//! A native method is a plain function pointer plus a declared signature. The
//! binder turns raw argument handles into the shape the body expects: it
//! checks the receiver kind, validates arity, coerces each value parameter,
//! materializes defaults for missing optionals and passes any variadic tail
//! through untouched. Dispatch walks the inheritance chain and turns an
//! unoverridden abstract stub into a fatal error naming the stub.

use crate::core::value::{Handle, Symbol, Val, Visibility};
use crate::runtime::context::ExecutionContext;
use crate::runtime::error::VmError;
use smallvec::SmallVec;

pub const INLINE_ARG_CAPACITY: usize = 8;
pub type ArgList = SmallVec<[Handle; INLINE_ARG_CAPACITY]>;

/// Calling convention for native method bodies: context, receiver, bound
/// arguments (fixed parameters first, variadic tail after).
pub type NativeHandler =
    fn(&mut ExecutionContext, Handle, &[Handle]) -> Result<Handle, VmError>;

/// Semantic type a value parameter is coerced to before the body runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    /// Coerce scalars to a byte string.
    Str,
    /// Coerce scalars and numeric strings to an integer.
    Int,
    /// Null or an object; `Some(class)` additionally requires that class or a
    /// descendant.
    Object(Option<Symbol>),
    /// Pass through unvalidated.
    Any,
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub ty: ParamType,
    /// `Some` makes the parameter optional; the value is materialized into
    /// the arena when the caller omits it.
    pub default: Option<Val>,
}

#[derive(Debug, Clone, Default)]
pub struct MethodSignature {
    /// Required receiver class; None accepts any instance.
    pub this_class: Option<Symbol>,
    pub params: Vec<ParamSpec>,
    /// Collect remaining arguments as a raw tail after the fixed parameters.
    pub variadic: bool,
}

impl MethodSignature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receiver(mut self, class: Symbol) -> Self {
        self.this_class = Some(class);
        self
    }

    pub fn param(mut self, ty: ParamType) -> Self {
        self.params.push(ParamSpec { ty, default: None });
        self
    }

    pub fn optional(mut self, ty: ParamType, default: Val) -> Self {
        self.params.push(ParamSpec {
            ty,
            default: Some(default),
        });
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

/// Method declaration consumed by `ClassRegistry::define_class`.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: Vec<u8>,
    pub visibility: Visibility,
    pub signature: MethodSignature,
    pub handler: Option<NativeHandler>,
}

impl MethodDecl {
    pub fn native(name: &[u8], signature: MethodSignature, handler: NativeHandler) -> Self {
        Self {
            name: name.to_vec(),
            visibility: Visibility::Public,
            signature,
            handler: Some(handler),
        }
    }

    /// Declare a body-less stub. Invoking it without a concrete override is a
    /// fatal error at call time, never at registration time.
    pub fn abstract_stub(name: &[u8], signature: MethodSignature) -> Self {
        Self {
            name: name.to_vec(),
            visibility: Visibility::Public,
            signature,
            handler: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Registered method resolved against a class, carrying its declaring class
/// for visibility checks and private-attribute scoping.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub name: Symbol,
    pub declaring_class: Symbol,
    pub visibility: Visibility,
    pub signature: MethodSignature,
    pub handler: Option<NativeHandler>,
}

impl MethodEntry {
    pub fn is_abstract(&self) -> bool {
        self.handler.is_none()
    }
}

impl ExecutionContext {
    /// Resolve and invoke a method on an instance.
    pub fn call_method(
        &mut self,
        obj: Handle,
        name: &[u8],
        args: &[Handle],
    ) -> Result<Handle, VmError> {
        let class = self.class_of(obj)?;
        let Some(entry) = self.registry.find_method(class, name) else {
            return Err(VmError::UndefinedMethod {
                class: self.symbol_string(class),
                method: String::from_utf8_lossy(name).into_owned(),
            });
        };
        self.invoke_entry(obj, &entry, args)
    }

    pub(crate) fn invoke_entry(
        &mut self,
        obj: Handle,
        entry: &MethodEntry,
        args: &[Handle],
    ) -> Result<Handle, VmError> {
        let Some(handler) = entry.handler else {
            // Interface and abstract contracts are enforced here, at the
            // first unresolved call.
            return Err(VmError::Fatal(format!(
                "Cannot call abstract method {}()",
                qualified_name(self, entry)
            )));
        };
        self.check_method_visibility(entry)?;
        let bound = bind_arguments(self, entry, obj, args)?;
        let saved = self.current_scope;
        self.current_scope = Some(entry.declaring_class);
        let result = handler(self, obj, &bound);
        self.current_scope = saved;
        result
    }
}

pub(crate) fn bind_arguments(
    ctx: &mut ExecutionContext,
    entry: &MethodEntry,
    this: Handle,
    args: &[Handle],
) -> Result<ArgList, VmError> {
    if let Some(required_class) = entry.signature.this_class {
        let actual = ctx.class_of(this)?;
        if !ctx.registry.is_subclass_of(actual, required_class) {
            return Err(VmError::TypeError {
                expected: ctx.symbol_string(required_class),
                got: ctx.symbol_string(actual),
                operation: "method receiver",
            });
        }
    }

    let params = &entry.signature.params;
    let required = params.iter().filter(|p| p.default.is_none()).count();
    if args.len() < required {
        return Err(VmError::ArgumentError(format!(
            "{}() expects at least {} arguments, {} given",
            qualified_name(ctx, entry),
            required,
            args.len()
        )));
    }
    if !entry.signature.variadic && args.len() > params.len() {
        return Err(VmError::ArgumentError(format!(
            "{}() expects at most {} arguments, {} given",
            qualified_name(ctx, entry),
            params.len(),
            args.len()
        )));
    }

    let mut bound = ArgList::new();
    for (index, spec) in params.iter().enumerate() {
        let handle = match args.get(index) {
            Some(&arg) => coerce_param(ctx, entry, index, &spec.ty, arg)?,
            // Binding is positional, so a required parameter declared after
            // an optional one can be reached with no argument left even
            // though the arity count passed.
            None => match &spec.default {
                Some(default) => ctx.arena.alloc(default.clone()),
                None => {
                    return Err(VmError::ArgumentError(format!(
                        "{}() expects parameter {} to be supplied",
                        qualified_name(ctx, entry),
                        index + 1
                    )));
                }
            },
        };
        bound.push(handle);
    }
    if entry.signature.variadic && args.len() > params.len() {
        bound.extend_from_slice(&args[params.len()..]);
    }
    Ok(bound)
}

fn coerce_param(
    ctx: &mut ExecutionContext,
    entry: &MethodEntry,
    index: usize,
    ty: &ParamType,
    arg: Handle,
) -> Result<Handle, VmError> {
    match ty {
        ParamType::Any => Ok(arg),
        ParamType::Str => {
            if matches!(ctx.arena.get(arg), Val::String(_)) {
                return Ok(arg);
            }
            let val = ctx.arena.get(arg).clone();
            match val.to_string_bytes() {
                Some(bytes) => Ok(ctx.new_str(&bytes)),
                None => Err(param_error(ctx, entry, index, "string", val.type_name())),
            }
        }
        ParamType::Int => {
            if matches!(ctx.arena.get(arg), Val::Int(_)) {
                return Ok(arg);
            }
            let val = ctx.arena.get(arg).clone();
            match val.to_int() {
                Some(i) => Ok(ctx.new_int(i)),
                None => Err(param_error(ctx, entry, index, "int", val.type_name())),
            }
        }
        ParamType::Object(expected) => {
            let type_name = ctx.arena.get(arg).type_name();
            match ctx.arena.get(arg) {
                Val::Null => Ok(arg),
                Val::Object(_) => {
                    if let Some(required) = expected {
                        let actual = ctx.class_of(arg)?;
                        if !ctx.registry.is_subclass_of(actual, *required) {
                            let expected_name = ctx.symbol_string(*required);
                            let actual_name = ctx.symbol_string(actual);
                            return Err(param_error(
                                ctx,
                                entry,
                                index,
                                &expected_name,
                                &actual_name,
                            ));
                        }
                    }
                    Ok(arg)
                }
                _ => Err(param_error(ctx, entry, index, "object", type_name)),
            }
        }
    }
}

fn param_error(
    ctx: &ExecutionContext,
    entry: &MethodEntry,
    index: usize,
    expected: &str,
    got: &str,
) -> VmError {
    VmError::ArgumentError(format!(
        "{}() expects parameter {} to be {}, {} given",
        qualified_name(ctx, entry),
        index + 1,
        expected,
        got
    ))
}

pub(crate) fn qualified_name(ctx: &ExecutionContext, entry: &MethodEntry) -> String {
    format!(
        "{}::{}",
        ctx.symbol_string(entry.declaring_class),
        ctx.symbol_string(entry.name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::registry::ClassDecl;
    use std::rc::Rc;

    fn echo_args(
        ctx: &mut ExecutionContext,
        _this: Handle,
        args: &[Handle],
    ) -> Result<Handle, VmError> {
        let mut arr = crate::core::value::ArrayData::new();
        for &a in args {
            arr.push(a);
        }
        Ok(ctx.arena.alloc(Val::Array(Rc::new(arr))))
    }

    fn context_with_probe() -> (ExecutionContext, Handle) {
        let mut ctx = ExecutionContext::new();
        let sig = MethodSignature::new()
            .param(ParamType::Str)
            .optional(ParamType::Int, Val::Int(7))
            .variadic();
        ctx.define_class(
            ClassDecl::new(b"Probe").method(MethodDecl::native(b"echo", sig, echo_args)),
        )
        .unwrap();
        let probe = ctx.registry.lookup(b"Probe").unwrap();
        let obj = ctx.instantiate(probe, &[]).unwrap();
        (ctx, obj)
    }

    fn bound_args(ctx: &ExecutionContext, result: Handle) -> Vec<Handle> {
        match ctx.arena.get(result) {
            Val::Array(arr) => arr.map.values().copied().collect(),
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn coerces_scalars_and_fills_defaults() {
        let (mut ctx, obj) = context_with_probe();
        let msg = ctx.new_int(42);
        let result = ctx.call_method(obj, b"echo", &[msg]).unwrap();
        let bound = bound_args(&ctx, result);
        assert_eq!(bound.len(), 2);
        assert_eq!(ctx.arena.get(bound[0]), &Val::String(Rc::new(b"42".to_vec())));
        assert_eq!(ctx.arena.get(bound[1]), &Val::Int(7));
    }

    #[test]
    fn variadic_tail_passes_raw_handles() {
        let (mut ctx, obj) = context_with_probe();
        let a = ctx.new_str(b"x");
        let b = ctx.new_int(1);
        let c = ctx.new_bool(true);
        let d = ctx.new_null();
        let result = ctx.call_method(obj, b"echo", &[a, b, c, d]).unwrap();
        let bound = bound_args(&ctx, result);
        assert_eq!(bound.len(), 4);
        assert_eq!(bound[2], c);
        assert_eq!(bound[3], d);
    }

    #[test]
    fn missing_required_argument_is_an_argument_error() {
        let (mut ctx, obj) = context_with_probe();
        let err = ctx.call_method(obj, b"echo", &[]).unwrap_err();
        match err {
            VmError::ArgumentError(msg) => {
                assert!(msg.contains("Probe::echo()"), "message was: {}", msg);
                assert!(msg.contains("1 arguments, 0 given"), "message was: {}", msg);
            }
            other => panic!("expected ArgumentError, got {:?}", other),
        }
    }

    #[test]
    fn uncoercible_argument_is_an_argument_error() {
        let (mut ctx, obj) = context_with_probe();
        let arr = ctx.arena.alloc(Val::Array(Rc::new(crate::core::value::ArrayData::new())));
        let err = ctx.call_method(obj, b"echo", &[arr]).unwrap_err();
        assert!(matches!(err, VmError::ArgumentError(_)));
    }

    #[test]
    fn required_parameter_after_an_optional_is_not_skipped() {
        let mut ctx = ExecutionContext::new();
        let sig = MethodSignature::new()
            .optional(ParamType::Int, Val::Int(7))
            .param(ParamType::Str);
        ctx.define_class(
            ClassDecl::new(b"Probe").method(MethodDecl::native(b"echo", sig, echo_args)),
        )
        .unwrap();
        let probe = ctx.registry.lookup(b"Probe").unwrap();
        let obj = ctx.instantiate(probe, &[]).unwrap();
        let first = ctx.new_int(1);
        let err = ctx.call_method(obj, b"echo", &[first]).unwrap_err();
        match err {
            VmError::ArgumentError(msg) => {
                assert!(msg.contains("parameter 2"), "message was: {}", msg);
            }
            other => panic!("expected ArgumentError, got {:?}", other),
        }
    }

    #[test]
    fn method_lookup_is_case_insensitive() {
        let (mut ctx, obj) = context_with_probe();
        let msg = ctx.new_str(b"hey");
        assert!(ctx.call_method(obj, b"ECHO", &[msg]).is_ok());
    }

    #[test]
    fn undefined_method_reports_class_and_name() {
        let (mut ctx, obj) = context_with_probe();
        let err = ctx.call_method(obj, b"missing", &[]).unwrap_err();
        assert_eq!(
            err,
            VmError::UndefinedMethod {
                class: "Probe".to_string(),
                method: "missing".to_string(),
            }
        );
    }
}
