//! The Exception class hierarchy.
//!
//! An exception snapshots the call stack once, in its instance factory, so
//! the traceback always describes the creation site regardless of where the
//! object is later thrown from or rethrown. `file` and `line` are derived
//! from the innermost captured frame. The causal chain (`previous`) holds the
//! exact object passed in, validated to be an Exception descendant.

use crate::core::interner::Interner;
use crate::core::value::{ArrayData, ArrayKey, Handle, Val, Visibility};
use crate::runtime::context::ExecutionContext;
use crate::runtime::error::VmError;
use crate::runtime::method::{MethodDecl, MethodSignature, ParamType};
use crate::runtime::registry::{ClassDecl, ClassRegistry};
use crate::runtime::trace::{render_trace, Frame};
use std::any::Any;
use std::rc::Rc;

/// Per-instance exception state, captured before the constructor runs.
pub struct ExceptionData {
    pub traceback: Vec<Frame>,
}

fn exception_factory(ctx: &mut ExecutionContext) -> Rc<dyn Any> {
    Rc::new(ExceptionData {
        traceback: ctx.snapshot_call_stack(),
    })
}

fn wrong_parameters() -> VmError {
    VmError::Fatal(
        "Wrong parameters for Exception([string $exception [, long $code [, Exception $previous = NULL]]])"
            .to_string(),
    )
}

fn exception_payload(
    ctx: &ExecutionContext,
    this: Handle,
) -> Result<Rc<ExceptionData>, VmError> {
    ctx.instance_payload::<ExceptionData>(this)
        .ok_or_else(|| VmError::Fatal("Internal error: exception object has no trace state".to_string()))
}

fn string_lossy(ctx: &ExecutionContext, handle: Handle) -> String {
    ctx.string_of(handle)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn exception_construct(
    ctx: &mut ExecutionContext,
    this: Handle,
    args: &[Handle],
) -> Result<Handle, VmError> {
    ctx.set_attr(this, b"message", args[0])?;
    ctx.set_attr(this, b"code", args[1])?;

    match ctx.arena.get(args[2]) {
        Val::Null => {}
        Val::Object(_) => {
            let class = ctx.class_of(args[2])?;
            let is_exception = ctx
                .registry
                .lookup(b"Exception")
                .map(|base| ctx.registry.is_subclass_of(class, base))
                .unwrap_or(false);
            if !is_exception {
                return Err(wrong_parameters());
            }
            ctx.set_attr(this, b"previous", args[2])?;
        }
        _ => return Err(wrong_parameters()),
    }

    let (file, line) = match exception_payload(ctx, this)?.traceback.first() {
        Some(frame) => (frame.file.clone(), frame.line),
        None => (String::new(), 0),
    };
    let file_h = ctx.new_str(file.as_bytes());
    ctx.set_attr(this, b"file", file_h)?;
    let line_h = ctx.new_int(line);
    ctx.set_attr(this, b"line", line_h)?;
    Ok(ctx.new_null())
}

fn exception_get_message(
    ctx: &mut ExecutionContext,
    this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    ctx.get_attr(this, b"message")
}

fn exception_get_code(
    ctx: &mut ExecutionContext,
    this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    ctx.get_attr(this, b"code")
}

fn exception_get_file(
    ctx: &mut ExecutionContext,
    this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    ctx.get_attr(this, b"file")
}

fn exception_get_line(
    ctx: &mut ExecutionContext,
    this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    ctx.get_attr(this, b"line")
}

fn exception_get_previous(
    ctx: &mut ExecutionContext,
    this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    ctx.get_attr(this, b"previous")
}

/// getTrace: one array per frame, innermost first, with `file`, `line` and
/// `function` entries.
fn exception_get_trace(
    ctx: &mut ExecutionContext,
    this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    let payload = exception_payload(ctx, this)?;
    let mut outer = ArrayData::new();
    for frame in &payload.traceback {
        let mut entry = ArrayData::new();
        let file = ctx.new_str(frame.file.as_bytes());
        entry.insert(ArrayKey::Str(Rc::new(b"file".to_vec())), file);
        let line = ctx.new_int(frame.line);
        entry.insert(ArrayKey::Str(Rc::new(b"line".to_vec())), line);
        let function = ctx.new_str(frame.function.as_bytes());
        entry.insert(ArrayKey::Str(Rc::new(b"function".to_vec())), function);
        let entry_h = ctx.arena.alloc(Val::Array(Rc::new(entry)));
        outer.push(entry_h);
    }
    Ok(ctx.arena.alloc(Val::Array(Rc::new(outer))))
}

fn exception_get_trace_as_string(
    ctx: &mut ExecutionContext,
    this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    let payload = exception_payload(ctx, this)?;
    let rendered = render_trace(&payload.traceback);
    Ok(ctx.new_str(rendered.as_bytes()))
}

fn exception_to_string(
    ctx: &mut ExecutionContext,
    this: Handle,
    _args: &[Handle],
) -> Result<Handle, VmError> {
    let class = ctx.class_of(this)?;
    let class_name = ctx.symbol_string(class);
    let message_h = ctx.get_attr(this, b"message")?;
    let message = string_lossy(ctx, message_h);
    let file_h = ctx.get_attr(this, b"file")?;
    let file = string_lossy(ctx, file_h);
    let line_h = ctx.get_attr(this, b"line")?;
    let line = ctx.int_of(line_h).unwrap_or(0);
    let payload = exception_payload(ctx, this)?;

    let mut out = format!(
        "exception '{}' with message '{}' in {}:{}",
        class_name, message, file, line
    );
    out.push_str("\nStack trace");
    let trace = render_trace(&payload.traceback);
    if !trace.is_empty() {
        out.push('\n');
        out.push_str(&trace);
    }
    Ok(ctx.new_str(out.as_bytes()))
}

pub fn register(registry: &mut ClassRegistry, interner: &mut Interner) -> Result<(), VmError> {
    let exception = interner.intern(b"Exception");
    let this = || MethodSignature::new().receiver(exception);

    let decl = ClassDecl::new(b"Exception")
        .instance_factory(exception_factory)
        .property(b"message", Visibility::Protected)
        .property(b"code", Visibility::Protected)
        .property(b"file", Visibility::Protected)
        .property(b"line", Visibility::Protected)
        .property(b"previous", Visibility::Private)
        .method(MethodDecl::native(
            b"__construct",
            this()
                .optional(ParamType::Str, Val::String(Rc::new(Vec::new())))
                .optional(ParamType::Int, Val::Int(0))
                .optional(ParamType::Any, Val::Null),
            exception_construct,
        ))
        .method(MethodDecl::native(b"getMessage", this(), exception_get_message))
        .method(MethodDecl::native(b"getCode", this(), exception_get_code))
        .method(MethodDecl::native(b"getFile", this(), exception_get_file))
        .method(MethodDecl::native(b"getLine", this(), exception_get_line))
        .method(MethodDecl::native(b"getPrevious", this(), exception_get_previous))
        .method(MethodDecl::native(b"getTrace", this(), exception_get_trace))
        .method(MethodDecl::native(
            b"getTraceAsString",
            this(),
            exception_get_trace_as_string,
        ))
        .method(MethodDecl::native(b"__toString", this(), exception_to_string));
    let base = registry.define_class(interner, decl)?;

    // Every seeded subclass is a direct, empty child of Exception; the
    // hierarchy exists only for catch discrimination.
    for name in [
        b"RuntimeException".as_slice(),
        b"LogicException",
        b"DomainException",
        b"OutOfBoundsException",
    ] {
        registry.define_class(interner, ClassDecl::new(name).extends(base))?;
    }
    Ok(())
}
