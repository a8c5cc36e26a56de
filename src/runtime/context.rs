//! Execution context: the per-interpreter state this subsystem runs against.
//!
//! Each context owns its arena, interner and class registry; two contexts
//! share nothing, which is what makes embedding several interpreters side by
//! side safe. The registry is populated once, during `ContextBuilder::build`
//! (the bootstrap phase), and treated as immutable afterwards. Everything is
//! single-threaded and synchronous; no operation suspends or retries.

use crate::core::heap::Arena;
use crate::core::interner::Interner;
use crate::core::value::{Handle, Symbol, Val};
use crate::runtime::error::VmError;
use crate::runtime::extension::{Extension, ExtensionResult};
use crate::runtime::registry::{ClassDecl, ClassRegistry};
use crate::runtime::trace::Frame;
use std::rc::Rc;

#[derive(Debug)]
pub struct ExecutionContext {
    pub arena: Arena,
    pub interner: Interner,
    pub registry: ClassRegistry,
    /// Host-maintained call stack, outermost frame first. Exceptions snapshot
    /// it at construction; nothing else reads it.
    pub call_stack: Vec<Frame>,
    /// Declaring class of the native method currently executing; governs
    /// protected/private member access.
    pub(crate) current_scope: Option<Symbol>,
    extensions: Vec<&'static str>,
}

impl ExecutionContext {
    /// Bootstrap a context with the standard builtin classes registered.
    pub fn new() -> Self {
        ContextBuilder::new()
            .with_core_extensions()
            .build()
            .expect("failed to bootstrap builtin classes")
    }

    /// Registration surface used by bootstrap code and embedders. All calls
    /// belong to the bootstrap phase, before program code runs.
    pub fn define_class(&mut self, decl: ClassDecl) -> Result<Symbol, VmError> {
        self.registry.define_class(&mut self.interner, decl)
    }

    pub fn extension_loaded(&self, name: &str) -> bool {
        self.extensions.contains(&name)
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.call_stack.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.call_stack.pop()
    }

    /// Snapshot of the call stack in capture order: innermost call first,
    /// outermost last. This is the order tracebacks are rendered in.
    pub fn snapshot_call_stack(&self) -> Vec<Frame> {
        self.call_stack.iter().rev().cloned().collect()
    }

    /// Coerce a runtime value into an ordered argument sequence, the way
    /// `ReflectionClass::newInstanceArgs` consumes its array parameter.
    pub fn value_to_arg_list(&mut self, value: Handle) -> Result<Vec<Handle>, VmError> {
        match self.arena.get(value) {
            Val::Array(arr) => Ok(arr.map.values().copied().collect()),
            Val::Null => Ok(Vec::new()),
            Val::Object(_) | Val::ObjPayload(_) => Err(VmError::ArgumentError(
                "cannot convert object to an argument list".to_string(),
            )),
            _ => Ok(vec![value]),
        }
    }

    pub fn intern(&mut self, name: &[u8]) -> Symbol {
        self.interner.intern(name)
    }

    pub fn symbol_string(&self, sym: Symbol) -> String {
        String::from_utf8_lossy(self.interner.lookup(sym).unwrap_or(b"?")).into_owned()
    }

    pub fn new_null(&mut self) -> Handle {
        self.arena.alloc(Val::Null)
    }

    pub fn new_bool(&mut self, value: bool) -> Handle {
        self.arena.alloc(Val::Bool(value))
    }

    pub fn new_int(&mut self, value: i64) -> Handle {
        self.arena.alloc(Val::Int(value))
    }

    pub fn new_str(&mut self, value: &[u8]) -> Handle {
        self.arena.alloc(Val::String(Rc::new(value.to_vec())))
    }

    pub fn string_of(&self, handle: Handle) -> Option<Vec<u8>> {
        match self.arena.get(handle) {
            Val::String(s) => Some(s.to_vec()),
            _ => None,
        }
    }

    pub fn int_of(&self, handle: Handle) -> Option<i64> {
        match self.arena.get(handle) {
            Val::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder assembling a context from extensions, mirroring the engine-level
/// module-init pass: each extension registers its classes exactly once, with
/// duplicate and dependency checks up front.
pub struct ContextBuilder {
    extensions: Vec<Box<dyn Extension>>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    pub fn with_extension<E: Extension + 'static>(mut self, extension: E) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Standard builtins: core classes (stdClass, the Exception hierarchy,
    /// ReflectionClass) and the SPL interface family.
    pub fn with_core_extensions(self) -> Self {
        self.with_extension(crate::runtime::core_extension::CoreExtension)
            .with_extension(crate::runtime::spl_extension::SplExtension)
    }

    pub fn build(self) -> Result<ExecutionContext, String> {
        let mut interner = Interner::new();
        let mut registry = ClassRegistry::new();
        let mut loaded: Vec<&'static str> = Vec::new();

        for extension in &self.extensions {
            let info = extension.info();
            if loaded.contains(&info.name) {
                return Err(format!("Extension '{}' is already registered", info.name));
            }
            for &dep in info.dependencies {
                if !loaded.contains(&dep) {
                    return Err(format!(
                        "Extension '{}' depends on '{}' which is not loaded",
                        info.name, dep
                    ));
                }
            }
            match extension.class_init(&mut registry, &mut interner) {
                ExtensionResult::Success => loaded.push(info.name),
                ExtensionResult::Failure(msg) => {
                    return Err(format!(
                        "Extension '{}' failed to initialize: {}",
                        info.name, msg
                    ));
                }
            }
        }

        Ok(ExecutionContext {
            arena: Arena::new(),
            interner,
            registry,
            call_stack: Vec::new(),
            current_scope: None,
            extensions: loaded,
        })
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
