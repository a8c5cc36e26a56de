//! Builtin class and object model for a PHP-style interpreter.
//!
//! Native class registration with inheritance, interfaces and visibility,
//! call-time abstract-method enforcement, the Exception hierarchy with
//! traceback capture and causal chaining, and ReflectionClass for name-based
//! construction. Parsing, bytecode execution and memory reclamation are the
//! embedding interpreter's concern.

pub mod builtins;
pub mod core;
pub mod runtime;
