/// Errors raised by class registration, attribute access and method dispatch.
///
/// Every variant is terminal from the interpreter's point of view: nothing in
/// this crate retries or recovers. The host decides whether a `VmError` aborts
/// the process or is reported; catchable language-level exceptions are object
/// instances (`builtins::exception`), never values of this type.
#[derive(Debug, Clone, PartialEq)]
pub enum VmError {
    /// Unrecoverable interpreter failure (redeclaration, abstract-method call,
    /// broken reflection target, malformed exception constructor arguments).
    Fatal(String),
    /// Arity or coercion failure while binding native-method arguments.
    ArgumentError(String),
    /// Receiver or value of the wrong runtime kind.
    TypeError {
        expected: String,
        got: String,
        operation: &'static str,
    },
    /// Class name that resolves to nothing.
    UndefinedClass { name: String },
    /// Method name that resolves to nothing along the inheritance chain.
    UndefinedMethod { class: String, method: String },
    /// Write to a getter-only virtual property.
    ImmutableProperty { class: String, property: String },
    /// Visibility violation on a property or method.
    AccessError(String),
}

impl std::fmt::Display for VmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmError::Fatal(msg) => write!(f, "{}", msg),
            VmError::ArgumentError(msg) => write!(f, "{}", msg),
            VmError::TypeError {
                expected,
                got,
                operation,
            } => {
                write!(
                    f,
                    "Type error in {}: expected {}, got {}",
                    operation, expected, got
                )
            }
            VmError::UndefinedClass { name } => write!(f, "Class '{}' not found", name),
            VmError::UndefinedMethod { class, method } => {
                write!(f, "Call to undefined method {}::{}()", class, method)
            }
            VmError::ImmutableProperty { class, property } => {
                write!(f, "Cannot modify immutable property {}::${}", class, property)
            }
            VmError::AccessError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for VmError {}
