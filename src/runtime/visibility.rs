//! Visibility checking for class members.
//!
//! Public: accessible anywhere. Protected: accessible from the declaring
//! class and its descendants. Private: accessible only from methods of the
//! declaring class itself. The caller scope is the declaring class of the
//! native method currently executing, or None outside any method.

use crate::core::value::{Symbol, Visibility};
use crate::runtime::context::ExecutionContext;
use crate::runtime::error::VmError;
use crate::runtime::method::MethodEntry;

impl ExecutionContext {
    pub fn is_visible_from(
        &self,
        defining_class: Symbol,
        visibility: Visibility,
        caller_scope: Option<Symbol>,
    ) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Protected => caller_scope
                .map(|scope| self.registry.is_subclass_of(scope, defining_class))
                .unwrap_or(false),
            Visibility::Private => Some(defining_class) == caller_scope,
        }
    }

    pub(crate) fn check_property_visibility(
        &self,
        defining_class: Symbol,
        visibility: Visibility,
        name: Symbol,
    ) -> Result<(), VmError> {
        if self.is_visible_from(defining_class, visibility, self.current_scope) {
            Ok(())
        } else {
            Err(VmError::AccessError(format!(
                "Cannot access {} property {}::${}",
                visibility.as_str(),
                self.symbol_string(defining_class),
                self.symbol_string(name)
            )))
        }
    }

    pub(crate) fn check_method_visibility(&self, entry: &MethodEntry) -> Result<(), VmError> {
        if self.is_visible_from(entry.declaring_class, entry.visibility, self.current_scope) {
            return Ok(());
        }
        let scope = match self.current_scope {
            Some(class) => format!("scope {}", self.symbol_string(class)),
            None => "global scope".to_string(),
        };
        Err(VmError::AccessError(format!(
            "Call to {} method {}::{}() from {}",
            entry.visibility.as_str(),
            self.symbol_string(entry.declaring_class),
            self.symbol_string(entry.name),
            scope
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_is_visible_from_anywhere() {
        let ctx = ExecutionContext::new();
        let class = Symbol(1);
        assert!(ctx.is_visible_from(class, Visibility::Public, None));
        assert!(ctx.is_visible_from(class, Visibility::Public, Some(Symbol(99))));
    }

    #[test]
    fn protected_requires_descendant_scope() {
        let ctx = ExecutionContext::new();
        let exception = ctx.registry.lookup(b"Exception").unwrap();
        let runtime_exception = ctx.registry.lookup(b"RuntimeException").unwrap();
        let std_class = ctx.registry.lookup(b"stdClass").unwrap();
        assert!(ctx.is_visible_from(exception, Visibility::Protected, Some(exception)));
        assert!(ctx.is_visible_from(exception, Visibility::Protected, Some(runtime_exception)));
        assert!(!ctx.is_visible_from(exception, Visibility::Protected, Some(std_class)));
        assert!(!ctx.is_visible_from(exception, Visibility::Protected, None));
    }

    #[test]
    fn private_requires_exact_declaring_scope() {
        let ctx = ExecutionContext::new();
        let exception = ctx.registry.lookup(b"Exception").unwrap();
        let runtime_exception = ctx.registry.lookup(b"RuntimeException").unwrap();
        assert!(ctx.is_visible_from(exception, Visibility::Private, Some(exception)));
        assert!(!ctx.is_visible_from(exception, Visibility::Private, Some(runtime_exception)));
        assert!(!ctx.is_visible_from(exception, Visibility::Private, None));
    }
}
