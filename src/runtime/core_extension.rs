//! Core extension: stdClass, the Exception hierarchy and ReflectionClass.

use crate::core::interner::Interner;
use crate::runtime::extension::{Extension, ExtensionInfo, ExtensionResult};
use crate::runtime::registry::ClassRegistry;

pub struct CoreExtension;

impl Extension for CoreExtension {
    fn info(&self) -> ExtensionInfo {
        ExtensionInfo {
            name: "Core",
            version: "8.2.0",
            dependencies: &[],
        }
    }

    fn class_init(&self, registry: &mut ClassRegistry, interner: &mut Interner) -> ExtensionResult {
        if let Err(err) = crate::builtins::class::register(registry, interner) {
            return ExtensionResult::Failure(err.to_string());
        }
        if let Err(err) = crate::builtins::exception::register(registry, interner) {
            return ExtensionResult::Failure(err.to_string());
        }
        if let Err(err) = crate::builtins::reflection::register(registry, interner) {
            return ExtensionResult::Failure(err.to_string());
        }
        ExtensionResult::Success
    }
}
