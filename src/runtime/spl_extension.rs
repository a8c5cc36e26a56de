//! SPL extension: the standard iterator and counting interfaces.

use crate::core::interner::Interner;
use crate::runtime::extension::{Extension, ExtensionInfo, ExtensionResult};
use crate::runtime::registry::ClassRegistry;

pub struct SplExtension;

impl Extension for SplExtension {
    fn info(&self) -> ExtensionInfo {
        ExtensionInfo {
            name: "SPL",
            version: "8.2.0",
            dependencies: &["Core"],
        }
    }

    fn class_init(&self, registry: &mut ClassRegistry, interner: &mut Interner) -> ExtensionResult {
        match crate::builtins::spl::register(registry, interner) {
            Ok(()) => ExtensionResult::Success,
            Err(err) => ExtensionResult::Failure(err.to_string()),
        }
    }
}
