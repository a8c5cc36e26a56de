//! Extension interface: the unit of class registration at bootstrap.

use crate::core::interner::Interner;
use crate::runtime::registry::ClassRegistry;

#[derive(Debug, Clone, Copy)]
pub struct ExtensionInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Names of extensions that must be initialized before this one.
    pub dependencies: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionResult {
    Success,
    Failure(String),
}

impl ExtensionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtensionResult::Success)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

/// An extension contributes classes to the registry during bootstrap.
/// `class_init` runs exactly once per context, after all dependencies have
/// initialized successfully.
pub trait Extension {
    fn info(&self) -> ExtensionInfo;

    fn class_init(&self, registry: &mut ClassRegistry, interner: &mut Interner) -> ExtensionResult;
}
