//! Class registry: immutable class descriptors and inheritance queries.
//!
//! One registry exists per execution context. It is populated during the
//! bootstrap phase (extension `class_init` hooks plus any host registrations)
//! and treated as read-only once program code runs. Inheritance is a chain
//! traversal over shared descriptors, never a copy.
//!
//! Name policy: class and method lookup is ASCII case-insensitive, the
//! registered spelling is preserved for display. Property names are
//! case-sensitive.

use crate::core::interner::Interner;
use crate::core::value::{Symbol, Visibility};
use crate::runtime::context::ExecutionContext;
use crate::runtime::error::VmError;
use crate::runtime::method::{MethodDecl, MethodEntry};
use crate::runtime::property::{GetterFn, PropertyDecl, PropertyEntry, SetterFn};
use indexmap::IndexMap;
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

/// Produces the extra per-instance state some builtin classes need (exception
/// tracebacks, reflection targets). Runs before the constructor.
pub type InstanceFactory = fn(&mut ExecutionContext) -> Rc<dyn Any>;

/// Immutable class descriptor.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: Symbol,
    pub parent: Option<Symbol>,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub interfaces: Vec<Symbol>,
    /// Keyed by ASCII-lowercased method name.
    pub methods: HashMap<Vec<u8>, MethodEntry>,
    pub properties: IndexMap<Symbol, PropertyEntry>,
    pub instance_factory: Option<InstanceFactory>,
}

/// Class declaration consumed by `define_class`.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Vec<u8>,
    pub parent: Option<Symbol>,
    pub interfaces: Vec<Symbol>,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub methods: Vec<MethodDecl>,
    pub properties: Vec<PropertyDecl>,
    pub instance_factory: Option<InstanceFactory>,
}

impl ClassDecl {
    pub fn new(name: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            parent: None,
            interfaces: Vec::new(),
            is_interface: false,
            is_abstract: false,
            methods: Vec::new(),
            properties: Vec::new(),
            instance_factory: None,
        }
    }

    pub fn extends(mut self, parent: Symbol) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn implements(mut self, interface: Symbol) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self.is_abstract = true;
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn method(mut self, decl: MethodDecl) -> Self {
        self.methods.push(decl);
        self
    }

    pub fn property(mut self, name: &[u8], visibility: Visibility) -> Self {
        self.properties.push(PropertyDecl {
            name: name.to_vec(),
            entry: PropertyEntry::Stored { visibility },
        });
        self
    }

    pub fn getter_setter(
        mut self,
        name: &[u8],
        visibility: Visibility,
        getter: GetterFn,
        setter: Option<SetterFn>,
    ) -> Self {
        self.properties.push(PropertyDecl {
            name: name.to_vec(),
            entry: PropertyEntry::GetterSetter {
                visibility,
                getter,
                setter,
            },
        });
        self
    }

    pub fn instance_factory(mut self, factory: InstanceFactory) -> Self {
        self.instance_factory = Some(factory);
        self
    }
}

#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<Symbol, ClassDef>,
    /// ASCII-lowercased name -> display symbol.
    by_name: HashMap<Vec<u8>, Symbol>,
}

fn fold(name: &[u8]) -> Vec<u8> {
    name.to_ascii_lowercase()
}

fn display_name(interner: &Interner, sym: Symbol) -> String {
    String::from_utf8_lossy(interner.lookup(sym).unwrap_or(b"?")).into_owned()
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class. Fails on a duplicate name (case-insensitive) or an
    /// unregistered parent/interface reference. Interface conformance of the
    /// class body is deliberately NOT checked here; an unimplemented stub
    /// only fails when first called.
    pub fn define_class(
        &mut self,
        interner: &mut Interner,
        decl: ClassDecl,
    ) -> Result<Symbol, VmError> {
        let folded = fold(&decl.name);
        if self.by_name.contains_key(&folded) {
            return Err(VmError::Fatal(format!(
                "Cannot redeclare class {}",
                String::from_utf8_lossy(&decl.name)
            )));
        }
        if let Some(parent) = decl.parent {
            if !self.classes.contains_key(&parent) {
                return Err(VmError::UndefinedClass {
                    name: display_name(interner, parent),
                });
            }
        }
        for &interface in &decl.interfaces {
            if !self.classes.contains_key(&interface) {
                return Err(VmError::UndefinedClass {
                    name: display_name(interner, interface),
                });
            }
        }

        let class_sym = interner.intern(&decl.name);
        let mut methods = HashMap::new();
        for m in decl.methods {
            let key = fold(&m.name);
            let name_sym = interner.intern(&m.name);
            methods.insert(
                key,
                MethodEntry {
                    name: name_sym,
                    declaring_class: class_sym,
                    visibility: m.visibility,
                    signature: m.signature,
                    handler: m.handler,
                },
            );
        }
        let mut properties = IndexMap::new();
        for p in decl.properties {
            let name_sym = interner.intern(&p.name);
            properties.insert(name_sym, p.entry);
        }

        self.by_name.insert(folded, class_sym);
        self.classes.insert(
            class_sym,
            ClassDef {
                name: class_sym,
                parent: decl.parent,
                is_interface: decl.is_interface,
                is_abstract: decl.is_abstract,
                interfaces: decl.interfaces,
                methods,
                properties,
                instance_factory: decl.instance_factory,
            },
        );
        Ok(class_sym)
    }

    /// Resolve a class or interface name, case-insensitively.
    pub fn lookup(&self, name: &[u8]) -> Option<Symbol> {
        self.by_name.get(&fold(name)).copied()
    }

    pub fn get(&self, class: Symbol) -> Option<&ClassDef> {
        self.classes.get(&class)
    }

    pub fn contains(&self, class: Symbol) -> bool {
        self.classes.contains_key(&class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// `instanceof`-style check: reflexive, covers the parent chain and all
    /// transitively implemented interfaces. Used for receiver typing,
    /// exception-chain validation and catch matching.
    pub fn is_subclass_of(&self, child: Symbol, ancestor: Symbol) -> bool {
        if child == ancestor {
            return true;
        }
        let mut current = self.get(child).and_then(|def| def.parent);
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            current = self.get(class).and_then(|def| def.parent);
        }
        self.get_implemented_interfaces(child).contains(&ancestor)
    }

    /// All interfaces implemented by a class or any of its ancestors,
    /// including interfaces extended by those interfaces.
    pub fn get_implemented_interfaces(&self, class: Symbol) -> Vec<Symbol> {
        let mut out = Vec::new();
        let mut current = Some(class);
        while let Some(c) = current {
            let Some(def) = self.get(c) else { break };
            for &interface in &def.interfaces {
                self.collect_interface(interface, &mut out);
            }
            current = def.parent;
        }
        out
    }

    fn collect_interface(&self, interface: Symbol, out: &mut Vec<Symbol>) {
        if out.contains(&interface) {
            return;
        }
        out.push(interface);
        if let Some(def) = self.get(interface) {
            for &extended in &def.interfaces {
                self.collect_interface(extended, out);
            }
        }
    }

    /// Find a method by walking the class chain, then implemented interfaces.
    /// Returns a clone so dispatch can proceed while the context is mutated.
    pub fn find_method(&self, class: Symbol, name: &[u8]) -> Option<MethodEntry> {
        let key = fold(name);
        let mut current = Some(class);
        while let Some(c) = current {
            let def = self.get(c)?;
            if let Some(entry) = def.methods.get(&key) {
                return Some(entry.clone());
            }
            current = def.parent;
        }
        for interface in self.get_implemented_interfaces(class) {
            if let Some(def) = self.get(interface) {
                if let Some(entry) = def.methods.get(&key) {
                    return Some(entry.clone());
                }
            }
        }
        None
    }

    /// Find a property descriptor and its declaring class along the chain.
    pub fn find_property(
        &self,
        class: Symbol,
        name: Symbol,
    ) -> Option<(PropertyEntry, Symbol)> {
        let mut current = Some(class);
        while let Some(c) = current {
            let def = self.get(c)?;
            if let Some(entry) = def.properties.get(&name) {
                return Some((*entry, c));
            }
            current = def.parent;
        }
        None
    }

    /// First instance factory found walking up the chain, so subclasses of
    /// Exception inherit its traceback capture without restating it.
    pub fn resolve_instance_factory(&self, class: Symbol) -> Option<InstanceFactory> {
        let mut current = Some(class);
        while let Some(c) = current {
            let def = self.get(c)?;
            if let Some(factory) = def.instance_factory {
                return Some(factory);
            }
            current = def.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::method::MethodSignature;

    fn registry_with_chain() -> (ClassRegistry, Interner, Symbol, Symbol, Symbol) {
        let mut registry = ClassRegistry::new();
        let mut interner = Interner::new();
        let grandparent = registry
            .define_class(&mut interner, ClassDecl::new(b"GrandParent"))
            .unwrap();
        let parent = registry
            .define_class(&mut interner, ClassDecl::new(b"ParentClass").extends(grandparent))
            .unwrap();
        let child = registry
            .define_class(&mut interner, ClassDecl::new(b"ChildClass").extends(parent))
            .unwrap();
        (registry, interner, grandparent, parent, child)
    }

    #[test]
    fn subclass_walks_parent_chain() {
        let (registry, _, grandparent, parent, child) = registry_with_chain();
        assert!(registry.is_subclass_of(child, grandparent));
        assert!(registry.is_subclass_of(child, child));
        assert!(!registry.is_subclass_of(parent, child));
    }

    #[test]
    fn duplicate_definition_is_fatal() {
        let (mut registry, mut interner, ..) = registry_with_chain();
        let err = registry
            .define_class(&mut interner, ClassDecl::new(b"childclass"))
            .unwrap_err();
        assert!(matches!(err, VmError::Fatal(_)));
    }

    #[test]
    fn lookup_is_case_insensitive_and_case_preserving() {
        let (registry, interner, .., child) = registry_with_chain();
        assert_eq!(registry.lookup(b"CHILDCLASS"), Some(child));
        assert_eq!(
            interner.lookup(child),
            Some(b"ChildClass".as_slice())
        );
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut registry = ClassRegistry::new();
        let mut interner = Interner::new();
        let ghost = interner.intern(b"Ghost");
        let err = registry
            .define_class(&mut interner, ClassDecl::new(b"Orphan").extends(ghost))
            .unwrap_err();
        assert_eq!(
            err,
            VmError::UndefinedClass {
                name: "Ghost".to_string()
            }
        );
    }

    #[test]
    fn interface_methods_resolve_through_implements() {
        let mut registry = ClassRegistry::new();
        let mut interner = Interner::new();
        let walker = registry
            .define_class(
                &mut interner,
                ClassDecl::new(b"Walker")
                    .interface()
                    .method(MethodDecl::abstract_stub(b"step", MethodSignature::new())),
            )
            .unwrap();
        let runner = registry
            .define_class(
                &mut interner,
                ClassDecl::new(b"Runner").interface().implements(walker).method(
                    MethodDecl::abstract_stub(b"sprint", MethodSignature::new()),
                ),
            )
            .unwrap();
        let athlete = registry
            .define_class(&mut interner, ClassDecl::new(b"Athlete").implements(runner))
            .unwrap();

        assert!(registry.is_subclass_of(athlete, walker));
        let step = registry.find_method(athlete, b"step").unwrap();
        assert!(step.is_abstract());
        assert_eq!(step.declaring_class, walker);
    }
}
