//! Instance creation and visibility-checked attribute access.
//!
//! Attribute storage is keyed by (name, declaring class for private slots),
//! so a private attribute on a parent never collides with a same-named slot
//! declared lower in the hierarchy.

use crate::core::value::{AttrKey, Handle, ObjectData, Symbol, Val, Visibility};
use crate::runtime::context::ExecutionContext;
use crate::runtime::error::VmError;
use crate::runtime::property::PropertyEntry;
use std::rc::Rc;

fn attr_key(name: Symbol, visibility: Visibility, declaring: Symbol) -> AttrKey {
    match visibility {
        Visibility::Private => (name, Some(declaring)),
        _ => (name, None),
    }
}

impl ExecutionContext {
    pub(crate) fn payload_handle(&self, obj: Handle) -> Result<Handle, VmError> {
        match self.arena.get(obj) {
            Val::Object(payload) => Ok(*payload),
            other => Err(VmError::TypeError {
                expected: "object".to_string(),
                got: other.type_name().to_string(),
                operation: "object access",
            }),
        }
    }

    pub fn obj_data(&self, obj: Handle) -> Result<&ObjectData, VmError> {
        let payload = self.payload_handle(obj)?;
        match self.arena.get(payload) {
            Val::ObjPayload(data) => Ok(data),
            other => Err(VmError::TypeError {
                expected: "object payload".to_string(),
                got: other.type_name().to_string(),
                operation: "object access",
            }),
        }
    }

    pub fn class_of(&self, obj: Handle) -> Result<Symbol, VmError> {
        Ok(self.obj_data(obj)?.class)
    }

    /// Extra per-instance state installed by the class's instance factory.
    pub fn instance_payload<T: 'static>(&self, obj: Handle) -> Option<Rc<T>> {
        let data = self.obj_data(obj).ok()?;
        let internal = data.internal.clone()?;
        internal.downcast::<T>().ok()
    }

    /// Construct a new instance of a registered class: reject abstract and
    /// interface targets, run the inherited instance factory, then the
    /// constructor if one resolves. A class without a constructor ignores
    /// its arguments.
    pub fn instantiate(&mut self, class: Symbol, args: &[Handle]) -> Result<Handle, VmError> {
        let (is_interface, is_abstract) = match self.registry.get(class) {
            Some(def) => (def.is_interface, def.is_abstract),
            None => {
                return Err(VmError::UndefinedClass {
                    name: self.symbol_string(class),
                });
            }
        };
        if is_interface {
            return Err(VmError::Fatal(format!(
                "Cannot instantiate interface {}",
                self.symbol_string(class)
            )));
        }
        if is_abstract {
            return Err(VmError::Fatal(format!(
                "Cannot instantiate abstract class {}",
                self.symbol_string(class)
            )));
        }

        let internal = self
            .registry
            .resolve_instance_factory(class)
            .map(|factory| factory(self));
        let mut data = ObjectData::new(class);
        data.internal = internal;
        let payload = self.arena.alloc(Val::ObjPayload(data));
        let obj = self.arena.alloc(Val::Object(payload));

        if let Some(constructor) = self.registry.find_method(class, b"__construct") {
            self.invoke_entry(obj, &constructor, args)?;
        }
        Ok(obj)
    }

    /// Name-based construction, the path ReflectionClass rides on.
    pub fn instantiate_by_name(
        &mut self,
        name: &[u8],
        args: &[Handle],
    ) -> Result<Handle, VmError> {
        let Some(class) = self.registry.lookup(name) else {
            return Err(VmError::UndefinedClass {
                name: String::from_utf8_lossy(name).into_owned(),
            });
        };
        self.instantiate(class, args)
    }

    /// Visibility-checked attribute read. A declared-but-unset attribute and
    /// an undeclared attribute both read as null.
    pub fn get_attr(&mut self, obj: Handle, name: &[u8]) -> Result<Handle, VmError> {
        let class = self.class_of(obj)?;
        let name_sym = self.interner.intern(name);
        match self.registry.find_property(class, name_sym) {
            Some((PropertyEntry::GetterSetter { visibility, getter, .. }, declaring)) => {
                self.check_property_visibility(declaring, visibility, name_sym)?;
                getter(self, obj)
            }
            Some((PropertyEntry::Stored { visibility }, declaring)) => {
                self.check_property_visibility(declaring, visibility, name_sym)?;
                let key = attr_key(name_sym, visibility, declaring);
                self.read_slot(obj, key)
            }
            None => self.read_slot(obj, (name_sym, None)),
        }
    }

    /// Visibility-checked attribute write.
    pub fn set_attr(
        &mut self,
        obj: Handle,
        name: &[u8],
        value: Handle,
    ) -> Result<(), VmError> {
        let class = self.class_of(obj)?;
        let name_sym = self.interner.intern(name);
        match self.registry.find_property(class, name_sym) {
            Some((PropertyEntry::GetterSetter { visibility, setter, .. }, declaring)) => {
                self.check_property_visibility(declaring, visibility, name_sym)?;
                match setter {
                    Some(setter) => setter(self, obj, value),
                    None => Err(VmError::ImmutableProperty {
                        class: self.symbol_string(declaring),
                        property: self.symbol_string(name_sym),
                    }),
                }
            }
            Some((PropertyEntry::Stored { visibility }, declaring)) => {
                self.check_property_visibility(declaring, visibility, name_sym)?;
                let key = attr_key(name_sym, visibility, declaring);
                self.write_slot(obj, key, value)
            }
            None => self.write_slot(obj, (name_sym, None), value),
        }
    }

    fn read_slot(&mut self, obj: Handle, key: AttrKey) -> Result<Handle, VmError> {
        let existing = self.obj_data(obj)?.properties.get(&key).copied();
        match existing {
            Some(handle) => Ok(handle),
            None => Ok(self.arena.alloc(Val::Null)),
        }
    }

    fn write_slot(&mut self, obj: Handle, key: AttrKey, value: Handle) -> Result<(), VmError> {
        let payload = self.payload_handle(obj)?;
        if let Val::ObjPayload(data) = self.arena.get_mut(payload) {
            data.properties.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::registry::ClassDecl;

    #[test]
    fn dynamic_attributes_default_to_null() {
        let mut ctx = ExecutionContext::new();
        let obj = ctx.instantiate_by_name(b"stdClass", &[]).unwrap();
        let unset = ctx.get_attr(obj, b"missing").unwrap();
        assert_eq!(ctx.arena.get(unset), &Val::Null);

        let value = ctx.new_int(9);
        ctx.set_attr(obj, b"missing", value).unwrap();
        assert_eq!(ctx.get_attr(obj, b"missing").unwrap(), value);
    }

    #[test]
    fn instantiating_an_interface_is_fatal() {
        let mut ctx = ExecutionContext::new();
        let iterator = ctx.registry.lookup(b"Iterator").unwrap();
        let err = ctx.instantiate(iterator, &[]).unwrap_err();
        assert_eq!(
            err,
            VmError::Fatal("Cannot instantiate interface Iterator".to_string())
        );
    }

    #[test]
    fn instantiating_an_abstract_class_is_fatal() {
        let mut ctx = ExecutionContext::new();
        ctx.define_class(ClassDecl::new(b"Shape").abstract_class())
            .unwrap();
        let err = ctx.instantiate_by_name(b"Shape", &[]).unwrap_err();
        assert_eq!(
            err,
            VmError::Fatal("Cannot instantiate abstract class Shape".to_string())
        );
    }

    #[test]
    fn unknown_class_reports_its_name() {
        let mut ctx = ExecutionContext::new();
        let err = ctx.instantiate_by_name(b"NoSuchClass", &[]).unwrap_err();
        assert_eq!(
            err,
            VmError::UndefinedClass {
                name: "NoSuchClass".to_string()
            }
        );
    }
}
