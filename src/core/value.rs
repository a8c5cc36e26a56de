use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Index into the `Arena`. Object identity is payload-handle identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub u32);

/// Interned byte string (class, method and property names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Symbol(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum ArrayKey {
    Int(i64),
    Str(Rc<Vec<u8>>),
}

/// Ordered PHP-style array with a cached auto-increment index.
#[derive(Debug, Clone, Default)]
pub struct ArrayData {
    pub map: IndexMap<ArrayKey, Handle>,
    pub next_free: i64,
}

impl ArrayData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ArrayKey, value: Handle) -> Option<Handle> {
        if let ArrayKey::Int(i) = &key {
            if *i >= self.next_free {
                self.next_free = i + 1;
            }
        }
        self.map.insert(key, value)
    }

    /// Append a value with the next auto-incremented integer key.
    pub fn push(&mut self, value: Handle) {
        let key = ArrayKey::Int(self.next_free);
        self.next_free += 1;
        self.map.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl PartialEq for ArrayData {
    fn eq(&self, other: &Self) -> bool {
        // next_free is cached metadata, not part of the value
        self.map == other.map
    }
}

/// Attribute storage key: property name plus the declaring class for PRIVATE
/// attributes, so a private slot shadows rather than collides with a parent's.
pub type AttrKey = (Symbol, Option<Symbol>);

/// Per-instance state. `internal` carries extra payloads produced by a class's
/// instance factory (exception tracebacks, reflection targets).
#[derive(Clone)]
pub struct ObjectData {
    pub class: Symbol,
    pub properties: IndexMap<AttrKey, Handle>,
    pub internal: Option<Rc<dyn Any>>,
}

impl ObjectData {
    pub fn new(class: Symbol) -> Self {
        Self {
            class,
            properties: IndexMap::new(),
            internal: None,
        }
    }
}

impl fmt::Debug for ObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectData")
            .field("class", &self.class)
            .field("properties", &self.properties)
            .field("internal", &self.internal.is_some())
            .finish()
    }
}

impl PartialEq for ObjectData {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.properties == other.properties
    }
}

#[derive(Debug, Clone)]
pub enum Val {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Rc<Vec<u8>>),
    Array(Rc<ArrayData>),
    Object(Handle),
    ObjPayload(ObjectData),
}

impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Null, Val::Null) => true,
            (Val::Bool(a), Val::Bool(b)) => a == b,
            (Val::Int(a), Val::Int(b)) => a == b,
            (Val::Float(a), Val::Float(b)) => a == b,
            (Val::String(a), Val::String(b)) => a == b,
            (Val::Array(a), Val::Array(b)) => a == b,
            (Val::Object(a), Val::Object(b)) => a == b,
            (Val::ObjPayload(a), Val::ObjPayload(b)) => a == b,
            _ => false,
        }
    }
}

impl Val {
    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Null => "null",
            Val::Bool(_) => "bool",
            Val::Int(_) => "int",
            Val::Float(_) => "float",
            Val::String(_) => "string",
            Val::Array(_) => "array",
            Val::Object(_) | Val::ObjPayload(_) => "object",
        }
    }

    /// String coercion for scalar values. Arrays and objects have no
    /// parameter-level string form and return None.
    pub fn to_string_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Val::Null => Some(Vec::new()),
            Val::Bool(b) => Some(if *b { b"1".to_vec() } else { Vec::new() }),
            Val::Int(i) => Some(i.to_string().into_bytes()),
            Val::Float(f) => {
                if f.fract() == 0.0 {
                    Some(format!("{:.0}", f).into_bytes())
                } else {
                    Some(format!("{}", f).into_bytes())
                }
            }
            Val::String(s) => Some(s.to_vec()),
            Val::Array(_) | Val::Object(_) | Val::ObjPayload(_) => None,
        }
    }

    /// Integer coercion for scalar values. Only fully-numeric strings coerce;
    /// anything else returns None and becomes an argument error upstream.
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Val::Null => Some(0),
            Val::Bool(b) => Some(*b as i64),
            Val::Int(i) => Some(*i),
            Val::Float(f) => Some(*f as i64),
            Val::String(s) => {
                let text = std::str::from_utf8(s).ok()?;
                let trimmed = text.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    Some(i)
                } else {
                    trimmed.parse::<f64>().ok().map(|f| f as i64)
                }
            }
            Val::Array(_) | Val::Object(_) | Val::ObjPayload(_) => None,
        }
    }
}
