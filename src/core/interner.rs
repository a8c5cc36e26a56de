use crate::core::value::Symbol;
use std::collections::HashMap;

/// Byte-string interner for class, method and property names. A `Symbol` is
/// what class descriptors, attribute keys and visibility checks carry instead
/// of owned strings. Symbols preserve the spelling they were first interned
/// with (the display form); the registry folds case separately for its
/// case-insensitive class and method lookup, so `Exception` and `exception`
/// are distinct symbols mapping to the same class.
#[derive(Debug, Default)]
pub struct Interner {
    map: HashMap<Vec<u8>, Symbol>,
    vec: Vec<Vec<u8>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &[u8]) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }
        let sym = Symbol(self.vec.len() as u32);
        self.vec.push(s.to_vec());
        self.map.insert(s.to_vec(), sym);
        sym
    }

    pub fn find(&self, s: &[u8]) -> Option<Symbol> {
        self.map.get(s).copied()
    }

    pub fn lookup(&self, sym: Symbol) -> Option<&[u8]> {
        self.vec.get(sym.0 as usize).map(|v| v.as_slice())
    }
}
