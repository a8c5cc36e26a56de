use crate::core::value::{Handle, Val};

/// Slot storage for runtime values. Handles are stable for the lifetime of
/// the context; reclamation policy belongs to the host, not this crate.
#[derive(Debug, Default)]
pub struct Arena {
    storage: Vec<Val>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            storage: Vec::with_capacity(1024),
        }
    }

    pub fn alloc(&mut self, val: Val) -> Handle {
        let idx = self.storage.len();
        self.storage.push(val);
        Handle(idx as u32)
    }

    pub fn get(&self, h: Handle) -> &Val {
        &self.storage[h.0 as usize]
    }

    pub fn get_mut(&mut self, h: Handle) -> &mut Val {
        &mut self.storage[h.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_get_round_trip() {
        let mut arena = Arena::new();
        let h = arena.alloc(Val::Int(11));
        assert_eq!(arena.get(h), &Val::Int(11));
        *arena.get_mut(h) = Val::Bool(true);
        assert_eq!(arena.get(h), &Val::Bool(true));
    }
}
