#![allow(dead_code)]

use php_object::core::value::{ArrayData, ArrayKey, Handle, Val};
use php_object::runtime::context::ExecutionContext;
use php_object::runtime::trace::Frame;
use std::rc::Rc;

pub fn bootstrapped() -> ExecutionContext {
    ExecutionContext::new()
}

/// Context with a two-level script call stack: `main` at /srv/app.php:4
/// calling `load` at /srv/lib.php:27.
pub fn with_script_frames() -> ExecutionContext {
    let mut ctx = bootstrapped();
    ctx.push_frame(Frame::new("/srv/app.php", "main", 4, ""));
    ctx.push_frame(Frame::new("/srv/lib.php", "load", 27, ""));
    ctx
}

pub fn string_of(ctx: &ExecutionContext, handle: Handle) -> String {
    match ctx.arena.get(handle) {
        Val::String(s) => String::from_utf8_lossy(s).into_owned(),
        other => panic!("expected string, got {:?}", other),
    }
}

pub fn int_of(ctx: &ExecutionContext, handle: Handle) -> i64 {
    match ctx.arena.get(handle) {
        Val::Int(i) => *i,
        other => panic!("expected int, got {:?}", other),
    }
}

pub fn array_of(ctx: &ExecutionContext, handle: Handle) -> Rc<ArrayData> {
    match ctx.arena.get(handle) {
        Val::Array(arr) => arr.clone(),
        other => panic!("expected array, got {:?}", other),
    }
}

pub fn str_entry(arr: &ArrayData, key: &[u8]) -> Handle {
    *arr.map
        .get(&ArrayKey::Str(Rc::new(key.to_vec())))
        .unwrap_or_else(|| panic!("missing key {}", String::from_utf8_lossy(key)))
}
