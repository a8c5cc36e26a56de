pub mod heap;
pub mod interner;
pub mod value;
