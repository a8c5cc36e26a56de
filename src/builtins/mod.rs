pub mod class;
pub mod exception;
pub mod reflection;
pub mod spl;
