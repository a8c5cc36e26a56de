pub mod context;
pub mod core_extension;
pub mod error;
pub mod extension;
pub mod method;
pub mod object;
pub mod property;
pub mod registry;
pub mod spl_extension;
pub mod trace;
mod visibility;
