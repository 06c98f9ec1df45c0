//! Shared stylediff data models consumed by the core library and its callers.

pub mod comparison;
pub mod diff;
pub mod stylesheet;

pub use comparison::*;
pub use diff::*;
pub use stylesheet::*;
