pub mod catalog;
pub mod registry;

pub use catalog::*;
pub use registry::*;
