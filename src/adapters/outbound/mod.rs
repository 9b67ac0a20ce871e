pub mod buffered_logger;
pub mod multi_logger;
pub mod noop_logger;
pub mod tracing_logger;

pub use buffered_logger::*;
pub use multi_logger::*;
pub use noop_logger::*;
pub use tracing_logger::*;
