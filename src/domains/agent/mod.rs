pub mod brain;
pub mod events;
pub mod handle;
pub mod types;

pub use brain::*;
pub use events::*;
pub use handle::*;
pub use types::*;
