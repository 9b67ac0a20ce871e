pub mod coords;
pub mod grid;
pub mod ports;

pub use coords::*;
pub use grid::*;
pub use ports::*;
