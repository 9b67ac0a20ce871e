pub mod admission;
pub mod agent;
pub mod grid;
pub mod location;
pub mod logger;
pub mod movement;
pub mod path_planning;

pub use admission::*;
pub use agent::*;
pub use grid::*;
pub use location::*;
pub use logger::*;
pub use movement::*;
pub use path_planning::*;
