pub mod agent_actor;
pub mod event_actor;
pub mod placement_service;
pub mod simulation_service;

pub use agent_actor::*;
pub use event_actor::*;
pub use placement_service::*;
pub use simulation_service::*;
