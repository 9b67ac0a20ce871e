pub mod event_journal;
pub mod file_snapshot_store;
pub mod snapshot_store;

pub use event_journal::*;
pub use file_snapshot_store::*;
pub use snapshot_store::*;
