//! Cursor-driven fetch-and-checkpoint loop
//!
//! - [`machine`]: pure state machine for one run
//! - [`engine`]: drives the machine against a source, sink and checkpoint store
//! - [`summary`]: result of a successful run

pub mod engine;
pub mod machine;
pub mod summary;

pub use engine::{SyncLoop, SyncOptions};
pub use machine::{DoneReason, SyncEvent, SyncMachine, SyncState};
pub use summary::SyncSummary;
