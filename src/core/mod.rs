//! Core sync logic
//!
//! - [`state`]: checkpoint payload codecs and the commit point
//! - [`sync`]: the fetch-and-checkpoint state machine and its engine

pub mod state;
pub mod sync;

pub use state::{CheckpointManager, CheckpointPayload, TriggerEvent};
pub use sync::{DoneReason, SyncLoop, SyncOptions, SyncSummary};
