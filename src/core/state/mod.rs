//! Checkpoint commit protocol
//!
//! - [`payload`]: wire format of the checkpoint and the invocation trigger
//! - [`manager`]: the commit point of a run

pub mod manager;
pub mod payload;

pub use manager::CheckpointManager;
pub use payload::{CheckpointPayload, TriggerEvent};
