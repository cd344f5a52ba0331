//! Checkpoint stores

pub mod job_file;

pub use job_file::{JobDocument, JobFileCheckpointStore};
