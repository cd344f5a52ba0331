//! CLI command implementations

pub mod fetch;
pub mod init;
pub mod status;
pub mod sync;
pub mod validate;
