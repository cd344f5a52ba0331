//! Report sinks

pub mod directory;

pub use directory::DirectorySink;
