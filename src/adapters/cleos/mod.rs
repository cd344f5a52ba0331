//! Partner reporting API adapter

pub mod client;
pub mod disposition;
pub mod status;

pub use client::CleosClient;
