//! Royalty Dashboard Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod analytics;
pub mod config;
pub mod royalty;
pub mod server;
pub mod sqlite_persistence;
pub mod support;

// Re-export commonly used types for convenience
pub use server::{run_server, RequestsLoggingLevel, ServerState};
