//! Shared configuration and logging setup for the ps3 S3-compatible test server.

mod config;
mod logging;

pub use config::{MemorySandboxMode, Ps3Config, StorageBackendKind};
pub use logging::init_tracing;
