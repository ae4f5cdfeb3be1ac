//! Server configuration.
//!
//! All configuration is driven by environment variables, matching the
//! convention used throughout this codebase: a `Default` impl documents the
//! out-of-the-box behavior, and `from_env()` layers environment variables on
//! top of it.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Which storage backend a running server or facade instance is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// Objects are stored as files on disk, one directory per bucket.
    Filesystem,
    /// Objects live only in process memory, optionally partitioned by the
    /// sandbox registry.
    Memory,
}

impl Default for StorageBackendKind {
    fn default() -> Self {
        Self::Filesystem
    }
}

impl StorageBackendKind {
    /// Parse a backend kind from a config string, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "filesystem" | "fs" | "disk" => Some(Self::Filesystem),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// The memory backend's sandbox mode, mirroring the sandbox registry's own
/// `Mode` but expressed as plain configuration (no registry reference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemorySandboxMode {
    /// Sandboxing disabled; everything uses the well-known process-wide
    /// container pair.
    Off,
    /// A fresh owner is allocated automatically for any task that doesn't
    /// already have one.
    Auto,
    /// No automatic allocation; an unregistered task fails loudly.
    Manual,
    /// All unregistered tasks fall back to a single named owner, identified
    /// by its encoded metadata token.
    Shared(String),
}

impl Default for MemorySandboxMode {
    fn default() -> Self {
        Self::Off
    }
}

impl MemorySandboxMode {
    /// Parse a mode from a config string.
    ///
    /// Accepts `off`, `auto`, `manual`, or `shared:<token>`. Any other value
    /// returns `None` so the caller can fall back to a default and warn.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off" => Some(Self::Off),
            "auto" => Some(Self::Auto),
            "manual" => Some(Self::Manual),
            other => other
                .strip_prefix("shared:")
                .map(|token| Self::Shared(token.to_owned())),
        }
    }
}

/// ps3 server configuration.
///
/// Can be loaded from environment variables via [`Ps3Config::from_env`] or
/// constructed directly via the generated builder.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Ps3Config {
    /// Bind address for the HTTP server.
    #[builder(default = String::from("0.0.0.0:4566"))]
    pub gateway_listen: String,

    /// Which storage backend the facade should dispatch to.
    #[builder(default)]
    pub storage_backend: StorageBackendKind,

    /// Root directory for the filesystem backend.
    #[builder(default = String::from("./.s3"))]
    pub storage_root: String,

    /// Sandbox mode used by the memory backend.
    #[builder(default)]
    pub memory_sandbox_mode: MemorySandboxMode,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for Ps3Config {
    fn default() -> Self {
        Self {
            gateway_listen: String::from("0.0.0.0:4566"),
            storage_backend: StorageBackendKind::default(),
            storage_root: String::from("./.s3"),
            memory_sandbox_mode: MemorySandboxMode::default(),
            log_level: String::from("info"),
        }
    }
}

impl Ps3Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:4566` |
    /// | `STORAGE_BACKEND` | `filesystem` |
    /// | `STORAGE_ROOT` | `./.s3` |
    /// | `MEMORY_SANDBOX_MODE` | `off` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Malformed values for `STORAGE_BACKEND` or `MEMORY_SANDBOX_MODE` are
    /// logged and ignored, falling back to the default rather than failing
    /// startup.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("STORAGE_BACKEND") {
            match StorageBackendKind::parse(&v) {
                Some(backend) => config.storage_backend = backend,
                None => tracing::warn!(value = %v, "unrecognized STORAGE_BACKEND, using default"),
            }
        }
        if let Ok(v) = std::env::var("STORAGE_ROOT") {
            config.storage_root = v;
        }
        if let Ok(v) = std::env::var("MEMORY_SANDBOX_MODE") {
            match MemorySandboxMode::parse(&v) {
                Some(mode) => config.memory_sandbox_mode = mode,
                None => {
                    tracing::warn!(value = %v, "unrecognized MEMORY_SANDBOX_MODE, using default");
                }
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}
