//! Sandbox mode: how an unregistered task's storage containers are resolved.

use crate::registry::OwnerId;

/// The registry's global fallback behavior for tasks with no owner/allowance
/// record of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Sandboxing is disabled entirely.
    Off,
    /// An unregistered task is automatically checked out as its own owner
    /// the first time it needs containers.
    Auto,
    /// An unregistered task fails loudly; nothing is allocated on its
    /// behalf.
    Manual,
    /// An unregistered task transparently uses the named owner's
    /// containers.
    Shared(OwnerId),
}

impl Default for Mode {
    fn default() -> Self {
        Self::Off
    }
}
