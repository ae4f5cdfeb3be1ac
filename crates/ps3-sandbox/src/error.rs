//! Sandbox registry error type.
//!
//! These errors never cross into an HTTP response; they are consumed only by
//! direct callers of the registry API (test harnesses). The allowance
//! interceptor swallows them silently, as documented on
//! [`crate::registry::Registry::allow`].

/// Errors returned by [`crate::registry::Registry`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    /// The referenced task is not a registered owner.
    #[error("task is not a registered sandbox owner")]
    NotFound,

    /// The task is already a registered owner.
    #[error("task is already a sandbox owner")]
    AlreadyOwner,

    /// The task is already allowed under some owner.
    #[error("task is already allowed under a sandbox owner")]
    AlreadyAllowed,

    /// The mode is already `Shared` for this exact owner.
    #[error("mode is already shared for this owner")]
    AlreadyShared,

    /// The caller attempted a shared-mode transition it does not own.
    #[error("caller is not the current sandbox owner")]
    NotOwner,

    /// `start_owner!` did not complete checkout within its bounded wait.
    #[error("timed out waiting for sandbox owner to start")]
    Timeout,

    /// The backing resource (e.g. the spawned owner task) is gone.
    #[error("sandbox owner task terminated unexpectedly: {0}")]
    OwnerGone(String),
}
