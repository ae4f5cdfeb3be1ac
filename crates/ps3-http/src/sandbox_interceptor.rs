//! The `x-ps3-sandbox-owner` allowance middleware.
//!
//! Runs once per request, before routing. Decodes the header (if present)
//! into an owner identity and registers the current handler task as
//! allowed under that owner, so downstream storage calls resolve to the
//! test's isolated containers. Every failure mode -- missing header, bad
//! encoding, unknown owner, no tokio task, registry unavailable -- is
//! swallowed: the request proceeds against whatever the registry's
//! fallback mode dictates.

use ps3_sandbox::{Registry, SandboxError};

/// The header name carrying an encoded sandbox owner identity.
pub const SANDBOX_OWNER_HEADER: &str = "x-ps3-sandbox-owner";

/// Inspect `headers` for the sandbox owner header and, if present, bind the
/// current task to that owner in `registry`.
///
/// Handler tasks are pooled across requests belonging to different test
/// owners, so an existing allowance to a different owner is rebound via
/// `force_allow` rather than rejected.
pub fn apply<B, O>(headers: &http::HeaderMap, registry: &Registry<B, O>)
where
    B: Default + Send + Sync + 'static,
    O: Default + Send + Sync + 'static,
{
    let Some(value) = headers.get(SANDBOX_OWNER_HEADER) else {
        return;
    };
    let Ok(token) = value.to_str() else {
        return;
    };
    let Ok(owner) = ps3_sandbox::decode_metadata(token) else {
        return;
    };
    let Some(task) = tokio::task::try_id() else {
        return;
    };

    match registry.allow(owner, task) {
        Ok(()) | Err(SandboxError::AlreadyOwner) => {}
        Err(SandboxError::AlreadyAllowed) => {
            if let Err(e) = registry.force_allow(owner, task) {
                tracing::debug!(error = %e, "sandbox force_allow failed, continuing unbound");
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "sandbox allowance interception failed, continuing unbound");
        }
    }
}
