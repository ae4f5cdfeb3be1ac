//! URL-safe encoding of an [`OwnerId`] for the `x-ps3-sandbox-owner` header.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::SandboxError;
use crate::registry::OwnerId;

/// Encode an owner identity as a URL-safe, unpadded base64 token.
#[must_use]
pub fn encode_metadata(owner: OwnerId) -> String {
    URL_SAFE_NO_PAD.encode(owner.as_bytes())
}

/// Decode a token previously produced by [`encode_metadata`].
///
/// # Errors
///
/// Returns [`SandboxError::NotFound`] if the token is not valid base64 or
/// does not decode to a 16-byte identity.
pub fn decode_metadata(token: &str) -> Result<OwnerId, SandboxError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| SandboxError::NotFound)?;
    OwnerId::from_bytes(&bytes).ok_or(SandboxError::NotFound)
}
