//! Binary encoding of [`EffectiveScope`] for external cache stores.
//!
//! Layout: one format-version byte followed by the `postcard` payload.
//! Readers reject any other version, so a rolling deploy that changes the
//! layout turns old entries into cache misses instead of misreads.

use crate::effective_scope::EffectiveScope;

/// Current payload format version.
pub const SCOPE_BIN_VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ScopeEncodeError {
    #[error("failed to encode effective scope: {0}")]
    Postcard(#[from] postcard::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ScopeDecodeError {
    #[error("empty scope payload")]
    Empty,

    #[error("unsupported scope payload version {0}")]
    UnsupportedVersion(u8),

    #[error("failed to decode effective scope: {0}")]
    Postcard(#[from] postcard::Error),
}

/// Encode a scope as `[version, payload...]`.
///
/// # Errors
///
/// Returns [`ScopeEncodeError`] if serialization fails.
pub fn encode_scope(scope: &EffectiveScope) -> Result<Vec<u8>, ScopeEncodeError> {
    let payload = postcard::to_allocvec(scope)?;
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(SCOPE_BIN_VERSION);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a payload produced by [`encode_scope`].
///
/// # Errors
///
/// Returns [`ScopeDecodeError`] for empty input, an unknown version byte, or
/// a corrupt payload.
pub fn decode_scope(bytes: &[u8]) -> Result<EffectiveScope, ScopeDecodeError> {
    let (&version, payload) = bytes.split_first().ok_or(ScopeDecodeError::Empty)?;
    if version != SCOPE_BIN_VERSION {
        return Err(ScopeDecodeError::UnsupportedVersion(version));
    }
    Ok(postcard::from_bytes(payload)?)
}
