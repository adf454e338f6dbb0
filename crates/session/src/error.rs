//! Session error model.

use thiserror::Error;

/// Key material rejected when building a [`crate::SessionCodec`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("cipher key must be 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("initialization vector must be 16 bytes, got {0}")]
    InvalidIvLength(usize),

    #[error("{0} contains characters outside Latin-1")]
    NonLatin1(&'static str),
}

/// Decrypted payload is not the JSON the caller asked for.
///
/// Tampered or stale blobs surface here; callers treat it as "no session".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("expected a JSON array, found {0}")]
    NotAnArray(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Format(#[from] FormatError),
}
