//! Errors from the fallible cache entry point.

use gv_signature::SignatureError;
use thiserror::Error;

/// Why [`TypeInfoCache::try_get`](crate::TypeInfoCache::try_get) could not
/// produce a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeInfoError {
    /// The string is not a single valid type.
    #[error("invalid type signature: {0}")]
    Signature(#[from] SignatureError),

    /// The type contains wildcards, so it has no concrete layout.
    #[error("type {signature:?} contains wildcards and has no layout")]
    Indefinite { signature: String },
}
