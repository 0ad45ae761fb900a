//! Signature validation errors.

use thiserror::Error;

/// Why a byte string is not a valid type signature.
///
/// Positions are byte offsets into the scanned input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Input ended while a type was still open (or no type was present).
    #[error("unexpected end of signature at byte {pos}")]
    UnexpectedEnd { pos: usize },

    /// A byte that cannot start a type.
    #[error("invalid type character {found:?} at byte {pos}")]
    InvalidChar { pos: usize, found: char },

    /// A dictionary entry whose key is not a basic type.
    #[error("dictionary key at byte {pos} must be a basic type, found {found:?}")]
    InvalidKey { pos: usize, found: char },

    /// Containers nested beyond the depth limit (normally [`crate::MAX_DEPTH`]).
    #[error("container at byte {pos} exceeds the nesting limit of {limit}")]
    TooDeep { pos: usize, limit: usize },

    /// A complete type followed by more bytes where exactly one type was expected.
    #[error("trailing data after complete type at byte {pos}")]
    TrailingData { pos: usize },
}
