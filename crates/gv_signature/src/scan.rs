//! Recursive-descent scanner for type signatures.
//!
//! [`scan`] reads exactly one type from the front of a byte slice and reports
//! where it ends and how deeply it nests. [`signature_len`] recovers the same
//! end position for input already known to be valid, without any recursion,
//! by counting brackets. The two must agree byte-for-byte: sub-views, equality
//! and hashing of [`Signature`](crate::Signature) all rely on it.

use crate::basic::{is_key_byte, is_leaf_byte};
use crate::SignatureError;

/// Maximum container nesting accepted by [`is_valid`] and
/// [`Signature::parse`](crate::Signature::parse).
///
/// Each `a`, `m`, `(` and `{` consumes one level; leaves consume none, so
/// `"a"` repeated 128 times followed by `"y"` is accepted and 129 levels are
/// rejected.
pub const MAX_DEPTH: usize = 128;

/// Result of scanning one type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scanned {
    /// Byte offset one past the end of the type.
    pub end: usize,
    /// Nesting depth: 1 for a leaf, `1 + max(child depths)` for a container
    /// (an empty tuple has depth 1).
    pub depth: usize,
}

/// Scan one type from the start of `bytes`.
///
/// Bytes after the type are ignored, which lets callers pull successive types
/// off a longer signature. `depth_limit` bounds container nesting; running out
/// is reported as [`SignatureError::TooDeep`], never a crash.
pub fn scan(bytes: &[u8], depth_limit: usize) -> Result<Scanned, SignatureError> {
    Scanner {
        bytes,
        limit: depth_limit,
    }
    .scan_at(0, depth_limit)
}

/// Whether `signature` is exactly one complete, valid type.
pub fn is_valid(signature: &str) -> bool {
    scan(signature.as_bytes(), MAX_DEPTH).is_ok_and(|s| s.end == signature.len())
}

/// Length of the type at the front of `bytes`.
///
/// The input must start with a valid type. `a`/`m` prefixes are skipped, then
/// `(`/`{` and `)`/`}` are counted until the brackets balance. If the input
/// runs out first (invalid input), the whole slice length is returned.
pub fn signature_len(bytes: &[u8]) -> usize {
    let mut brackets = 0usize;
    let mut index = 0;

    loop {
        while matches!(bytes.get(index), Some(b'a' | b'm')) {
            index += 1;
        }

        match bytes.get(index) {
            Some(b'(' | b'{') => brackets += 1,
            Some(b')' | b'}') => brackets = brackets.saturating_sub(1),
            Some(_) => {}
            None => return bytes.len(),
        }

        index += 1;
        if brackets == 0 {
            return index;
        }
    }
}

struct Scanner<'a> {
    bytes: &'a [u8],
    /// The caller's original limit, for error reporting.
    limit: usize,
}

impl Scanner<'_> {
    fn byte(&self, pos: usize) -> Result<u8, SignatureError> {
        self.bytes
            .get(pos)
            .copied()
            .ok_or(SignatureError::UnexpectedEnd { pos })
    }

    fn open_container(&self, pos: usize, budget: usize) -> Result<usize, SignatureError> {
        if budget == 0 {
            return Err(SignatureError::TooDeep {
                pos,
                limit: self.limit,
            });
        }
        Ok(budget - 1)
    }

    fn scan_at(&self, pos: usize, budget: usize) -> Result<Scanned, SignatureError> {
        match self.byte(pos)? {
            b'(' => {
                let child_budget = self.open_container(pos, budget)?;
                let mut cursor = pos + 1;
                let mut max_child = 0;
                while self.byte(cursor)? != b')' {
                    let child = self.scan_at(cursor, child_budget)?;
                    max_child = max_child.max(child.depth);
                    cursor = child.end;
                }
                Ok(Scanned {
                    end: cursor + 1,
                    depth: max_child + 1,
                })
            }
            b'{' => {
                let child_budget = self.open_container(pos, budget)?;
                let key = self.byte(pos + 1)?;
                if !is_key_byte(key) {
                    return Err(SignatureError::InvalidKey {
                        pos: pos + 1,
                        found: char::from(key),
                    });
                }
                let value = self.scan_at(pos + 2, child_budget)?;
                match self.byte(value.end)? {
                    b'}' => Ok(Scanned {
                        end: value.end + 1,
                        depth: value.depth + 1,
                    }),
                    other => Err(SignatureError::InvalidChar {
                        pos: value.end,
                        found: char::from(other),
                    }),
                }
            }
            b'a' | b'm' => {
                let child_budget = self.open_container(pos, budget)?;
                let child = self.scan_at(pos + 1, child_budget)?;
                Ok(Scanned {
                    end: child.end,
                    depth: child.depth + 1,
                })
            }
            ch if is_leaf_byte(ch) => Ok(Scanned {
                end: pos + 1,
                depth: 1,
            }),
            other => Err(SignatureError::InvalidChar {
                pos,
                found: char::from(other),
            }),
        }
    }
}
