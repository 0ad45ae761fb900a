//! GVariant type signature grammar.
//!
//! A type signature is a compact ASCII string describing the shape of a
//! value: `"i"` is an int32, `"a(iy)"` an array of (int32, byte) tuples,
//! `"a{sv}"` a dictionary from strings to variants.
//!
//! # Grammar
//!
//! ```text
//! type      = basic | wildcard | "a" type | "m" type
//!           | "(" type* ")" | "{" key type "}"
//! basic     = "b" | "y" | "n" | "q" | "i" | "u" | "x" | "t"
//!           | "h" | "d" | "s" | "o" | "g" | "v"
//! key       = basic-except-"v" | "?"
//! wildcard  = "*" | "?" | "r"
//! ```
//!
//! Wildcards only appear in signatures used for matching
//! ([`Signature::is_subtype_of`]); they never describe a concrete layout.
//!
//! # Layers
//!
//! - [`scan`]: the raw recursive-descent scanner over byte slices, plus
//!   [`signature_len`], the bracket-counting walk that must agree with it.
//! - [`Signature`]: a validated view of exactly one type, with sub-views for
//!   array elements, tuple items, and dictionary keys/values.

mod basic;
mod error;
mod scan;
mod signature;

pub use basic::BasicType;
pub use error::SignatureError;
pub use scan::{is_valid, scan, signature_len, Scanned, MAX_DEPTH};
pub use signature::{Items, Signature, TypeClass};
