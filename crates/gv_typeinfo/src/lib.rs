//! Layout descriptors for GVariant types.
//!
//! A [`TypeInfo`] tells a serializer how values of one type are laid out:
//! their alignment, their size when it is fixed, and for tuples and
//! dictionary entries where every member starts. Descriptors are obtained
//! from a [`TypeInfoCache`], which interns one descriptor per signature.
//!
//! # Descriptor kinds
//!
//! - **Basic**: looked up in a static table, never allocated or counted.
//! - **Array/maybe**: one element descriptor; alignment is the element's,
//!   fixed size is always 0.
//! - **Tuple/dict-entry**: per-member [`MemberInfo`] computed by the layout
//!   compiler ([`compile_tuple`]).
//!
//! # Lifetime
//!
//! Container descriptors carry an atomic reference count: cloning a
//! [`TypeInfo`] adds a reference, dropping one removes it. A descriptor that
//! reaches zero is not freed on the spot; it is queued and reclaimed by the
//! next [`TypeInfoCache::sweep`], which runs automatically once enough
//! descriptors are queued. Re-acquiring a queued descriptor before the sweep
//! simply keeps it alive.
//!
//! # Example
//!
//! ```text
//! let cache = TypeInfoCache::new();
//! let info = cache.try_get("(iy)")?;
//! assert_eq!(info.query(), (3, 8));
//! ```

mod basic;
mod build;
mod cache;
mod config;
mod error;
mod info;
mod layout;

pub use cache::TypeInfoCache;
pub use config::{CacheConfig, DEFAULT_SWEEP_THRESHOLD};
pub use error::TypeInfoError;
pub use info::{MemberEnding, MemberInfo, TypeInfo};
pub use layout::{align, compile_tuple, Framing, TupleLayout};

pub use gv_signature::{BasicType, Signature, SignatureError, TypeClass};
