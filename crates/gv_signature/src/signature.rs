//! Validated signature views.

use std::fmt;
use std::iter::FusedIterator;

use crate::basic::is_key_byte;
use crate::scan::{scan, signature_len, MAX_DEPTH};
use crate::{BasicType, SignatureError};

/// A borrowed view of exactly one complete type signature.
///
/// Every `Signature` has passed the scanner, so its extent is always
/// grammar-bounded: equality and hashing compare exactly the bytes of one
/// type. Sub-views ([`element`](Self::element), [`items`](Self::items),
/// [`key`](Self::key), [`value`](Self::value)) borrow from the same buffer
/// and are located with [`signature_len`] rather than re-scanned.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Signature<'a> {
    text: &'a str,
}

/// The kind of type a signature describes, from its first character.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeClass {
    /// A basic type (`b`, `y`, ..., `v`).
    Basic(BasicType),
    /// `m`: zero or one value.
    Maybe,
    /// `a`: zero or more values.
    Array,
    /// `(...)`: fixed sequence of members.
    Tuple,
    /// `{kv}`: key/value pair.
    DictEntry,
    /// `*`: matches any type.
    AnyType,
    /// `?`: matches any basic type.
    AnyBasic,
    /// `r`: matches any tuple.
    AnyTuple,
}

impl<'a> Signature<'a> {
    /// Validate `text` as exactly one type.
    pub fn parse(text: &'a str) -> Result<Self, SignatureError> {
        let scanned = scan(text.as_bytes(), MAX_DEPTH)?;
        if scanned.end != text.len() {
            return Err(SignatureError::TrailingData { pos: scanned.end });
        }
        Ok(Self { text })
    }

    /// Split the first type off a longer signature.
    ///
    /// Returns the leading type and the unscanned remainder.
    pub fn peel(text: &'a str) -> Result<(Self, &'a str), SignatureError> {
        let scanned = scan(text.as_bytes(), MAX_DEPTH)?;
        let (head, rest) = text.split_at(scanned.end);
        Ok((Self { text: head }, rest))
    }

    /// View of the type starting at the front of `text`, which must already
    /// be known to begin with a valid type.
    fn view_at(text: &'a str) -> Self {
        let len = signature_len(text.as_bytes());
        Self {
            text: &text[..len],
        }
    }

    /// The signature text.
    #[inline]
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in bytes.
    #[expect(
        clippy::len_without_is_empty,
        reason = "a signature always holds one complete type"
    )]
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    fn first(&self) -> u8 {
        // A validated signature is never empty.
        self.text.as_bytes().first().copied().unwrap_or(b'*')
    }

    /// Classify the type by its first character.
    pub fn class(&self) -> TypeClass {
        match self.first() {
            b'm' => TypeClass::Maybe,
            b'a' => TypeClass::Array,
            b'(' => TypeClass::Tuple,
            b'{' => TypeClass::DictEntry,
            b'?' => TypeClass::AnyBasic,
            b'r' => TypeClass::AnyTuple,
            ch => BasicType::from_byte(ch).map_or(TypeClass::AnyType, TypeClass::Basic),
        }
    }

    /// Whether this is a basic type (or the `?` wildcard).
    ///
    /// As in GVariant, `v` is not basic: it boxes a value of any type, even
    /// though its layout comes from the basic-type table.
    pub fn is_basic(&self) -> bool {
        is_key_byte(self.first())
    }

    /// Whether this type contains other values: arrays, maybes, tuples,
    /// dictionary entries, variants and the `r` wildcard.
    pub fn is_container(&self) -> bool {
        matches!(self.first(), b'a' | b'm' | b'(' | b'{' | b'r' | b'v')
    }

    /// Whether this is a tuple or the `r` wildcard.
    pub fn is_tuple(&self) -> bool {
        matches!(self.first(), b'(' | b'r')
    }

    /// Whether the signature is free of wildcards and so names a concrete
    /// type with a concrete layout.
    pub fn is_definite(&self) -> bool {
        !self.text.bytes().any(|ch| matches!(ch, b'*' | b'?' | b'r'))
    }

    /// Nesting depth: 1 for a leaf, `1 + max(child depths)` for containers.
    pub fn depth(&self) -> usize {
        scan(self.text.as_bytes(), usize::MAX).map_or(0, |scanned| scanned.depth)
    }

    /// Element type of an array or maybe.
    pub fn element(&self) -> Option<Signature<'a>> {
        match self.class() {
            TypeClass::Array | TypeClass::Maybe => Some(Self {
                text: &self.text[1..],
            }),
            _ => None,
        }
    }

    /// Member types of a tuple, or key then value of a dictionary entry.
    ///
    /// Empty for every other class.
    pub fn items(&self) -> Items<'a> {
        let rest = match self.class() {
            TypeClass::Tuple | TypeClass::DictEntry => &self.text[1..],
            _ => "",
        };
        Items { rest }
    }

    /// Number of items yielded by [`items`](Self::items).
    pub fn n_items(&self) -> usize {
        self.items().count()
    }

    /// Key type of a dictionary entry.
    pub fn key(&self) -> Option<Signature<'a>> {
        match self.class() {
            TypeClass::DictEntry => self.items().next(),
            _ => None,
        }
    }

    /// Value type of a dictionary entry.
    pub fn value(&self) -> Option<Signature<'a>> {
        match self.class() {
            TypeClass::DictEntry => self.items().nth(1),
            _ => None,
        }
    }

    /// Whether every value of this type is also a value of `supertype`.
    ///
    /// Wildcards in `supertype` match: `*` any type, `?` any basic type,
    /// `r` any tuple. A type is always a subtype of itself.
    pub fn is_subtype_of(&self, supertype: Signature<'_>) -> bool {
        let ty = self.text.as_bytes();
        let mut pos = 0;

        for &expected in supertype.text.as_bytes() {
            let Some(&found) = ty.get(pos) else {
                return false;
            };

            if expected == found {
                pos += 1;
                continue;
            }
            if found == b')' {
                return false;
            }

            let target = Signature::view_at(&self.text[pos..]);
            let matched = match expected {
                b'*' => true,
                b'?' => target.is_basic(),
                b'r' => target.is_tuple(),
                _ => false,
            };
            if !matched {
                return false;
            }
            pos += target.len();
        }

        true
    }
}

impl<'a> TryFrom<&'a str> for Signature<'a> {
    type Error = SignatureError;

    fn try_from(text: &'a str) -> Result<Self, Self::Error> {
        Self::parse(text)
    }
}

impl AsRef<str> for Signature<'_> {
    fn as_ref(&self) -> &str {
        self.text
    }
}

impl fmt::Debug for Signature<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:?})", self.text)
    }
}

impl fmt::Display for Signature<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// Iterator over the immediate children of a tuple or dictionary entry.
#[derive(Clone, Debug)]
pub struct Items<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Items<'a> {
    type Item = Signature<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rest.as_bytes().first() {
            None | Some(b')' | b'}') => None,
            Some(_) => {
                let item = Signature::view_at(self.rest);
                self.rest = &self.rest[item.len()..];
                Some(item)
            }
        }
    }
}

impl FusedIterator for Items<'_> {}
