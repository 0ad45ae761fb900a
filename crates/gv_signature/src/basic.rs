//! The basic (non-container) type alphabet.

use std::fmt;

/// A concrete basic type.
///
/// Basic types are leaves of the grammar: they never contain another type.
/// The discriminant is the type's signature character.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BasicType {
    /// `b`: boolean.
    Boolean = b'b',
    /// `y`: unsigned 8-bit integer.
    Byte = b'y',
    /// `n`: signed 16-bit integer.
    Int16 = b'n',
    /// `q`: unsigned 16-bit integer.
    UInt16 = b'q',
    /// `i`: signed 32-bit integer.
    Int32 = b'i',
    /// `u`: unsigned 32-bit integer.
    UInt32 = b'u',
    /// `x`: signed 64-bit integer.
    Int64 = b'x',
    /// `t`: unsigned 64-bit integer.
    UInt64 = b't',
    /// `h`: file descriptor handle (int32 on the wire).
    Handle = b'h',
    /// `d`: IEEE 754 double.
    Double = b'd',
    /// `s`: UTF-8 string.
    String = b's',
    /// `o`: D-Bus object path.
    ObjectPath = b'o',
    /// `g`: type signature string.
    Signature = b'g',
    /// `v`: boxed value of any type.
    Variant = b'v',
}

impl BasicType {
    /// Every basic type, in signature-character order of the grammar listing.
    pub const ALL: [BasicType; 14] = [
        BasicType::Boolean,
        BasicType::Byte,
        BasicType::Int16,
        BasicType::UInt16,
        BasicType::Int32,
        BasicType::UInt32,
        BasicType::Int64,
        BasicType::UInt64,
        BasicType::Handle,
        BasicType::Double,
        BasicType::String,
        BasicType::ObjectPath,
        BasicType::Signature,
        BasicType::Variant,
    ];

    /// Map a signature character to its basic type.
    ///
    /// Returns `None` for containers, wildcards, and anything outside the
    /// grammar.
    #[inline]
    pub const fn from_byte(ch: u8) -> Option<Self> {
        match ch {
            b'b' => Some(Self::Boolean),
            b'y' => Some(Self::Byte),
            b'n' => Some(Self::Int16),
            b'q' => Some(Self::UInt16),
            b'i' => Some(Self::Int32),
            b'u' => Some(Self::UInt32),
            b'x' => Some(Self::Int64),
            b't' => Some(Self::UInt64),
            b'h' => Some(Self::Handle),
            b'd' => Some(Self::Double),
            b's' => Some(Self::String),
            b'o' => Some(Self::ObjectPath),
            b'g' => Some(Self::Signature),
            b'v' => Some(Self::Variant),
            _ => None,
        }
    }

    /// The signature character for this type.
    #[inline]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// The signature of this type as a one-character string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "b",
            Self::Byte => "y",
            Self::Int16 => "n",
            Self::UInt16 => "q",
            Self::Int32 => "i",
            Self::UInt32 => "u",
            Self::Int64 => "x",
            Self::UInt64 => "t",
            Self::Handle => "h",
            Self::Double => "d",
            Self::String => "s",
            Self::ObjectPath => "o",
            Self::Signature => "g",
            Self::Variant => "v",
        }
    }

    /// Whether this type may be used as a dictionary-entry key.
    ///
    /// Every basic type except `v` qualifies.
    #[inline]
    pub const fn is_key(self) -> bool {
        !matches!(self, Self::Variant)
    }
}

/// Whether `ch` can start a dictionary-entry key: a key-capable basic type
/// or the `?` wildcard.
#[inline]
pub(crate) const fn is_key_byte(ch: u8) -> bool {
    match BasicType::from_byte(ch) {
        Some(basic) => basic.is_key(),
        None => ch == b'?',
    }
}

/// Whether `ch` is a one-character leaf: a basic type or a wildcard.
#[inline]
pub(crate) const fn is_leaf_byte(ch: u8) -> bool {
    BasicType::from_byte(ch).is_some() || matches!(ch, b'*' | b'?' | b'r')
}

impl fmt::Debug for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BasicType({})", self.as_str())
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
