//! Fixed layout of the basic types.
//!
//! One cell per letter from `b` to `y`, indexed by `char - 'b'`. Letters that
//! are not basic types hold a zeroed not-a-type cell; [`BasicType`] can only
//! name real types, so those cells are never read.

use gv_signature::BasicType;

/// Size and alignment of a basic type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BasicLayout {
    /// Size in bytes, 0 for variable-size types.
    pub fixed_size: u8,
    /// Alignment mask (alignment in bytes minus one).
    pub alignment: u8,
}

const NOT_A_TYPE: BasicLayout = BasicLayout {
    fixed_size: 0,
    alignment: 0,
};

const UNALIGNED: BasicLayout = BasicLayout {
    fixed_size: 0,
    alignment: 0,
};

const fn fixed_aligned(size: u8) -> BasicLayout {
    BasicLayout {
        fixed_size: size,
        alignment: size - 1,
    }
}

const fn aligned(alignment: u8) -> BasicLayout {
    BasicLayout {
        fixed_size: 0,
        alignment: alignment - 1,
    }
}

static BASIC_TABLE: [BasicLayout; 24] = [
    /* b */ fixed_aligned(1), // boolean
    /* c */ NOT_A_TYPE,
    /* d */ fixed_aligned(8), // double
    /* e */ NOT_A_TYPE,
    /* f */ NOT_A_TYPE,
    /* g */ UNALIGNED, // signature string
    /* h */ fixed_aligned(4), // file handle
    /* i */ fixed_aligned(4), // int32
    /* j */ NOT_A_TYPE,
    /* k */ NOT_A_TYPE,
    /* l */ NOT_A_TYPE,
    /* m */ NOT_A_TYPE,
    /* n */ fixed_aligned(2), // int16
    /* o */ UNALIGNED, // object path
    /* p */ NOT_A_TYPE,
    /* q */ fixed_aligned(2), // uint16
    /* r */ NOT_A_TYPE,
    /* s */ UNALIGNED, // string
    /* t */ fixed_aligned(8), // uint64
    /* u */ fixed_aligned(4), // uint32
    /* v */ aligned(8), // variant
    /* w */ NOT_A_TYPE,
    /* x */ fixed_aligned(8), // int64
    /* y */ fixed_aligned(1), // byte
];

/// Look up the layout of a basic type. Lock-free and allocation-free.
#[inline]
pub(crate) fn basic_layout(ty: BasicType) -> BasicLayout {
    let index = usize::from(ty.as_byte().wrapping_sub(b'b'));
    match BASIC_TABLE.get(index) {
        Some(layout) => *layout,
        None => panic!("basic type {ty} maps outside the basic-type table (index {index})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layout_of(ch: u8) -> (u8, u8) {
        let Some(ty) = BasicType::from_byte(ch) else {
            panic!("{} is not a basic type", char::from(ch));
        };
        let layout = basic_layout(ty);
        (layout.fixed_size, layout.alignment)
    }

    #[test]
    fn fixed_width_types() {
        assert_eq!(layout_of(b'b'), (1, 0));
        assert_eq!(layout_of(b'y'), (1, 0));
        assert_eq!(layout_of(b'n'), (2, 1));
        assert_eq!(layout_of(b'q'), (2, 1));
        assert_eq!(layout_of(b'i'), (4, 3));
        assert_eq!(layout_of(b'u'), (4, 3));
        assert_eq!(layout_of(b'h'), (4, 3));
        assert_eq!(layout_of(b'x'), (8, 7));
        assert_eq!(layout_of(b't'), (8, 7));
        assert_eq!(layout_of(b'd'), (8, 7));
    }

    #[test]
    fn variable_width_types() {
        assert_eq!(layout_of(b's'), (0, 0));
        assert_eq!(layout_of(b'o'), (0, 0));
        assert_eq!(layout_of(b'g'), (0, 0));
        assert_eq!(layout_of(b'v'), (0, 7));
    }

    #[test]
    fn every_basic_type_has_a_valid_alignment() {
        for ty in BasicType::ALL {
            let layout = basic_layout(ty);
            assert!(
                matches!(layout.alignment, 0 | 1 | 3 | 7),
                "{ty}: alignment {}",
                layout.alignment
            );
            if layout.fixed_size != 0 {
                assert_eq!(usize::from(layout.fixed_size) % (usize::from(layout.alignment) + 1), 0);
            }
        }
    }

    #[test]
    fn non_types_are_zeroed() {
        for ch in *b"cefjklmprw" {
            assert_eq!(BASIC_TABLE[usize::from(ch - b'b')], NOT_A_TYPE, "{}", char::from(ch));
        }
    }
}
