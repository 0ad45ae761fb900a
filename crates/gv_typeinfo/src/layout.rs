//! Tuple layout compiler.
//!
//! Given each member's alignment mask and fixed size (0 for variable-size
//! members), computes where every member starts and the tuple's own
//! alignment and fixed size.
//!
//! # Framing
//!
//! A serialized tuple ends with an offset table recording where each
//! variable-size member (except the last member) ends. A member's start is a
//! function of the nearest preceding table entry:
//!
//! ```text
//! base  = offset_table[i]   (0 if no variable member precedes)
//! start = ((base + a) & !b) | c
//! ```
//!
//! `b` is the strictest alignment seen since `base`; `a` holds the bytes
//! accumulated since `base` in whole multiples of that alignment, plus `b`
//! itself so the `& !b` rounds up; `c` is the remaining misalignment, always
//! smaller than the alignment.
//!
//! # Algorithm
//!
//! Walk the members keeping `i` (current table slot), `a` (bytes before the
//! current alignment run), `b` (the run's alignment) and `c` (bytes within
//! the run). For a member with alignment `d` and size `e`:
//!
//! 1. `d <= b`: it fits the current run, `c = align(c, d)`.
//! 2. otherwise start a stricter run: `a += align(c, b); b = d; c = 0`.
//! 3. record the member's framing from `(i, a, b, c)`.
//! 4. fixed members advance `c` by `e`; a variable member moves to the next
//!    table slot and resets `a`, `b` and `c`, since nothing after it has a
//!    compile-time offset.

/// Round `offset` up to the alignment described by `mask` (alignment - 1).
#[inline]
pub fn align(offset: usize, mask: u8) -> usize {
    offset + (offset.wrapping_neg() & usize::from(mask))
}

/// Where one tuple member starts, relative to the offset table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Framing {
    /// Offset-table slot holding the end of the nearest preceding
    /// variable-size member; `None` when no variable member precedes.
    pub i: Option<usize>,
    /// Bytes to add to the base, pre-rounded for the `& !b` step.
    pub a: usize,
    /// Alignment mask of the run the member belongs to.
    pub b: u8,
    /// Low bits to set after aligning; always `< b + 1`.
    pub c: u8,
}

impl Framing {
    /// Normalise raw compiler state into the `((base + a) & !b) | c` form.
    fn from_run(i: Option<usize>, a: usize, b: u8, c: usize) -> Self {
        let mask = usize::from(b);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "masked to at most 7 by the alignment mask"
        )]
        let low = (c & mask) as u8;
        Self {
            i,
            a: a + (c & !mask) + mask,
            b,
            c: low,
        }
    }

    /// Start offset of the member, given `base`, the value read from offset
    /// table slot [`i`](Self::i) (pass 0 when `i` is `None`).
    #[inline]
    pub fn start(self, base: usize) -> usize {
        ((base + self.a) & !usize::from(self.b)) | usize::from(self.c)
    }
}

/// Output of [`compile_tuple`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleLayout {
    /// One framing per member, in order.
    pub framings: Vec<Framing>,
    /// OR of all member alignments.
    pub alignment: u8,
    /// Total size when every member is fixed-size, otherwise 0. An empty
    /// tuple is a one-byte unit.
    pub fixed_size: usize,
}

/// Compile framings for members given as `(alignment_mask, fixed_size)`.
pub fn compile_tuple(members: &[(u8, usize)]) -> TupleLayout {
    let mut framings = Vec::with_capacity(members.len());
    let mut i: Option<usize> = None;
    let (mut a, mut b, mut c) = (0usize, 0u8, 0usize);

    for &(d, e) in members {
        debug_assert!(matches!(d, 0 | 1 | 3 | 7), "alignment mask {d} out of range");

        if d <= b {
            c = align(c, d);
        } else {
            a += align(c, b);
            b = d;
            c = 0;
        }

        framings.push(Framing::from_run(i, a, b, c));

        if e == 0 {
            i = Some(i.map_or(0, |slot| slot + 1));
            a = 0;
            b = 0;
            c = 0;
        } else {
            c += e;
        }
    }

    let alignment = members.iter().fold(0, |acc, &(d, _)| acc | d);
    let fixed_size = match (members.last(), framings.last()) {
        (None, _) => 1,
        (Some(&(_, size)), Some(last)) if last.i.is_none() && size != 0 => {
            align(last.start(0) + size, alignment)
        }
        _ => 0,
    };

    TupleLayout {
        framings,
        alignment,
        fixed_size,
    }
}
