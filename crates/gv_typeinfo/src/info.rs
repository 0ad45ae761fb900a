//! Type-info handles.
//!
//! [`TypeInfo`] is a tagged handle: basic types are plain values looked up
//! in the static table, containers point at a shared node owned by a
//! [`TypeInfoCache`](crate::TypeInfoCache). Cloning a container handle adds
//! a reference, dropping it removes one; a node whose count reaches zero is
//! handed back to its cache for the next sweep.

use std::fmt;
use std::sync::atomic::{self, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use gv_signature::{BasicType, TypeClass};

use crate::basic::basic_layout;
use crate::cache::CacheShared;
use crate::layout::Framing;

/// Layout descriptor for one type.
///
/// Equality is identity: two handles are equal when they name the same basic
/// type or the same interned container node.
#[derive(Clone)]
pub struct TypeInfo(Repr);

#[derive(Clone)]
enum Repr {
    Basic(BasicType),
    Container(ContainerRef),
}

/// How a tuple member's end is found.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MemberEnding {
    /// Fixed-size member: ends `fixed_size` bytes after its start.
    Fixed,
    /// Variable-size final member: extends to the start of the offset table.
    Last,
    /// Variable-size member whose end is recorded in the offset table.
    Offset,
}

/// One member of a tuple or dictionary entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    type_info: TypeInfo,
    framing: Framing,
    ending: MemberEnding,
}

impl MemberInfo {
    pub(crate) fn new(type_info: TypeInfo, framing: Framing, ending: MemberEnding) -> Self {
        Self {
            type_info,
            framing,
            ending,
        }
    }

    /// Descriptor of the member's type.
    #[inline]
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// Start-offset coordinates.
    #[inline]
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Offset-table slot this member's start is relative to.
    #[inline]
    pub fn offset_index(&self) -> Option<usize> {
        self.framing.i
    }

    #[inline]
    pub fn ending(&self) -> MemberEnding {
        self.ending
    }

    /// Start offset given the value of offset-table slot
    /// [`offset_index`](Self::offset_index) (0 when there is none).
    #[inline]
    pub fn start(&self, base: usize) -> usize {
        self.framing.start(base)
    }
}

/// Shape-specific payload of a container node.
pub(crate) enum ContainerKind {
    /// Array or maybe.
    ArrayLike { element: TypeInfo },
    /// Tuple or dictionary entry.
    Tuple { members: Box<[MemberInfo]> },
}

/// Interned container descriptor.
pub(crate) struct ContainerNode {
    pub(crate) signature: Box<str>,
    pub(crate) class: TypeClass,
    pub(crate) alignment: u8,
    pub(crate) fixed_size: usize,
    pub(crate) kind: ContainerKind,
    /// Format-level reference count: live handles plus one claim per
    /// pending-collection entry.
    pub(crate) refs: AtomicUsize,
    pub(crate) cache: Weak<CacheShared>,
}

/// Counted reference to a container node.
pub(crate) struct ContainerRef(Arc<ContainerNode>);

impl Clone for ContainerRef {
    fn clone(&self) -> Self {
        // Only reachable through a live handle, so the count is already > 0.
        self.0.refs.fetch_add(1, Ordering::Relaxed);
        Self(Arc::clone(&self.0))
    }
}

impl Drop for ContainerRef {
    fn drop(&mut self) {
        let previous = self.0.refs.fetch_sub(1, Ordering::Release);
        assert!(previous != 0, "type-info refcount underflow for {}", self.0.signature);
        if previous != 1 {
            return;
        }
        atomic::fence(Ordering::Acquire);
        if let Some(cache) = self.0.cache.upgrade() {
            cache.release(Arc::clone(&self.0));
        }
    }
}

impl TypeInfo {
    /// Descriptor for a basic type. Lock-free, never allocates.
    #[inline]
    pub fn basic(ty: BasicType) -> Self {
        Self(Repr::Basic(ty))
    }

    /// Wrap a freshly created node whose count already includes this handle.
    pub(crate) fn from_new_node(node: Arc<ContainerNode>) -> Self {
        Self(Repr::Container(ContainerRef(node)))
    }

    /// Take a new reference to an interned node. Caller holds the cache lock.
    pub(crate) fn acquire(node: &Arc<ContainerNode>) -> Self {
        node.refs.fetch_add(1, Ordering::Relaxed);
        Self(Repr::Container(ContainerRef(Arc::clone(node))))
    }

    fn node(&self) -> Option<&ContainerNode> {
        match &self.0 {
            Repr::Basic(_) => None,
            Repr::Container(container) => Some(&container.0),
        }
    }

    /// Alignment mask: 0, 1, 3 or 7.
    pub fn alignment(&self) -> u8 {
        match &self.0 {
            Repr::Basic(ty) => basic_layout(*ty).alignment,
            Repr::Container(container) => container.0.alignment,
        }
    }

    /// Size in bytes of every value of this type, or 0 if values vary in size.
    pub fn fixed_size(&self) -> usize {
        match &self.0 {
            Repr::Basic(ty) => usize::from(basic_layout(*ty).fixed_size),
            Repr::Container(container) => container.0.fixed_size,
        }
    }

    /// `(alignment, fixed_size)`.
    #[inline]
    pub fn query(&self) -> (u8, usize) {
        (self.alignment(), self.fixed_size())
    }

    #[inline]
    pub fn is_fixed_size(&self) -> bool {
        self.fixed_size() != 0
    }

    /// The type signature this descriptor was built for.
    pub fn type_string(&self) -> &str {
        match &self.0 {
            Repr::Basic(ty) => ty.as_str(),
            Repr::Container(container) => &container.0.signature,
        }
    }

    pub fn class(&self) -> TypeClass {
        match &self.0 {
            Repr::Basic(ty) => TypeClass::Basic(*ty),
            Repr::Container(container) => container.0.class,
        }
    }

    pub fn is_basic(&self) -> bool {
        matches!(self.0, Repr::Basic(_))
    }

    /// Nesting depth: 1 for basic types, one more than the deepest child for
    /// containers.
    pub fn depth(&self) -> usize {
        match self.node().map(|node| &node.kind) {
            None => 1,
            Some(ContainerKind::ArrayLike { element }) => element.depth() + 1,
            Some(ContainerKind::Tuple { members }) => {
                members
                    .iter()
                    .map(|member| member.type_info.depth())
                    .max()
                    .unwrap_or(0)
                    + 1
            }
        }
    }

    /// Element descriptor of an array or maybe.
    pub fn try_element(&self) -> Option<&TypeInfo> {
        match self.node().map(|node| &node.kind) {
            Some(ContainerKind::ArrayLike { element }) => Some(element),
            _ => None,
        }
    }

    /// Element descriptor of an array or maybe.
    ///
    /// # Panics
    /// Panics if this is not an array or maybe.
    pub fn element(&self) -> &TypeInfo {
        match self.try_element() {
            Some(element) => element,
            None => panic!("{} is not an array or maybe type", self.type_string()),
        }
    }

    /// Members of a tuple or dictionary entry.
    pub fn try_members(&self) -> Option<&[MemberInfo]> {
        match self.node().map(|node| &node.kind) {
            Some(ContainerKind::Tuple { members }) => Some(members),
            _ => None,
        }
    }

    /// Members of a tuple or dictionary entry.
    ///
    /// # Panics
    /// Panics if this is not a tuple or dictionary entry.
    pub fn members(&self) -> &[MemberInfo] {
        match self.try_members() {
            Some(members) => members,
            None => panic!("{} is not a tuple or dict-entry type", self.type_string()),
        }
    }

    /// Number of members of a tuple or dictionary entry.
    ///
    /// # Panics
    /// Panics if this is not a tuple or dictionary entry.
    pub fn n_members(&self) -> usize {
        self.members().len()
    }

    /// Member `index` of a tuple or dictionary entry.
    ///
    /// # Panics
    /// Panics if this is not a tuple or dictionary entry, or `index` is out
    /// of range.
    pub fn member_info(&self, index: usize) -> &MemberInfo {
        let members = self.members();
        match members.get(index) {
            Some(member) => member,
            None => panic!(
                "member {index} out of range for {} ({} members)",
                self.type_string(),
                members.len()
            ),
        }
    }

    /// Current reference count of a container descriptor, `None` for basic
    /// types. Includes the pending-collection claim while the descriptor is
    /// queued for a sweep.
    pub fn ref_count(&self) -> Option<usize> {
        self.node().map(|node| node.refs.load(Ordering::Relaxed))
    }

    /// Whether both handles name the same descriptor.
    pub fn ptr_eq(&self, other: &TypeInfo) -> bool {
        match (&self.0, &other.0) {
            (Repr::Basic(a), Repr::Basic(b)) => a == b,
            (Repr::Container(a), Repr::Container(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({:?})", self.type_string())
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_string())
    }
}
