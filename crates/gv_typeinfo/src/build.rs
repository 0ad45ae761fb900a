//! Container descriptor builders.
//!
//! Children are fetched through the cache before the parent exists, so a
//! build never holds the cache lock.

use gv_signature::{Signature, TypeClass};
use tracing::debug;

use crate::info::{ContainerKind, MemberEnding, MemberInfo, TypeInfo};
use crate::layout::compile_tuple;
use crate::TypeInfoCache;

/// Everything about a container except its identity and refcount.
pub(crate) struct Descriptor {
    pub class: TypeClass,
    pub alignment: u8,
    pub fixed_size: usize,
    pub kind: ContainerKind,
}

/// Build the descriptor for a definite container signature.
pub(crate) fn build(cache: &TypeInfoCache, signature: Signature<'_>) -> Descriptor {
    let class = signature.class();
    let descriptor = match class {
        TypeClass::Array | TypeClass::Maybe => array_like(cache, signature, class),
        TypeClass::Tuple | TypeClass::DictEntry => tuple(cache, signature, class),
        other => panic!("{signature} is not a container type ({other:?})"),
    };
    debug_assert!(
        matches!(descriptor.alignment, 0 | 1 | 3 | 7),
        "alignment {} out of range for {signature}",
        descriptor.alignment
    );
    descriptor
}

fn array_like(cache: &TypeInfoCache, signature: Signature<'_>, class: TypeClass) -> Descriptor {
    let Some(element_signature) = signature.element() else {
        panic!("{signature} has no element type");
    };
    let element = cache.get(element_signature);

    Descriptor {
        class,
        alignment: element.alignment(),
        fixed_size: 0,
        kind: ContainerKind::ArrayLike { element },
    }
}

fn tuple(cache: &TypeInfoCache, signature: Signature<'_>, class: TypeClass) -> Descriptor {
    let children: Vec<TypeInfo> = signature.items().map(|item| cache.get(item)).collect();
    let shape: Vec<(u8, usize)> = children.iter().map(TypeInfo::query).collect();
    let layout = compile_tuple(&shape);
    let last = children.len().checked_sub(1);

    let members: Box<[MemberInfo]> = children
        .into_iter()
        .zip(layout.framings)
        .enumerate()
        .map(|(index, (type_info, framing))| {
            let ending = if type_info.is_fixed_size() {
                MemberEnding::Fixed
            } else if Some(index) == last {
                MemberEnding::Last
            } else {
                MemberEnding::Offset
            };
            MemberInfo::new(type_info, framing, ending)
        })
        .collect();

    debug!(
        %signature,
        members = members.len(),
        alignment = layout.alignment,
        fixed_size = layout.fixed_size,
        "compiled tuple layout"
    );

    Descriptor {
        class,
        alignment: layout.alignment,
        fixed_size: layout.fixed_size,
        kind: ContainerKind::Tuple { members },
    }
}
