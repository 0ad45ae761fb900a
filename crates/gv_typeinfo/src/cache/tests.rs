use super::*;
use crate::{SignatureError, DEFAULT_SWEEP_THRESHOLD};
use pretty_assertions::assert_eq;

fn get(cache: &TypeInfoCache, text: &str) -> TypeInfo {
    match cache.try_get(text) {
        Ok(info) => info,
        Err(err) => panic!("{text:?}: {err}"),
    }
}

/// `(y)`, `(yy)`, ... with `n` bytes.
fn byte_tuple(n: usize) -> String {
    format!("({})", "y".repeat(n))
}

// === Interning ===

#[test]
fn same_signature_same_descriptor() {
    let cache = TypeInfoCache::new();
    let first = get(&cache, "a{sv}");
    let second = get(&cache, "a{sv}");
    assert!(first.ptr_eq(&second));
    assert_eq!(first, second);
    assert_eq!(cache.len(), 2, "a{{sv}} and {{sv}}");
}

#[test]
fn basic_types_bypass_the_table() {
    let cache = TypeInfoCache::new();
    let info = get(&cache, "v");
    assert!(info.is_basic());
    assert_eq!(info.ref_count(), None);
    assert!(cache.is_empty());
}

#[test]
fn children_are_shared_between_parents() {
    let cache = TypeInfoCache::new();
    let array = get(&cache, "a(iy)");
    let maybe = get(&cache, "m(iy)");
    assert!(array.element().ptr_eq(maybe.element()));
    assert_eq!(array.element().ref_count(), Some(2));
    assert_eq!(cache.signatures(), ["(iy)", "a(iy)", "m(iy)"]);
}

#[test]
fn every_get_and_clone_adds_a_reference() {
    let cache = TypeInfoCache::new();
    let first = get(&cache, "(iy)");
    assert_eq!(first.ref_count(), Some(1));
    let second = get(&cache, "(iy)");
    assert_eq!(first.ref_count(), Some(2));
    let third = second.clone();
    assert_eq!(first.ref_count(), Some(3));
    drop(third);
    drop(second);
    assert_eq!(first.ref_count(), Some(1));
    assert_eq!(cache.pending_len(), 0);
}

#[test]
fn indefinite_and_invalid_input_is_rejected() {
    let cache = TypeInfoCache::new();
    assert!(matches!(
        cache.try_get("a(iy"),
        Err(TypeInfoError::Signature(SignatureError::UnexpectedEnd { pos: 4 }))
    ));
    assert_eq!(
        cache.try_get("a*"),
        Err(TypeInfoError::Indefinite {
            signature: "a*".to_owned()
        })
    );
    assert!(matches!(cache.try_get("ii"), Err(TypeInfoError::Signature(_))));
    assert!(cache.is_empty());
}

#[test]
#[should_panic(expected = "indefinite")]
fn get_panics_on_wildcards() {
    let cache = TypeInfoCache::new();
    let Ok(signature) = Signature::parse("(i?)") else {
        panic!("(i?) should parse");
    };
    let _ = cache.get(signature);
}

#[test]
fn global_cache_is_a_singleton() {
    assert!(std::ptr::eq(TypeInfoCache::global(), TypeInfoCache::global()));
    let info = get(TypeInfoCache::global(), "a(ddd)");
    assert_eq!(info.element().query(), (7, 24));
}

// === Deferred reclamation ===

#[test]
fn release_queues_without_freeing() {
    let cache = TypeInfoCache::new();
    drop(get(&cache, "ai"));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.pending_len(), 1);

    assert_eq!(cache.sweep(), 1);
    assert!(cache.is_empty());
    assert_eq!(cache.pending_len(), 0);
}

#[test]
fn reacquire_before_sweep_revives() {
    let cache = TypeInfoCache::new();
    drop(get(&cache, "ai"));

    let revived = get(&cache, "ai");
    // The handle plus the pending claim.
    assert_eq!(revived.ref_count(), Some(2));

    assert_eq!(cache.sweep(), 0);
    assert_eq!(revived.ref_count(), Some(1));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.pending_len(), 0);

    drop(revived);
    assert_eq!(cache.sweep(), 1);
    assert!(cache.is_empty());
}

#[test]
fn sweep_cascades_into_children() {
    let cache = TypeInfoCache::new();
    let nested = get(&cache, "aa(iy)");
    assert_eq!(cache.len(), 3);
    drop(nested);
    assert_eq!(cache.pending_len(), 1, "only the outer array is queued");

    assert_eq!(cache.sweep(), 3);
    assert!(cache.is_empty());
    assert_eq!(cache.pending_len(), 0);
}

#[test]
fn child_held_elsewhere_survives_parent_sweep() {
    let cache = TypeInfoCache::new();
    let parent = get(&cache, "a(iy)");
    let child = parent.element().clone();
    drop(parent);

    assert_eq!(cache.sweep(), 1);
    assert_eq!(cache.signatures(), ["(iy)"]);
    assert_eq!(child.ref_count(), Some(1));

    drop(child);
    cache.assert_empty();
}

#[test]
fn threshold_triggers_automatic_sweep() {
    let cache = TypeInfoCache::new();
    for n in 1..DEFAULT_SWEEP_THRESHOLD {
        drop(get(&cache, &byte_tuple(n)));
    }
    assert_eq!(cache.pending_len(), DEFAULT_SWEEP_THRESHOLD - 1);
    assert_eq!(cache.len(), DEFAULT_SWEEP_THRESHOLD - 1);

    drop(get(&cache, &byte_tuple(DEFAULT_SWEEP_THRESHOLD)));
    assert_eq!(cache.pending_len(), 0);
    assert!(cache.is_empty());
}

#[test]
fn small_threshold_sweeps_every_release() {
    for threshold in [0, 1] {
        let cache = TypeInfoCache::with_config(CacheConfig::new().with_sweep_threshold(threshold));
        assert_eq!(cache.config().sweep_threshold, threshold);
        drop(get(&cache, "a{sv}"));
        assert!(cache.is_empty(), "threshold {threshold}");
        assert_eq!(cache.pending_len(), 0);
    }
}

#[test]
fn large_threshold_defers_until_explicit_sweep() {
    let cache = TypeInfoCache::with_config(CacheConfig::new().with_sweep_threshold(usize::MAX));
    for n in 1..=100 {
        drop(get(&cache, &byte_tuple(n)));
    }
    assert_eq!(cache.pending_len(), 100);
    assert_eq!(cache.sweep(), 100);
    assert!(cache.is_empty());
}

// === Leak checks ===

#[test]
#[should_panic(expected = "still holds 2 descriptor(s): (iy), a(iy)")]
fn assert_empty_reports_live_descriptors() {
    let cache = TypeInfoCache::new();
    let _leaked = get(&cache, "a(iy)");
    drop(get(&cache, "a(ii)"));
    cache.assert_empty();
}

#[test]
fn dropping_cache_with_live_handles() {
    let cache = TypeInfoCache::new();
    let info = get(&cache, "a{s(iy)}");
    let alias = cache.clone();
    drop(cache);
    assert_eq!(alias.len(), 3);
    drop(alias);

    // The descriptor stays fully usable after its cache is gone.
    assert_eq!(info.element().member_info(1).type_info().query(), (3, 8));
    let copy = info.clone();
    assert_eq!(copy.ref_count(), Some(2));
    drop(copy);
    drop(info);
}

#[test]
fn debug_reports_sizes() {
    let cache = TypeInfoCache::new();
    let _info = get(&cache, "ax");
    let text = format!("{cache:?}");
    assert!(text.starts_with("TypeInfoCache"), "{text}");
    assert!(text.contains("len: 1"), "{text}");
    assert!(text.contains("pending: 0"), "{text}");
}

// === Concurrency ===

#[test]
fn concurrent_get_and_release() {
    const SIGNATURES: [&str; 6] = ["a{sv}", "(iy)", "a(iy)", "maai", "(s(xy)as)", "{ya{sv}}"];

    let cache = TypeInfoCache::with_config(CacheConfig::new().with_sweep_threshold(4));
    std::thread::scope(|scope| {
        for worker in 0..8 {
            let cache = &cache;
            scope.spawn(move || {
                for round in 0..200 {
                    let text = SIGNATURES[(worker + round) % SIGNATURES.len()];
                    let info = get(cache, text);
                    assert_eq!(info.type_string(), text);
                    let again = get(cache, text);
                    assert!(info.ptr_eq(&again));
                }
            });
        }
    });

    cache.assert_empty();
}

#[test]
fn concurrent_holders_share_one_node() {
    let cache = TypeInfoCache::new();
    let handles: Vec<TypeInfo> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| get(&cache, "a(sa{sv})")))
            .collect();
        workers
            .into_iter()
            .map(|worker| match worker.join() {
                Ok(info) => info,
                Err(_) => panic!("worker panicked"),
            })
            .collect()
    });

    assert!(handles.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
    assert_eq!(handles[0].ref_count(), Some(8));
    assert_eq!(cache.len(), 4);

    drop(handles);
    cache.assert_empty();
}
