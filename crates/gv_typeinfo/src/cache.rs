//! Interning cache for container descriptors.
//!
//! One descriptor exists per container signature. Lookups and inserts go
//! through a single mutex; reference counting on handles is lock-free except
//! when a count reaches zero.
//!
//! # Deferred reclamation
//!
//! A descriptor whose count drops to zero is not destroyed. It is queued on a
//! pending list, which takes one reference of its own (the *claim*), and stays
//! in the table where lookups can still find and revive it. A sweep pops each
//! pending entry and drops its claim; only a descriptor left at zero is removed
//! from the table and destroyed. Destroying a descriptor releases its
//! children, which may queue them in turn, so a sweep repeats until a pass
//! reclaims nothing.
//!
//! A sweep runs automatically whenever the pending list reaches
//! [`CacheConfig::sweep_threshold`] entries.
//!
//! # Locking
//!
//! The lock is never held while building a descriptor or destroying one:
//! children are fetched (each under its own short lock) before the parent is
//! inserted, and swept nodes are dropped after the lock is released. Two
//! threads racing to build the same signature both build it; the second to
//! insert adopts the first's node and discards its own.

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::{Arc, OnceLock};

use gv_signature::{Signature, TypeClass};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::build::{build, Descriptor};
use crate::info::{ContainerNode, TypeInfo};
use crate::{CacheConfig, TypeInfoError};

/// Thread-safe interning cache of type descriptors.
///
/// Cloning a `TypeInfoCache` yields another handle to the same cache.
/// Descriptors outlive their cache safely: once the cache is gone, a
/// descriptor is freed as soon as its last handle drops.
#[derive(Clone)]
pub struct TypeInfoCache {
    shared: Arc<CacheShared>,
}

pub(crate) struct CacheShared {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    /// Signature to interned node. Keys are owned copies of the signature.
    table: FxHashMap<Box<str>, Arc<ContainerNode>>,
    /// Nodes whose count reached zero since the last sweep. Each entry
    /// holds one claim on its node's count.
    pending: Vec<Arc<ContainerNode>>,
}

static GLOBAL: OnceLock<TypeInfoCache> = OnceLock::new();

impl TypeInfoCache {
    /// Create an empty cache with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            shared: Arc::new(CacheShared {
                config,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// The process-wide cache, created on first use.
    pub fn global() -> &'static TypeInfoCache {
        GLOBAL.get_or_init(TypeInfoCache::new)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.shared.config
    }

    /// Get the descriptor for `signature`.
    ///
    /// Basic types are returned without touching the cache. Containers are
    /// looked up and built on a miss, together with any missing children.
    ///
    /// # Panics
    /// Panics if `signature` contains wildcards; use [`try_get`](Self::try_get)
    /// for unchecked input.
    pub fn get(&self, signature: Signature<'_>) -> TypeInfo {
        assert!(
            signature.is_definite(),
            "cannot lay out indefinite type {signature}"
        );
        match signature.class() {
            TypeClass::Basic(basic) => TypeInfo::basic(basic),
            _ => self.get_container(signature),
        }
    }

    /// Validate `signature` and get its descriptor.
    pub fn try_get(&self, signature: &str) -> Result<TypeInfo, TypeInfoError> {
        let parsed = Signature::parse(signature)?;
        if !parsed.is_definite() {
            return Err(TypeInfoError::Indefinite {
                signature: signature.to_owned(),
            });
        }
        Ok(self.get(parsed))
    }

    fn lookup(&self, signature: &str) -> Option<TypeInfo> {
        let state = self.shared.state.lock();
        state.table.get(signature).map(TypeInfo::acquire)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(signature = %signature))]
    fn get_container(&self, signature: Signature<'_>) -> TypeInfo {
        if let Some(hit) = self.lookup(signature.as_str()) {
            trace!("cache hit");
            return hit;
        }

        trace!("cache miss, building");
        let descriptor = build(self, signature);

        let mut state = self.shared.state.lock();
        // Another thread may have inserted while we were building.
        if let Some(existing) = state.table.get(signature.as_str()).map(TypeInfo::acquire) {
            drop(state);
            trace!("lost insert race, discarding duplicate");
            return existing;
        }

        let node = Arc::new(self.new_node(signature, descriptor));
        state.table.insert(Box::from(signature.as_str()), Arc::clone(&node));
        drop(state);

        trace!("inserted");
        TypeInfo::from_new_node(node)
    }

    fn new_node(&self, signature: Signature<'_>, descriptor: Descriptor) -> ContainerNode {
        let Descriptor {
            class,
            alignment,
            fixed_size,
            kind,
        } = descriptor;
        ContainerNode {
            signature: Box::from(signature.as_str()),
            class,
            alignment,
            fixed_size,
            kind,
            refs: 1.into(),
            cache: Arc::downgrade(&self.shared),
        }
    }

    /// Reclaim every queued descriptor that is still unused.
    ///
    /// Returns the number of descriptors destroyed, children included.
    pub fn sweep(&self) -> usize {
        self.shared.sweep()
    }

    /// Number of interned container descriptors, including unused ones
    /// awaiting a sweep.
    pub fn len(&self) -> usize {
        self.shared.state.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of descriptors queued for the next sweep.
    pub fn pending_len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Signatures of all interned container descriptors, sorted.
    pub fn signatures(&self) -> Vec<String> {
        let state = self.shared.state.lock();
        let mut signatures: Vec<String> = state.table.keys().map(ToString::to_string).collect();
        drop(state);
        signatures.sort_unstable();
        signatures
    }

    /// Sweep, then assert that no descriptors remain.
    ///
    /// Diagnostic hook for leak checks at the end of a test.
    ///
    /// # Panics
    /// Panics, listing the survivors, if any descriptor is still referenced.
    pub fn assert_empty(&self) {
        self.sweep();
        let live = self.signatures();
        assert!(
            live.is_empty(),
            "type-info cache still holds {} descriptor(s): {}",
            live.len(),
            live.join(", ")
        );
    }
}

impl CacheShared {
    /// Queue a node whose count just reached zero.
    pub(crate) fn release(&self, node: Arc<ContainerNode>) {
        let should_sweep = {
            let mut state = self.state.lock();
            node.refs.fetch_add(1, Ordering::Relaxed);
            trace!(signature = %node.signature, "queued unused descriptor");
            state.pending.push(node);
            state.pending.len() >= self.config.sweep_threshold
        };

        if should_sweep {
            self.sweep();
        }
    }

    fn sweep(&self) -> usize {
        let mut reclaimed = 0;
        loop {
            let dead = self.state.lock().collect();
            if dead.is_empty() {
                break;
            }
            reclaimed += dead.len();
            // Dropping the nodes releases their children, which takes the
            // lock again.
            drop(dead);
        }

        if reclaimed > 0 {
            debug!(reclaimed, "swept type-info cache");
        }
        reclaimed
    }
}

impl CacheState {
    /// Drop each pending claim; unlink and return the nodes left unused.
    fn collect(&mut self) -> Vec<Arc<ContainerNode>> {
        let mut dead = Vec::new();

        for node in std::mem::take(&mut self.pending) {
            if node.refs.fetch_sub(1, Ordering::AcqRel) != 1 {
                // Revived by a lookup since it was queued.
                continue;
            }
            let is_current = self
                .table
                .get(&*node.signature)
                .is_some_and(|current| Arc::ptr_eq(current, &node));
            if is_current {
                self.table.remove(&*node.signature);
            }
            dead.push(node);
        }

        dead
    }
}

impl Default for TypeInfoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeInfoCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("TypeInfoCache")
            .field("len", &state.table.len())
            .field("pending", &state.pending.len())
            .field("config", &self.shared.config)
            .finish()
    }
}

#[cfg(test)]
mod tests;
