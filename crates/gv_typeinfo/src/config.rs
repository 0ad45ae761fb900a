//! Cache configuration.

/// Pending descriptors that trigger an automatic sweep.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 32;

/// Tuning knobs for a [`TypeInfoCache`](crate::TypeInfoCache).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Sweep as soon as this many unused descriptors are queued.
    ///
    /// Higher values batch more reclamation per lock acquisition and give
    /// short-lived types more chance to be reused; 0 and 1 both sweep on
    /// every release.
    pub sweep_threshold: usize,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sweep_threshold(mut self, sweep_threshold: usize) -> Self {
        self.sweep_threshold = sweep_threshold;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }
}
