//! Reusable-handle pools
//!
//! Sustained spawning would otherwise build a fresh scene object for every
//! bullet and enemy. The pools keep released visual handles on a free list
//! so steady-state play allocates nothing. Handles come back with stale
//! transform state; callers reposition before reuse.

use crate::scene::VisualHandle;

/// Free-list cache of reusable handles for a single entity category.
///
/// `acquire_with` pops a free handle, or runs the supplied constructor when
/// the list is empty. Growth is unbounded and provenance is never checked;
/// the simulation step is the only caller.
#[derive(Debug)]
pub struct HandlePool<H> {
    free: Vec<H>,
    constructed: usize,
}

impl<H> Default for HandlePool<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> HandlePool<H> {
    pub fn new() -> Self {
        Self {
            free: Vec::new(),
            constructed: 0,
        }
    }

    /// Take a free handle, constructing a new one if none is available.
    pub fn acquire_with(&mut self, build: impl FnOnce() -> H) -> H {
        match self.free.pop() {
            Some(handle) => handle,
            None => {
                self.constructed += 1;
                build()
            }
        }
    }

    /// Return a handle for reuse. Transform state is NOT reset.
    pub fn release(&mut self, handle: H) {
        self.free.push(handle);
    }

    /// Total handles ever constructed (reuse does not count)
    pub fn constructed(&self) -> usize {
        self.constructed
    }

    /// Handles currently sitting on the free list
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

/// Pools for the categories that opt into reuse. Bullets and enemies churn
/// fast enough to pool; power-ups are rare and spawn fresh visuals.
#[derive(Debug, Default)]
pub struct VisualPools {
    pub bullets: HandlePool<VisualHandle>,
    pub enemies: HandlePool<VisualHandle>,
}

impl VisualPools {
    pub fn new() -> Self {
        Self::default()
    }
}
