//! Bundled eviction strategies.

use std::collections::{HashSet, VecDeque};

use lru::LruCache;

use super::ReadPolicy;
use crate::domain::Domain;

/// Smallest resident key, so fallbacks do not depend on hash order.
fn any_resident<const D: usize>(resident: &HashSet<Domain<D>>) -> Option<Domain<D>> {
    resident.iter().min().copied()
}

// =============================================================================
// FIFO
// =============================================================================

/// Evicts the tile that was loaded first.
#[derive(Debug, Clone)]
pub struct FifoReadPolicy<const D: usize> {
    capacity: usize,
    queue: VecDeque<Domain<D>>,
}

impl<const D: usize> FifoReadPolicy<D> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: VecDeque::with_capacity(capacity),
        }
    }
}

impl<const D: usize> ReadPolicy<D> for FifoReadPolicy<D> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn on_hit(&mut self, _domain: &Domain<D>) {}

    fn on_miss(&mut self, domain: &Domain<D>) {
        self.queue.retain(|d| d != domain);
        self.queue.push_back(*domain);
    }

    fn select_victim(&mut self, resident: &HashSet<Domain<D>>) -> Option<Domain<D>> {
        // Entries leave the queue in `forget`, after a successful eviction
        self.queue
            .iter()
            .find(|d| resident.contains(d))
            .copied()
            .or_else(|| any_resident(resident))
    }

    fn forget(&mut self, domain: &Domain<D>) {
        self.queue.retain(|d| d != domain);
    }
}

// =============================================================================
// LRU
// =============================================================================

/// Evicts the least recently accessed tile.
pub struct LruReadPolicy<const D: usize> {
    capacity: usize,
    recency: LruCache<Domain<D>, ()>,
}

impl<const D: usize> LruReadPolicy<D> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            recency: LruCache::unbounded(),
        }
    }

    fn touch(&mut self, domain: &Domain<D>) {
        self.recency.put(*domain, ());
    }
}

impl<const D: usize> ReadPolicy<D> for LruReadPolicy<D> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn on_hit(&mut self, domain: &Domain<D>) {
        self.touch(domain);
    }

    fn on_miss(&mut self, domain: &Domain<D>) {
        self.touch(domain);
    }

    fn select_victim(&mut self, resident: &HashSet<Domain<D>>) -> Option<Domain<D>> {
        // Iteration runs most-recent first
        let victim = self
            .recency
            .iter()
            .rev()
            .map(|(d, _)| *d)
            .find(|d| resident.contains(d));
        victim.or_else(|| any_resident(resident))
    }

    fn forget(&mut self, domain: &Domain<D>) {
        self.recency.pop(domain);
    }
}

// =============================================================================
// Last
// =============================================================================

/// Single-slot policy: always evicts the tile currently resident.
#[derive(Debug, Clone, Default)]
pub struct LastReadPolicy<const D: usize> {
    last: Option<Domain<D>>,
}

impl<const D: usize> LastReadPolicy<D> {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl<const D: usize> ReadPolicy<D> for LastReadPolicy<D> {
    fn capacity(&self) -> usize {
        1
    }

    fn on_hit(&mut self, _domain: &Domain<D>) {}

    fn on_miss(&mut self, domain: &Domain<D>) {
        self.last = Some(*domain);
    }

    fn select_victim(&mut self, resident: &HashSet<Domain<D>>) -> Option<Domain<D>> {
        match self.last {
            Some(last) if resident.contains(&last) => Some(last),
            _ => any_resident(resident),
        }
    }

    fn forget(&mut self, domain: &Domain<D>) {
        if self.last.as_ref() == Some(domain) {
            self.last = None;
        }
    }
}
