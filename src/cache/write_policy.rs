//! Bundled write-back strategies.

use super::{CachedTile, WritePolicy};

/// Persists a tile only if it was modified while resident.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteBackPolicy {
    write_backs: u64,
}

impl WriteBackPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tiles written back so far.
    pub fn write_backs(&self) -> u64 {
        self.write_backs
    }
}

impl<V: Copy, const D: usize> WritePolicy<V, D> for WriteBackPolicy {
    fn should_write_back(&mut self, tile: &CachedTile<V, D>) -> bool {
        tile.is_dirty()
    }

    fn on_write_back(&mut self, _tile: &CachedTile<V, D>) {
        self.write_backs += 1;
    }
}

/// Persists every tile that leaves the cache, modified or not.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteThroughPolicy {
    write_backs: u64,
}

impl WriteThroughPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_backs(&self) -> u64 {
        self.write_backs
    }
}

impl<V: Copy, const D: usize> WritePolicy<V, D> for WriteThroughPolicy {
    fn should_write_back(&mut self, _tile: &CachedTile<V, D>) -> bool {
        true
    }

    fn on_write_back(&mut self, _tile: &CachedTile<V, D>) {
        self.write_backs += 1;
    }
}

/// Never persists anything; modifications die with the resident tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardPolicy {
    discarded: u64,
}

impl DiscardPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dirty tiles dropped without being persisted.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

impl<V: Copy, const D: usize> WritePolicy<V, D> for DiscardPolicy {
    fn should_write_back(&mut self, tile: &CachedTile<V, D>) -> bool {
        if tile.is_dirty() {
            self.discarded += 1;
        }
        false
    }

    fn on_write_back(&mut self, _tile: &CachedTile<V, D>) {}
}
