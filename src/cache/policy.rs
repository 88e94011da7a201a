use std::collections::HashSet;

use crate::domain::Domain;
use crate::image::ImageContainer;

/// A tile held resident by the cache, with its modification state.
#[derive(Debug, Clone)]
pub struct CachedTile<V, const D: usize> {
    tile: ImageContainer<V, D>,
    dirty: bool,
}

impl<V: Copy, const D: usize> CachedTile<V, D> {
    pub(crate) fn new(tile: ImageContainer<V, D>) -> Self {
        Self { tile, dirty: false }
    }

    pub fn tile(&self) -> &ImageContainer<V, D> {
        &self.tile
    }

    pub fn domain(&self) -> &Domain<D> {
        self.tile.domain()
    }

    /// `true` if the tile was written since it was loaded or last persisted.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn tile_mut(&mut self) -> &mut ImageContainer<V, D> {
        self.dirty = true;
        &mut self.tile
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn into_tile(self) -> ImageContainer<V, D> {
        self.tile
    }
}

/// Decides which resident tile to evict when the cache needs room.
///
/// The policy sees every hit and every load, and may keep whatever
/// bookkeeping it needs. A policy instance may be shared by several caches
/// (see [`Shared`](super::Shared)); keys from all of them then land in the
/// same bookkeeping, so victims must always be chosen from the `resident`
/// set passed in.
pub trait ReadPolicy<const D: usize> {
    /// Number of tiles the cache should keep resident. A soft target: the
    /// cache grows past it when no victim can be found.
    fn capacity(&self) -> usize;

    /// A resident tile was accessed.
    fn on_hit(&mut self, domain: &Domain<D>);

    /// A tile is being loaded.
    fn on_miss(&mut self, domain: &Domain<D>);

    /// Pick a tile to evict among `resident`.
    ///
    /// Returning a key outside `resident` is a contract violation and makes
    /// the load fail. Returning `None` lets the cache grow.
    fn select_victim(&mut self, resident: &HashSet<Domain<D>>) -> Option<Domain<D>>;

    /// A tile left the cache; drop any bookkeeping about it.
    fn forget(&mut self, _domain: &Domain<D>) {}
}

/// Decides whether a tile leaving the cache (or being flushed) is persisted.
///
/// The policy only decides; the cache performs the write through the factory.
pub trait WritePolicy<V, const D: usize> {
    /// Whether `tile` must be written back through the factory.
    fn should_write_back(&mut self, tile: &CachedTile<V, D>) -> bool;

    /// `tile` was written back.
    fn on_write_back(&mut self, tile: &CachedTile<V, D>);
}
