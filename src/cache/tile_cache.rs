//! Registry of resident tiles.
//!
//! The cache has a fast path and a slow path:
//!
//! - [`TileCache::read`] / [`TileCache::write`] resolve the owning tile and
//!   touch it only if it is already resident. A miss bumps a counter and
//!   returns `None`/`false`; nothing is allocated.
//! - [`TileCache::materialize`] loads a tile through the factory, evicting a
//!   victim chosen by the read policy first when the cache is full.
//!
//! Callers run the fast path, and on a miss materialize and retry.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use super::{CachedTile, ReadPolicy, Shared, WritePolicy};
use crate::domain::{Domain, Point};
use crate::error::{CacheError, FactoryError};
use crate::factory::TileFactory;
use crate::image::ImageContainer;
use crate::tiled::TileGrid;

/// Cache-miss counters.
///
/// Both counters only grow until [`TileCache::clear_and_reset_counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissCounters {
    /// Fast-path reads that found no resident tile
    pub reads: u64,
    /// Fast-path writes that found no resident tile
    pub writes: u64,
}

/// Bounded set of resident tiles keyed by sub-domain.
///
/// The factory and both policies are shared handles: the cache uses them but
/// does not own them. Resident tiles are owned by the cache until eviction,
/// when they are handed to [`TileFactory::release_tile`].
pub struct TileCache<F, R: ?Sized, W: ?Sized, const D: usize>
where
    F: TileFactory<D>,
{
    factory: Shared<F>,
    read_policy: Shared<R>,
    write_policy: Shared<W>,
    grid: TileGrid<D>,
    tiles: HashMap<Domain<D>, CachedTile<F::Value, D>>,
    misses: MissCounters,
}

impl<F, R, W, const D: usize> TileCache<F, R, W, D>
where
    F: TileFactory<D>,
    R: ReadPolicy<D> + ?Sized,
    W: WritePolicy<F::Value, D> + ?Sized,
{
    /// Create an empty cache over tiles laid out by `grid`.
    pub fn new(
        factory: Shared<F>,
        read_policy: Shared<R>,
        write_policy: Shared<W>,
        grid: TileGrid<D>,
    ) -> Self {
        Self {
            factory,
            read_policy,
            write_policy,
            grid,
            tiles: HashMap::new(),
            misses: MissCounters::default(),
        }
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Resident tile for `domain`, without loading or bookkeeping.
    pub fn lookup(&self, domain: &Domain<D>) -> Option<&ImageContainer<F::Value, D>> {
        self.tiles.get(domain).map(CachedTile::tile)
    }

    pub fn contains(&self, domain: &Domain<D>) -> bool {
        self.tiles.contains_key(domain)
    }

    /// Number of resident tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Soft capacity as reported by the read policy (at least one tile).
    pub fn capacity(&self) -> usize {
        self.read_policy.borrow().capacity().max(1)
    }

    /// Keys of the resident tiles.
    pub fn resident(&self) -> HashSet<Domain<D>> {
        self.tiles.keys().copied().collect()
    }

    pub fn grid(&self) -> &TileGrid<D> {
        &self.grid
    }

    // =========================================================================
    // Slow path
    // =========================================================================

    /// Return the resident tile for `domain`, loading it if needed.
    ///
    /// When the cache is at capacity, victims chosen by the read policy are
    /// evicted first. A load is never refused for lack of space: if the policy
    /// offers no victim the registry grows past capacity.
    pub fn materialize(
        &mut self,
        domain: &Domain<D>,
    ) -> Result<&ImageContainer<F::Value, D>, CacheError> {
        if !self.tiles.contains_key(domain) {
            self.make_room()?;
            self.load(domain)?;
        }
        self.tiles
            .get(domain)
            .map(CachedTile::tile)
            .ok_or_else(|| CacheError::NotResident {
                domain: domain.to_string(),
            })
    }

    fn make_room(&mut self) -> Result<(), CacheError> {
        let capacity = self.capacity();
        while self.tiles.len() >= capacity {
            let resident = self.resident();
            let victim = self.read_policy.borrow_mut().select_victim(&resident);
            match victim {
                Some(victim) if resident.contains(&victim) => self.evict(&victim)?,
                Some(victim) => {
                    return Err(CacheError::VictimNotResident {
                        victim: victim.to_string(),
                    })
                }
                None => {
                    warn!(
                        resident = self.tiles.len(),
                        capacity, "no eviction candidate, growing tile cache past capacity"
                    );
                    break;
                }
            }
        }
        Ok(())
    }

    fn load(&mut self, domain: &Domain<D>) -> Result<(), CacheError> {
        let tile = self.factory.borrow_mut().produce_tile(domain)?;
        if tile.domain() != domain {
            return Err(FactoryError::WrongTileDomain {
                requested: domain.to_string(),
                produced: tile.domain().to_string(),
            }
            .into());
        }

        self.read_policy.borrow_mut().on_miss(domain);
        self.tiles.insert(*domain, CachedTile::new(tile));
        debug!(tile = %domain, resident = self.tiles.len(), "loaded tile");
        Ok(())
    }

    /// Persist `domain` if the write policy asks for it. The tile stays
    /// resident whatever happens.
    fn write_back(&mut self, domain: &Domain<D>) -> Result<(), CacheError> {
        let Some(entry) = self.tiles.get_mut(domain) else {
            return Ok(());
        };

        let mut policy = self.write_policy.borrow_mut();
        if policy.should_write_back(entry) {
            self.factory.borrow_mut().flush_tile(entry.tile())?;
            policy.on_write_back(entry);
            entry.mark_clean();
            debug!(tile = %domain, "wrote tile back");
        }
        Ok(())
    }

    /// Evict one tile. If the write-back fails the tile stays resident.
    fn evict(&mut self, domain: &Domain<D>) -> Result<(), CacheError> {
        self.write_back(domain)?;

        if let Some(entry) = self.tiles.remove(domain) {
            self.read_policy.borrow_mut().forget(domain);
            self.factory.borrow_mut().release_tile(entry.into_tile());
            debug!(tile = %domain, "evicted tile");
        }
        Ok(())
    }

    // =========================================================================
    // Fast path
    // =========================================================================

    /// Value at `point` if its tile is resident.
    ///
    /// A miss bumps the read-miss counter. Points outside the image always
    /// miss and are not counted.
    pub fn read(&mut self, point: &Point<D>) -> Option<F::Value> {
        let domain = self.grid.sub_domain_of(point).ok()?;
        match self.tiles.get(&domain) {
            Some(entry) => {
                self.read_policy.borrow_mut().on_hit(&domain);
                entry.tile().get(point)
            }
            None => {
                self.misses.reads += 1;
                trace!(%point, "read miss");
                None
            }
        }
    }

    /// Store `value` at `point` if its tile is resident, marking it dirty.
    ///
    /// Returns `false` on a miss, leaving the image untouched.
    pub fn write(&mut self, point: &Point<D>, value: F::Value) -> bool {
        let Ok(domain) = self.grid.sub_domain_of(point) else {
            return false;
        };
        match self.tiles.get_mut(&domain) {
            Some(entry) => {
                self.read_policy.borrow_mut().on_hit(&domain);
                entry.tile_mut().set(point, value)
            }
            None => {
                self.misses.writes += 1;
                trace!(%point, "write miss");
                false
            }
        }
    }

    /// Like [`write`](Self::write), then persist the tile immediately,
    /// bypassing the write policy.
    pub fn write_through(&mut self, point: &Point<D>, value: F::Value) -> Result<bool, CacheError> {
        let domain = self.grid.sub_domain_of(point)?;
        let Some(entry) = self.tiles.get_mut(&domain) else {
            self.misses.writes += 1;
            trace!(%point, "write miss");
            return Ok(false);
        };

        self.read_policy.borrow_mut().on_hit(&domain);
        entry.tile_mut().set(point, value);
        self.factory.borrow_mut().flush_tile(entry.tile())?;
        entry.mark_clean();
        Ok(true)
    }

    /// Count a read miss observed outside [`read`](Self::read), e.g. when a
    /// cursor crosses into a tile that is not resident.
    pub(crate) fn record_read_miss(&mut self) {
        self.misses.reads += 1;
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Write back every resident tile the write policy selects, keeping
    /// them all resident.
    pub fn flush(&mut self) -> Result<(), CacheError> {
        let mut keys: Vec<_> = self.tiles.keys().copied().collect();
        keys.sort();
        for domain in &keys {
            self.write_back(domain)?;
        }
        debug!(tiles = keys.len(), "flushed tile cache");
        Ok(())
    }

    /// Evict every tile (with write-back) and zero both miss counters.
    pub fn clear_and_reset_counters(&mut self) -> Result<(), CacheError> {
        let mut keys: Vec<_> = self.tiles.keys().copied().collect();
        keys.sort();
        for domain in &keys {
            self.evict(domain)?;
        }
        self.misses = MissCounters::default();
        debug!(evicted = keys.len(), "cleared tile cache");
        Ok(())
    }

    pub fn miss_counters(&self) -> MissCounters {
        self.misses
    }

    /// Factory is valid and every resident tile sits where the grid says.
    pub fn is_valid(&self) -> bool {
        self.factory.borrow().is_valid()
            && self.tiles.iter().all(|(key, entry)| {
                entry.domain() == key
                    && self
                        .grid
                        .block_coordinates(key.lower())
                        .and_then(|block| self.grid.sub_domain(&block))
                        .is_ok_and(|expected| expected == *key)
            })
    }
}

// =============================================================================
// Tests
// =============================================================================
