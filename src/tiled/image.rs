use std::cell::RefCell;

use tracing::debug;

use super::cursor::{TiledCursor, Values};
use super::TileGrid;
use crate::cache::{MissCounters, ReadPolicy, Shared, TileCache, WritePolicy};
use crate::domain::{Domain, Point};
use crate::error::{CacheError, DomainError, ImageError};
use crate::factory::TileFactory;

/// Point-addressable view of a large image, paged in tile by tile.
///
/// The image domain comes from the factory and is cut into a grid of
/// `tiles_per_dimension` tiles per axis (see [`TileGrid`]). Reads and writes go
/// through an internal [`TileCache`] that keeps a bounded number of tiles
/// resident.
///
/// The factory and both policies are borrowed through [`Shared`] handles and
/// must outlive the image. Two images built over the same policy handles share
/// eviction behavior.
///
/// Accessors take `&self`; the cache sits behind a `RefCell`, so cursors can
/// hold a plain reference to the image while still paging tiles in.
///
/// Dropping the image drops resident tiles without writing them back. Call
/// [`flush`](Self::flush) or
/// [`clear_cache_and_reset_misses`](Self::clear_cache_and_reset_misses) first
/// to persist pending modifications.
///
/// # Example
///
/// ```
/// use tiled_image::cache::{shared, LruReadPolicy, WriteBackPolicy};
/// use tiled_image::domain::{Domain, Point};
/// use tiled_image::factory::MemoryFactory;
/// use tiled_image::image::ImageContainer;
/// use tiled_image::tiled::TiledImage;
///
/// let domain = Domain::from_extents([100, 100]).unwrap();
/// let factory = shared(MemoryFactory::new(ImageContainer::new(domain, 0u8)));
/// let image = TiledImage::new(
///     factory.clone(),
///     shared(LruReadPolicy::new(4)),
///     shared(WriteBackPolicy::new()),
///     10,
/// )
/// .unwrap();
///
/// image.set_value(&Point::new([42, 17]), 9).unwrap();
/// assert_eq!(image.value(&Point::new([42, 17])).unwrap(), 9);
/// assert_eq!(image.cache_miss_writes(), 1);
/// ```
pub struct TiledImage<F, R: ?Sized, W: ?Sized, const D: usize>
where
    F: TileFactory<D>,
{
    factory: Shared<F>,
    grid: TileGrid<D>,
    cache: RefCell<TileCache<F, R, W, D>>,
}

impl<F, R, W, const D: usize> TiledImage<F, R, W, D>
where
    F: TileFactory<D>,
    R: ReadPolicy<D> + ?Sized,
    W: WritePolicy<F::Value, D> + ?Sized,
{
    /// Create a tiled image over `factory`'s domain.
    ///
    /// Fails if `tiles_per_dimension` is not positive or the factory reports
    /// an invalid state.
    pub fn new(
        factory: Shared<F>,
        read_policy: Shared<R>,
        write_policy: Shared<W>,
        tiles_per_dimension: i64,
    ) -> Result<Self, ImageError> {
        let domain = {
            let factory = factory.borrow();
            if !factory.is_valid() {
                return Err(ImageError::InvalidFactory(format!(
                    "factory over {} reports an invalid state",
                    factory.domain()
                )));
            }
            *factory.domain()
        };

        let grid = TileGrid::new(domain, tiles_per_dimension)?;
        debug!(
            domain = %domain,
            tiles = grid.tile_count(),
            tile_size = %grid.tile_size(),
            "created tiled image"
        );

        let cache = TileCache::new(factory.clone(), read_policy, write_policy, grid);
        Ok(Self {
            factory,
            grid,
            cache: RefCell::new(cache),
        })
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Full image domain, as reported by the factory.
    pub fn domain(&self) -> Domain<D> {
        *self.factory.borrow().domain()
    }

    /// Domain of block coordinates.
    pub fn block_domain(&self) -> Domain<D> {
        *self.grid.block_domain()
    }

    pub fn tile_grid(&self) -> &TileGrid<D> {
        &self.grid
    }

    pub fn block_coordinates(&self, point: &Point<D>) -> Result<Point<D>, ImageError> {
        Ok(self.grid.block_coordinates(point)?)
    }

    pub fn sub_domain(&self, block: &Point<D>) -> Result<Domain<D>, ImageError> {
        Ok(self.grid.sub_domain(block)?)
    }

    /// Sub-domain of the tile owning `point`.
    pub fn sub_domain_of(&self, point: &Point<D>) -> Result<Domain<D>, ImageError> {
        Ok(self.grid.sub_domain_of(point)?)
    }

    fn check_inside(&self, point: &Point<D>) -> Result<(), DomainError> {
        if self.grid.domain().contains(point) {
            Ok(())
        } else {
            Err(DomainError::PointOutside {
                point: point.to_string(),
                domain: self.grid.domain().to_string(),
            })
        }
    }

    // =========================================================================
    // Point access
    // =========================================================================

    /// Value at `point`, paging its tile in if needed.
    pub fn value(&self, point: &Point<D>) -> Result<F::Value, ImageError> {
        self.check_inside(point)?;

        let mut cache = self.cache.borrow_mut();
        if let Some(value) = cache.read(point) {
            return Ok(value);
        }

        let domain = self.grid.sub_domain_of(point)?;
        cache.materialize(&domain)?;
        cache.read(point).ok_or_else(|| {
            CacheError::NotResident {
                domain: domain.to_string(),
            }
            .into()
        })
    }

    /// Store `value` at `point`, paging its tile in if needed.
    ///
    /// Whether and when the change reaches the factory is up to the write
    /// policy.
    pub fn set_value(&self, point: &Point<D>, value: F::Value) -> Result<(), ImageError> {
        self.check_inside(point)?;

        let mut cache = self.cache.borrow_mut();
        if cache.write(point, value) {
            return Ok(());
        }

        let domain = self.grid.sub_domain_of(point)?;
        cache.materialize(&domain)?;
        if cache.write(point, value) {
            Ok(())
        } else {
            Err(CacheError::NotResident {
                domain: domain.to_string(),
            }
            .into())
        }
    }

    /// Make the tile at `block` resident. A load counts as a read miss.
    pub(crate) fn load_block(&self, block: &Point<D>) -> Result<(), ImageError> {
        let domain = self.grid.sub_domain(block)?;
        let mut cache = self.cache.borrow_mut();
        if cache.lookup(&domain).is_none() {
            cache.record_read_miss();
            cache.materialize(&domain)?;
        }
        Ok(())
    }

    /// Write `value` and persist its tile right away, whatever the write
    /// policy says.
    pub(crate) fn write_through(&self, point: &Point<D>, value: F::Value) -> Result<(), ImageError> {
        self.check_inside(point)?;

        let mut cache = self.cache.borrow_mut();
        if cache.write_through(point, value)? {
            return Ok(());
        }

        let domain = self.grid.sub_domain_of(point)?;
        cache.materialize(&domain)?;
        if cache.write_through(point, value)? {
            Ok(())
        } else {
            Err(CacheError::NotResident {
                domain: domain.to_string(),
            }
            .into())
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Cursor on the first point, in tile-major order.
    pub fn begin(&self) -> Result<TiledCursor<'_, F, R, W, D>, ImageError> {
        let (block, point) = self.grid.first_position()?;
        TiledCursor::at(self, block, point)
    }

    /// End sentinel.
    pub fn end(&self) -> TiledCursor<'_, F, R, W, D> {
        TiledCursor::end(self)
    }

    /// Cursor on the last point, for walking backwards with
    /// [`TiledCursor::retreat`].
    pub fn rbegin(&self) -> Result<TiledCursor<'_, F, R, W, D>, ImageError> {
        let (block, point) = self.grid.last_position()?;
        TiledCursor::at(self, block, point)
    }

    /// Cursor positioned directly on `point`, without walking from the start.
    pub fn seek(&self, point: &Point<D>) -> Result<TiledCursor<'_, F, R, W, D>, ImageError> {
        let block = self.grid.block_coordinates(point)?;
        TiledCursor::at(self, block, *point)
    }

    /// Every `(point, value)` pair in tile-major order.
    ///
    /// Double-ended: `.rev()` walks from the last point back to the first.
    pub fn values(&self) -> Values<'_, F, R, W, D> {
        Values::new(self)
    }

    // =========================================================================
    // Cache diagnostics
    // =========================================================================

    pub fn cache_miss_reads(&self) -> u64 {
        self.cache.borrow().miss_counters().reads
    }

    pub fn cache_miss_writes(&self) -> u64 {
        self.cache.borrow().miss_counters().writes
    }

    pub fn miss_counters(&self) -> MissCounters {
        self.cache.borrow().miss_counters()
    }

    /// Evict every tile (honoring the write policy) and zero the miss
    /// counters.
    pub fn clear_cache_and_reset_misses(&self) -> Result<(), ImageError> {
        Ok(self.cache.borrow_mut().clear_and_reset_counters()?)
    }

    /// Write back resident tiles as the write policy decides, keeping them
    /// resident.
    pub fn flush(&self) -> Result<(), ImageError> {
        Ok(self.cache.borrow_mut().flush()?)
    }

    /// Number of resident tiles.
    pub fn resident_tiles(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_valid(&self) -> bool {
        self.cache.borrow().is_valid()
    }
}
