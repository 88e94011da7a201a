//! Tile geometry: mapping points to the tile that owns them.
//!
//! The image domain is split into `N` tiles along every axis. Along axis `i`
//! each tile is `max(1, extent_i / N)` points wide, and the last tile absorbs
//! the remainder:
//!
//! ```text
//!   extent 10, N = 3  →  width 3
//!
//!   0 1 2 │ 3 4 5 │ 6 7 8 9
//!   ──────┼───────┼────────
//!   blk 0 │ blk 1 │ blk 2 (clipped to the domain, width 4)
//! ```
//!
//! When an axis is shorter than `N`, tiles along it are one point wide and
//! there are only `extent` of them. The same `N` applies to every axis, so a
//! non-cubic domain yields non-cubic tiles.

use crate::domain::{Domain, Point};
use crate::error::DomainError;

/// Partition of an image domain into a grid of tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid<const D: usize> {
    domain: Domain<D>,
    tiles_per_dimension: i64,
    tile_size: Point<D>,
    block_domain: Domain<D>,
}

impl<const D: usize> TileGrid<D> {
    /// Split `domain` into `tiles_per_dimension` tiles along each axis.
    pub fn new(domain: Domain<D>, tiles_per_dimension: i64) -> Result<Self, DomainError> {
        if tiles_per_dimension <= 0 {
            return Err(DomainError::InvalidTileCount(tiles_per_dimension));
        }

        let tile_size = Point::from_fn(|i| (domain.extent(i) / tiles_per_dimension).max(1));
        let blocks = Point::from_fn(|i| domain.extent(i).min(tiles_per_dimension) - 1);
        let block_domain = Domain::new(Point::splat(0), blocks)?;

        Ok(Self {
            domain,
            tiles_per_dimension,
            tile_size,
            block_domain,
        })
    }

    /// The full image domain.
    pub fn domain(&self) -> &Domain<D> {
        &self.domain
    }

    pub fn tiles_per_dimension(&self) -> i64 {
        self.tiles_per_dimension
    }

    /// Width of a regular (non-last) tile along each axis.
    pub fn tile_size(&self) -> &Point<D> {
        &self.tile_size
    }

    /// Domain of block coordinates, `[0, blocks_i - 1]` on each axis.
    pub fn block_domain(&self) -> &Domain<D> {
        &self.block_domain
    }

    /// Total number of tiles.
    pub fn tile_count(&self) -> usize {
        self.block_domain.size()
    }

    /// Block coordinate of the tile owning `point`.
    pub fn block_coordinates(&self, point: &Point<D>) -> Result<Point<D>, DomainError> {
        if !self.domain.contains(point) {
            return Err(DomainError::PointOutside {
                point: point.to_string(),
                domain: self.domain.to_string(),
            });
        }
        Ok(Point::from_fn(|i| {
            let block = (point[i] - self.domain.lower()[i]) / self.tile_size[i];
            block.min(self.block_domain.upper()[i])
        }))
    }

    /// Sub-domain covered by the tile at `block`.
    pub fn sub_domain(&self, block: &Point<D>) -> Result<Domain<D>, DomainError> {
        if !self.block_domain.contains(block) {
            return Err(DomainError::BlockOutsideGrid {
                block: block.to_string(),
                grid: self.block_domain.to_string(),
            });
        }
        let lower = Point::from_fn(|i| self.domain.lower()[i] + block[i] * self.tile_size[i]);
        let upper = Point::from_fn(|i| {
            if block[i] == self.block_domain.upper()[i] {
                self.domain.upper()[i]
            } else {
                lower[i] + self.tile_size[i] - 1
            }
        });
        Domain::new(lower, upper)
    }

    /// Sub-domain of the tile owning `point`.
    pub fn sub_domain_of(&self, point: &Point<D>) -> Result<Domain<D>, DomainError> {
        self.sub_domain(&self.block_coordinates(point)?)
    }

    /// Position following `(block, point)` in tile-major order.
    ///
    /// Walks the points of the current tile lexicographically, then moves on
    /// to the first point of the next block. `None` after the last point of
    /// the last tile.
    pub(crate) fn next_position(
        &self,
        block: &Point<D>,
        point: &Point<D>,
    ) -> Result<Option<(Point<D>, Point<D>)>, DomainError> {
        let tile = self.sub_domain(block)?;
        if let Some(next) = tile.successor(point) {
            return Ok(Some((*block, next)));
        }
        match self.block_domain.successor(block) {
            Some(next_block) => Ok(Some((next_block, self.sub_domain(&next_block)?.first()))),
            None => Ok(None),
        }
    }

    /// Position preceding `(block, point)` in tile-major order.
    pub(crate) fn prev_position(
        &self,
        block: &Point<D>,
        point: &Point<D>,
    ) -> Result<Option<(Point<D>, Point<D>)>, DomainError> {
        let tile = self.sub_domain(block)?;
        if let Some(prev) = tile.predecessor(point) {
            return Ok(Some((*block, prev)));
        }
        match self.block_domain.predecessor(block) {
            Some(prev_block) => Ok(Some((prev_block, self.sub_domain(&prev_block)?.last()))),
            None => Ok(None),
        }
    }

    /// First position in tile-major order.
    pub(crate) fn first_position(&self) -> Result<(Point<D>, Point<D>), DomainError> {
        let block = self.block_domain.first();
        Ok((block, self.sub_domain(&block)?.first()))
    }

    /// Last position in tile-major order.
    pub(crate) fn last_position(&self) -> Result<(Point<D>, Point<D>), DomainError> {
        let block = self.block_domain.last();
        Ok((block, self.sub_domain(&block)?.last()))
    }
}
