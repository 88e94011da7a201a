//! Traversal of a tiled image, tile by tile.
//!
//! Both [`TiledCursor`] and [`Values`] visit every point exactly once in
//! tile-major order: blocks are taken lexicographically (axis 0 fastest) and
//! the points of each tile lexicographically within it. Crossing into a tile
//! that is not resident pages it in and counts one read miss.

use std::fmt;
use std::iter::FusedIterator;

use super::TiledImage;
use crate::cache::{ReadPolicy, WritePolicy};
use crate::domain::Point;
use crate::error::ImageError;
use crate::factory::TileFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position<const D: usize> {
    Within { block: Point<D>, point: Point<D> },
    End,
}

/// Bidirectional cursor over a [`TiledImage`].
///
/// Obtained from [`TiledImage::begin`], [`TiledImage::rbegin`],
/// [`TiledImage::seek`] or [`TiledImage::end`]. Two cursors compare equal when
/// they walk the same image and sit on the same position.
///
/// Writes through a cursor ([`set_value`](Self::set_value)) reach the factory
/// immediately, regardless of the image's write policy.
pub struct TiledCursor<'a, F, R: ?Sized, W: ?Sized, const D: usize>
where
    F: TileFactory<D>,
{
    image: &'a TiledImage<F, R, W, D>,
    position: Position<D>,
}

impl<'a, F, R, W, const D: usize> TiledCursor<'a, F, R, W, D>
where
    F: TileFactory<D>,
    R: ReadPolicy<D> + ?Sized,
    W: WritePolicy<F::Value, D> + ?Sized,
{
    pub(crate) fn at(
        image: &'a TiledImage<F, R, W, D>,
        block: Point<D>,
        point: Point<D>,
    ) -> Result<Self, ImageError> {
        image.load_block(&block)?;
        Ok(Self {
            image,
            position: Position::Within { block, point },
        })
    }

    pub(crate) fn end(image: &'a TiledImage<F, R, W, D>) -> Self {
        Self {
            image,
            position: Position::End,
        }
    }

    /// Current point, `None` at the end.
    pub fn point(&self) -> Option<Point<D>> {
        match self.position {
            Position::Within { point, .. } => Some(point),
            Position::End => None,
        }
    }

    /// Block coordinates of the current tile, `None` at the end.
    pub fn block(&self) -> Option<Point<D>> {
        match self.position {
            Position::Within { block, .. } => Some(block),
            Position::End => None,
        }
    }

    pub fn is_end(&self) -> bool {
        self.position == Position::End
    }

    /// Value under the cursor.
    pub fn get(&self) -> Result<F::Value, ImageError> {
        match self.position {
            Position::Within { point, .. } => self.image.value(&point),
            Position::End => Err(ImageError::CursorAtEnd),
        }
    }

    /// Store `value` under the cursor and flush its tile to the factory.
    pub fn set_value(&self, value: F::Value) -> Result<(), ImageError> {
        match self.position {
            Position::Within { point, .. } => self.image.write_through(&point, value),
            Position::End => Err(ImageError::CursorAtEnd),
        }
    }

    /// Step to the next point, moving to the next tile when the current one
    /// is exhausted. The cursor does not move if paging in the next tile
    /// fails.
    pub fn advance(&mut self) -> Result<(), ImageError> {
        let Position::Within { block, point } = self.position else {
            return Err(ImageError::CursorAtEnd);
        };

        self.position = match self.image.tile_grid().next_position(&block, &point)? {
            Some((next_block, next_point)) => {
                if next_block != block {
                    self.image.load_block(&next_block)?;
                }
                Position::Within {
                    block: next_block,
                    point: next_point,
                }
            }
            None => Position::End,
        };
        Ok(())
    }

    /// Step to the previous point. Retreating from the end lands on the last
    /// point of the last tile.
    pub fn retreat(&mut self) -> Result<(), ImageError> {
        let grid = self.image.tile_grid();
        let previous = match self.position {
            Position::Within { block, point } => grid.prev_position(&block, &point)?,
            Position::End => Some(grid.last_position()?),
        };
        let Some((prev_block, prev_point)) = previous else {
            return Err(ImageError::CursorAtBegin);
        };

        if self.block() != Some(prev_block) {
            self.image.load_block(&prev_block)?;
        }
        self.position = Position::Within {
            block: prev_block,
            point: prev_point,
        };
        Ok(())
    }
}

impl<F, R: ?Sized, W: ?Sized, const D: usize> Clone for TiledCursor<'_, F, R, W, D>
where
    F: TileFactory<D>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<F, R: ?Sized, W: ?Sized, const D: usize> Copy for TiledCursor<'_, F, R, W, D> where
    F: TileFactory<D>
{
}

impl<F, R: ?Sized, W: ?Sized, const D: usize> PartialEq for TiledCursor<'_, F, R, W, D>
where
    F: TileFactory<D>,
{
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.image, other.image) && self.position == other.position
    }
}

impl<F, R: ?Sized, W: ?Sized, const D: usize> Eq for TiledCursor<'_, F, R, W, D> where
    F: TileFactory<D>
{
}

impl<F, R: ?Sized, W: ?Sized, const D: usize> fmt::Debug for TiledCursor<'_, F, R, W, D>
where
    F: TileFactory<D>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TiledCursor")
            .field("position", &self.position)
            .finish()
    }
}

// =============================================================================
// Values
// =============================================================================

/// Iterator over `(point, value)` pairs of a [`TiledImage`].
///
/// Created by [`TiledImage::values`]. Reading a point may page in its tile and
/// fail, so items are `Result`s; iteration stops after the first error.
pub struct Values<'a, F, R: ?Sized, W: ?Sized, const D: usize>
where
    F: TileFactory<D>,
{
    image: &'a TiledImage<F, R, W, D>,
    front: Option<(Point<D>, Point<D>)>,
    back: Option<(Point<D>, Point<D>)>,
    remaining: usize,
}

impl<'a, F, R, W, const D: usize> Values<'a, F, R, W, D>
where
    F: TileFactory<D>,
    R: ReadPolicy<D> + ?Sized,
    W: WritePolicy<F::Value, D> + ?Sized,
{
    pub(crate) fn new(image: &'a TiledImage<F, R, W, D>) -> Self {
        let grid = image.tile_grid();
        Self {
            image,
            front: grid.first_position().ok(),
            back: grid.last_position().ok(),
            remaining: grid.domain().size(),
        }
    }

    fn read(&mut self, point: Point<D>) -> Result<(Point<D>, F::Value), ImageError> {
        let result = self.image.value(&point).map(|value| (point, value));
        if result.is_err() {
            self.remaining = 0;
        }
        result
    }
}

impl<F, R, W, const D: usize> Iterator for Values<'_, F, R, W, D>
where
    F: TileFactory<D>,
    R: ReadPolicy<D> + ?Sized,
    W: WritePolicy<F::Value, D> + ?Sized,
{
    type Item = Result<(Point<D>, F::Value), ImageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (block, point) = self.front?;
        self.remaining -= 1;
        self.front = self
            .image
            .tile_grid()
            .next_position(&block, &point)
            .ok()
            .flatten();
        Some(self.read(point))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<F, R, W, const D: usize> DoubleEndedIterator for Values<'_, F, R, W, D>
where
    F: TileFactory<D>,
    R: ReadPolicy<D> + ?Sized,
    W: WritePolicy<F::Value, D> + ?Sized,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (block, point) = self.back?;
        self.remaining -= 1;
        self.back = self
            .image
            .tile_grid()
            .prev_position(&block, &point)
            .ok()
            .flatten();
        Some(self.read(point))
    }
}

impl<F, R, W, const D: usize> ExactSizeIterator for Values<'_, F, R, W, D>
where
    F: TileFactory<D>,
    R: ReadPolicy<D> + ?Sized,
    W: WritePolicy<F::Value, D> + ?Sized,
{
}

impl<F, R, W, const D: usize> FusedIterator for Values<'_, F, R, W, D>
where
    F: TileFactory<D>,
    R: ReadPolicy<D> + ?Sized,
    W: WritePolicy<F::Value, D> + ?Sized,
{
}
