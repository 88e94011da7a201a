//! Tiled image facade.
//!
//! [`TiledImage`] exposes a whole image through point reads and writes while
//! only a few tiles live in memory at once. [`TileGrid`] decides which tile
//! owns a point; [`TiledCursor`] and [`Values`] walk the image tile by tile.

mod cursor;
mod grid;
mod image;

pub use cursor::{TiledCursor, Values};
pub use grid::TileGrid;
pub use image::TiledImage;
