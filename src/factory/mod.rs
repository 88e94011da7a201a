//! Tile factories.
//!
//! A factory is the backing store behind a tiled image. The cache asks it for
//! tiles on a miss, hands dirty tiles back to it for persistence, and gives up
//! ownership of evicted tiles to it.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               TileCache                 │
//! └──────┬──────────────┬──────────────┬────┘
//!        │ produce      │ flush        │ release
//!        ▼              ▼              ▼
//! ┌─────────────────────────────────────────┐
//! │           TileFactory Trait             │
//! └────────────────────┬────────────────────┘
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │  MemoryFactory  │    │  DirectoryFactory   │
//! │ (whole image in │    │ (one JSON document  │
//! │     memory)     │    │    per tile)        │
//! └─────────────────┘    └─────────────────────┘
//! ```

mod directory;
mod memory;

pub use directory::DirectoryFactory;
pub use memory::MemoryFactory;

use crate::domain::Domain;
use crate::error::FactoryError;
use crate::image::ImageContainer;

/// Backing store that materializes and persists tiles.
///
/// All calls are blocking from the cache's point of view. Retry policy, if
/// any, belongs to the implementation.
pub trait TileFactory<const D: usize> {
    /// Pixel value type.
    type Value: Copy;

    /// Full domain of the logical image.
    fn domain(&self) -> &Domain<D>;

    /// Produce the tile covering exactly `domain`.
    fn produce_tile(
        &mut self,
        domain: &Domain<D>,
    ) -> Result<ImageContainer<Self::Value, D>, FactoryError>;

    /// Persist the current contents of `tile`. Must be idempotent.
    fn flush_tile(&mut self, tile: &ImageContainer<Self::Value, D>) -> Result<(), FactoryError>;

    /// Take back ownership of an evicted tile.
    fn release_tile(&mut self, tile: ImageContainer<Self::Value, D>) {
        drop(tile);
    }

    /// Whether the factory is usable.
    fn is_valid(&self) -> bool {
        true
    }
}

/// Counters kept by the bundled factories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactoryStats {
    /// Tiles produced
    pub produced: u64,
    /// Tiles persisted
    pub flushed: u64,
    /// Tiles handed back on eviction
    pub released: u64,
}

/// Reject sub-domains that stick out of the image.
pub(crate) fn check_inside<const D: usize>(
    image: &Domain<D>,
    requested: &Domain<D>,
) -> Result<(), FactoryError> {
    if image.contains_domain(requested) {
        Ok(())
    } else {
        Err(FactoryError::OutsideDomain {
            requested: requested.to_string(),
            domain: image.to_string(),
        })
    }
}
