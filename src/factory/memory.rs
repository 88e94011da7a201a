use tracing::trace;

use super::{check_inside, FactoryStats, TileFactory};
use crate::domain::Domain;
use crate::error::FactoryError;
use crate::image::ImageContainer;

/// Factory backed by a full image held in memory.
///
/// Tiles are copies of regions of the backing image; flushing a tile copies
/// its contents back. Useful for tests and for images that fit in memory but
/// should still be accessed through a bounded working set.
///
/// # Example
///
/// ```
/// use tiled_image::domain::{Domain, Point};
/// use tiled_image::factory::{MemoryFactory, TileFactory};
/// use tiled_image::image::ImageContainer;
///
/// let domain = Domain::from_extents([8, 8]).unwrap();
/// let mut factory = MemoryFactory::new(ImageContainer::new(domain, 0u8));
///
/// let sub = Domain::new(Point::new([0, 0]), Point::new([3, 3])).unwrap();
/// let mut tile = factory.produce_tile(&sub).unwrap();
/// tile.set(&Point::new([1, 1]), 5);
/// factory.flush_tile(&tile).unwrap();
///
/// assert_eq!(factory.image().get(&Point::new([1, 1])), Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFactory<V, const D: usize> {
    image: ImageContainer<V, D>,
    stats: FactoryStats,
}

impl<V: Copy, const D: usize> MemoryFactory<V, D> {
    /// Create a factory over `image`.
    pub fn new(image: ImageContainer<V, D>) -> Self {
        Self {
            image,
            stats: FactoryStats::default(),
        }
    }

    /// The backing image, including every flushed tile.
    pub fn image(&self) -> &ImageContainer<V, D> {
        &self.image
    }

    pub fn stats(&self) -> FactoryStats {
        self.stats
    }
}

impl<V: Copy, const D: usize> TileFactory<D> for MemoryFactory<V, D> {
    type Value = V;

    fn domain(&self) -> &Domain<D> {
        self.image.domain()
    }

    fn produce_tile(&mut self, domain: &Domain<D>) -> Result<ImageContainer<V, D>, FactoryError> {
        check_inside(self.image.domain(), domain)?;
        let tile = self
            .image
            .sub_image(domain)
            .ok_or_else(|| FactoryError::OutsideDomain {
                requested: domain.to_string(),
                domain: self.image.domain().to_string(),
            })?;
        self.stats.produced += 1;
        trace!(tile = %domain, "memory factory produced tile");
        Ok(tile)
    }

    fn flush_tile(&mut self, tile: &ImageContainer<V, D>) -> Result<(), FactoryError> {
        check_inside(self.image.domain(), tile.domain())?;
        self.image.copy_from(tile);
        self.stats.flushed += 1;
        trace!(tile = %tile.domain(), "memory factory flushed tile");
        Ok(())
    }

    fn release_tile(&mut self, tile: ImageContainer<V, D>) {
        self.stats.released += 1;
        drop(tile);
    }
}
