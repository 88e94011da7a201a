//! Test utilities for integration tests.
//!
//! Provides a factory that records every call made to it, so tests can assert
//! on the exact sequence of loads and write-backs the cache performs.

use tiled_image::cache::{shared, ReadPolicy, Shared, WritePolicy};
use tiled_image::domain::{Domain, Point};
use tiled_image::error::FactoryError;
use tiled_image::factory::{MemoryFactory, TileFactory};
use tiled_image::image::ImageContainer;
use tiled_image::tiled::TiledImage;

// =============================================================================
// Recording Factory
// =============================================================================

/// One call observed by [`RecordingFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<const D: usize> {
    Produced(Domain<D>),
    Flushed(Domain<D>),
    Released(Domain<D>),
}

/// In-memory factory that logs every call and can be told to fail flushes.
pub struct RecordingFactory<const D: usize> {
    inner: MemoryFactory<u32, D>,
    events: Vec<Event<D>>,
    fail_flushes: bool,
}

impl<const D: usize> RecordingFactory<D> {
    pub fn new(image: ImageContainer<u32, D>) -> Self {
        Self {
            inner: MemoryFactory::new(image),
            events: Vec::new(),
            fail_flushes: false,
        }
    }

    pub fn events(&self) -> &[Event<D>] {
        &self.events
    }

    /// Drain the log.
    pub fn take_events(&mut self) -> Vec<Event<D>> {
        std::mem::take(&mut self.events)
    }

    pub fn set_fail_flushes(&mut self, fail: bool) {
        self.fail_flushes = fail;
    }

    /// Number of logged flushes.
    pub fn flush_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Flushed(_)))
            .count()
    }

    /// Persisted value at `point`, ignoring anything still resident in a cache.
    pub fn stored(&self, point: &Point<D>) -> Option<u32> {
        self.inner.image().get(point)
    }
}

impl<const D: usize> TileFactory<D> for RecordingFactory<D> {
    type Value = u32;

    fn domain(&self) -> &Domain<D> {
        self.inner.domain()
    }

    fn produce_tile(&mut self, domain: &Domain<D>) -> Result<ImageContainer<u32, D>, FactoryError> {
        let tile = self.inner.produce_tile(domain)?;
        self.events.push(Event::Produced(*domain));
        Ok(tile)
    }

    fn flush_tile(&mut self, tile: &ImageContainer<u32, D>) -> Result<(), FactoryError> {
        if self.fail_flushes {
            return Err(FactoryError::Io {
                path: tile.domain().to_string(),
                message: "injected flush failure".to_string(),
            });
        }
        self.inner.flush_tile(tile)?;
        self.events.push(Event::Flushed(*tile.domain()));
        Ok(())
    }

    fn release_tile(&mut self, tile: ImageContainer<u32, D>) {
        self.events.push(Event::Released(*tile.domain()));
        self.inner.release_tile(tile);
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Value stored at `(x, y)` by [`gradient`].
pub fn gradient_value(point: &Point<2>) -> u32 {
    (point[0] + 100 * point[1]) as u32
}

/// 2D image where each point holds `x + 100 * y`.
pub fn gradient(extents: [i64; 2]) -> ImageContainer<u32, 2> {
    let domain = Domain::from_extents(extents).unwrap();
    ImageContainer::from_fn(domain, |p| gradient_value(&p))
}

/// Recording factory over a [`gradient`] image.
pub fn recording_factory(extents: [i64; 2]) -> Shared<RecordingFactory<2>> {
    shared(RecordingFactory::new(gradient(extents)))
}

/// Build a tiled image, panicking on invalid arguments.
pub fn tiled<F, R, W, const D: usize>(
    factory: &Shared<F>,
    read_policy: &Shared<R>,
    write_policy: &Shared<W>,
    tiles_per_dimension: i64,
) -> TiledImage<F, R, W, D>
where
    F: TileFactory<D>,
    R: ReadPolicy<D>,
    W: WritePolicy<F::Value, D>,
{
    TiledImage::new(
        factory.clone(),
        read_policy.clone(),
        write_policy.clone(),
        tiles_per_dimension,
    )
    .unwrap()
}

/// Sub-domain from inclusive bounds.
pub fn rect(lower: [i64; 2], upper: [i64; 2]) -> Domain<2> {
    Domain::new(Point::new(lower), Point::new(upper)).unwrap()
}
