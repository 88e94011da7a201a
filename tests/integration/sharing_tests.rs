//! Shared collaborator tests.
//!
//! Tests verify:
//! - Policies shared by several images keep one set of bookkeeping
//! - Policies can be chosen at runtime behind trait objects
//! - Images over one factory see each other's persisted writes

use tiled_image::cache::{
    shared, FifoReadPolicy, LruReadPolicy, ReadPolicy, Shared, WriteBackPolicy, WritePolicy,
    WriteThroughPolicy,
};
use tiled_image::domain::{Domain, Point};
use tiled_image::factory::MemoryFactory;
use tiled_image::image::ImageContainer;
use tiled_image::tiled::TiledImage;

use super::test_utils::{gradient, recording_factory, tiled, RecordingFactory};

/// Gradient image whose domain starts at `origin`, so tile keys never collide
/// with those of an image at the origin.
fn offset_factory(origin: i64) -> Shared<RecordingFactory<2>> {
    let domain = Domain::new(Point::new([origin, origin]), Point::new([origin + 9, origin + 9]))
        .unwrap();
    shared(RecordingFactory::new(ImageContainer::from_fn(domain, |p| {
        (p[0] + 100 * p[1]) as u32
    })))
}

#[test]
fn test_shared_write_policy_counts_both_images() {
    let write_through = shared(WriteThroughPolicy::new());
    let read_policy = shared(LruReadPolicy::new(1));
    let first = recording_factory([10, 10]);
    let second = offset_factory(100);

    let a = tiled(&first, &read_policy, &write_through, 2);
    let b = tiled(&second, &read_policy, &write_through, 2);

    a.value(&Point::new([0, 0])).unwrap();
    b.value(&Point::new([100, 100])).unwrap();
    a.value(&Point::new([9, 9])).unwrap();
    b.value(&Point::new([109, 109])).unwrap();

    assert_eq!(write_through.borrow().write_backs(), 2);
    assert_eq!(first.borrow().flush_count(), 1);
    assert_eq!(second.borrow().flush_count(), 1);
    assert_eq!(a.resident_tiles(), 1);
    assert_eq!(b.resident_tiles(), 1);
}

#[test]
fn test_shared_lru_ages_tiles_on_one_clock() {
    let lru = shared(LruReadPolicy::new(2));
    let write_back = shared(WriteBackPolicy::new());
    let first = recording_factory([10, 10]);
    let second = offset_factory(100);

    let a = tiled(&first, &lru, &write_back, 2);
    let b = tiled(&second, &lru, &write_back, 2);

    // a: tiles (0,0) and (1,0); b: tile (0,0)
    a.value(&Point::new([0, 0])).unwrap();
    a.value(&Point::new([5, 0])).unwrap();
    b.value(&Point::new([100, 100])).unwrap();
    a.value(&Point::new([1, 1])).unwrap();

    // a is full; its least recent tile is (1,0) even though b touched the
    // policy more recently
    a.value(&Point::new([0, 5])).unwrap();
    assert_eq!(a.resident_tiles(), 2);
    assert_eq!(a.value(&Point::new([1, 1])).unwrap(), 101);

    let misses = a.cache_miss_reads();
    a.value(&Point::new([5, 0])).unwrap();
    assert_eq!(a.cache_miss_reads(), misses + 1);

    assert_eq!(b.resident_tiles(), 1);
    assert_eq!(b.cache_miss_reads(), 1);
}

#[test]
fn test_runtime_selected_policies() {
    type DynImage =
        TiledImage<MemoryFactory<u32, 2>, dyn ReadPolicy<2>, dyn WritePolicy<u32, 2>, 2>;

    fn build(lru: bool) -> DynImage {
        let read_policy: Shared<dyn ReadPolicy<2>> = if lru {
            shared(LruReadPolicy::new(2))
        } else {
            shared(FifoReadPolicy::new(2))
        };
        let write_policy: Shared<dyn WritePolicy<u32, 2>> = shared(WriteBackPolicy::new());
        let factory = shared(MemoryFactory::new(gradient([12, 12])));
        TiledImage::new(factory, read_policy, write_policy, 3).unwrap()
    }

    for lru in [true, false] {
        let image = build(lru);
        image.set_value(&Point::new([11, 11]), 5).unwrap();
        for point in image.domain().iter() {
            image.value(&point).unwrap();
        }
        assert_eq!(image.value(&Point::new([11, 11])).unwrap(), 5);
        assert!(image.resident_tiles() <= 2);
    }
}

#[test]
fn test_images_over_one_factory() {
    let factory = shared(MemoryFactory::new(gradient([8, 8])));
    let writer = tiled(
        &factory,
        &shared(LruReadPolicy::new(4)),
        &shared(WriteBackPolicy::new()),
        2,
    );
    let reader = tiled(
        &factory,
        &shared(LruReadPolicy::new(4)),
        &shared(WriteBackPolicy::new()),
        4,
    );

    assert_eq!(reader.value(&Point::new([3, 3])).unwrap(), 303);
    writer.set_value(&Point::new([3, 3]), 1).unwrap();
    assert_eq!(reader.value(&Point::new([3, 3])).unwrap(), 303);

    writer.flush().unwrap();
    reader.clear_cache_and_reset_misses().unwrap();
    assert_eq!(reader.value(&Point::new([3, 3])).unwrap(), 1);
    assert_eq!(factory.borrow().stats().flushed, 1);
}
