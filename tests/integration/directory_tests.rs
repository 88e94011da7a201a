//! On-disk tile store integration tests.
//!
//! Tests verify:
//! - Values written through a tiled image survive reopening the store
//! - Only tiles that were written back reach the disk
//! - Corrupt tile files surface as errors

use std::fs;

use tiled_image::cache::{shared, LastReadPolicy, LruReadPolicy, WriteBackPolicy};
use tiled_image::domain::{Domain, Point};
use tiled_image::error::{CacheError, FactoryError, ImageError};
use tiled_image::factory::DirectoryFactory;

use super::test_utils::tiled;

fn json_files(dir: &std::path::Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
        .count()
}

#[test]
fn test_values_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let domain = Domain::from_extents([12, 12]).unwrap();

    {
        let factory = shared(DirectoryFactory::open(dir.path(), domain, 0u32).unwrap());
        let image = tiled(
            &factory,
            &shared(LruReadPolicy::new(2)),
            &shared(WriteBackPolicy::new()),
            3,
        );
        for point in domain.iter() {
            image.set_value(&point, (point[0] * point[1]) as u32).unwrap();
        }
        image.flush().unwrap();
    }

    assert_eq!(json_files(dir.path()), 9);

    let factory = shared(DirectoryFactory::open(dir.path(), domain, 0u32).unwrap());
    let image = tiled(
        &factory,
        &shared(LastReadPolicy::new()),
        &shared(WriteBackPolicy::new()),
        3,
    );
    for item in image.values() {
        let (point, value) = item.unwrap();
        assert_eq!(value, (point[0] * point[1]) as u32);
    }
    assert_eq!(factory.borrow().stats().flushed, 0);
}

#[test]
fn test_clean_tiles_never_written() {
    let dir = tempfile::tempdir().unwrap();
    let domain = Domain::from_extents([8, 8]).unwrap();
    let factory = shared(DirectoryFactory::open(dir.path(), domain, 5u32).unwrap());
    let image = tiled(
        &factory,
        &shared(LastReadPolicy::new()),
        &shared(WriteBackPolicy::new()),
        2,
    );

    for item in image.values() {
        assert_eq!(item.unwrap().1, 5);
    }
    image.set_value(&Point::new([7, 0]), 1).unwrap();
    image.clear_cache_and_reset_misses().unwrap();

    assert_eq!(json_files(dir.path()), 1);
    let path = factory
        .borrow()
        .tile_path(&Domain::new(Point::new([4, 0]), Point::new([7, 3])).unwrap());
    assert!(path.exists());
}

#[test]
fn test_corrupt_tile_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let domain = Domain::from_extents([4, 4]).unwrap();
    let factory = shared(DirectoryFactory::open(dir.path(), domain, 0u32).unwrap());
    let image = tiled(
        &factory,
        &shared(LastReadPolicy::new()),
        &shared(WriteBackPolicy::new()),
        2,
    );

    let path = factory
        .borrow()
        .tile_path(&Domain::new(Point::new([0, 0]), Point::new([1, 1])).unwrap());
    fs::write(&path, b"{ not json").unwrap();

    let result = image.value(&Point::new([1, 1]));
    assert!(matches!(
        result,
        Err(ImageError::Cache(CacheError::Factory(FactoryError::Corrupt { .. })))
    ));
    assert_eq!(image.resident_tiles(), 0);
    assert_eq!(image.value(&Point::new([3, 3])).unwrap(), 0);
}
