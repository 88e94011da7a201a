//! Cursor and iterator integration tests.
//!
//! Tests verify:
//! - Forward and backward traversal agree
//! - Seeking lands on the same value as a point read
//! - Tile crossings page tiles in and count as misses
//! - Cursor writes reach the factory immediately

use tiled_image::cache::{shared, FifoReadPolicy, LastReadPolicy, LruReadPolicy, WriteBackPolicy};
use tiled_image::domain::{Domain, Point};
use tiled_image::error::ImageError;
use tiled_image::factory::MemoryFactory;
use tiled_image::image::ImageContainer;

use super::test_utils::{gradient_value, recording_factory, rect, tiled, Event};

#[test]
fn test_forward_and_backward_cursors_agree() {
    let factory = recording_factory([11, 6]);
    let image = tiled(
        &factory,
        &shared(LastReadPolicy::new()),
        &shared(WriteBackPolicy::new()),
        3,
    );

    let mut forward = Vec::new();
    let mut cursor = image.begin().unwrap();
    while !cursor.is_end() {
        forward.push(cursor.get().unwrap());
        cursor.advance().unwrap();
    }
    assert_eq!(cursor, image.end());

    let mut backward = Vec::new();
    let mut cursor = image.rbegin().unwrap();
    loop {
        backward.push(cursor.get().unwrap());
        match cursor.retreat() {
            Ok(()) => {}
            Err(ImageError::CursorAtBegin) => break,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    backward.reverse();

    assert_eq!(forward.len(), 66);
    assert_eq!(forward, backward);
}

#[test]
fn test_values_iterator_agrees_with_cursor() {
    let factory = recording_factory([9, 9]);
    let image = tiled(
        &factory,
        &shared(LruReadPolicy::new(2)),
        &shared(WriteBackPolicy::new()),
        2,
    );

    let mut from_cursor = Vec::new();
    let mut cursor = image.begin().unwrap();
    while let Some(point) = cursor.point() {
        from_cursor.push((point, cursor.get().unwrap()));
        cursor.advance().unwrap();
    }

    let from_values: Vec<_> = image.values().collect::<Result<_, _>>().unwrap();
    assert_eq!(from_cursor, from_values);

    let mut reversed: Vec<_> = image.values().rev().collect::<Result<_, _>>().unwrap();
    reversed.reverse();
    assert_eq!(from_values, reversed);

    for (point, value) in from_values {
        assert_eq!(value, gradient_value(&point));
    }
}

#[test]
fn test_seek_matches_point_read() {
    let factory = recording_factory([7, 5]);
    let image = tiled(
        &factory,
        &shared(FifoReadPolicy::new(1)),
        &shared(WriteBackPolicy::new()),
        3,
    );

    for point in image.domain().iter() {
        let cursor = image.seek(&point).unwrap();
        assert_eq!(cursor.point(), Some(point));
        assert_eq!(cursor.get().unwrap(), image.value(&point).unwrap());
    }
}

#[test]
fn test_each_tile_crossing_is_one_miss() {
    let factory = recording_factory([6, 6]);
    let image = tiled(
        &factory,
        &shared(LastReadPolicy::new()),
        &shared(WriteBackPolicy::new()),
        3,
    );

    let mut cursor = image.begin().unwrap();
    while !cursor.is_end() {
        cursor.get().unwrap();
        cursor.advance().unwrap();
    }

    assert_eq!(image.cache_miss_reads(), 9);
    let produced = factory
        .borrow()
        .events()
        .iter()
        .filter(|e| matches!(e, Event::Produced(_)))
        .count();
    assert_eq!(produced, 9);
}

#[test]
fn test_cursor_write_is_persisted_immediately() {
    let factory = recording_factory([6, 6]);
    let image = tiled(
        &factory,
        &shared(LruReadPolicy::new(4)),
        &shared(WriteBackPolicy::new()),
        2,
    );

    let mut cursor = image.begin().unwrap();
    cursor.advance().unwrap();
    cursor.set_value(77).unwrap();

    let point = Point::new([1, 0]);
    assert_eq!(cursor.point(), Some(point));
    assert_eq!(factory.borrow().stored(&point), Some(77));
    assert_eq!(
        factory.borrow().events().last(),
        Some(&Event::Flushed(rect([0, 0], [2, 2])))
    );

    // Facade writes wait for the write policy
    image.set_value(&Point::new([2, 0]), 78).unwrap();
    assert_eq!(factory.borrow().stored(&Point::new([2, 0])), Some(2));
}

#[test]
fn test_cursor_errors_at_both_ends() {
    let factory = recording_factory([3, 3]);
    let image = tiled(
        &factory,
        &shared(LruReadPolicy::new(1)),
        &shared(WriteBackPolicy::new()),
        1,
    );

    let mut end = image.end();
    assert!(matches!(end.advance(), Err(ImageError::CursorAtEnd)));
    assert!(matches!(end.get(), Err(ImageError::CursorAtEnd)));

    let mut begin = image.begin().unwrap();
    assert!(matches!(begin.retreat(), Err(ImageError::CursorAtBegin)));
    assert_eq!(begin.point(), Some(Point::new([0, 0])));

    end.retreat().unwrap();
    assert_eq!(end, image.rbegin().unwrap());
}

#[test]
fn test_three_dimensional_traversal() {
    let domain = Domain::new(Point::new([-2, 0, 5]), Point::new([3, 4, 8])).unwrap();
    let factory = shared(MemoryFactory::new(ImageContainer::from_fn(domain, |p| {
        (p[0] + 2) as u32 + 10 * p[1] as u32 + 100 * p[2] as u32
    })));
    let image = tiled(
        &factory,
        &shared(LruReadPolicy::new(3)),
        &shared(WriteBackPolicy::new()),
        2,
    );

    let points: Vec<_> = image.values().map(|item| item.unwrap().0).collect();
    assert_eq!(points.len(), domain.size());

    let mut sorted = points.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), domain.size());

    assert_eq!(points.first(), Some(&domain.first()));
    assert_eq!(points.last(), Some(&domain.last()));
}
