//! # Tiled Image
//!
//! A tile-paged view over large N-dimensional images.
//!
//! The image is cut into a regular grid of tiles. Only a bounded number of
//! tiles are resident at any time; the rest live behind a [`TileFactory`] that
//! produces tiles on demand and persists modified ones when they leave memory.
//!
//! ## Features
//!
//! - **Point access**: read and write any point while the library pages tiles
//!   in and out behind the scenes
//! - **Pluggable eviction**: FIFO, LRU and single-slot read policies, or your
//!   own [`ReadPolicy`]
//! - **Pluggable persistence**: write-back, write-through and discard write
//!   policies, or your own [`WritePolicy`]
//! - **Tile-aware traversal**: cursors and iterators that walk one tile at a
//!   time, forwards or backwards
//! - **Miss accounting**: read and write miss counters for cache tuning
//!
//! ## Architecture
//!
//! - [`domain`] - Points and rectangular domains
//! - [`image`] - Dense in-memory image over one domain
//! - [`factory`] - Tile producers (in-memory, on-disk JSON)
//! - [`cache`] - Tile cache and its read/write policies
//! - [`tiled`] - Tile grid, the [`TiledImage`] facade and its cursors
//! - [`config`] - CLI configuration of the workload driver
//!
//! ## Example
//!
//! ```rust
//! use tiled_image::{
//!     shared, Domain, ImageContainer, LastReadPolicy, MemoryFactory, Point, TiledImage,
//!     WriteBackPolicy,
//! };
//!
//! let domain = Domain::from_extents([10, 10]).unwrap();
//! let factory = shared(MemoryFactory::new(ImageContainer::new(domain, 0u32)));
//! let image = TiledImage::new(
//!     factory,
//!     shared(LastReadPolicy::new()),
//!     shared(WriteBackPolicy::new()),
//!     3,
//! )
//! .unwrap();
//!
//! image.set_value(&Point::new([9, 9]), 7).unwrap();
//! image.value(&Point::new([0, 0])).unwrap();
//! assert_eq!(image.value(&Point::new([9, 9])).unwrap(), 7);
//! assert_eq!(image.cache_miss_reads(), 2);
//! ```

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod factory;
pub mod image;
pub mod tiled;

// Re-export commonly used types
pub use cache::{
    shared, CachedTile, DiscardPolicy, FifoReadPolicy, LastReadPolicy, LruReadPolicy,
    MissCounters, ReadPolicy, Shared, TileCache, WriteBackPolicy, WritePolicy,
    WriteThroughPolicy,
};
pub use config::{Config, ReadPolicyKind, WritePolicyKind};
pub use domain::{Domain, DomainIter, Point};
pub use error::{CacheError, DomainError, FactoryError, ImageError};
pub use factory::{DirectoryFactory, FactoryStats, MemoryFactory, TileFactory};
pub use image::ImageContainer;
pub use tiled::{TileGrid, TiledCursor, TiledImage, Values};
