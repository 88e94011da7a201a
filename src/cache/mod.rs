//! Tile cache and its pluggable policies.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               TileCache                 │
//! │   registry: sub-domain → CachedTile     │
//! │   miss counters (reads, writes)         │
//! └──────┬──────────────┬──────────────┬────┘
//!        │              │              │
//!        ▼              ▼              ▼
//! ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//! │ ReadPolicy  │ │ WritePolicy │ │ TileFactory │
//! │ (victim     │ │ (persist on │ │ (produce /  │
//! │  selection) │ │  eviction?) │ │  flush)     │
//! └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Shared collaborators
//!
//! The cache never owns its factory or policies. They are passed in as
//! [`Shared`] handles, so the caller keeps them alive and can hand the same
//! policy to several caches. Caches sharing a policy share its bookkeeping:
//! two images over one LRU policy age their tiles on a single clock even
//! though their registries are separate.
//!
//! `Shared` is `Rc<RefCell<_>>`: everything here is single-threaded. Callers
//! needing concurrency serialize access themselves, for instance with one
//! image per worker.

mod policy;
mod read_policy;
mod tile_cache;
mod write_policy;

use std::cell::RefCell;
use std::rc::Rc;

pub use policy::{CachedTile, ReadPolicy, WritePolicy};
pub use read_policy::{FifoReadPolicy, LastReadPolicy, LruReadPolicy};
pub use tile_cache::{MissCounters, TileCache};
pub use write_policy::{DiscardPolicy, WriteBackPolicy, WriteThroughPolicy};

/// Shared, borrowed collaborator handle.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap `value` in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
