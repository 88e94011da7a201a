//! Integer points and axis-aligned domains.
//!
//! A [`Domain`] is the rectangular index space of an image (or of a tile, or
//! of the grid of tiles). Its points are enumerated lexicographically, axis 0
//! varying fastest:
//!
//! ```text
//!   y
//!   2 │ 6  7  8
//!   1 │ 3  4  5
//!   0 │ 0  1  2
//!     └────────── x
//!       0  1  2
//! ```

mod point;
mod rect;

pub use point::Point;
pub use rect::{Domain, DomainIter};
