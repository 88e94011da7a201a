//! Image containers.

mod container;

pub use container::ImageContainer;
