use std::fmt;
use std::ops::Index;

/// Integer point in `D`-dimensional space.
///
/// The arity is fixed at compile time. Points are plain values: copy them
/// freely, compare them component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point<const D: usize>([i64; D]);

impl<const D: usize> Point<D> {
    /// Number of coordinates.
    pub const DIMENSION: usize = D;

    /// Create a point from its coordinates.
    pub const fn new(coords: [i64; D]) -> Self {
        Self(coords)
    }

    /// Create a point with every coordinate set to `value`.
    pub const fn splat(value: i64) -> Self {
        Self([value; D])
    }

    /// Create a point by evaluating `f` for each axis.
    pub fn from_fn(f: impl FnMut(usize) -> i64) -> Self {
        Self(std::array::from_fn(f))
    }

    /// Borrow the raw coordinates.
    pub fn coords(&self) -> &[i64; D] {
        &self.0
    }

    /// `true` if every coordinate of `self` is `<=` the matching one in `other`.
    pub fn all_le(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a <= b)
    }
}

impl<const D: usize> From<[i64; D]> for Point<D> {
    fn from(coords: [i64; D]) -> Self {
        Self(coords)
    }
}

impl<const D: usize> Index<usize> for Point<D> {
    type Output = i64;

    fn index(&self, axis: usize) -> &i64 {
        &self.0[axis]
    }
}

impl<const D: usize> fmt::Display for Point<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}
