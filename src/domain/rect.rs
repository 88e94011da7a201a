use std::fmt;
use std::iter::FusedIterator;

use super::Point;
use crate::error::DomainError;

/// Axis-aligned integer box `[lower, upper]`, both bounds inclusive.
///
/// A domain always holds at least one point. Its points are enumerated in
/// lexicographic order with axis 0 varying fastest and the last axis slowest;
/// [`Domain::successor`], [`Domain::linear_index`] and [`Domain::iter`] all
/// follow that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain<const D: usize> {
    lower: Point<D>,
    upper: Point<D>,
}

impl<const D: usize> Domain<D> {
    /// Create a domain, checking `lower[i] <= upper[i]` on every axis.
    ///
    /// The number of points along each axis must also fit in an `i64`.
    pub fn new(lower: Point<D>, upper: Point<D>) -> Result<Self, DomainError> {
        if let Some(axis) = (0..D).find(|&i| lower[i] > upper[i]) {
            return Err(DomainError::InvertedBounds {
                lower: lower.to_string(),
                upper: upper.to_string(),
                axis,
            });
        }
        let too_wide = |i: usize| {
            upper[i]
                .checked_sub(lower[i])
                .and_then(|span| span.checked_add(1))
                .is_none()
        };
        if let Some(axis) = (0..D).find(|&i| too_wide(i)) {
            return Err(DomainError::ExtentOverflow {
                lower: lower.to_string(),
                upper: upper.to_string(),
                axis,
            });
        }
        Ok(Self { lower, upper })
    }

    /// Domain `[0, extent - 1]` on each axis.
    ///
    /// Non-positive extents are rejected as inverted bounds.
    pub fn from_extents(extents: [i64; D]) -> Result<Self, DomainError> {
        Self::new(Point::splat(0), Point::from_fn(|i| extents[i].saturating_sub(1)))
    }

    pub fn lower(&self) -> &Point<D> {
        &self.lower
    }

    pub fn upper(&self) -> &Point<D> {
        &self.upper
    }

    /// Number of points along `axis`.
    pub fn extent(&self, axis: usize) -> i64 {
        self.upper[axis] - self.lower[axis] + 1
    }

    /// Total number of points.
    pub fn size(&self) -> usize {
        (0..D).fold(1usize, |acc, i| acc.saturating_mul(self.extent(i) as usize))
    }

    pub fn contains(&self, point: &Point<D>) -> bool {
        self.lower.all_le(point) && point.all_le(&self.upper)
    }

    /// `true` if `other` lies entirely inside `self`.
    pub fn contains_domain(&self, other: &Domain<D>) -> bool {
        self.contains(&other.lower) && self.contains(&other.upper)
    }

    pub fn intersects(&self, other: &Domain<D>) -> bool {
        (0..D).all(|i| self.lower[i] <= other.upper[i] && other.lower[i] <= self.upper[i])
    }

    /// First point in lexicographic order.
    pub fn first(&self) -> Point<D> {
        self.lower
    }

    /// Last point in lexicographic order.
    pub fn last(&self) -> Point<D> {
        self.upper
    }

    /// Position of `point` in the lexicographic enumeration.
    pub fn linear_index(&self, point: &Point<D>) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }
        let mut index = 0usize;
        for i in (0..D).rev() {
            let offset = (point[i] - self.lower[i]) as usize;
            index = index
                .checked_mul(self.extent(i) as usize)?
                .checked_add(offset)?;
        }
        Some(index)
    }

    /// Inverse of [`Domain::linear_index`].
    pub fn point_at(&self, index: usize) -> Option<Point<D>> {
        if index >= self.size() {
            return None;
        }
        let mut rest = index;
        Some(Point::from_fn(|i| {
            let extent = self.extent(i) as usize;
            let offset = rest % extent;
            rest /= extent;
            self.lower[i] + offset as i64
        }))
    }

    /// Next point in lexicographic order, `None` after the last one.
    pub fn successor(&self, point: &Point<D>) -> Option<Point<D>> {
        if !self.contains(point) {
            return None;
        }
        let mut coords = *point.coords();
        for i in 0..D {
            if coords[i] < self.upper[i] {
                coords[i] += 1;
                return Some(Point::new(coords));
            }
            coords[i] = self.lower[i];
        }
        None
    }

    /// Previous point in lexicographic order, `None` before the first one.
    pub fn predecessor(&self, point: &Point<D>) -> Option<Point<D>> {
        if !self.contains(point) {
            return None;
        }
        let mut coords = *point.coords();
        for i in 0..D {
            if coords[i] > self.lower[i] {
                coords[i] -= 1;
                return Some(Point::new(coords));
            }
            coords[i] = self.upper[i];
        }
        None
    }

    /// Iterate over every point in lexicographic order.
    pub fn iter(&self) -> DomainIter<D> {
        DomainIter {
            domain: *self,
            front: 0,
            back: self.size(),
        }
    }
}

impl<const D: usize> fmt::Display for Domain<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.lower, self.upper)
    }
}

impl<const D: usize> IntoIterator for &Domain<D> {
    type Item = Point<D>;
    type IntoIter = DomainIter<D>;

    fn into_iter(self) -> DomainIter<D> {
        self.iter()
    }
}

/// Restartable, double-ended iterator over the points of a [`Domain`].
#[derive(Debug, Clone)]
pub struct DomainIter<const D: usize> {
    domain: Domain<D>,
    front: usize,
    back: usize,
}

impl<const D: usize> Iterator for DomainIter<D> {
    type Item = Point<D>;

    fn next(&mut self) -> Option<Point<D>> {
        if self.front >= self.back {
            return None;
        }
        let point = self.domain.point_at(self.front);
        self.front += 1;
        point
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back.saturating_sub(self.front);
        (len, Some(len))
    }
}

impl<const D: usize> DoubleEndedIterator for DomainIter<D> {
    fn next_back(&mut self) -> Option<Point<D>> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.domain.point_at(self.back)
    }
}

impl<const D: usize> ExactSizeIterator for DomainIter<D> {}

impl<const D: usize> FusedIterator for DomainIter<D> {}
