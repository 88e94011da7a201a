use crate::domain::{Domain, Point};
use crate::error::DomainError;

/// Dense image over exactly one [`Domain`].
///
/// Values are stored in the domain's lexicographic order. This is the tile
/// type handed out by factories and held resident by the cache, and also the
/// backing store of [`MemoryFactory`](crate::factory::MemoryFactory).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageContainer<V, const D: usize> {
    domain: Domain<D>,
    values: Vec<V>,
}

impl<V: Copy, const D: usize> ImageContainer<V, D> {
    /// Create an image with every point set to `fill`.
    pub fn new(domain: Domain<D>, fill: V) -> Self {
        Self {
            domain,
            values: vec![fill; domain.size()],
        }
    }

    /// Create an image by evaluating `f` at every point.
    pub fn from_fn(domain: Domain<D>, f: impl FnMut(Point<D>) -> V) -> Self {
        Self {
            domain,
            values: domain.iter().map(f).collect(),
        }
    }

    /// Wrap a dense buffer laid out in lexicographic order.
    pub fn from_values(domain: Domain<D>, values: Vec<V>) -> Result<Self, DomainError> {
        if values.len() != domain.size() {
            return Err(DomainError::ValueCountMismatch {
                domain: domain.to_string(),
                expected: domain.size(),
                actual: values.len(),
            });
        }
        Ok(Self { domain, values })
    }

    pub fn domain(&self) -> &Domain<D> {
        &self.domain
    }

    /// Values in lexicographic order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Value at `point`, `None` if the point is outside this image.
    #[inline]
    pub fn get(&self, point: &Point<D>) -> Option<V> {
        let index = self.domain.linear_index(point)?;
        self.values.get(index).copied()
    }

    /// Store `value` at `point`. Returns `false` if the point is outside.
    #[inline]
    pub fn set(&mut self, point: &Point<D>, value: V) -> bool {
        match self.domain.linear_index(point) {
            Some(index) => {
                self.values[index] = value;
                true
            }
            None => false,
        }
    }

    /// Iterate over `(point, value)` pairs in lexicographic order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Point<D>, V)> + '_ {
        self.domain.iter().zip(self.values.iter().copied())
    }

    /// Copy of the region `domain`, which must lie inside this image.
    pub fn sub_image(&self, domain: &Domain<D>) -> Option<Self> {
        if !self.domain.contains_domain(domain) {
            return None;
        }
        let values = domain
            .iter()
            .map(|p| self.get(&p))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            domain: *domain,
            values,
        })
    }

    /// Copy every point of `other` that also lies in this image.
    ///
    /// Returns the number of points written.
    pub fn copy_from(&mut self, other: &ImageContainer<V, D>) -> usize {
        if !self.domain.intersects(&other.domain) {
            return 0;
        }
        let mut written = 0;
        for (point, value) in other.iter() {
            if self.set(&point, value) {
                written += 1;
            }
        }
        written
    }
}
