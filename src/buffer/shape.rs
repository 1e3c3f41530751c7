//! Array shapes: ordered extents with row-major stride computation.
//!
//! A [`Shape`] is immutable once built and always has rank at least one.
//! Zero extents are legal; an empty array is still a well-formed array.

use crate::mesh_error::MeshPlexError;

/// Ordered sequence of non-negative extents, rank >= 1.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    extents: Vec<usize>,
}

impl Shape {
    /// Build a shape from a list of extents.
    ///
    /// # Errors
    /// Returns `Err(InvalidSize)` if `extents` is empty (rank-0 shapes are
    /// not representable).
    pub fn try_new(extents: Vec<usize>) -> Result<Self, MeshPlexError> {
        if extents.is_empty() {
            return Err(MeshPlexError::InvalidSize("shape must have rank >= 1"));
        }
        Ok(Self { extents })
    }

    /// Rank-1 convenience constructor for a single extent.
    pub fn scalar(extent: usize) -> Self {
        Self {
            extents: vec![extent],
        }
    }

    /// Build a shape from signed extents, as marshaled by an exposure layer.
    ///
    /// # Errors
    /// Returns `Err(InvalidSize)` on a negative extent or an empty list.
    pub fn try_from_signed(extents: &[i64]) -> Result<Self, MeshPlexError> {
        let mut out = Vec::with_capacity(extents.len());
        for &e in extents {
            if e < 0 {
                return Err(MeshPlexError::InvalidSize("extent must be non-negative"));
            }
            out.push(e as usize);
        }
        Self::try_new(out)
    }

    /// The extents, outermost first.
    #[inline]
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Product of all extents.
    ///
    /// # Errors
    /// Returns `Err(InvalidSize)` if the product overflows `usize`.
    pub fn element_count(&self) -> Result<usize, MeshPlexError> {
        self.extents.iter().try_fold(1usize, |acc, &e| {
            acc.checked_mul(e)
                .ok_or(MeshPlexError::InvalidSize("element count overflows usize"))
        })
    }

    /// Row-major element strides: the last dimension is contiguous.
    pub fn row_major_strides(&self) -> Vec<usize> {
        let mut strides = vec![1usize; self.extents.len()];
        for i in (0..self.extents.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.extents[i + 1];
        }
        strides
    }
}

impl From<[usize; 1]> for Shape {
    fn from(e: [usize; 1]) -> Self {
        Self { extents: e.to_vec() }
    }
}

impl From<[usize; 2]> for Shape {
    fn from(e: [usize; 2]) -> Self {
        Self { extents: e.to_vec() }
    }
}

impl From<[usize; 3]> for Shape {
    fn from(e: [usize; 3]) -> Self {
        Self { extents: e.to_vec() }
    }
}
