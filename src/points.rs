//! Point collections holding rescaled coordinates.
//!
//! A [`Points`] collection is built once from a raw coordinate matrix (one
//! point per row) and a [`CovarianceParameters`]. Construction applies
//!
//! ```text
//! rescaled[i][k] = (raw[i][k] - origin[k]) * scaling_factors[k]
//! ```
//!
//! in a single O(n·d) pass, after which the kernels read rows directly with
//! unit lengthscales. The collection does not keep a reference to the
//! parameters, but it only makes sense together with the parameters (or any
//! parameters with identical scaling factors) it was built from.

use std::ops::{Index, IndexMut};

use crate::error::{CovResult, CovarianceError};
use crate::matrix::DenseMatrix;
use crate::params::CovarianceParameters;
use crate::storage::{DefaultStorage, PointStorage};

/// `n` rescaled points of dimension `d`, stored with layout `S`.
///
/// `Points::default()` has no points and dimension 0. Give it a dimension
/// with [`Points::reshape`] before writing rows, or start from
/// [`Points::empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Points<S: PointStorage = DefaultStorage> {
    storage: S,
}

impl<S: PointStorage> Points<S> {
    /// Rescale every row of `source` with the parameters' scaling factors.
    ///
    /// # Errors
    /// [`CovarianceError::DimensionMismatch`] if `source` does not have
    /// `params.dim()` columns.
    pub fn new(source: &DenseMatrix, params: &CovarianceParameters) -> CovResult<Self> {
        check_columns(source, params)?;
        Ok(Self::fill(source, params.scaling_factors(), None))
    }

    /// Like [`Points::new`], re-centering on `origin` before scaling.
    ///
    /// # Errors
    /// [`CovarianceError::DimensionMismatch`] if `source` columns or
    /// `origin` length differ from `params.dim()`.
    pub fn with_origin(
        source: &DenseMatrix,
        params: &CovarianceParameters,
        origin: &[f64],
    ) -> CovResult<Self> {
        check_columns(source, params)?;
        if origin.len() != params.dim() {
            return Err(CovarianceError::DimensionMismatch {
                context: "origin",
                expected: params.dim(),
                found: origin.len(),
            });
        }
        Ok(Self::fill(source, params.scaling_factors(), Some(origin)))
    }

    /// Empty collection of dimension `dim`, to be grown with [`Points::resize`].
    pub fn empty(dim: usize) -> Self {
        Self {
            storage: S::with_shape(0, dim),
        }
    }

    fn fill(source: &DenseMatrix, scaling: &[f64], origin: Option<&[f64]>) -> Self {
        let (n, d) = source.shape();
        let mut storage = S::with_shape(n, d);
        // column-wise so reads from the column-major source stay contiguous
        for k in 0..d {
            let factor = scaling[k];
            let shift = origin.map_or(0.0, |o| o[k]);
            for (i, &raw) in source.column(k).iter().enumerate() {
                storage.row_mut(i)[k] = (raw - shift) * factor;
            }
        }
        Self { storage }
    }

    /// Sub-collection made of the rows at `indices`, in that order.
    ///
    /// Coordinates are copied as they are, without rescaling again.
    ///
    /// # Panics
    /// Panics if an index is out of range.
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut storage = S::with_shape(indices.len(), self.dim());
        for (dst, &src) in indices.iter().enumerate() {
            storage.row_mut(dst).copy_from_slice(self.storage.row(src));
        }
        Self { storage }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.storage.dim()
    }

    /// Rescaled coordinates of point `index`.
    #[inline]
    pub fn point(&self, index: usize) -> &[f64] {
        self.storage.row(index)
    }

    /// Writable coordinates of point `index`.
    ///
    /// Values written here are taken as already rescaled.
    #[inline]
    pub fn point_mut(&mut self, index: usize) -> &mut [f64] {
        self.storage.row_mut(index)
    }

    /// Grow or shrink to `len` points; new points sit at the origin.
    pub fn resize(&mut self, len: usize) {
        self.storage.resize(len);
    }

    /// Set `len` points of dimension `dim`.
    ///
    /// Keeps existing rows when `dim` is unchanged, like [`Points::resize`].
    /// Otherwise every point is reset to the origin.
    pub fn reshape(&mut self, len: usize, dim: usize) {
        if dim == self.dim() {
            self.storage.resize(len);
        } else {
            self.storage = S::with_shape(len, dim);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.len()).map(move |i| self.storage.row(i))
    }
}

fn check_columns(source: &DenseMatrix, params: &CovarianceParameters) -> CovResult<()> {
    if source.ncols() != params.dim() {
        return Err(CovarianceError::DimensionMismatch {
            context: "coordinate matrix columns",
            expected: params.dim(),
            found: source.ncols(),
        });
    }
    Ok(())
}

impl<S: PointStorage> Index<usize> for Points<S> {
    type Output = [f64];

    #[inline]
    fn index(&self, index: usize) -> &[f64] {
        self.storage.row(index)
    }
}

impl<S: PointStorage> IndexMut<usize> for Points<S> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut [f64] {
        self.storage.row_mut(index)
    }
}
