//! Column-major dense matrix used for coordinates and correlation outputs.
//!
//! [`DenseMatrix`] carries its dimensions alongside a flat `Vec<f64>` and
//! removes manual `data[i + j * n]` arithmetic from callers. It is the opaque
//! numerical container the covariance engine fills; anything heavier
//! (Cholesky, solves) goes through nalgebra via [`DenseMatrix::to_dmatrix`].

use nalgebra::DMatrix;

use crate::error::{CovResult, CovarianceError};

/// Column-major matrix of `f64`.
///
/// Element `(row, col)` lives at index `row + col * nrows`.
///
/// # Conventions
///
/// Coordinate matrices hold one point per row and one dimension per column.
/// Correlation matrices are indexed `(point_a, point_b)`.
///
/// # Examples
///
/// ```
/// use kriging_core::matrix::DenseMatrix;
///
/// // 3 points in 2 dimensions
/// let coords = DenseMatrix::from_rows(&[&[0.0, 1.0], &[2.0, 3.0], &[4.0, 5.0]]).unwrap();
///
/// assert_eq!(coords.shape(), (3, 2));
/// assert_eq!(coords[(1, 0)], 2.0);
/// assert_eq!(coords.column(1), &[1.0, 3.0, 5.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DenseMatrix {
    data: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

impl DenseMatrix {
    /// Create from flat column-major data with dimension validation.
    ///
    /// Returns `None` if `data.len() != nrows * ncols`.
    pub fn from_column_major(data: Vec<f64>, nrows: usize, ncols: usize) -> Option<Self> {
        if Some(data.len()) != nrows.checked_mul(ncols) {
            return None;
        }
        Some(Self { data, nrows, ncols })
    }

    /// Create from row slices, one row per point.
    ///
    /// Returns `None` if rows have different lengths.
    pub fn from_rows(rows: &[&[f64]]) -> Option<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != ncols) {
            return None;
        }
        let mut mat = Self::zeros(nrows, ncols);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                mat[(i, j)] = v;
            }
        }
        Some(mat)
    }

    /// Create a zero-filled matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![0.0; nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Dimensions as `(nrows, ncols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Contiguous column slice.
    ///
    /// # Panics
    /// Panics if `col >= ncols`.
    #[inline]
    pub fn column(&self, col: usize) -> &[f64] {
        let start = col * self.nrows;
        &self.data[start..start + self.nrows]
    }

    /// Extract a single row as a new `Vec<f64>`.
    ///
    /// O(ncols) with a strided read since rows are not contiguous.
    pub fn row(&self, row: usize) -> Vec<f64> {
        (0..self.ncols)
            .map(|j| self.data[row + j * self.nrows])
            .collect()
    }

    /// Flat column-major view.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Reshape to `nrows x ncols`, allocating fallibly.
    ///
    /// Contents are zeroed. On allocation failure the matrix is left empty
    /// (`0 x 0`) and the error is returned, so a failed resize never leaves
    /// stale data behind a new shape.
    pub fn try_resize(&mut self, nrows: usize, ncols: usize) -> CovResult<()> {
        // usize::MAX on overflow makes try_reserve report CapacityOverflow
        let len = nrows.checked_mul(ncols).unwrap_or(usize::MAX);
        self.data.clear();
        if let Err(source) = self.data.try_reserve_exact(len) {
            self.nrows = 0;
            self.ncols = 0;
            return Err(CovarianceError::Allocation {
                rows: nrows,
                cols: ncols,
                source,
            });
        }
        self.data.resize(len, 0.0);
        self.nrows = nrows;
        self.ncols = ncols;
        Ok(())
    }

    /// Largest absolute difference between `(i, j)` and `(j, i)`.
    ///
    /// Returns `None` for non-square matrices.
    pub fn max_asymmetry(&self) -> Option<f64> {
        if self.nrows != self.ncols {
            return None;
        }
        let n = self.nrows;
        let mut worst: f64 = 0.0;
        for j in 0..n {
            for i in (j + 1)..n {
                worst = worst.max((self[(i, j)] - self[(j, i)]).abs());
            }
        }
        Some(worst)
    }

    /// Copy into a nalgebra `DMatrix<f64>`.
    ///
    /// Both are column-major, so this is a straight copy.
    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        DMatrix::from_column_slice(self.nrows, self.ncols, &self.data)
    }

    /// Copy from a nalgebra `DMatrix<f64>`.
    pub fn from_dmatrix(mat: &DMatrix<f64>) -> Self {
        let (nrows, ncols) = mat.shape();
        Self {
            data: mat.as_slice().to_vec(),
            nrows,
            ncols,
        }
    }
}

impl std::ops::Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        debug_assert!(
            row < self.nrows && col < self.ncols,
            "DenseMatrix index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.nrows,
            self.ncols
        );
        &self.data[row + col * self.nrows]
    }
}

impl std::ops::IndexMut<(usize, usize)> for DenseMatrix {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        debug_assert!(
            row < self.nrows && col < self.ncols,
            "DenseMatrix index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.nrows,
            self.ncols
        );
        &mut self.data[row + col * self.nrows]
    }
}

impl std::fmt::Display for DenseMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DenseMatrix({}x{})", self.nrows, self.ncols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_3x2() -> DenseMatrix {
        DenseMatrix::from_rows(&[&[1.0, 4.0], &[2.0, 5.0], &[3.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_from_rows_layout() {
        let mat = sample_3x2();
        assert_eq!(mat.shape(), (3, 2));
        assert_eq!(mat.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(mat.row(2), vec![3.0, 6.0]);
    }

    #[test]
    fn test_from_rows_ragged() {
        assert!(DenseMatrix::from_rows(&[&[1.0, 2.0], &[3.0]]).is_none());
    }

    #[test]
    fn test_from_rows_empty() {
        let mat = DenseMatrix::from_rows(&[]).unwrap();
        assert_eq!(mat.shape(), (0, 0));
        assert!(mat.is_empty());
    }

    #[test]
    fn test_from_column_major_invalid() {
        assert!(DenseMatrix::from_column_major(vec![1.0, 2.0], 3, 4).is_none());
        assert!(DenseMatrix::from_column_major(vec![], usize::MAX, 2).is_none());
    }

    #[test]
    fn test_column_access() {
        let mut mat = sample_3x2();
        assert_eq!(mat.column(1), &[4.0, 5.0, 6.0]);
        mat[(2, 0)] = 9.0;
        assert_eq!(mat.column(0), &[1.0, 2.0, 9.0]);
    }

    #[test]
    fn test_try_resize_zeroes() {
        let mut mat = sample_3x2();
        mat.try_resize(2, 2).unwrap();
        assert_eq!(mat.shape(), (2, 2));
        assert!(mat.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_try_resize_overflow() {
        let mut mat = sample_3x2();
        let err = mat.try_resize(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, CovarianceError::Allocation { cols: 2, .. }));
        assert_eq!(mat.shape(), (0, 0));
        assert!(mat.is_empty());
    }

    #[test]
    fn test_max_asymmetry() {
        let mut mat = DenseMatrix::zeros(2, 2);
        mat[(0, 1)] = 0.5;
        mat[(1, 0)] = 0.25;
        assert_eq!(mat.max_asymmetry(), Some(0.25));
        assert_eq!(sample_3x2().max_asymmetry(), None);
    }

    #[test]
    fn test_nalgebra_roundtrip() {
        let mat = sample_3x2();
        let dmat = mat.to_dmatrix();
        assert_eq!(dmat[(1, 1)], 5.0);
        assert_eq!(DenseMatrix::from_dmatrix(&dmat), mat);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", sample_3x2()), "DenseMatrix(3x2)");
    }
}
