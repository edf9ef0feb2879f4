//! Correlation and cross-correlation matrix fills.
//!
//! [`Covariance`] is a read-only view over a [`CovarianceParameters`] plus the
//! regularization constants. It fills caller-owned [`DenseMatrix`] outputs:
//!
//! - `fill_allocated_*` assume the output already has the right shape. They
//!   never allocate and never fail.
//! - `fill_corr_matrix` / `fill_cross_correlations` reshape the output first
//!   and report failures through `log` before returning them.
//!
//! Kernel evaluation dominates the cost, so the symmetric fill evaluates each
//! unordered pair once. Both fills walk the column-major output one column at
//! a time; with the `parallel` feature columns are processed concurrently.

use crate::config::{NuggetPolicy, Regularization};
use crate::error::{CovResult, CovarianceError};
use crate::matrix::DenseMatrix;
use crate::maybe_par_chunks_mut_enumerate;
use crate::params::CovarianceParameters;
use crate::points::Points;
use crate::storage::PointStorage;

/// Matrix-filling engine borrowing a [`CovarianceParameters`].
#[derive(Debug, Clone, Copy)]
pub struct Covariance<'a> {
    params: &'a CovarianceParameters,
    regularization: Regularization,
    nugget_policy: NuggetPolicy,
}

impl<'a> Covariance<'a> {
    /// Engine with default regularization and cyclic nugget policy.
    pub fn new(params: &'a CovarianceParameters) -> Self {
        Self::with_regularization(params, Regularization::default())
    }

    pub fn with_regularization(
        params: &'a CovarianceParameters,
        regularization: Regularization,
    ) -> Self {
        Self {
            params,
            regularization,
            nugget_policy: NuggetPolicy::default(),
        }
    }

    /// Set how mismatched nugget lengths are handled by the self-sizing fills.
    pub fn nugget_policy(mut self, policy: NuggetPolicy) -> Self {
        self.nugget_policy = policy;
        self
    }

    pub fn params(&self) -> &'a CovarianceParameters {
        self.params
    }

    pub fn regularization(&self) -> Regularization {
        self.regularization
    }

    /// Diagonal entry without external nugget: `1 + tiny_nugget_on_diag`.
    #[inline]
    pub fn diagonal_value(&self) -> f64 {
        1.0 + self.regularization.tiny_nugget_on_diag
    }

    /// Correlation between two rescaled points, including the off-diagonal tiny nugget.
    #[inline]
    pub fn correlation(&self, x1: &[f64], x2: &[f64]) -> f64 {
        self.params
            .kernel()
            .corr_with_offset(x1, x2, self.regularization.tiny_nugget_off_diag)
    }

    // =========================================================================
    // Allocated fills
    // =========================================================================

    /// Write the diagonal of `matrix`.
    ///
    /// Entry `i` becomes `diagonal_value() + nugget[i] * inverse_variance`,
    /// where the nugget term is
    /// - absent if `nugget` is empty,
    /// - `nugget[0]` for every entry if it has one value,
    /// - `nugget[i % nugget.len()]` otherwise.
    pub fn fill_allocated_diagonal(&self, matrix: &mut DenseMatrix, nugget: &[f64]) {
        let n = matrix.nrows().min(matrix.ncols());
        let diag = self.diagonal_value();
        let inverse_variance = self.params.inverse_variance();
        match nugget.len() {
            0 => {
                for i in 0..n {
                    matrix[(i, i)] = diag;
                }
            }
            1 => {
                let value = diag + nugget[0] * inverse_variance;
                for i in 0..n {
                    matrix[(i, i)] = value;
                }
            }
            len if len == n => {
                for i in 0..n {
                    matrix[(i, i)] = diag + nugget[i] * inverse_variance;
                }
            }
            len => {
                for i in 0..n {
                    matrix[(i, i)] = diag + nugget[i % len] * inverse_variance;
                }
            }
        }
    }

    /// Fill a pre-sized `n x n` correlation matrix for `points`.
    ///
    /// The strictly lower triangle is computed column by column, then
    /// mirrored, then the diagonal is written.
    pub fn fill_allocated_corr_matrix<S: PointStorage>(
        &self,
        matrix: &mut DenseMatrix,
        points: &Points<S>,
        nugget: &[f64],
    ) {
        let n = points.len();
        debug_assert_eq!(matrix.shape(), (n, n), "correlation matrix not allocated");
        if n == 0 {
            return;
        }
        let kernel = self.params.kernel();
        let offset = self.regularization.tiny_nugget_off_diag;

        maybe_par_chunks_mut_enumerate!(matrix.as_mut_slice(), n, |(j, col)| {
            let pj = points.point(j);
            for i in (j + 1)..n {
                col[i] = kernel.corr_with_offset(points.point(i), pj, offset);
            }
        });

        for j in 0..n {
            for i in (j + 1)..n {
                matrix[(j, i)] = matrix[(i, j)];
            }
        }

        self.fill_allocated_diagonal(matrix, nugget);
    }

    /// Fill a pre-sized `a.len() x b.len()` cross-correlation matrix.
    ///
    /// No symmetry is assumed and no diagonal regularization is applied.
    pub fn fill_allocated_cross_correlations<S: PointStorage, T: PointStorage>(
        &self,
        matrix: &mut DenseMatrix,
        points_a: &Points<S>,
        points_b: &Points<T>,
    ) {
        let (na, nb) = (points_a.len(), points_b.len());
        debug_assert_eq!(
            matrix.shape(),
            (na, nb),
            "cross-correlation matrix not allocated"
        );
        if na == 0 || nb == 0 {
            return;
        }
        let kernel = self.params.kernel();
        let offset = self.regularization.tiny_nugget_off_diag;

        // column-major output: one column per point of B
        maybe_par_chunks_mut_enumerate!(matrix.as_mut_slice(), na, |(j, col)| {
            let pj = points_b.point(j);
            for (i, out) in col.iter_mut().enumerate() {
                *out = kernel.corr_with_offset(points_a.point(i), pj, offset);
            }
        });
    }

    // =========================================================================
    // Self-sizing fills
    // =========================================================================

    /// Reshape `matrix` to `n x n` and fill it with correlations of `points`.
    ///
    /// # Errors
    /// - [`CovarianceError::DimensionMismatch`] if `points` and the parameters disagree on dimension.
    /// - [`CovarianceError::NuggetLength`] under [`NuggetPolicy::Strict`].
    /// - [`CovarianceError::Allocation`] if the output cannot be allocated.
    pub fn fill_corr_matrix<S: PointStorage>(
        &self,
        matrix: &mut DenseMatrix,
        points: &Points<S>,
        nugget: &[f64],
    ) -> CovResult<()> {
        let result = self
            .check_points("points", points)
            .and_then(|_| self.check_nugget(points.len(), nugget))
            .and_then(|_| matrix.try_resize(points.len(), points.len()));
        if let Err(e) = result {
            log::error!("error filling correlation matrix: {}", e);
            return Err(e);
        }
        log::debug!("filling {0}x{0} correlation matrix", points.len());
        self.fill_allocated_corr_matrix(matrix, points, nugget);
        Ok(())
    }

    /// Reshape `matrix` to `a.len() x b.len()` and fill it with cross-correlations.
    ///
    /// # Errors
    /// - [`CovarianceError::DimensionMismatch`] if either collection disagrees with the parameters.
    /// - [`CovarianceError::Allocation`] if the output cannot be allocated.
    pub fn fill_cross_correlations<S: PointStorage, T: PointStorage>(
        &self,
        matrix: &mut DenseMatrix,
        points_a: &Points<S>,
        points_b: &Points<T>,
    ) -> CovResult<()> {
        let result = self
            .check_points("points_a", points_a)
            .and_then(|_| self.check_points("points_b", points_b))
            .and_then(|_| matrix.try_resize(points_a.len(), points_b.len()));
        if let Err(e) = result {
            log::error!("error filling cross-correlation matrix: {}", e);
            return Err(e);
        }
        log::debug!(
            "filling {}x{} cross-correlation matrix",
            points_a.len(),
            points_b.len()
        );
        self.fill_allocated_cross_correlations(matrix, points_a, points_b);
        Ok(())
    }

    /// Newly allocated correlation matrix of `points`.
    pub fn corr_matrix<S: PointStorage>(
        &self,
        points: &Points<S>,
        nugget: &[f64],
    ) -> CovResult<DenseMatrix> {
        let mut matrix = DenseMatrix::default();
        self.fill_corr_matrix(&mut matrix, points, nugget)?;
        Ok(matrix)
    }

    /// Newly allocated cross-correlation matrix between `points_a` and `points_b`.
    pub fn cross_correlations<S: PointStorage, T: PointStorage>(
        &self,
        points_a: &Points<S>,
        points_b: &Points<T>,
    ) -> CovResult<DenseMatrix> {
        let mut matrix = DenseMatrix::default();
        self.fill_cross_correlations(&mut matrix, points_a, points_b)?;
        Ok(matrix)
    }

    /// Covariance matrix `variance * corr`, so the diagonal carries
    /// `variance + nugget` up to regularization.
    pub fn covariance_matrix<S: PointStorage>(
        &self,
        points: &Points<S>,
        nugget: &[f64],
    ) -> CovResult<DenseMatrix> {
        let mut matrix = self.corr_matrix(points, nugget)?;
        let variance = self.params.variance();
        for v in matrix.as_mut_slice() {
            *v *= variance;
        }
        Ok(matrix)
    }

    fn check_points<S: PointStorage>(
        &self,
        context: &'static str,
        points: &Points<S>,
    ) -> CovResult<()> {
        // an empty default collection carries no dimension yet
        if !points.is_empty() && points.dim() != self.params.dim() {
            return Err(CovarianceError::DimensionMismatch {
                context,
                expected: self.params.dim(),
                found: points.dim(),
            });
        }
        Ok(())
    }

    fn check_nugget(&self, n: usize, nugget: &[f64]) -> CovResult<()> {
        let len = nugget.len();
        if self.nugget_policy == NuggetPolicy::Strict && len > 1 && len != n {
            return Err(CovarianceError::NuggetLength {
                expected: n,
                found: len,
            });
        }
        Ok(())
    }
}
