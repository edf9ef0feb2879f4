//! Covariance parameters and their precomputed coordinate scaling.
//!
//! [`CovarianceParameters`] owns the selected correlation function and turns
//! the raw lengthscales into per-dimension multipliers once, at construction.
//! Point collections apply those multipliers to their coordinates so that the
//! kernels only ever see unit-lengthscale data.

use crate::error::{CovResult, CovarianceError};
use crate::kernel::{CorrelationFunction, KernelFamily};

/// Added to the variance before inversion so a zero variance stays finite.
pub const VARIANCE_EPS: f64 = 1e-100;

/// Kernel choice, variance and derived scaling factors.
///
/// Not `Clone`: the kernel and the derived state are owned exactly once.
/// Engines borrow the parameters, which keeps them alive and in place for as
/// long as any engine exists.
#[derive(Debug)]
pub struct CovarianceParameters {
    dim: usize,
    param: Vec<f64>,
    variance: f64,
    inverse_variance: f64,
    kernel: CorrelationFunction,
    scaling_factors: Vec<f64>,
}

impl CovarianceParameters {
    /// Build parameters from a kernel name.
    ///
    /// Unknown names fall back to the exponential kernel with a warning.
    /// `param` holds `dim` lengthscales, followed by `dim` exponents for `powexp`.
    /// A wrong `param` length is a caller contract violation and is not
    /// reported here; use [`CovarianceParameters::checked`] to validate.
    ///
    /// # Panics
    /// Panics if `param` holds fewer than `dim` values.
    pub fn new(dim: usize, param: &[f64], variance: f64, kernel_name: &str) -> Self {
        Self::with_family(
            dim,
            param,
            variance,
            KernelFamily::from_name_or_fallback(kernel_name),
        )
    }

    /// Build parameters for an explicit kernel family.
    ///
    /// # Panics
    /// Panics if `param` holds fewer than `dim` values.
    pub fn with_family(dim: usize, param: &[f64], variance: f64, family: KernelFamily) -> Self {
        let kernel = CorrelationFunction::new(family, dim, param);
        let scaling_factors = scaling_factors(&kernel, &param[..dim]);
        log::debug!(
            "covariance parameters: kernel={}, dim={}, variance={}",
            family,
            dim,
            variance
        );
        Self {
            dim,
            param: param.to_vec(),
            variance,
            inverse_variance: 1.0 / (variance + VARIANCE_EPS),
            kernel,
            scaling_factors,
        }
    }

    /// Validating constructor.
    ///
    /// Rejects unknown kernel names, a parameter vector of the wrong length,
    /// non-positive or non-finite lengthscales, exponents outside `(0, 2]`
    /// and negative or non-finite variances.
    pub fn checked(
        dim: usize,
        param: &[f64],
        variance: f64,
        kernel_name: &str,
    ) -> CovResult<Self> {
        let family: KernelFamily = kernel_name.parse()?;
        Self::checked_family(dim, param, variance, family)
    }

    /// Validating constructor for an already resolved kernel family.
    ///
    /// Applies the same parameter and variance checks as
    /// [`CovarianceParameters::checked`].
    pub fn checked_family(
        dim: usize,
        param: &[f64],
        variance: f64,
        family: KernelFamily,
    ) -> CovResult<Self> {
        validate(dim, param, variance, family)?;
        Ok(Self::with_family(dim, param, variance, family))
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Raw parameter vector as given at construction.
    #[inline]
    pub fn param(&self) -> &[f64] {
        &self.param
    }

    /// Raw lengthscales, the first `dim` parameters.
    #[inline]
    pub fn lengthscales(&self) -> &[f64] {
        &self.param[..self.dim]
    }

    #[inline]
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// `1 / (variance + VARIANCE_EPS)`.
    #[inline]
    pub fn inverse_variance(&self) -> f64 {
        self.inverse_variance
    }

    #[inline]
    pub fn kernel(&self) -> &CorrelationFunction {
        &self.kernel
    }

    #[inline]
    pub fn family(&self) -> KernelFamily {
        self.kernel.family()
    }

    /// Per-dimension multipliers `kernel.scaling_factor() / lengthscale[k]`.
    #[inline]
    pub fn scaling_factors(&self) -> &[f64] {
        &self.scaling_factors
    }
}

fn scaling_factors(kernel: &CorrelationFunction, lengthscales: &[f64]) -> Vec<f64> {
    let scaling = kernel.scaling_factor();
    lengthscales.iter().map(|&l| scaling / l).collect()
}

fn validate(dim: usize, param: &[f64], variance: f64, family: KernelFamily) -> CovResult<()> {
    let expected = family.param_len(dim);
    if param.len() != expected {
        return Err(CovarianceError::DimensionMismatch {
            context: "parameter vector",
            expected,
            found: param.len(),
        });
    }
    if let Some((k, l)) = param[..dim]
        .iter()
        .enumerate()
        .find(|(_, l)| !(l.is_finite() && **l > 0.0))
    {
        return Err(CovarianceError::InvalidParameter(format!(
            "lengthscale[{}] must be finite and > 0, got {}",
            k, l
        )));
    }
    if let Some((k, p)) = param[dim..]
        .iter()
        .enumerate()
        .find(|(_, p)| !(**p > 0.0 && **p <= 2.0))
    {
        return Err(CovarianceError::InvalidParameter(format!(
            "exponent[{}] must be in (0, 2], got {}",
            k, p
        )));
    }
    if !(variance.is_finite() && variance >= 0.0) {
        return Err(CovarianceError::InvalidParameter(format!(
            "variance must be finite and >= 0, got {}",
            variance
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_factors_per_family() {
        let p = CovarianceParameters::new(2, &[2.0, 0.5], 1.0, "matern5_2");
        let s5 = 5.0_f64.sqrt();
        assert!((p.scaling_factors()[0] - s5 / 2.0).abs() < 1e-15);
        assert!((p.scaling_factors()[1] - s5 * 2.0).abs() < 1e-15);

        let p = CovarianceParameters::new(1, &[4.0], 1.0, "exp");
        assert_eq!(p.scaling_factors(), &[0.25]);
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let p = CovarianceParameters::new(1, &[1.0], 1.0, "Exponential");
        assert_eq!(p.family(), KernelFamily::Exponential);
        assert_eq!(p.kernel(), &CorrelationFunction::Exponential);
    }

    #[test]
    fn test_inverse_variance() {
        let p = CovarianceParameters::new(1, &[1.0], 4.0, "gauss");
        assert_eq!(p.variance(), 4.0);
        assert!((p.inverse_variance() - 0.25).abs() < 1e-15);

        let zero = CovarianceParameters::new(1, &[1.0], 0.0, "gauss");
        assert!(zero.inverse_variance().is_finite());
        assert!((zero.inverse_variance() / 1e100 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_powexp_layout() {
        let p = CovarianceParameters::new(2, &[2.0, 4.0, 1.0, 1.5], 1.0, "powexp");
        assert_eq!(p.lengthscales(), &[2.0, 4.0]);
        assert_eq!(p.scaling_factors(), &[0.5, 0.25]);
        assert_eq!(p.param().len(), 4);
        assert_eq!(
            p.kernel(),
            &CorrelationFunction::PowerExponential {
                powers: vec![1.0, 1.5].into_boxed_slice()
            }
        );
    }

    #[test]
    fn test_checked_accepts_valid() {
        let p = CovarianceParameters::checked(2, &[1.0, 2.0], 1.5, "matern3_2").unwrap();
        assert_eq!(p.dim(), 2);
        assert_eq!(p.family(), KernelFamily::Matern32);
    }

    #[test]
    fn test_checked_rejects_unknown_name() {
        let err = CovarianceParameters::checked(1, &[1.0], 1.0, "gaussian").unwrap_err();
        assert!(matches!(err, CovarianceError::UnknownKernel(_)));
    }

    #[test]
    fn test_checked_rejects_wrong_length() {
        let err = CovarianceParameters::checked(2, &[1.0, 1.0], 1.0, "powexp").unwrap_err();
        assert!(matches!(
            err,
            CovarianceError::DimensionMismatch {
                expected: 4,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_checked_rejects_bad_values() {
        assert!(CovarianceParameters::checked(1, &[0.0], 1.0, "exp").is_err());
        assert!(CovarianceParameters::checked(1, &[f64::NAN], 1.0, "exp").is_err());
        assert!(CovarianceParameters::checked(1, &[1.0], -1.0, "exp").is_err());
        assert!(CovarianceParameters::checked(1, &[1.0, 2.5], 1.0, "powexp").is_err());
        assert!(CovarianceParameters::checked(1, &[1.0, 0.0], 1.0, "powexp").is_err());
    }
}
