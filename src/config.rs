//! Engine configuration: tiny-nugget regularization, nugget policy and a
//! serializable description of a covariance model.

use serde::{Deserialize, Serialize};

use crate::covariance::Covariance;
use crate::error::{CovResult, CovarianceError};
use crate::kernel::KernelFamily;
use crate::params::CovarianceParameters;

/// Default on-diagonal regularization, `256 * f64::EPSILON` (about 5.684e-14).
///
/// A power-of-two multiple of machine epsilon keeps inversion of
/// "all ones + diagonal nugget" matrices stable up to size 512.
pub const TINY_NUGGET_ON_DIAG: f64 = 256.0 * f64::EPSILON;

/// Default off-diagonal regularization.
pub const TINY_NUGGET_OFF_DIAG: f64 = 0.0;

/// Small constants keeping correlation matrices numerically invertible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Regularization {
    /// Added to every diagonal entry of a correlation matrix.
    pub tiny_nugget_on_diag: f64,

    /// Added to the distance sum of off-diagonal kernel evaluations
    /// (Gaussian, exponential and Matérn families only).
    pub tiny_nugget_off_diag: f64,
}

impl Default for Regularization {
    fn default() -> Self {
        Self {
            tiny_nugget_on_diag: TINY_NUGGET_ON_DIAG,
            tiny_nugget_off_diag: TINY_NUGGET_OFF_DIAG,
        }
    }
}

impl Regularization {
    pub fn validate(&self) -> CovResult<()> {
        if !(self.tiny_nugget_on_diag.is_finite() && self.tiny_nugget_on_diag >= 0.0) {
            return Err(CovarianceError::Config(format!(
                "tiny_nugget_on_diag must be finite and >= 0, got {}",
                self.tiny_nugget_on_diag
            )));
        }
        if !(self.tiny_nugget_off_diag.is_finite() && self.tiny_nugget_off_diag >= 0.0) {
            return Err(CovarianceError::Config(format!(
                "tiny_nugget_off_diag must be finite and >= 0, got {}",
                self.tiny_nugget_off_diag
            )));
        }
        Ok(())
    }
}

/// How nugget vectors whose length is neither 0, 1 nor `n` are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NuggetPolicy {
    /// Reuse values cyclically: entry `i` takes `nugget[i % len]`.
    #[default]
    Cyclic,
    /// Reject the nugget in the self-sizing fills.
    Strict,
}

/// Serializable description of a covariance model.
///
/// ```
/// use kriging_core::config::CovarianceConfig;
///
/// let config = CovarianceConfig::from_json(
///     r#"{"kernel": "matern5_2", "param": [0.5, 2.0], "variance": 1.5}"#,
/// ).unwrap();
/// let params = config.build_parameters().unwrap();
/// assert_eq!(params.dim(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceConfig {
    /// Kernel family name (`white_noise`, `gauss`, `exp`, `matern3_2`, `matern5_2`, `powexp`).
    pub kernel: String,

    /// Lengthscales, followed by exponents for `powexp`.
    pub param: Vec<f64>,

    /// Signal variance.
    pub variance: f64,

    #[serde(default)]
    pub regularization: Regularization,

    #[serde(default)]
    pub nugget_policy: NuggetPolicy,
}

impl CovarianceConfig {
    /// Dimension implied by the kernel and parameter count.
    ///
    /// Unknown kernels are treated like the exponential fallback.
    pub fn dim(&self) -> usize {
        self.param.len() / self.family().param_len(1)
    }

    pub fn validate(&self) -> CovResult<()> {
        self.regularization.validate()?;
        let family = self.family();
        let per_dim = family.param_len(1);
        if self.param.len() % per_dim != 0 {
            return Err(CovarianceError::Config(format!(
                "{} expects a multiple of {} parameters, got {}",
                family,
                per_dim,
                self.param.len()
            )));
        }
        Ok(())
    }

    /// Validate and build [`CovarianceParameters`].
    ///
    /// An unknown kernel name resolves to the exponential kernel with a
    /// warning. Parameter values and the variance are checked strictly.
    pub fn build_parameters(&self) -> CovResult<CovarianceParameters> {
        self.validate()?;
        let family = KernelFamily::from_name_or_fallback(&self.kernel);
        CovarianceParameters::checked_family(self.dim(), &self.param, self.variance, family)
    }

    /// Engine over `params` carrying this configuration's regularization and nugget policy.
    pub fn engine<'a>(&self, params: &'a CovarianceParameters) -> Covariance<'a> {
        Covariance::with_regularization(params, self.regularization)
            .nugget_policy(self.nugget_policy)
    }

    // silent lookup; build_parameters is the one place that warns
    fn family(&self) -> KernelFamily {
        self.kernel.parse().unwrap_or(KernelFamily::FALLBACK)
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> CovResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CovarianceError::Config(format!("JSON parse error: {e}")))
    }

    pub fn to_json(&self) -> CovResult<String> {
        serde_json::to_string(self)
            .map_err(|e| CovarianceError::Config(format!("JSON encode error: {e}")))
    }
}
