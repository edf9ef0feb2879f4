//! Correlation functions on rescaled coordinates.
//!
//! Every kernel here assumes its inputs were already multiplied by the
//! per-dimension scaling factors computed in
//! [`CovarianceParameters`](crate::params::CovarianceParameters), so all
//! lengthscales are implicitly 1 and the formulas below carry no division.
//!
//! | Family | Name | `corr(x, y)` | Scaling factor |
//! |---|---|---|---|
//! | White noise | `white_noise` | `1` if `Σ|Δ_k| < 1e-15`, else `0` | 1 |
//! | Gaussian | `gauss` | `exp(-ΣΔ_k²)` | √2/2 |
//! | Exponential | `exp` | `exp(-Σ|Δ_k|)` | 1 |
//! | Matérn 3/2 | `matern3_2` | `exp(-Σd_k) Π(1 + d_k)` | √3 |
//! | Matérn 5/2 | `matern5_2` | `exp(-Σd_k) Π(1 + d_k + d_k²/3)` | √5 |
//! | Power-exponential | `powexp` | `exp(-Σ|Δ_k|^{p_k})` | 1 |
//!
//! with `Δ_k = x_k - y_k` and `d_k = |Δ_k|`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CovarianceError;

/// Total absolute difference under which white noise treats two points as equal.
pub const WHITE_NOISE_TOLERANCE: f64 = 1e-15;

const ONE_THIRD: f64 = 1.0 / 3.0;

/// Tag identifying a correlation family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KernelFamily {
    #[serde(rename = "white_noise")]
    WhiteNoise,
    #[serde(rename = "gauss")]
    Gauss,
    #[serde(rename = "exp")]
    Exponential,
    #[serde(rename = "matern3_2")]
    Matern32,
    #[serde(rename = "matern5_2")]
    Matern52,
    #[serde(rename = "powexp")]
    PowerExponential,
}

impl KernelFamily {
    pub const ALL: [KernelFamily; 6] = [
        KernelFamily::WhiteNoise,
        KernelFamily::Gauss,
        KernelFamily::Exponential,
        KernelFamily::Matern32,
        KernelFamily::Matern52,
        KernelFamily::PowerExponential,
    ];

    /// Family used when a kernel name is not recognized.
    pub const FALLBACK: KernelFamily = KernelFamily::Exponential;

    /// Canonical (case-sensitive) name.
    pub fn name(self) -> &'static str {
        match self {
            KernelFamily::WhiteNoise => "white_noise",
            KernelFamily::Gauss => "gauss",
            KernelFamily::Exponential => "exp",
            KernelFamily::Matern32 => "matern3_2",
            KernelFamily::Matern52 => "matern5_2",
            KernelFamily::PowerExponential => "powexp",
        }
    }

    /// Factor turning a natural lengthscale into a unit-scale coordinate multiplier.
    ///
    /// The per-dimension scaling used on coordinates is `scaling_factor() / param[k]`.
    pub fn scaling_factor(self) -> f64 {
        match self {
            KernelFamily::WhiteNoise | KernelFamily::Exponential => 1.0,
            KernelFamily::PowerExponential => 1.0,
            KernelFamily::Gauss => std::f64::consts::SQRT_2 / 2.0,
            KernelFamily::Matern32 => 3.0_f64.sqrt(),
            KernelFamily::Matern52 => 5.0_f64.sqrt(),
        }
    }

    /// Expected length of the parameter vector for `dim` dimensions.
    pub fn param_len(self, dim: usize) -> usize {
        match self {
            KernelFamily::PowerExponential => 2 * dim,
            _ => dim,
        }
    }

    /// Lenient lookup: unknown names resolve to [`KernelFamily::FALLBACK`] with a warning.
    pub fn from_name_or_fallback(name: &str) -> Self {
        match name.parse() {
            Ok(family) => family,
            Err(_) => {
                log::warn!(
                    "kernel family {:?} wrongly written, using {} kernel",
                    name,
                    Self::FALLBACK.name()
                );
                Self::FALLBACK
            }
        }
    }
}

impl FromStr for KernelFamily {
    type Err = CovarianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.name() == s)
            .ok_or_else(|| CovarianceError::UnknownKernel(s.to_string()))
    }
}

impl fmt::Display for KernelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pairwise correlation evaluator, one variant per family.
///
/// Inputs must have equal length; this is only checked in debug builds.
/// Evaluation never fails and never allocates.
#[derive(Debug, PartialEq)]
pub enum CorrelationFunction {
    WhiteNoise,
    Gauss,
    Exponential,
    Matern32,
    Matern52,
    /// Per-dimension exponents `p_k`.
    PowerExponential { powers: Box<[f64]> },
}

impl CorrelationFunction {
    /// Build the evaluator for `family`.
    ///
    /// `param` is the raw parameter vector; only power-exponential reads it,
    /// taking the exponents from `param[dim..2 * dim]`. Missing exponents
    /// default to 1 with a warning.
    pub fn new(family: KernelFamily, dim: usize, param: &[f64]) -> Self {
        match family {
            KernelFamily::WhiteNoise => CorrelationFunction::WhiteNoise,
            KernelFamily::Gauss => CorrelationFunction::Gauss,
            KernelFamily::Exponential => CorrelationFunction::Exponential,
            KernelFamily::Matern32 => CorrelationFunction::Matern32,
            KernelFamily::Matern52 => CorrelationFunction::Matern52,
            KernelFamily::PowerExponential => {
                let supplied = param.get(dim..).unwrap_or(&[]);
                if supplied.len() < dim {
                    log::warn!(
                        "powexp expects {} exponents, got {}; missing exponents default to 1",
                        dim,
                        supplied.len()
                    );
                }
                let powers = (0..dim)
                    .map(|k| supplied.get(k).copied().unwrap_or(1.0))
                    .collect();
                CorrelationFunction::PowerExponential { powers }
            }
        }
    }

    /// Build from a kernel name, falling back to exponential on unknown names.
    pub fn from_name(name: &str, dim: usize, param: &[f64]) -> Self {
        Self::new(KernelFamily::from_name_or_fallback(name), dim, param)
    }

    pub fn family(&self) -> KernelFamily {
        match self {
            CorrelationFunction::WhiteNoise => KernelFamily::WhiteNoise,
            CorrelationFunction::Gauss => KernelFamily::Gauss,
            CorrelationFunction::Exponential => KernelFamily::Exponential,
            CorrelationFunction::Matern32 => KernelFamily::Matern32,
            CorrelationFunction::Matern52 => KernelFamily::Matern52,
            CorrelationFunction::PowerExponential { .. } => KernelFamily::PowerExponential,
        }
    }

    #[inline]
    pub fn scaling_factor(&self) -> f64 {
        self.family().scaling_factor()
    }

    /// Correlation between two rescaled points.
    #[inline]
    pub fn corr(&self, x1: &[f64], x2: &[f64]) -> f64 {
        self.corr_with_offset(x1, x2, 0.0)
    }

    /// Correlation with `offset` added to the distance sum before exponentiation.
    ///
    /// `offset` is the off-diagonal tiny nugget. White noise and
    /// power-exponential ignore it.
    #[inline]
    pub fn corr_with_offset(&self, x1: &[f64], x2: &[f64], offset: f64) -> f64 {
        debug_assert_eq!(x1.len(), x2.len(), "points must have the same dimension");
        match self {
            CorrelationFunction::WhiteNoise => {
                let s: f64 = x1.iter().zip(x2).map(|(a, b)| (a - b).abs()).sum();
                if s < WHITE_NOISE_TOLERANCE {
                    1.0
                } else {
                    0.0
                }
            }
            CorrelationFunction::Gauss => {
                let mut s = offset;
                for (a, b) in x1.iter().zip(x2) {
                    let t = a - b;
                    s += t * t;
                }
                (-s).exp()
            }
            CorrelationFunction::Exponential => {
                let mut s = offset;
                for (a, b) in x1.iter().zip(x2) {
                    s += (a - b).abs();
                }
                (-s).exp()
            }
            CorrelationFunction::Matern32 => {
                let mut s = offset;
                let mut prod = 1.0;
                for (a, b) in x1.iter().zip(x2) {
                    let d = (a - b).abs();
                    s += d;
                    prod *= 1.0 + d;
                }
                prod * (-s).exp()
            }
            CorrelationFunction::Matern52 => {
                let mut s = offset;
                let mut prod = 1.0;
                for (a, b) in x1.iter().zip(x2) {
                    let d = (a - b).abs();
                    s += d;
                    prod *= 1.0 + d + d * d * ONE_THIRD;
                }
                prod * (-s).exp()
            }
            CorrelationFunction::PowerExponential { powers } => {
                debug_assert_eq!(x1.len(), powers.len());
                let mut s = 0.0;
                for ((a, b), p) in x1.iter().zip(x2).zip(powers.iter()) {
                    s += (a - b).abs().powf(*p);
                }
                (-s).exp()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kernels(dim: usize) -> Vec<CorrelationFunction> {
        let mut param = vec![1.0; dim];
        param.extend(std::iter::repeat(1.5).take(dim));
        KernelFamily::ALL
            .into_iter()
            .map(|f| CorrelationFunction::new(f, dim, &param))
            .collect()
    }

    #[test]
    fn test_names_roundtrip() {
        for family in KernelFamily::ALL {
            assert_eq!(family.name().parse::<KernelFamily>().unwrap(), family);
            assert_eq!(family.to_string(), family.name());
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!("Gauss".parse::<KernelFamily>().is_err());
        assert!(matches!(
            "matern".parse::<KernelFamily>(),
            Err(CovarianceError::UnknownKernel(ref s)) if s == "matern"
        ));
    }

    #[test]
    fn test_fallback_is_exponential() {
        assert_eq!(
            KernelFamily::from_name_or_fallback("gaussian"),
            KernelFamily::Exponential
        );
        assert_eq!(
            CorrelationFunction::from_name("nope", 2, &[1.0, 1.0]),
            CorrelationFunction::Exponential
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&KernelFamily::Matern52).unwrap();
        assert_eq!(json, "\"matern5_2\"");
        let back: KernelFamily = serde_json::from_str("\"powexp\"").unwrap();
        assert_eq!(back, KernelFamily::PowerExponential);
    }

    #[test]
    fn test_scaling_factors() {
        assert_eq!(KernelFamily::Exponential.scaling_factor(), 1.0);
        assert_eq!(KernelFamily::WhiteNoise.scaling_factor(), 1.0);
        assert_eq!(KernelFamily::PowerExponential.scaling_factor(), 1.0);
        assert!((KernelFamily::Gauss.scaling_factor() - 0.5_f64.sqrt()).abs() < 1e-15);
        assert!((KernelFamily::Matern32.scaling_factor() - 1.7320508075688772).abs() < 1e-15);
        assert!((KernelFamily::Matern52.scaling_factor() - 2.23606797749979).abs() < 1e-15);
    }

    #[test]
    fn test_powexp_keeps_supplied_exponents() {
        let kernel = CorrelationFunction::new(KernelFamily::PowerExponential, 2, &[1.0, 1.0, 2.0]);
        assert_eq!(
            kernel,
            CorrelationFunction::PowerExponential {
                powers: vec![2.0, 1.0].into_boxed_slice()
            }
        );

        let kernel = CorrelationFunction::new(KernelFamily::PowerExponential, 2, &[1.0]);
        assert_eq!(
            kernel,
            CorrelationFunction::PowerExponential {
                powers: vec![1.0, 1.0].into_boxed_slice()
            }
        );
    }

    #[test]
    fn test_param_len() {
        assert_eq!(KernelFamily::Gauss.param_len(3), 3);
        assert_eq!(KernelFamily::PowerExponential.param_len(3), 6);
    }

    #[test]
    fn test_self_correlation_is_one() {
        let x = [0.3, -1.2, 4.0];
        for kernel in all_kernels(3) {
            assert_eq!(kernel.corr(&x, &x), 1.0, "{:?}", kernel.family());
        }
    }

    #[test]
    fn test_symmetry() {
        let x = [0.3, -1.2, 4.0];
        let y = [1.1, 0.4, 3.5];
        for kernel in all_kernels(3) {
            assert_eq!(kernel.corr(&x, &y), kernel.corr(&y, &x));
        }
    }

    #[test]
    fn test_exponential_value() {
        let k = CorrelationFunction::Exponential;
        assert!((k.corr(&[0.0], &[1.0]) - (-1.0_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_gauss_value() {
        let k = CorrelationFunction::Gauss;
        let c = k.corr(&[0.0, 0.0], &[1.0, 1.0]);
        assert!((c - (-2.0_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_matern_values() {
        let d: f64 = 0.7;
        let m32 = CorrelationFunction::Matern32.corr(&[0.0], &[d]);
        assert!((m32 - (1.0 + d) * (-d).exp()).abs() < 1e-15);
        let m52 = CorrelationFunction::Matern52.corr(&[0.0], &[d]);
        assert!((m52 - (1.0 + d + d * d / 3.0) * (-d).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_matern_product_over_dimensions() {
        let c = CorrelationFunction::Matern32.corr(&[0.0, 0.0], &[0.5, 1.0]);
        let expected = 1.5 * 2.0 * (-1.5_f64).exp();
        assert!((c - expected).abs() < 1e-15);
    }

    #[test]
    fn test_powexp_uses_exponents() {
        let k = CorrelationFunction::new(KernelFamily::PowerExponential, 2, &[1.0, 1.0, 2.0, 1.0]);
        let c = k.corr(&[0.0, 0.0], &[0.5, 0.5]);
        assert!((c - (-(0.25 + 0.5_f64)).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_powexp_missing_exponents_default_to_one() {
        let k = CorrelationFunction::new(KernelFamily::PowerExponential, 2, &[1.0, 1.0]);
        assert_eq!(
            k,
            CorrelationFunction::PowerExponential {
                powers: vec![1.0, 1.0].into_boxed_slice()
            }
        );
    }

    #[test]
    fn test_white_noise() {
        let k = CorrelationFunction::WhiteNoise;
        assert_eq!(k.corr(&[1.0, 2.0], &[1.0, 2.0]), 1.0);
        assert_eq!(k.corr(&[1.0, 2.0], &[1.0, 2.0 + 1e-10]), 0.0);
    }

    #[test]
    fn test_offset_shrinks_correlation() {
        let x = [0.0];
        let y = [0.5];
        for kernel in [
            CorrelationFunction::Gauss,
            CorrelationFunction::Exponential,
            CorrelationFunction::Matern32,
            CorrelationFunction::Matern52,
        ] {
            let plain = kernel.corr(&x, &y);
            let shifted = kernel.corr_with_offset(&x, &y, 1e-3);
            assert!((shifted - plain * (-1e-3_f64).exp()).abs() < 1e-15);
        }
        let wn = CorrelationFunction::WhiteNoise;
        assert_eq!(wn.corr_with_offset(&x, &x, 1.0), 1.0);
    }

    #[test]
    fn test_bounds_for_distinct_points() {
        let x = [0.1, 0.2];
        let y = [0.9, -0.4];
        for kernel in all_kernels(2) {
            let c = kernel.corr(&x, &y);
            assert!(c.is_finite());
            assert!(c <= 1.0);
            if kernel.family() != KernelFamily::WhiteNoise {
                assert!(c > 0.0);
            }
        }
    }
}
