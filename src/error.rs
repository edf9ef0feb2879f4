//! Error type shared by the covariance engine.
//!
//! Per-pair kernel evaluation and the `fill_allocated_*` routines never fail.
//! Errors only come out of construction boundaries (parameters, point
//! collections, configuration) and out of the self-sizing fill wrappers.

use std::collections::TryReserveError;

use thiserror::Error;

/// Root error type for covariance computations.
#[derive(Error, Debug)]
pub enum CovarianceError {
    /// Kernel name not recognized by a strict parse.
    #[error("unknown kernel family: {0:?}")]
    UnknownKernel(String),

    /// Invalid lengthscale, exponent or variance.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A point collection or coordinate matrix disagrees with the expected dimension.
    #[error("{context}: dimension mismatch, expected {expected}, found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// Nugget length other than 0, 1 or n under a strict nugget policy.
    #[error("nugget length {found} does not match 0, 1 or {expected}")]
    NuggetLength { expected: usize, found: usize },

    /// Output matrix storage could not be allocated.
    #[error("cannot allocate {rows}x{cols} matrix: {source}")]
    Allocation {
        rows: usize,
        cols: usize,
        #[source]
        source: TryReserveError,
    },

    /// Configuration could not be parsed or failed validation.
    #[error("config error: {0}")]
    Config(String),
}

pub type CovResult<T> = Result<T, CovarianceError>;
