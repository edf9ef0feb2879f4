//! # kriging-core
//!
//! Covariance kernel engine for Gaussian-process and Kriging models.
//!
//! This crate computes correlation matrices between spatial points:
//! - Correlation families (white noise, Gaussian, exponential, Matérn 3/2 and 5/2,
//!   power-exponential)
//! - Lengthscale precomputation, so kernels run on unit-scale coordinates
//! - Point collections with a compile-time choice of storage layout
//! - Symmetric correlation fills with nugget regularization, and rectangular
//!   cross-correlation fills
//!
//! ## Typical use
//!
//! ```
//! use kriging_core::{Covariance, CovarianceParameters, DenseMatrix, Points};
//!
//! let params = CovarianceParameters::new(2, &[1.0, 0.5], 1.0, "matern5_2");
//! let x = DenseMatrix::from_rows(&[&[0.0, 0.0], &[0.3, 0.1], &[1.0, 0.8]]).unwrap();
//! let points: Points = Points::new(&x, &params)?;
//!
//! let covariance = Covariance::new(&params);
//! let mut k = DenseMatrix::default();
//! covariance.fill_corr_matrix(&mut k, &points, &[0.01])?;
//!
//! assert_eq!(k.shape(), (3, 3));
//! assert_eq!(k[(0, 2)], k[(2, 0)]);
//! # Ok::<(), kriging_core::CovarianceError>(())
//! ```
//!
//! ## Data Layout
//!
//! Coordinate inputs and correlation outputs are column-major [`DenseMatrix`]
//! values: element `(i, j)` lives at `data[i + j * nrows]`. Coordinate
//! matrices hold one point per row.
//!
//! ## Features
//!
//! - `parallel` (default): fill matrix columns concurrently with rayon.
//! - `nested-storage`: use one allocation per point as the default layout.

#![allow(clippy::needless_range_loop)]

pub mod parallel;

pub mod config;
pub mod covariance;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod params;
pub mod points;
pub mod storage;

pub use config::{CovarianceConfig, NuggetPolicy, Regularization};
pub use covariance::Covariance;
pub use error::{CovResult, CovarianceError};
pub use kernel::{CorrelationFunction, KernelFamily};
pub use matrix::DenseMatrix;
pub use params::CovarianceParameters;
pub use points::Points;
pub use storage::{DefaultStorage, NestedStorage, PointStorage, RowMajorStorage};
