//! Stratamx: strided, reference-counted dense matrices and a small
//! finite-difference neural network built on them.
//!
//! Matrices are lightweight handles. Each one carries its own shape and
//! strides over a shared element buffer, so views, transposes and
//! rectangular slices cost no copy unless a copy is asked for. The buffer
//! is freed when its last handle is dropped.
//!
//! # Quick Start
//!
//! ```
//! use stratamx::prelude::*;
//!
//! let a = Matrix::from_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("2x3");
//! let t = a.transpose(TransposeMode::View).expect("views never copy");
//! assert!(t.shares_buffer(&a));
//!
//! // A · Aᵀ, read through the transposed strides
//! let g = a.dot(&t).expect("2x3 · 3x2");
//! assert_eq!(g.to_vec(), vec![14.0, 32.0, 32.0, 77.0]);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: buffers, layouts, matrices and the dense kernel
//! - [`data`]: comma-separated dataset loading
//! - [`nn`]: feed-forward sigmoid networks and their trainer
//! - [`optim`]: gradient descent for linear regression
//! - [`error`]: the crate error type
//!
//! # Features
//!
//! - `f64`: use `f64` elements instead of `f32`

pub mod data;
pub mod error;
pub mod nn;
pub mod optim;
pub mod prelude;
pub mod primitives;

pub use error::{MatrixError, Result};
pub use primitives::{Matrix, Scalar};
