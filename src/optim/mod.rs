//! Optimization algorithms over [`crate::primitives::Matrix`] parameters.
//!
//! - [`GradientDescent`]: full-batch descent for least-squares regression
//!
//! Network training by finite differences lives in [`crate::nn::Trainer`].

mod gradient_descent;

pub use gradient_descent::GradientDescent;
