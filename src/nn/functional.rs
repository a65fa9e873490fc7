//! Stateless activation functions.

use crate::error::Result;
use crate::primitives::{Matrix, Scalar};

/// Scalar sigmoid: σ(x) = 1 / (1 + exp(-x))
#[inline]
#[must_use]
pub fn sigmoid_scalar(x: Scalar) -> Scalar {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid of every element, into a new matrix.
///
/// # Errors
///
/// Returns [`crate::error::MatrixError::Allocation`] if the result cannot be allocated.
pub fn sigmoid(x: &Matrix) -> Result<Matrix> {
    x.map(sigmoid_scalar)
}

/// Sigmoid of every element, in place.
pub fn sigmoid_in_place(x: &mut Matrix) {
    x.apply(sigmoid_scalar);
}
