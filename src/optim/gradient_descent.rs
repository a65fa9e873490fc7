//! Batch gradient descent for least-squares linear regression.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MatrixError, Result};
use crate::primitives::{Matrix, Scalar, TransposeMode};

/// Full-batch gradient descent on the mean squared error `‖y - Xw‖² / m`.
///
/// # Update Rule
///
/// ```text
/// r    = y - X·w
/// grad = -2/m · Xᵀ·r
/// w    = w - α · grad
/// ```
///
/// `Xᵀ` is taken as a view, so no copy of the design matrix is ever made.
///
/// # Example
///
/// ```
/// use stratamx::optim::GradientDescent;
/// use stratamx::primitives::Matrix;
///
/// // y = 2·x
/// let x = Matrix::from_slice(3, 1, &[1.0, 2.0, 3.0]).expect("3x1");
/// let y = Matrix::from_slice(3, 1, &[2.0, 4.0, 6.0]).expect("3x1");
/// let w0 = Matrix::zeros(1, 1).expect("1x1");
///
/// let w = GradientDescent::new(0.05).with_iterations(500).fit(&x, &y, w0).expect("shapes agree");
/// assert!((w.get(0, 0) - 2.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientDescent {
    /// Step size α
    learning_rate: Scalar,
    /// Number of full-batch updates
    iterations: usize,
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            iterations: 1_000,
        }
    }
}

impl GradientDescent {
    /// Creates an optimizer with the given learning rate and 1000 iterations.
    #[must_use]
    pub fn new(learning_rate: Scalar) -> Self {
        Self {
            learning_rate,
            ..Self::default()
        }
    }

    /// Sets the number of iterations.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> Scalar {
        self.learning_rate
    }

    /// Returns the number of iterations.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Fits weights `w` (`n x 1`) so that `x · w ≈ y`, starting from `w0`.
    ///
    /// `x` is `m x n` with one sample per row, `y` is `m x 1`. The starting
    /// weights are consumed and the fitted weights returned.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Config`] for a non-positive learning rate and
    /// [`MatrixError::DimensionMismatch`] if the shapes do not line up.
    pub fn fit(&self, x: &Matrix, y: &Matrix, w0: Matrix) -> Result<Matrix> {
        if !(self.learning_rate > 0.0) {
            return Err(MatrixError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        let (m, n) = x.shape();
        if y.shape() != (m, 1) {
            return Err(MatrixError::dimension_mismatch((m, 1), y.shape()));
        }
        if w0.shape() != (n, 1) {
            return Err(MatrixError::dimension_mismatch((n, 1), w0.shape()));
        }

        let xt = x.transpose(TransposeMode::View)?;
        let factor = -2.0 / m as Scalar;
        let mut w = w0;
        for iteration in 0..self.iterations {
            let residual = y.sub(&x.dot(&w)?)?;
            let grad = xt.dot(&residual)?.scale(factor)?;
            w = w.sub(&grad.scale(self.learning_rate)?)?;
            if iteration % 100 == 0 {
                let loss = residual.self_dot()? / m as Scalar;
                debug!(iteration, loss = f64::from(loss), "descent step");
            }
        }
        let loss = y.sub(&x.dot(&w)?)?.self_dot()? / m as Scalar;
        info!(iterations = self.iterations, loss = f64::from(loss), "gradient descent finished");
        Ok(w)
    }
}
