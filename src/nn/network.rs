//! Fully connected sigmoid network trained by finite differences.
//!
//! A network with architecture `[n0, n1, ..., nL]` holds, for every layer
//! `i`, a weight matrix `n_i x n_{i+1}` and a bias row `1 x n_{i+1}`, plus
//! one activation row per width. The forward pass computes
//!
//! ```text
//! a_0     = input
//! a_{i+1} = sigmoid(a_i · W_i + b_i)
//! ```
//!
//! Gradients are estimated numerically, one parameter at a time, which is
//! slow but needs nothing beyond the forward pass.

use std::fmt::Write as _;

use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use tracing::trace;

use super::functional::sigmoid_in_place;
use crate::error::{MatrixError, Result};
use crate::primitives::{Matrix, Scalar};

/// A feed-forward network with sigmoid activations on every layer.
///
/// # Examples
///
/// ```
/// use stratamx::nn::Network;
/// use stratamx::primitives::Matrix;
///
/// let mut nn = Network::new(&[2, 2, 1]).expect("valid architecture");
/// let x = Matrix::from_slice(1, 2, &[0.0, 1.0]).expect("1x2");
/// nn.forward(&x).expect("input matches layer 0");
/// // All parameters are zero, so every output is sigmoid(0).
/// assert!((nn.output().get(0, 0) - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Deserialize)]
#[serde(try_from = "NetworkRepr")]
pub struct Network {
    architecture: Vec<usize>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
    activations: Vec<Matrix>,
}

impl Network {
    /// Creates a zero-initialized network.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidShape`] if fewer than two widths are
    /// given or any width is zero.
    pub fn new(architecture: &[usize]) -> Result<Self> {
        if architecture.len() < 2 {
            return Err(MatrixError::InvalidShape {
                rows: architecture.len(),
                cols: 0,
            });
        }
        let mut weights = Vec::with_capacity(architecture.len() - 1);
        let mut biases = Vec::with_capacity(architecture.len() - 1);
        let mut activations = Vec::with_capacity(architecture.len());
        activations.push(Matrix::zeros(1, architecture[0])?);
        for pair in architecture.windows(2) {
            weights.push(Matrix::zeros(pair[0], pair[1])?);
            biases.push(Matrix::zeros(1, pair[1])?);
            activations.push(Matrix::zeros(1, pair[1])?);
        }
        Ok(Self {
            architecture: architecture.to_vec(),
            weights,
            biases,
            activations,
        })
    }

    /// A zero network with the same architecture, used to hold gradients.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Allocation`] if storage cannot be obtained.
    pub fn zeros_like(&self) -> Result<Self> {
        Self::new(&self.architecture)
    }

    /// Redraws every weight and bias uniformly from `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidRange`] if `low > high` or the range is
    /// not finite.
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        low: Scalar,
        high: Scalar,
    ) -> Result<()> {
        for param in self.weights.iter_mut().chain(self.biases.iter_mut()) {
            param.fill_random(low, high, rng)?;
        }
        Ok(())
    }

    /// Layer widths, input first.
    #[must_use]
    pub fn architecture(&self) -> &[usize] {
        &self.architecture
    }

    /// Number of weight layers (one less than the number of widths).
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.weights.len()
    }

    /// Weight matrices, one per layer.
    #[must_use]
    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    /// Bias rows, one per layer.
    #[must_use]
    pub fn biases(&self) -> &[Matrix] {
        &self.biases
    }

    /// Mutable weight matrices. Shapes must be left unchanged.
    pub fn weights_mut(&mut self) -> &mut [Matrix] {
        &mut self.weights
    }

    /// Mutable bias rows. Shapes must be left unchanged.
    pub fn biases_mut(&mut self) -> &mut [Matrix] {
        &mut self.biases
    }

    /// The activation row of layer 0, i.e. the last input fed forward.
    #[must_use]
    pub fn input(&self) -> &Matrix {
        &self.activations[0]
    }

    /// The activation row of the last layer.
    #[must_use]
    pub fn output(&self) -> &Matrix {
        &self.activations[self.activations.len() - 1]
    }

    fn input_width(&self) -> usize {
        self.architecture[0]
    }

    fn output_width(&self) -> usize {
        self.architecture[self.architecture.len() - 1]
    }

    /// Runs one sample through the network. `input` must be `1 x n0`; the
    /// network keeps a view of it as its input activation.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] if `input` is not a row of
    /// the input width.
    pub fn forward(&mut self, input: &Matrix) -> Result<()> {
        let expected = (1, self.input_width());
        if input.shape() != expected {
            return Err(MatrixError::dimension_mismatch(expected, input.shape()));
        }
        self.activations[0] = input.view();
        for i in 0..self.weights.len() {
            let mut z = self.activations[i].dot(&self.weights[i])?;
            z.add_assign(&self.biases[i])?;
            sigmoid_in_place(&mut z);
            self.activations[i + 1] = z;
        }
        Ok(())
    }

    fn check_samples(&self, ti: &Matrix, to: &Matrix) -> Result<()> {
        if ti.n_rows() != to.n_rows() {
            return Err(MatrixError::DimensionMismatch {
                expected: format!("{} target rows", ti.n_rows()),
                actual: format!("{} target rows", to.n_rows()),
            });
        }
        if ti.n_cols() != self.input_width() {
            return Err(MatrixError::dimension_mismatch(
                (ti.n_rows(), self.input_width()),
                ti.shape(),
            ));
        }
        if to.n_cols() != self.output_width() {
            return Err(MatrixError::dimension_mismatch(
                (to.n_rows(), self.output_width()),
                to.shape(),
            ));
        }
        Ok(())
    }

    /// Mean over samples of the summed squared output error.
    ///
    /// Row `k` of `ti` is the input of sample `k`, row `k` of `to` its target.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] if the row counts differ or
    /// the widths do not match the network.
    pub fn cost(&mut self, ti: &Matrix, to: &Matrix) -> Result<Scalar> {
        self.check_samples(ti, to)?;
        let samples = ti.n_rows();
        let mut total = 0.0;
        for k in 0..samples {
            let x = ti.slice_view(k, k, 0, ti.n_cols() - 1)?;
            self.forward(&x)?;
            let out = self.output();
            for j in 0..to.n_cols() {
                let d = out.get(0, j) - to.get(k, j);
                total += d * d;
            }
        }
        Ok(total / samples as Scalar)
    }

    /// Estimates the cost gradient of every weight and bias by forward
    /// differences, `(cost(θ + eps) - cost(θ)) / eps`, writing it into `grad`.
    ///
    /// Every parameter is restored after it has been probed. Returns the
    /// unperturbed cost.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidMatrix`] if `grad` has a different
    /// architecture, plus the errors of [`Network::cost`].
    pub fn finite_difference(
        &mut self,
        grad: &mut Network,
        eps: Scalar,
        ti: &Matrix,
        to: &Matrix,
    ) -> Result<Scalar> {
        self.check_same_architecture(grad)?;
        let base = self.cost(ti, to)?;
        trace!(cost = f64::from(base), "finite difference pass");

        for i in 0..self.weights.len() {
            let (rows, cols) = self.weights[i].shape();
            for r in 0..rows {
                for c in 0..cols {
                    let saved = self.weights[i].get(r, c);
                    self.weights[i].set(r, c, saved + eps)?;
                    let probed = self.cost(ti, to);
                    self.weights[i].set(r, c, saved)?;
                    grad.weights[i].set(r, c, (probed? - base) / eps)?;
                }
            }
            for c in 0..self.biases[i].n_cols() {
                let saved = self.biases[i].get(0, c);
                self.biases[i].set(0, c, saved + eps)?;
                let probed = self.cost(ti, to);
                self.biases[i].set(0, c, saved)?;
                grad.biases[i].set(0, c, (probed? - base) / eps)?;
            }
        }
        Ok(base)
    }

    /// Takes one descent step: `θ -= rate * g` for every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidMatrix`] if `grad` has a different
    /// architecture.
    pub fn learn(&mut self, grad: &Network, rate: Scalar) -> Result<()> {
        self.check_same_architecture(grad)?;
        for (param, g) in self
            .weights
            .iter_mut()
            .chain(self.biases.iter_mut())
            .zip(grad.weights.iter().chain(grad.biases.iter()))
        {
            param.sub_assign(&g.scale(rate)?)?;
        }
        Ok(())
    }

    fn check_same_architecture(&self, other: &Network) -> Result<()> {
        if self.architecture != other.architecture {
            return Err(MatrixError::InvalidMatrix(format!(
                "gradient architecture {:?} does not match network {:?}",
                other.architecture, self.architecture
            )));
        }
        Ok(())
    }

    /// Renders every weight and bias as `name = [ ws0=([..]); bs0=([..]); ... ]`.
    #[must_use]
    pub fn render(&self, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{name} = [");
        for (i, (w, b)) in self.weights.iter().zip(&self.biases).enumerate() {
            out.push_str(&w.render(&format!("ws{i}"), 4));
            out.push_str(&b.render(&format!("bs{i}"), 4));
        }
        out.push_str("]\n");
        out
    }
}

#[derive(Serialize)]
struct NetworkRef<'a> {
    architecture: &'a [usize],
    weights: &'a [Matrix],
    biases: &'a [Matrix],
}

impl Serialize for Network {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        NetworkRef {
            architecture: &self.architecture,
            weights: &self.weights,
            biases: &self.biases,
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct NetworkRepr {
    architecture: Vec<usize>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

impl TryFrom<NetworkRepr> for Network {
    type Error = MatrixError;

    fn try_from(repr: NetworkRepr) -> Result<Self> {
        let mut nn = Network::new(&repr.architecture)?;
        if repr.weights.len() != nn.weights.len() || repr.biases.len() != nn.biases.len() {
            return Err(MatrixError::InvalidMatrix(format!(
                "expected {} layers for architecture {:?}",
                nn.weights.len(),
                repr.architecture
            )));
        }
        for (slot, m) in nn.weights.iter_mut().zip(repr.weights) {
            if slot.shape() != m.shape() {
                return Err(MatrixError::dimension_mismatch(slot.shape(), m.shape()));
            }
            *slot = m;
        }
        for (slot, m) in nn.biases.iter_mut().zip(repr.biases) {
            if slot.shape() != m.shape() {
                return Err(MatrixError::dimension_mismatch(slot.shape(), m.shape()));
            }
            *slot = m;
        }
        Ok(nn)
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
