//! Dense kernel: element-wise operators, products and reductions.
//!
//! Every operator reads its operands through their own layouts, so
//! transposed views and slice views are consumed without copying.

use tracing::debug;

use super::matrix::{Matrix, Storage, TransposeMode};
use super::Scalar;
use crate::error::{MatrixError, Result};

impl Matrix {
    fn check_same_shape(&self, other: &Matrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(MatrixError::dimension_mismatch(self.shape(), other.shape()));
        }
        Ok(())
    }

    fn zip_with(&self, other: &Matrix, f: impl Fn(Scalar, Scalar) -> Scalar) -> Result<Matrix> {
        self.check_same_shape(other)?;
        let (rows, cols) = self.shape();
        let mut data = Vec::new();
        data.try_reserve_exact(rows * cols)
            .map_err(|_| MatrixError::Allocation {
                elements: rows * cols,
            })?;
        {
            let (a, b) = (self.reader(), other.reader());
            for i in 0..rows {
                for j in 0..cols {
                    data.push(f(a.at(i, j), b.at(i, j)));
                }
            }
        }
        Matrix::from_vec(rows, cols, data)
    }

    fn zip_assign(&mut self, other: &Matrix, f: impl Fn(Scalar, Scalar) -> Scalar) -> Result<()> {
        self.check_same_shape(other)?;
        // An operand aliasing our buffer would be borrowed while we write.
        let snapshot;
        let other = if self.shares_buffer(other) {
            snapshot = other.deep_copy()?;
            &snapshot
        } else {
            other
        };
        let b = other.reader();
        let (mut data, layout) = self.dense_mut()?;
        for i in 0..layout.rows {
            for j in 0..layout.cols {
                let at = layout.offset_of(i, j);
                data[at] = f(data[at], b.at(i, j));
            }
        }
        Ok(())
    }

    /// Element-wise sum into a new matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] if shapes differ.
    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Element-wise difference into a new matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] if shapes differ.
    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Adds `other` into this matrix in place.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] if shapes differ and
    /// [`MatrixError::InvalidMatrix`] if `self` is a constant.
    pub fn add_assign(&mut self, other: &Matrix) -> Result<()> {
        self.zip_assign(other, |a, b| a + b)
    }

    /// Subtracts `other` from this matrix in place.
    ///
    /// # Errors
    ///
    /// Same as [`Matrix::add_assign`].
    pub fn sub_assign(&mut self, other: &Matrix) -> Result<()> {
        self.zip_assign(other, |a, b| a - b)
    }

    /// A copy with every element multiplied by `k`. `self` is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Allocation`] if the copy cannot be allocated.
    pub fn scale(&self, k: Scalar) -> Result<Matrix> {
        let mut out = self.deep_copy()?;
        out.apply(|x| x * k);
        Ok(out)
    }

    /// Applies `f` to every logical element in place.
    ///
    /// On a constant matrix the constant itself is mapped.
    pub fn apply(&mut self, f: impl Fn(Scalar) -> Scalar) {
        if let Storage::Constant(value) = self.storage_mut() {
            *value = f(*value);
            return;
        }
        if let Ok((mut data, layout)) = self.dense_mut() {
            for i in 0..layout.rows {
                for j in 0..layout.cols {
                    let at = layout.offset_of(i, j);
                    data[at] = f(data[at]);
                }
            }
        }
    }

    /// A new matrix holding `f` of every element.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Allocation`] if the copy cannot be allocated.
    pub fn map(&self, f: impl Fn(Scalar) -> Scalar) -> Result<Matrix> {
        let mut out = self.deep_copy()?;
        out.apply(f);
        Ok(out)
    }

    /// Matrix product.
    ///
    /// If `self.cols != other.rows` the operands are aligned automatically:
    /// `other` is transposed (as a view) when `self.cols == other.cols`,
    /// otherwise `self` is transposed when `self.rows == other.rows`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::IncompatibleShape`] if no alignment works.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratamx::primitives::Matrix;
    ///
    /// let a = Matrix::from_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("2x3");
    /// let b = Matrix::from_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("3x2");
    /// let c = a.dot(&b).expect("inner dimensions agree");
    /// assert_eq!(c.to_vec(), vec![22.0, 28.0, 49.0, 64.0]);
    /// ```
    pub fn dot(&self, other: &Matrix) -> Result<Matrix> {
        let (lhs_t, rhs_t);
        let (lhs, rhs) = if self.n_cols() == other.n_rows() {
            (self, other)
        } else if self.n_cols() == other.n_cols() {
            debug!(left = ?self.shape(), right = ?other.shape(), "dot: transposing right operand");
            rhs_t = other.transpose(TransposeMode::View)?;
            (self, &rhs_t)
        } else if self.n_rows() == other.n_rows() {
            debug!(left = ?self.shape(), right = ?other.shape(), "dot: transposing left operand");
            lhs_t = self.transpose(TransposeMode::View)?;
            (&lhs_t, other)
        } else {
            return Err(MatrixError::IncompatibleShape {
                left: self.shape(),
                right: other.shape(),
            });
        };

        let (m, k, n) = (lhs.n_rows(), lhs.n_cols(), rhs.n_cols());
        let mut data = Vec::new();
        data.try_reserve_exact(m * n)
            .map_err(|_| MatrixError::Allocation { elements: m * n })?;
        {
            let (a, b) = (lhs.reader(), rhs.reader());
            for i in 0..m {
                for j in 0..n {
                    let mut sum = 0.0;
                    for p in 0..k {
                        sum += a.at(i, p) * b.at(p, j);
                    }
                    data.push(sum);
                }
            }
        }
        Matrix::from_vec(m, n, data)
    }

    /// Matrix product written into `out` without any validation.
    ///
    /// Accumulates in the same order as [`Matrix::dot`], so results are
    /// bit-identical for well-formed input.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that:
    /// - `a.n_cols() == b.n_rows()`,
    /// - `out` has shape `a.n_rows() x b.n_cols()`,
    /// - `a`, `b` and `out` are dense (not constant),
    /// - `out` does not share a buffer with `a` or `b`,
    /// - every layout addresses only elements inside its buffer.
    ///
    /// Violating any of these is undefined behavior.
    pub unsafe fn dot_unchecked(out: &mut Matrix, a: &Matrix, b: &Matrix) {
        let (Storage::Dense(a_buf), Storage::Dense(b_buf)) = (a.storage(), b.storage()) else {
            debug_assert!(false, "dot_unchecked: constant operand");
            return;
        };
        let (la, lb) = (a.layout(), b.layout());
        let (a_data, b_data) = (a_buf.borrow(), b_buf.borrow());
        let Ok((mut out_data, lo)) = out.dense_mut() else {
            debug_assert!(false, "dot_unchecked: constant output");
            return;
        };
        let (m, k, n) = (la.rows, la.cols, lb.cols);
        let tail = k - k % 4;
        for i in 0..m {
            for j in 0..n {
                let mut sum: Scalar = 0.0;
                let mut p = 0;
                while p < tail {
                    // SAFETY: offsets are in bounds by the caller's contract.
                    unsafe {
                        sum += *a_data.get_unchecked(la.offset_of(i, p))
                            * *b_data.get_unchecked(lb.offset_of(p, j));
                        sum += *a_data.get_unchecked(la.offset_of(i, p + 1))
                            * *b_data.get_unchecked(lb.offset_of(p + 1, j));
                        sum += *a_data.get_unchecked(la.offset_of(i, p + 2))
                            * *b_data.get_unchecked(lb.offset_of(p + 2, j));
                        sum += *a_data.get_unchecked(la.offset_of(i, p + 3))
                            * *b_data.get_unchecked(lb.offset_of(p + 3, j));
                    }
                    p += 4;
                }
                while p < k {
                    // SAFETY: as above.
                    unsafe {
                        sum += *a_data.get_unchecked(la.offset_of(i, p))
                            * *b_data.get_unchecked(lb.offset_of(p, j));
                    }
                    p += 1;
                }
                // SAFETY: `out` has shape m x n by the caller's contract.
                unsafe {
                    *out_data.get_unchecked_mut(lo.offset_of(i, j)) = sum;
                }
            }
        }
    }

    /// Sum of all logical elements.
    #[must_use]
    pub fn sum(&self) -> Scalar {
        let r = self.reader();
        let mut total = 0.0;
        for i in 0..self.n_rows() {
            for j in 0..self.n_cols() {
                total += r.at(i, j);
            }
        }
        total
    }

    /// Mean of all logical elements.
    #[must_use]
    pub fn average(&self) -> Scalar {
        self.sum() / self.layout().len() as Scalar
    }

    /// Frobenius norm: `sqrt(sum of squared elements)`.
    #[must_use]
    pub fn length(&self) -> Scalar {
        let r = self.reader();
        let mut total = 0.0;
        for i in 0..self.n_rows() {
            for j in 0..self.n_cols() {
                let x = r.at(i, j);
                total += x * x;
            }
        }
        total.sqrt()
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
