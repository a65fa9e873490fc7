//! Operations defined only for single-row or single-column matrices.

use super::matrix::Matrix;
use super::Scalar;
use crate::error::{MatrixError, Result};

const DEGENERATE_LENGTH: Scalar = 1e-6;

impl Matrix {
    /// Number of elements of a row or column vector.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotAVector`] if the matrix has more than one
    /// row and more than one column.
    pub fn vector_len(&self) -> Result<usize> {
        let (rows, cols) = self.shape();
        if !self.is_vector() {
            return Err(MatrixError::NotAVector { rows, cols });
        }
        Ok(rows.max(cols))
    }

    /// The `k`-th element of a vector, whatever its orientation.
    fn vector_at(&self, k: usize) -> Scalar {
        if self.n_rows() == 1 {
            self.get(0, k)
        } else {
            self.get(k, 0)
        }
    }

    /// Dot product of a vector with itself (squared length).
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotAVector`] for non-vectors.
    pub fn self_dot(&self) -> Result<Scalar> {
        let n = self.vector_len()?;
        Ok((0..n).map(|k| self.vector_at(k)).map(|x| x * x).sum())
    }

    /// The vector scaled to length 1.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotAVector`] for non-vectors and
    /// [`MatrixError::DegenerateVector`] if the length is (nearly) zero.
    pub fn unit_vector(&self) -> Result<Matrix> {
        self.vector_len()?;
        let length = self.length();
        if length.abs() < DEGENERATE_LENGTH {
            return Err(MatrixError::DegenerateVector {
                length: f64::from(length),
            });
        }
        self.map(|x| x / length)
    }

    /// Cosine of the angle between two vectors of the same shape.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotAVector`] for non-vectors,
    /// [`MatrixError::DimensionMismatch`] if the shapes differ and
    /// [`MatrixError::DegenerateVector`] if either vector has zero length.
    pub fn cosine_between(&self, other: &Matrix) -> Result<Scalar> {
        let n = self.vector_len()?;
        other.vector_len()?;
        if self.shape() != other.shape() {
            return Err(MatrixError::dimension_mismatch(self.shape(), other.shape()));
        }
        let (la, lb) = (self.length(), other.length());
        for length in [la, lb] {
            if length == 0.0 {
                return Err(MatrixError::DegenerateVector {
                    length: f64::from(length),
                });
            }
        }
        let dot: Scalar = (0..n).map(|k| self.vector_at(k) * other.vector_at(k)).sum();
        Ok(dot / (la * lb))
    }

    /// Cross product of two 3-element vectors. The result has `self`'s orientation.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotAVector`] for non-vectors and
    /// [`MatrixError::DimensionUnsupported`] unless both have 3 elements.
    pub fn cross_product(&self, other: &Matrix) -> Result<Matrix> {
        for v in [self, other] {
            let dims = v.vector_len()?;
            if dims != 3 {
                return Err(MatrixError::DimensionUnsupported {
                    dims,
                    supported: "3-element vectors",
                });
            }
        }
        let (a, b) = (
            [self.vector_at(0), self.vector_at(1), self.vector_at(2)],
            [other.vector_at(0), other.vector_at(1), other.vector_at(2)],
        );
        let c = [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ];
        Matrix::from_slice(self.n_rows(), self.n_cols(), &c)
    }

    /// A vector perpendicular to this 2- or 3-element vector.
    ///
    /// In 2-D `(x, y)` maps to `(-y, x)`. In 3-D the result is the cross
    /// product with `e_x`, or with `e_y` when the vector is nearly parallel
    /// to `e_x`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotAVector`] for non-vectors and
    /// [`MatrixError::DimensionUnsupported`] for any other length, since
    /// above three dimensions there are infinitely many perpendiculars.
    pub fn perpendicular(&self) -> Result<Matrix> {
        match self.vector_len()? {
            2 => {
                let (x, y) = (self.vector_at(0), self.vector_at(1));
                Matrix::from_slice(self.n_rows(), self.n_cols(), &[-y, x])
            }
            3 => {
                let base = if self.vector_at(0).abs() > 0.99 {
                    [0.0, 1.0, 0.0]
                } else {
                    [1.0, 0.0, 0.0]
                };
                let base = Matrix::from_slice(self.n_rows(), self.n_cols(), &base)?;
                self.cross_product(&base)
            }
            dims => Err(MatrixError::DimensionUnsupported {
                dims,
                supported: "2- or 3-element vectors",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::TransposeMode;

    fn row(values: &[Scalar]) -> Matrix {
        Matrix::from_slice(1, values.len(), values).expect("non-empty row")
    }

    fn col(values: &[Scalar]) -> Matrix {
        Matrix::from_slice(values.len(), 1, values).expect("non-empty column")
    }

    #[test]
    fn test_vector_len_rejects_matrix() {
        let m = Matrix::zeros(2, 2).expect("2x2");
        assert!(matches!(
            m.vector_len(),
            Err(MatrixError::NotAVector { rows: 2, cols: 2 })
        ));
        assert_eq!(row(&[1.0, 2.0, 3.0]).vector_len().expect("row"), 3);
        assert_eq!(col(&[1.0, 2.0]).vector_len().expect("column"), 2);
    }

    #[test]
    fn test_self_dot() {
        assert!((row(&[3.0, 4.0]).self_dot().expect("row") - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_unit_vector() {
        let u = col(&[3.0, 4.0]).unit_vector().expect("non-zero");
        assert_eq!(u.shape(), (2, 1));
        assert!((u.get(0, 0) - 0.6).abs() < 1e-6);
        assert!((u.get(1, 0) - 0.8).abs() < 1e-6);
        assert!((u.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unit_vector_of_transposed_view() {
        let m = col(&[0.0, 5.0]);
        let t = m.transpose(TransposeMode::View).expect("view");
        let u = t.unit_vector().expect("non-zero");
        assert_eq!(u.shape(), (1, 2));
        assert!((u.get(0, 1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unit_vector_zero_length() {
        assert!(matches!(
            row(&[0.0, 0.0]).unit_vector(),
            Err(MatrixError::DegenerateVector { .. })
        ));
    }

    #[test]
    fn test_unit_vector_not_a_vector() {
        let m = Matrix::filled(2, 2, 1.0).expect("2x2");
        assert!(matches!(m.unit_vector(), Err(MatrixError::NotAVector { .. })));
    }

    #[test]
    fn test_cosine_between() {
        let a = row(&[1.0, 0.0]);
        let b = row(&[0.0, 1.0]);
        assert!(a.cosine_between(&b).expect("orthogonal").abs() < 1e-6);
        let c = row(&[2.0, 0.0]);
        assert!((a.cosine_between(&c).expect("parallel") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_bounded_by_schwarz() {
        let a = row(&[1.0, 2.0, 4.0]);
        let b = row(&[4.0, 2.0, 13.0]);
        let cos = a.cosine_between(&b).expect("same shape");
        assert!(cos.abs() <= 1.0);
    }

    #[test]
    fn test_cosine_shape_mismatch() {
        let a = row(&[1.0, 0.0]);
        let b = col(&[1.0, 0.0]);
        assert!(matches!(
            a.cosine_between(&b),
            Err(MatrixError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_cosine_zero_vector() {
        let a = row(&[0.0, 0.0]);
        let b = row(&[1.0, 0.0]);
        assert!(a.cosine_between(&b).is_err());
    }

    #[test]
    fn test_cross_product() {
        let x = col(&[1.0, 0.0, 0.0]);
        let y = col(&[0.0, 1.0, 0.0]);
        let z = x.cross_product(&y).expect("3-vectors");
        assert_eq!(z.shape(), (3, 1));
        assert_eq!(z.to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_cross_product_mixed_orientation() {
        let x = row(&[1.0, 0.0, 0.0]);
        let y = col(&[0.0, 1.0, 0.0]);
        let z = x.cross_product(&y).expect("3-vectors");
        assert_eq!(z.shape(), (1, 3));
        assert_eq!(z.to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_cross_product_wrong_dims() {
        let a = row(&[1.0, 2.0]);
        let b = row(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            a.cross_product(&b),
            Err(MatrixError::DimensionUnsupported { dims: 2, .. })
        ));
    }

    #[test]
    fn test_perpendicular_2d() {
        let v = row(&[3.0, 4.0]);
        let p = v.perpendicular().expect("2-D");
        assert_eq!(p.to_vec(), vec![-4.0, 3.0]);
        assert!(v.cosine_between(&p).expect("same shape").abs() < 1e-6);
    }

    #[test]
    fn test_perpendicular_3d() {
        for values in [[0.0, 1.0, 2.0], [1.0, 0.0, 0.0], [0.3, -2.0, 5.0]] {
            let v = row(&values);
            let p = v.perpendicular().expect("3-D");
            let dot: Scalar = v.to_vec().iter().zip(p.to_vec()).map(|(a, b)| a * b).sum();
            assert!(dot.abs() < 1e-5, "{values:?} . {:?} = {dot}", p.to_vec());
            assert!(p.length() > 0.0);
        }
    }

    #[test]
    fn test_perpendicular_4d_unsupported() {
        let v = row(&[1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            v.perpendicular(),
            Err(MatrixError::DimensionUnsupported { dims: 4, .. })
        ));
    }
}
