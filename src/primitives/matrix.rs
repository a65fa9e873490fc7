//! Matrix handles: a [`Layout`] over shared [`Buffer`] storage or a constant.

use std::cell::{Ref, RefMut};
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};

use super::buffer::{Buffer, BufferProbe};
use super::layout::Layout;
use super::Scalar;
use crate::error::{MatrixError, Result};

/// Backing of a matrix handle.
#[derive(Debug)]
pub(crate) enum Storage {
    /// Real elements, possibly shared with other handles.
    Dense(Buffer),
    /// No storage; every logical element reads as this value.
    Constant(Scalar),
}

/// How [`Matrix::transpose`] produces its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransposeMode {
    /// Share the buffer and swap strides; no data is moved.
    View,
    /// Materialize an independent row-major transposed buffer.
    Copy,
}

/// A 2D matrix handle of [`Scalar`] values with strided addressing.
///
/// Several handles may alias one buffer (views, transposed views). Writes
/// through any of them are visible through all of them. Dropping a handle
/// releases its reference; the buffer is freed with the last one.
///
/// # Examples
///
/// ```
/// use stratamx::primitives::{Matrix, TransposeMode};
///
/// let m = Matrix::from_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("6 values for 2x3");
/// let t = m.transpose(TransposeMode::View).expect("views never allocate");
/// assert_eq!(t.shape(), (3, 2));
/// assert_eq!(t.get(2, 1), 6.0);
/// assert!(t.shares_buffer(&m));
/// ```
pub struct Matrix {
    layout: Layout,
    storage: Storage,
}

/// Borrowed read access to every logical element of a matrix.
pub(crate) enum Reader<'a> {
    Dense { data: Ref<'a, Vec<Scalar>>, layout: Layout },
    Constant(Scalar),
}

impl Reader<'_> {
    #[inline]
    pub(crate) fn at(&self, i: usize, j: usize) -> Scalar {
        match self {
            Reader::Dense { data, layout } => data[layout.offset_of(i, j)],
            Reader::Constant(value) => *value,
        }
    }
}

/// Elements listed by `Debug` before the rest are elided.
const DEBUG_VALUES: usize = 64;

fn checked_len(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(MatrixError::InvalidShape { rows, cols });
    }
    rows.checked_mul(cols).ok_or(MatrixError::Allocation {
        elements: usize::MAX,
    })
}

impl Matrix {
    fn dense(layout: Layout, buffer: Buffer) -> Self {
        Self {
            layout,
            storage: Storage::Dense(buffer),
        }
    }

    /// Creates a zero-filled row-major matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidShape`] if either dimension is zero and
    /// [`MatrixError::Allocation`] if storage cannot be obtained.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        Ok(Self::dense(Layout::row_major(rows, cols), Buffer::allocate(len)?))
    }

    /// Creates a row-major matrix with every element set to `fill`.
    ///
    /// # Errors
    ///
    /// Same as [`Matrix::zeros`].
    pub fn filled(rows: usize, cols: usize, fill: Scalar) -> Result<Self> {
        let m = Self::zeros(rows, cols)?;
        if fill != 0.0 {
            if let Storage::Dense(buffer) = &m.storage {
                buffer.borrow_mut().fill(fill);
            }
        }
        Ok(m)
    }

    /// Creates a matrix that owns `data`, interpreted row-major.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is invalid or `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<Scalar>) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        if data.len() != len {
            return Err(MatrixError::DimensionMismatch {
                expected: format!("{rows}x{cols}={len} values"),
                actual: format!("{} values", data.len()),
            });
        }
        Ok(Self::dense(Layout::row_major(rows, cols), Buffer::from_vec(data)?))
    }

    /// Creates a matrix by copying `values` (row-major). The source is never aliased.
    ///
    /// # Errors
    ///
    /// Same as [`Matrix::from_vec`].
    pub fn from_slice(rows: usize, cols: usize, values: &[Scalar]) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        if values.len() != len {
            return Err(MatrixError::DimensionMismatch {
                expected: format!("{rows}x{cols}={len} values"),
                actual: format!("{} values", values.len()),
            });
        }
        let m = Self::zeros(rows, cols)?;
        if let Storage::Dense(buffer) = &m.storage {
            buffer.borrow_mut().copy_from_slice(values);
        }
        Ok(m)
    }

    /// Creates a lazy matrix with no storage that reads `value` everywhere.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidShape`] if either dimension is zero.
    pub fn constant(rows: usize, cols: usize, value: Scalar) -> Result<Self> {
        checked_len(rows, cols)?;
        Ok(Self {
            layout: Layout::row_major(rows, cols),
            storage: Storage::Constant(value),
        })
    }

    /// Creates an `n x n` identity matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidShape`] if `n == 0`.
    pub fn identity(n: usize) -> Result<Self> {
        Self::diagonal(n, 1.0)
    }

    /// Creates an `n x n` matrix with `value` on the main diagonal.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidShape`] if `n == 0`.
    pub fn diagonal(n: usize, value: Scalar) -> Result<Self> {
        let mut m = Self::zeros(n, n)?;
        for i in 0..n {
            m.set(i, i, value)?;
        }
        Ok(m)
    }

    /// Creates a matrix filled row-major with `start, start + 1, ...`.
    ///
    /// # Errors
    ///
    /// Same as [`Matrix::zeros`].
    pub fn arrange(rows: usize, cols: usize, start: Scalar) -> Result<Self> {
        let m = Self::zeros(rows, cols)?;
        if let Storage::Dense(buffer) = &m.storage {
            let mut value = start;
            for x in buffer.borrow_mut().iter_mut() {
                *x = value;
                value += 1.0;
            }
        }
        Ok(m)
    }

    /// Creates a matrix of values drawn uniformly from `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidRange`] if `low > high` or the range is
    /// not finite, plus the errors of [`Matrix::zeros`].
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        low: Scalar,
        high: Scalar,
        rng: &mut R,
    ) -> Result<Self> {
        let mut m = Self::zeros(rows, cols)?;
        m.fill_random(low, high, rng)?;
        Ok(m)
    }

    /// Overwrites every logical element with a value drawn from `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidRange`] if `low > high`, either is NaN or
    /// the width `high - low` is not finite, and [`MatrixError::InvalidMatrix`]
    /// for constant matrices.
    pub fn fill_random<R: Rng + ?Sized>(
        &mut self,
        low: Scalar,
        high: Scalar,
        rng: &mut R,
    ) -> Result<()> {
        if !(low <= high) {
            return Err(MatrixError::InvalidRange(format!(
                "random range [{low}, {high}] is empty"
            )));
        }
        if !(high - low).is_finite() {
            return Err(MatrixError::InvalidRange(format!(
                "random range [{low}, {high}] is not finite"
            )));
        }
        let (mut data, layout) = self.dense_mut()?;
        for i in 0..layout.rows {
            for j in 0..layout.cols {
                data[layout.offset_of(i, j)] = rng.gen_range(low..=high);
            }
        }
        Ok(())
    }

    /// Returns the shape as `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.layout.shape()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.layout.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.layout.cols
    }

    /// Returns the addressing layout of this handle.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns `(row_stride, col_stride)`.
    #[must_use]
    pub fn strides(&self) -> (usize, usize) {
        (self.layout.row_stride, self.layout.col_stride)
    }

    /// Whether this is a lazy matrix without storage.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self.storage, Storage::Constant(_))
    }

    /// Whether the matrix is a single row or a single column.
    #[must_use]
    pub fn is_vector(&self) -> bool {
        self.layout.rows == 1 || self.layout.cols == 1
    }

    /// Reference count of the backing buffer, `None` for constants.
    #[must_use]
    pub fn ref_count(&self) -> Option<usize> {
        match &self.storage {
            Storage::Dense(buffer) => Some(buffer.ref_count()),
            Storage::Constant(_) => None,
        }
    }

    /// Weak observer of the backing buffer, `None` for constants.
    #[must_use]
    pub fn probe(&self) -> Option<BufferProbe> {
        match &self.storage {
            Storage::Dense(buffer) => Some(buffer.probe()),
            Storage::Constant(_) => None,
        }
    }

    /// Whether both handles alias the same buffer.
    #[must_use]
    pub fn shares_buffer(&self, other: &Matrix) -> bool {
        match (&self.storage, &other.storage) {
            (Storage::Dense(a), Storage::Dense(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub(crate) fn reader(&self) -> Reader<'_> {
        match &self.storage {
            Storage::Dense(buffer) => Reader::Dense {
                data: buffer.borrow(),
                layout: self.layout,
            },
            Storage::Constant(value) => Reader::Constant(*value),
        }
    }

    pub(crate) fn dense_mut(&mut self) -> Result<(RefMut<'_, Vec<Scalar>>, Layout)> {
        match &self.storage {
            Storage::Dense(buffer) => Ok((buffer.borrow_mut(), self.layout)),
            Storage::Constant(_) => Err(MatrixError::InvalidMatrix(
                "constant matrix has no storage to write into".to_string(),
            )),
        }
    }

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Gets element at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Scalar {
        self.try_get(row, col).unwrap_or_else(|| {
            panic!(
                "index ({row}, {col}) out of bounds for {}x{} matrix",
                self.layout.rows, self.layout.cols
            )
        })
    }

    /// Gets element at `(row, col)`, or `None` if out of bounds.
    #[must_use]
    pub fn try_get(&self, row: usize, col: usize) -> Option<Scalar> {
        if row >= self.layout.rows || col >= self.layout.cols {
            return None;
        }
        Some(self.reader().at(row, col))
    }

    /// Sets element at `(row, col)`. The write is visible through every
    /// handle aliasing the same buffer.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidMatrix`] for constant matrices.
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: Scalar) -> Result<()> {
        assert!(
            row < self.layout.rows && col < self.layout.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.layout.rows,
            self.layout.cols
        );
        let (mut data, layout) = self.dense_mut()?;
        data[layout.offset_of(row, col)] = value;
        Ok(())
    }

    /// Element `(0, 0)`; the value of a 1x1 result.
    #[must_use]
    pub fn scalar(&self) -> Scalar {
        self.reader().at(0, 0)
    }

    /// Logical elements in row-major order, regardless of strides.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Scalar> {
        let reader = self.reader();
        let mut out = Vec::with_capacity(self.layout.len());
        for i in 0..self.layout.rows {
            for j in 0..self.layout.cols {
                out.push(reader.at(i, j));
            }
        }
        out
    }

    /// Whether both matrices have the same shape and every pair of elements
    /// differs by at most `tol`.
    #[must_use]
    pub fn approx_eq(&self, other: &Matrix, tol: Scalar) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        let (a, b) = (self.reader(), other.reader());
        (0..self.layout.rows)
            .all(|i| (0..self.layout.cols).all(|j| (a.at(i, j) - b.at(i, j)).abs() <= tol))
    }

    /// Deep copy into a new, independently owned, row-major buffer.
    ///
    /// Reads honor this handle's strides, so copying a view materializes
    /// exactly what the view shows. Copying a constant materializes it.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Allocation`] if storage cannot be obtained.
    pub fn deep_copy(&self) -> Result<Matrix> {
        let (rows, cols) = self.shape();
        let buffer = Buffer::allocate(checked_len(rows, cols)?)?;
        {
            let reader = self.reader();
            let mut out = buffer.borrow_mut();
            for i in 0..rows {
                for j in 0..cols {
                    out[i * cols + j] = reader.at(i, j);
                }
            }
        }
        Ok(Self::dense(Layout::row_major(rows, cols), buffer))
    }

    /// A new handle over the same buffer with the same layout.
    #[must_use]
    pub fn view(&self) -> Matrix {
        let storage = match &self.storage {
            Storage::Dense(buffer) => Storage::Dense(buffer.retain()),
            Storage::Constant(value) => Storage::Constant(*value),
        };
        Self {
            layout: self.layout,
            storage,
        }
    }

    /// A new handle over the same buffer and strides reporting `rows x cols`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidShape`] if the shape is empty or would
    /// address elements outside the aliased buffer.
    pub fn view_as(&self, rows: usize, cols: usize) -> Result<Matrix> {
        checked_len(rows, cols)?;
        let layout = Layout {
            rows,
            cols,
            ..self.layout
        };
        match &self.storage {
            Storage::Dense(buffer) => {
                match layout.max_offset() {
                    Some(last) if last < buffer.len() => {}
                    _ => return Err(MatrixError::InvalidShape { rows, cols }),
                }
                Ok(Self::dense(layout, buffer.retain()))
            }
            Storage::Constant(value) => Self::constant(rows, cols, *value),
        }
    }

    /// A view of `src` if given, otherwise a lazy constant matrix of `fill`.
    ///
    /// # Errors
    ///
    /// Same as [`Matrix::view_as`] and [`Matrix::constant`].
    pub fn view_or_constant(
        src: Option<&Matrix>,
        rows: usize,
        cols: usize,
        fill: Scalar,
    ) -> Result<Matrix> {
        match src {
            Some(m) => m.view_as(rows, cols),
            None => Self::constant(rows, cols, fill),
        }
    }

    /// A view of `src`, refusing the lazy fallback.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NullSource`] if `src` is `None`.
    pub fn view_strict(src: Option<&Matrix>, rows: usize, cols: usize) -> Result<Matrix> {
        src.ok_or(MatrixError::NullSource)?.view_as(rows, cols)
    }

    /// Transposes as a zero-copy view or as an independent copy.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Allocation`] if a copy cannot be allocated.
    pub fn transpose(&self, mode: TransposeMode) -> Result<Matrix> {
        match mode {
            TransposeMode::View => {
                let mut t = self.view();
                t.layout = self.layout.transposed();
                Ok(t)
            }
            TransposeMode::Copy => {
                let mut t = self.view();
                t.layout = self.layout.transposed();
                t.deep_copy()
            }
        }
    }

    /// Swaps this handle's dimensions and strides without moving data.
    ///
    /// Only this handle changes; other handles aliasing the buffer keep
    /// their own layouts.
    pub fn transpose_in_place(&mut self) {
        self.layout = self.layout.transposed();
    }

    /// Consumes the handle and returns it transposed.
    #[must_use]
    pub fn into_transposed(mut self) -> Matrix {
        self.transpose_in_place();
        self
    }

    fn check_range(&self, rows: (usize, usize), cols: (usize, usize)) -> Result<()> {
        let (r, c) = self.shape();
        if rows.0 > rows.1 || cols.0 > cols.1 || rows.1 >= r || cols.1 >= c {
            return Err(MatrixError::invalid_range(rows, cols, (r, c)));
        }
        Ok(())
    }

    /// Copies the rectangle `start_row..=end_row` x `start_col..=end_col`
    /// into a new, densely packed, independent matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidRange`] if a start exceeds its end or an
    /// end is outside the matrix.
    pub fn slice(
        &self,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
    ) -> Result<Matrix> {
        self.slice_view(start_row, end_row, start_col, end_col)?
            .deep_copy()
    }

    /// Copies rows `start..=end` (all columns).
    ///
    /// # Errors
    ///
    /// Same as [`Matrix::slice`].
    pub fn row_slice(&self, start: usize, end: usize) -> Result<Matrix> {
        self.slice(start, end, 0, self.layout.cols - 1)
    }

    /// Copies columns `start..=end` (all rows).
    ///
    /// # Errors
    ///
    /// Same as [`Matrix::slice`].
    pub fn col_slice(&self, start: usize, end: usize) -> Result<Matrix> {
        self.slice(0, self.layout.rows - 1, start, end)
    }

    /// Zero-copy view of the rectangle `start_row..=end_row` x
    /// `start_col..=end_col`, aliasing this handle's buffer.
    ///
    /// # Errors
    ///
    /// Same as [`Matrix::slice`].
    pub fn slice_view(
        &self,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
    ) -> Result<Matrix> {
        self.check_range((start_row, end_row), (start_col, end_col))?;
        let mut view = self.view();
        view.layout = Layout {
            rows: end_row - start_row + 1,
            cols: end_col - start_col + 1,
            offset: self.layout.offset_of(start_row, start_col),
            ..self.layout
        };
        if view.is_constant() {
            view.layout.row_stride = view.layout.cols;
            view.layout.col_stride = 1;
            view.layout.offset = 0;
        }
        Ok(view)
    }

    /// Ends this handle's lifetime. Returns `true` if it held the last
    /// reference and the buffer was destroyed; always `false` for constants.
    pub fn release(self) -> bool {
        match self.storage {
            Storage::Dense(buffer) => buffer.release(),
            Storage::Constant(_) => false,
        }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        let (a, b) = (self.reader(), other.reader());
        (0..self.layout.rows).all(|i| (0..self.layout.cols).all(|j| a.at(i, j) == b.at(i, j)))
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Matrix");
        s.field("layout", &self.layout);
        match &self.storage {
            Storage::Dense(buffer) => s.field("buffer", buffer),
            Storage::Constant(value) => s.field("constant", value),
        };
        let shown = self.layout.len().min(DEBUG_VALUES);
        let reader = self.reader();
        let cols = self.layout.cols;
        let values: Vec<Scalar> = (0..shown).map(|k| reader.at(k / cols, k % cols)).collect();
        s.field("values", &values);
        if shown < self.layout.len() {
            s.field("elided", &(self.layout.len() - shown));
        }
        s.finish()
    }
}

#[derive(Serialize, Deserialize)]
struct MatrixRepr {
    rows: usize,
    cols: usize,
    data: Vec<Scalar>,
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        MatrixRepr {
            rows: self.layout.rows,
            cols: self.layout.cols,
            data: self.to_vec(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Matrix {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let repr = MatrixRepr::deserialize(deserializer)?;
        Matrix::from_vec(repr.rows, repr.cols, repr.data).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
