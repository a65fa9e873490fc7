//! Strided addressing: how a logical `(row, col)` maps to a buffer offset.

use serde::{Deserialize, Serialize};

/// Shape and strides of a matrix handle.
///
/// Strides are measured in elements. Every element access goes through
/// [`Layout::offset_of`], so transposed and sliced views need nothing more
/// than a different `Layout` over the same buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layout {
    /// Logical rows
    pub rows: usize,
    /// Logical columns
    pub cols: usize,
    /// Elements to advance per row
    pub row_stride: usize,
    /// Elements to advance per column
    pub col_stride: usize,
    /// Offset of element (0, 0)
    pub offset: usize,
}

impl Layout {
    /// Dense row-major layout: `row_stride = cols`, `col_stride = 1`.
    #[must_use]
    pub fn row_major(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_stride: cols,
            col_stride: 1,
            offset: 0,
        }
    }

    /// Buffer offset of logical element `(i, j)`.
    #[inline]
    #[must_use]
    pub fn offset_of(&self, i: usize, j: usize) -> usize {
        self.offset + i * self.row_stride + j * self.col_stride
    }

    /// [`Layout::offset_of`] that returns `None` instead of overflowing.
    #[must_use]
    pub fn checked_offset_of(&self, i: usize, j: usize) -> Option<usize> {
        i.checked_mul(self.row_stride)
            .and_then(|r| j.checked_mul(self.col_stride).and_then(|c| r.checked_add(c)))
            .and_then(|rc| rc.checked_add(self.offset))
    }

    /// Same elements with rows and columns swapped.
    #[must_use]
    pub fn transposed(&self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
            row_stride: self.col_stride,
            col_stride: self.row_stride,
            offset: self.offset,
        }
    }

    /// Largest offset addressed by this layout, or `None` if it does not fit
    /// in `usize`.
    ///
    /// Meaningless for an empty layout; callers check dimensions first.
    #[must_use]
    pub fn max_offset(&self) -> Option<usize> {
        self.checked_offset_of(self.rows.saturating_sub(1), self.cols.saturating_sub(1))
    }

    /// Whether the layout is dense, row-major and starts at offset 0.
    #[must_use]
    pub fn is_row_major(&self) -> bool {
        self.offset == 0 && self.col_stride == 1 && self.row_stride == self.cols
    }

    /// Number of logical elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Whether either dimension is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Shape as `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}
