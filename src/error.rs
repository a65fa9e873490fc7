//! Error types for stratamx operations.
//!
//! Every kernel function validates its own preconditions and returns one of
//! these variants before allocating anything.

use thiserror::Error;

/// Main error type for matrix and network operations.
///
/// # Examples
///
/// ```
/// use stratamx::error::MatrixError;
///
/// let err = MatrixError::DimensionMismatch {
///     expected: "2x3".to_string(),
///     actual: "3x2".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Zero or malformed dimensions at construction.
    #[error("Invalid shape: {rows}x{cols} (both dimensions must be positive)")]
    InvalidShape {
        /// Requested rows
        rows: usize,
        /// Requested columns
        cols: usize,
    },

    /// Element-wise operands disagree on shape.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// No alignment of the operands makes the product defined.
    #[error("Incompatible shapes for dot product: {left:?} and {right:?}")]
    IncompatibleShape {
        /// Shape of the left operand
        left: (usize, usize),
        /// Shape of the right operand
        right: (usize, usize),
    },

    /// Slice bounds out of order or outside the source.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A vector-only operation received a matrix with more than one row and column.
    #[error("Not a vector: shape {rows}x{cols}")]
    NotAVector {
        /// Rows of the offending operand
        rows: usize,
        /// Columns of the offending operand
        cols: usize,
    },

    /// The operation is undefined in this many dimensions.
    #[error("Unsupported dimension: {dims} (expected {supported})")]
    DimensionUnsupported {
        /// Length of the offending vector
        dims: usize,
        /// Human readable description of what is supported
        supported: &'static str,
    },

    /// Storage could not be allocated.
    #[error("Allocation failed for {elements} elements")]
    Allocation {
        /// Number of elements requested
        elements: usize,
    },

    /// The handle cannot be used for this operation.
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    /// A strict view was requested without a source matrix.
    #[error("Null source: a strict view requires a source matrix")]
    NullSource,

    /// A vector with (near) zero length has no direction.
    #[error("Degenerate vector: length {length} is too close to zero")]
    DegenerateVector {
        /// Frobenius length of the operand
        length: f64,
    },

    /// Malformed dataset text.
    #[error("Dataset error at line {line}: {message}")]
    Dataset {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Invalid configuration value or document.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error while reading a dataset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatrixError {
    /// Create a dimension mismatch error from two shapes.
    #[must_use]
    pub fn dimension_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }

    /// Create an invalid range error for a slice request.
    #[must_use]
    pub fn invalid_range(
        rows: (usize, usize),
        cols: (usize, usize),
        shape: (usize, usize),
    ) -> Self {
        Self::InvalidRange(format!(
            "rows {}..={} cols {}..={} for a {}x{} matrix",
            rows.0, rows.1, cols.0, cols.1, shape.0, shape.1
        ))
    }
}

impl From<serde_json::Error> for MatrixError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, MatrixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = MatrixError::dimension_mismatch((2, 3), (3, 2));
        let msg = err.to_string();
        assert!(msg.contains("dimension mismatch"));
        assert!(msg.contains("2x3"));
        assert!(msg.contains("3x2"));
    }

    #[test]
    fn test_invalid_shape_display() {
        let err = MatrixError::InvalidShape { rows: 0, cols: 4 };
        assert!(err.to_string().contains("0x4"));
    }

    #[test]
    fn test_invalid_range_helper() {
        let err = MatrixError::invalid_range((2, 1), (0, 0), (4, 4));
        let msg = err.to_string();
        assert!(msg.contains("rows 2..=1"));
        assert!(msg.contains("4x4"));
    }

    #[test]
    fn test_incompatible_shape_display() {
        let err = MatrixError::IncompatibleShape {
            left: (2, 3),
            right: (4, 5),
        };
        let msg = err.to_string();
        assert!(msg.contains("(2, 3)"));
        assert!(msg.contains("(4, 5)"));
    }

    #[test]
    fn test_dataset_display() {
        let err = MatrixError::Dataset {
            line: 3,
            message: "expected 2 fields".to_string(),
        };
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MatrixError = io_err.into();
        assert!(matches!(err, MatrixError::Io(_)));
    }

    #[test]
    fn test_error_source_io() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = MatrixError::Io(io_err);
        assert!(err.source().is_some());
        assert!(MatrixError::NullSource.source().is_none());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: MatrixError = json_err.into();
        assert!(matches!(err, MatrixError::Config(_)));
    }
}
