//! Numeric dataset loading.
//!
//! Datasets are plain comma-separated text: one sample per line, the same
//! number of fields on every line. The whole file becomes one row-major
//! [`Matrix`]; callers split inputs from targets with [`Matrix::slice`].

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{MatrixError, Result};
use crate::primitives::{Matrix, Scalar};

/// Parses comma-separated numbers into a matrix.
///
/// The column count is taken from the first non-blank line. Blank lines are
/// skipped; every other line must have exactly that many fields.
///
/// # Errors
///
/// Returns [`MatrixError::Dataset`] with the 1-based line number for a
/// field that is not a number or a line with the wrong number of fields,
/// and [`MatrixError::InvalidShape`] if there are no rows at all.
///
/// # Examples
///
/// ```
/// use stratamx::data::parse_csv;
///
/// let m = parse_csv("0,0,0\n0,1,1\n1,0,1\n1,1,0\n").expect("well-formed");
/// assert_eq!(m.shape(), (4, 3));
/// assert_eq!(m.get(2, 0), 1.0);
/// ```
pub fn parse_csv(text: &str) -> Result<Matrix> {
    let mut cols = None;
    let mut rows = 0;
    let mut data: Vec<Scalar> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let before = data.len();
        for field in line.split(',') {
            let field = field.trim();
            let value = field.parse::<Scalar>().map_err(|_| MatrixError::Dataset {
                line: line_no,
                message: format!("'{field}' is not a number"),
            })?;
            data.push(value);
        }
        let width = data.len() - before;
        match cols {
            None => cols = Some(width),
            Some(expected) if expected != width => {
                return Err(MatrixError::Dataset {
                    line: line_no,
                    message: format!("expected {expected} fields, found {width}"),
                });
            }
            Some(_) => {}
        }
        rows += 1;
    }

    let cols = cols.unwrap_or(0);
    debug!(rows, cols, "parsed dataset");
    Matrix::from_vec(rows, cols, data)
}

/// Reads a comma-separated file and parses it with [`parse_csv`].
///
/// # Errors
///
/// Returns [`MatrixError::Io`] if the file cannot be read, plus the errors of
/// [`parse_csv`].
pub fn load_csv(path: impl AsRef<Path>) -> Result<Matrix> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "loading dataset");
    parse_csv(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shape_and_values() {
        let m = parse_csv("1, 2.5\n-3,4\n").expect("well-formed");
        assert_eq!(m.shape(), (2, 2));
        assert!((m.get(0, 1) - 2.5).abs() < 1e-6);
        assert!((m.get(1, 0) + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let m = parse_csv("\n1,2\n\n3,4\n\n").expect("well-formed");
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_parse_ragged_line() {
        let err = parse_csv("1,2\n3\n").expect_err("ragged");
        assert!(matches!(err, MatrixError::Dataset { line: 2, .. }));
        assert!(err.to_string().contains("expected 2 fields"));
    }

    #[test]
    fn test_parse_not_a_number() {
        let err = parse_csv("1,2\n3,x\n").expect_err("bad field");
        assert!(matches!(err, MatrixError::Dataset { line: 2, .. }));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            parse_csv("\n\n"),
            Err(MatrixError::InvalidShape { rows: 0, cols: 0 })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_csv("/nonexistent/dataset.csv").expect_err("missing");
        assert!(matches!(err, MatrixError::Io(_)));
    }

    #[test]
    fn test_load_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("stratamx-data-{}.csv", std::process::id()));
        fs::write(&path, "0,1\n1,0\n").expect("temp dir is writable");
        let m = load_csv(&path).expect("readable");
        let _ = fs::remove_file(&path);
        assert_eq!(m.to_vec(), vec![0.0, 1.0, 1.0, 0.0]);
    }
}
