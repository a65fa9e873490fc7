//! Human-readable rendering of matrices.
//!
//! Elements are read through the handle's layout, so transposed and sliced
//! views print what they show rather than the underlying buffer order.

use std::fmt::{self, Write as _};

use super::matrix::Matrix;

impl Matrix {
    fn write_rows<W: fmt::Write>(&self, out: &mut W, pad: &str) -> fmt::Result {
        let (rows, cols) = self.shape();
        for i in 0..rows {
            out.write_str(pad)?;
            out.write_char('[')?;
            for j in 0..cols {
                write!(out, "{:.6}", self.get(i, j))?;
                if j + 1 < cols {
                    out.write_str(", ")?;
                }
            }
            out.write_char(']')?;
            if i + 1 < rows {
                out.write_char(',')?;
            }
            out.write_char('\n')?;
        }
        Ok(())
    }

    /// Renders the matrix as `name=([ ... ]);`, each line indented by
    /// `padding` spaces.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratamx::primitives::Matrix;
    ///
    /// let m = Matrix::from_slice(1, 2, &[1.0, 2.5]).expect("1x2");
    /// assert_eq!(m.render("m", 0), "m=([\n[1.000000, 2.500000]\n]);\n");
    /// ```
    #[must_use]
    pub fn render(&self, name: &str, padding: usize) -> String {
        let pad = " ".repeat(padding);
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{pad}{name}=([");
        let _ = self.write_rows(&mut out, &pad);
        let _ = writeln!(out, "{pad}]);");
        out
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("array([\n")?;
        self.write_rows(f, "")?;
        f.write_str("])")
    }
}
