use core::fmt;

use crate::dense::write_grid;
use crate::traits::Scalar;

use super::{SparseMatrix, SparseVector};

/// Stored elements only: `{0: 1, 2: 3}`.
impl<T: Scalar + fmt::Display> fmt::Display for SparseVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (k, (i, x)) in self.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", i, x)?;
        }
        write!(f, "}}")
    }
}

/// Every element, structural zeros included, as a framed grid.
impl<T: Scalar + fmt::Display> fmt::Display for SparseMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.compact();
        write_grid(f, self.n_rows(), self.n_cols(), |i, j| self.get(i, j))
    }
}

/// Column-by-column listing of a matrix's stored elements, from
/// [`SparseMatrix::compressed`].
pub struct Compressed<'a, T>(&'a SparseMatrix<T>);

impl<T: Scalar> SparseMatrix<T> {
    /// Displayable summary with shape and stored elements by column.
    ///
    /// ```
    /// use sparsela::sparse::SparseMatrix;
    /// let mut m = SparseMatrix::new(3, 2);
    /// m.set(2, 0, 1.5_f64);
    /// m.set(0, 1, -1.0);
    /// assert_eq!(
    ///     m.compressed().to_string(),
    ///     "sparse(rows=3, columns=2, by columns=[{2: 1.5}, {0: -1}])",
    /// );
    /// ```
    pub fn compressed(&self) -> Compressed<'_, T> {
        Compressed(self)
    }
}

impl<T: Scalar + fmt::Display> fmt::Display for Compressed<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(f, "sparse(rows={}, columns={}, by columns=[", m.n_rows(), m.n_cols())?;
        for (j, c) in m.columns().iter().enumerate() {
            if j > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "])")
    }
}
