use crate::traits::Scalar;

use super::{check_size, SparseError, SparseMatrix};

impl<T: Scalar> SparseMatrix<T> {
    /// Solve `U·x = b` in place by back substitution, `U` being `self`.
    ///
    /// Column oriented: once `x[j]` is known, column `j` is subtracted from
    /// the rows above it, so only stored elements are visited.
    ///
    /// ```
    /// use sparsela::sparse::SparseMatrix;
    /// // | 2 1 |
    /// // | 0 4 |
    /// let u = SparseMatrix::from_columns(2, 2, vec![
    ///     vec![(0, 2.0_f64)],
    ///     vec![(0, 1.0), (1, 4.0)],
    /// ]).unwrap();
    /// let mut b = [4.0, 8.0];
    /// u.solve_upper_triangular(&mut b).unwrap();
    /// assert_eq!(b, [1.0, 2.0]);
    /// ```
    pub fn solve_upper_triangular(&self, b: &mut [T]) -> Result<(), SparseError> {
        if !self.is_upper_triangular() {
            return Err(SparseError::NotTriangular);
        }
        check_size(self.n_rows(), b.len())?;
        for j in (0..self.n_cols()).rev() {
            let c = self.col(j);
            if c.is_structural_zero(j) {
                return Err(SparseError::StructurallySingular { column: j });
            }
            let x_j = b[j] / c.get(j);
            b[j] = x_j;
            for (i, u_ij) in c.iter() {
                if i < j {
                    b[i] = b[i] - u_ij * x_j;
                }
            }
        }
        Ok(())
    }

    /// Solve `L·x = b` in place by forward substitution, `L` being `self`
    /// with its stored unit diagonal.
    pub fn solve_unit_lower_triangular(&self, b: &mut [T]) -> Result<(), SparseError> {
        if !self.is_unit_lower_triangular() {
            return Err(SparseError::NotTriangular);
        }
        check_size(self.n_rows(), b.len())?;
        for j in 0..self.n_cols() {
            let x_j = b[j];
            for (i, l_ij) in self.col(j).iter() {
                if i > j {
                    b[i] = b[i] - l_ij * x_j;
                }
            }
        }
        Ok(())
    }
}
