use alloc::vec;
use alloc::vec::Vec;

use crate::dense::PackedSymmetric;
use crate::traits::Scalar;

use super::{check_size, SparseError, SparseMatrix, SparseVector};

// ── Matrix × vector ─────────────────────────────────────────────────

impl<T: Scalar> SparseMatrix<T> {
    /// `A·v` for a sparse `v`: each stored `v[j]` scatters column `j`,
    /// scaled, into the result.
    pub fn mul_vector(&self, v: &SparseVector<T>) -> Result<SparseVector<T>, SparseError> {
        check_size(self.n_cols(), v.size())?;
        let mut w = SparseVector::new(self.n_rows());
        for (j, v_j) in v.iter() {
            for (i, a_ij) in self.col(j).iter() {
                w.add(i, a_ij * v_j);
            }
        }
        w.compact();
        Ok(w)
    }

    /// `A·x` for a dense `x`, scattering over the stored elements only.
    pub fn mul_dense(&self, x: &[T]) -> Result<Vec<T>, SparseError> {
        check_size(self.n_cols(), x.len())?;
        let mut y = vec![T::zero(); self.n_rows()];
        for (j, c) in self.columns().iter().enumerate() {
            let x_j = x[j];
            for (i, a_ij) in c.iter() {
                y[i] = y[i] + a_ij * x_j;
            }
        }
        Ok(y)
    }

    /// `Aᵀ·u`, i.e. the row vector `uᵀ·A`: one dense dot product per column.
    pub fn transpose_times(&self, u: &[T]) -> Result<Vec<T>, SparseError> {
        check_size(self.n_rows(), u.len())?;
        self.columns().iter().map(|c| c.dot_dense(u)).collect()
    }

    /// Sparse product `A·B`: column `j` of the result is
    /// `Σ_k B[k, j]·A.col(k)`.
    pub fn mul_matrix(&self, b: &SparseMatrix<T>) -> Result<SparseMatrix<T>, SparseError> {
        check_size(self.n_cols(), b.n_rows())?;
        let mut c = SparseMatrix::new(self.n_rows(), b.n_cols());
        for (j, b_col) in b.columns().iter().enumerate() {
            let c_col = c.col_mut(j);
            for (k, b_kj) in b_col.iter() {
                for (i, a_ik) in self.col(k).iter() {
                    c_col.add(i, a_ik * b_kj);
                }
            }
        }
        Ok(c)
    }
}

// ── Gram matrices ───────────────────────────────────────────────────

/// Symmetric `n x n` sparse matrix with `(p, q)` and `(q, p)` both set to
/// `f(p, q)` for `p <= q`. `None` leaves the pair a structural zero.
fn symmetric_from<T: Scalar>(n: usize, f: impl Fn(usize, usize) -> Option<T>) -> SparseMatrix<T> {
    let mut result = SparseMatrix::new(n, n);
    for q in 0..n {
        for p in 0..=q {
            if let Some(x) = f(p, q) {
                result.set(p, q, x);
                if p != q {
                    result.set(q, p, x);
                }
            }
        }
    }
    result
}

/// `Σ w_i·u_i·v_i` over the rows stored in both columns, `None` when they
/// share no row.
fn overlap_dot<T: Scalar>(
    u: &SparseVector<T>,
    v: &SparseVector<T>,
    w: impl Fn(usize) -> T,
) -> Option<T> {
    let mut sum = None;
    u.merge_join(v, |i, x, y| sum = Some(sum.unwrap_or_else(T::zero) + w(i) * x * y));
    sum
}

/// `uᵀ·S·v` for a dense `S`, `None` when either column is empty.
fn sandwich<T: Scalar>(u: &SparseVector<T>, s: &PackedSymmetric<T>, v: &SparseVector<T>) -> Option<T> {
    if u.non_zeroes() == 0 || v.non_zeroes() == 0 {
        return None;
    }
    Some(u.bilinear(s, v))
}

impl<T: Scalar> SparseMatrix<T> {
    /// `AᵀA`.
    ///
    /// `(p, q)` is stored whenever columns `p` and `q` share a row, even when
    /// the sum cancels to zero.
    pub fn this_transpose_times_this(&self) -> SparseMatrix<T> {
        let cols = self.columns();
        symmetric_from(self.n_cols(), |p, q| overlap_dot(&cols[p], &cols[q], |_| T::one()))
    }

    /// `Aᵀ·diag(w)·A`, the weighted normal matrix of least squares.
    ///
    /// Only the upper triangle is computed, each element one merge-join over
    /// two columns; the lower triangle is mirrored.
    pub fn this_transpose_times_diagonal_times_this(
        &self,
        w: &[T],
    ) -> Result<SparseMatrix<T>, SparseError> {
        check_size(self.n_rows(), w.len())?;
        let cols = self.columns();
        Ok(symmetric_from(self.n_cols(), |p, q| {
            overlap_dot(&cols[p], &cols[q], |i| w[i])
        }))
    }

    /// `Aᵀ·S·A` for symmetric `S` (`n_rows x n_rows`).
    pub fn this_transpose_times_symmetric_times_this(
        &self,
        s: &PackedSymmetric<T>,
    ) -> Result<SparseMatrix<T>, SparseError> {
        check_size(self.n_rows(), s.n())?;
        let cols = self.columns();
        Ok(symmetric_from(self.n_cols(), |p, q| sandwich(&cols[p], s, &cols[q])))
    }

    /// `A·S·Aᵀ` for symmetric `S` (`n_cols x n_cols`), through the rows of
    /// `A` gathered by a transpose.
    pub fn this_times_symmetric_times_this_transpose(
        &self,
        s: &PackedSymmetric<T>,
    ) -> Result<SparseMatrix<T>, SparseError> {
        check_size(self.n_cols(), s.n())?;
        let at = self.transpose();
        let rows = at.columns();
        Ok(symmetric_from(self.n_rows(), |p, q| sandwich(&rows[p], s, &rows[q])))
    }
}

/// Upper triangle of a square sparse matrix, in the packed layout consumed
/// by [`PackedCholesky`](crate::linalg::PackedCholesky).
///
/// Elements below the diagonal are ignored: the matrix is taken to be
/// symmetric.
pub fn upper_diagonal_of<T: Scalar>(a: &SparseMatrix<T>) -> Result<PackedSymmetric<T>, SparseError> {
    check_size(a.n_rows(), a.n_cols())?;
    let mut packed = PackedSymmetric::zeros(a.n_cols());
    for (j, c) in a.columns().iter().enumerate() {
        for (i, x) in c.iter() {
            if i <= j {
                *packed.get_mut(i, j) = x;
            }
        }
    }
    Ok(packed)
}
