use crate::dense::PackedSymmetric;
use crate::linalg::LinalgError;
use crate::traits::FloatScalar;

// ---------------------------------------------------------------------------
// In-place functions on packed storage
// ---------------------------------------------------------------------------

/// Cholesky decomposition in place: A = Uᵀ·U.
///
/// `a` holds the upper triangle of a symmetric matrix, packed row by row.
/// On return it holds the upper triangular factor `U` in the same layout.
///
/// Returns an error if the matrix is not positive definite; `a` is then
/// left partially overwritten.
pub fn cholesky_u_in_place<T: FloatScalar>(a: &mut PackedSymmetric<T>) -> Result<(), LinalgError> {
    let n = a.n();
    for j in 0..n {
        for i in 0..j {
            let mut s = a.get(i, j);
            for k in 0..i {
                s = s - a.get(k, i) * a.get(k, j);
            }
            *a.get_mut(i, j) = s / a.get(i, i);
        }

        let mut d = a.get(j, j);
        for k in 0..j {
            let u_kj = a.get(k, j);
            d = d - u_kj * u_kj;
        }
        if !(d > T::zero()) {
            return Err(LinalgError::NotPositiveDefinite);
        }
        *a.get_mut(j, j) = d.sqrt();
    }
    Ok(())
}

/// Solve Uᵀ·U·x = b in place, where `u` is the factor from
/// [`cholesky_u_in_place`]. On return `b` holds `x`.
pub fn cholesky_solve_in_place<T: FloatScalar>(
    u: &PackedSymmetric<T>,
    b: &mut [T],
) -> Result<(), LinalgError> {
    let n = u.n();
    if b.len() != n {
        return Err(LinalgError::DimensionMismatch);
    }

    // Uᵀ·y = b, forward
    for i in 0..n {
        let mut s = b[i];
        for k in 0..i {
            s = s - u.get(k, i) * b[k];
        }
        b[i] = s / u.get(i, i);
    }

    // U·x = y, backward
    for i in (0..n).rev() {
        let mut s = b[i];
        for k in (i + 1)..n {
            s = s - u.get(i, k) * b[k];
        }
        b[i] = s / u.get(i, i);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PackedCholesky
// ---------------------------------------------------------------------------

/// Cholesky factorisation `A = Uᵀ·U` of a packed symmetric positive-definite
/// matrix.
///
/// # Example
///
/// ```
/// use sparsela::dense::PackedSymmetric;
/// use sparsela::linalg::PackedCholesky;
///
/// let a = PackedSymmetric::from_vec(2, vec![4.0_f64, 2.0, 3.0]);
/// let chol = PackedCholesky::new(a).unwrap();
/// let x = chol.solve(&[8.0, 7.0]).unwrap();
/// assert!((4.0 * x[0] + 2.0 * x[1] - 8.0).abs() < 1e-12);
/// assert!((chol.det() - 8.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct PackedCholesky<T> {
    u: PackedSymmetric<T>,
}

impl<T: FloatScalar> PackedCholesky<T> {
    /// Factorise, consuming the matrix storage.
    pub fn new(mut a: PackedSymmetric<T>) -> Result<Self, LinalgError> {
        cholesky_u_in_place(&mut a)?;
        Ok(Self { u: a })
    }

    /// The upper triangular factor `U`, packed.
    pub fn u(&self) -> &PackedSymmetric<T> {
        &self.u
    }

    /// Solve `A·x = b`.
    pub fn solve(&self, b: &[T]) -> Result<alloc::vec::Vec<T>, LinalgError> {
        let mut x = b.to_vec();
        cholesky_solve_in_place(&self.u, &mut x)?;
        Ok(x)
    }

    /// det(A) = (Π U[i,i])².
    pub fn det(&self) -> T {
        let mut prod = T::one();
        for i in 0..self.u.n() {
            prod = prod * self.u.get(i, i);
        }
        prod * prod
    }
}
