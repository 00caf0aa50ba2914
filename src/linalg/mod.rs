//! Dense factorisations backing the normal equations.
//!
//! Only what least-squares assembly needs: the Cholesky factorisation
//! `A = UᵀU` of a symmetric positive-definite matrix held in packed
//! upper-triangular storage, done in place, and the matching solve.

pub(crate) mod cholesky;

pub use cholesky::{cholesky_solve_in_place, cholesky_u_in_place, PackedCholesky};

/// Errors from linear algebra operations.
///
/// ```
/// use sparsela::dense::PackedSymmetric;
/// use sparsela::linalg::{LinalgError, PackedCholesky};
///
/// let not_pd = PackedSymmetric::from_vec(2, vec![1.0_f64, 5.0, 1.0]);
/// assert_eq!(PackedCholesky::new(not_pd).unwrap_err(), LinalgError::NotPositiveDefinite);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinalgError {
    /// Matrix is not positive definite (required for Cholesky).
    NotPositiveDefinite,
    /// Right-hand side length differs from the matrix dimension.
    DimensionMismatch,
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::NotPositiveDefinite => write!(f, "matrix is not positive definite"),
            LinalgError::DimensionMismatch => {
                write!(f, "right-hand side length does not match matrix dimension")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinalgError {}
