//! Normal equations for linear and Gauss-Newton least squares.
//!
//! Three accumulators, each building a packed symmetric normal matrix and a
//! right-hand side one equation (or one sparse Jacobian) at a time:
//!
//! - [`LinearLs`]: `min ‖A·x − b‖²_w`, solved by a packed `UᵀU` Cholesky
//!   factorisation.
//! - [`NonLinearLs`]: objective `½ Σ wᵢ rᵢ(x)²`, keeping the objective value
//!   alongside the linearised step equations `JᵀWJ·δ = −JᵀW·r`.
//! - [`SeparableScaleLs`]: fit `K·y_c(x) ≈ y_o` with the overall scale `K`
//!   eliminated analytically before the step equations are built.
//!
//! # Linear fit through a sparse design matrix
//!
//! ```
//! use sparsela::normal_eqns::LinearLs;
//! use sparsela::sparse::SparseMatrix;
//!
//! // y = 1 + 2t sampled at t = 0, 1, 2
//! let a = SparseMatrix::from_columns(3, 2, vec![
//!     vec![(0, 1.0_f64), (1, 1.0), (2, 1.0)],
//!     vec![(1, 1.0), (2, 2.0)],
//! ]).unwrap();
//! let y = [1.0, 3.0, 5.0];
//!
//! let mut ls = LinearLs::new(2);
//! ls.add_equations(&y, &a, &[1.0, 1.0, 1.0], false).unwrap();
//! ls.solve().unwrap();
//! let x = ls.solution().unwrap();
//! assert!((x[0] - 1.0).abs() < 1e-12);
//! assert!((x[1] - 2.0).abs() < 1e-12);
//! ```
//!
//! # Gauss-Newton step
//!
//! ```
//! use sparsela::normal_eqns::NonLinearLs;
//!
//! // r(x) = x - 3, one parameter, at x = 1
//! let mut ls = NonLinearLs::new(1);
//! ls.add_equation(1.0_f64 - 3.0, &[1.0], 1.0).unwrap();
//! assert_eq!(ls.objective(), 2.0);
//! let step = ls.step_equations();
//! step.solve().unwrap();
//! assert!((step.solution().unwrap()[0] - 2.0).abs() < 1e-12);
//! ```

mod linear;
mod non_linear;
mod separable;


pub use linear::LinearLs;
pub use non_linear::NonLinearLs;
pub use separable::SeparableScaleLs;

use crate::linalg::LinalgError;
use crate::sparse::SparseError;

/// Errors from normal-equation assembly and solving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LsqError {
    /// An equation, Jacobian or weight vector has the wrong length.
    SizeMismatch { expected: usize, got: usize },
    /// The normal matrix could not be factorised.
    NotPositiveDefinite,
    /// The equations were already solved; the normal matrix now holds the
    /// Cholesky factor.
    AlreadySolved,
    /// The solution was requested before solving.
    NotSolved,
    /// Separable problem queried before `finalise`.
    NotFinalised,
    /// Separable problem modified or finalised after `finalise`.
    AlreadyFinalised,
    /// Separable problem finalised with no equations.
    NoEquations,
    /// Other failure of a sparse operation.
    Sparse(SparseError),
    /// Other failure of a dense factorisation.
    Linalg(LinalgError),
}

impl core::fmt::Display for LsqError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LsqError::SizeMismatch { expected, got } => {
                write!(f, "size mismatch: expected {}, got {}", expected, got)
            }
            LsqError::NotPositiveDefinite => {
                write!(f, "normal matrix is not positive definite")
            }
            LsqError::AlreadySolved => write!(f, "normal equations already solved"),
            LsqError::NotSolved => write!(f, "normal equations not solved yet"),
            LsqError::NotFinalised => write!(f, "equations not finalised yet"),
            LsqError::AlreadyFinalised => write!(f, "equations already finalised"),
            LsqError::NoEquations => write!(f, "no equations to finalise"),
            LsqError::Sparse(e) => write!(f, "{}", e),
            LsqError::Linalg(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LsqError {}

impl From<SparseError> for LsqError {
    fn from(e: SparseError) -> Self {
        match e {
            SparseError::SizeMismatch { expected, got } => LsqError::SizeMismatch { expected, got },
            other => LsqError::Sparse(other),
        }
    }
}

impl From<LinalgError> for LsqError {
    fn from(e: LinalgError) -> Self {
        match e {
            LinalgError::NotPositiveDefinite => LsqError::NotPositiveDefinite,
            other => LsqError::Linalg(other),
        }
    }
}

#[inline]
pub(crate) fn check_len(expected: usize, got: usize) -> Result<(), LsqError> {
    if expected == got {
        Ok(())
    } else {
        Err(LsqError::SizeMismatch { expected, got })
    }
}

/// Weight of equation `i`: `w[i]`, or one when `w` is empty.
#[inline]
pub(crate) fn weight_at<T: crate::traits::Scalar>(w: &[T], i: usize) -> T {
    if w.is_empty() {
        T::one()
    } else {
        w[i]
    }
}
