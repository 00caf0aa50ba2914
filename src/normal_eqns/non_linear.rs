use alloc::vec;
use alloc::vec::Vec;

use crate::dense::PackedSymmetric;
use crate::sparse::SparseMatrix;
use crate::traits::{FloatScalar, MatrixRef};

use super::{check_len, weight_at, LinearLs, LsqError};

/// Gauss-Newton normal equations for `L(x) = ½ Σ wᵢ rᵢ(x)²`.
///
/// Each equation contributes its weighted squared residual to the objective
/// and its linearisation `∇rᵢ·δ = −rᵢ` to the [step
/// equations](Self::step_equations). Slices of weights may be empty, meaning
/// unit weights.
#[derive(Debug, Clone)]
pub struct NonLinearLs<T> {
    n_equations: usize,
    /// `Σ wᵢ rᵢ²`.
    r_sq: T,
    linearised: LinearLs<T>,
}

impl<T: FloatScalar> NonLinearLs<T> {
    pub fn new(n_parameters: usize) -> Self {
        Self {
            n_equations: 0,
            r_sq: T::zero(),
            linearised: LinearLs::new(n_parameters),
        }
    }

    /// Problem already built elsewhere: `objective()` returns `objective`
    /// and the step equations hold `normal` and `minus_grad_objective`.
    pub fn from_parts(
        n_equations: usize,
        objective: T,
        minus_grad_objective: Vec<T>,
        normal: PackedSymmetric<T>,
    ) -> Result<Self, LsqError> {
        Ok(Self {
            n_equations,
            r_sq: (T::one() + T::one()) * objective,
            linearised: LinearLs::from_parts(normal, minus_grad_objective)?,
        })
    }

    /// Number of residuals added.
    #[inline]
    pub fn n_equations(&self) -> usize {
        self.n_equations
    }

    #[inline]
    pub fn n_parameters(&self) -> usize {
        self.linearised.n_parameters()
    }

    /// Degrees of freedom `n_equations − n_parameters`, zero when there are
    /// fewer equations than parameters.
    #[inline]
    pub fn dof(&self) -> usize {
        self.n_equations.saturating_sub(self.n_parameters())
    }

    /// Count residual `r` with weight `w` in the objective only.
    pub fn add_residual(&mut self, r: T, w: T) {
        self.n_equations += 1;
        self.r_sq = self.r_sq + w * r * r;
    }

    pub fn add_residuals(&mut self, r: &[T], w: &[T]) -> Result<(), LsqError> {
        check_weights(r.len(), w)?;
        for (i, &r_i) in r.iter().enumerate() {
            self.add_residual(r_i, weight_at(w, i));
        }
        Ok(())
    }

    /// Add the equation `r(x) = 0` with gradient `grad_r` and weight `w`.
    pub fn add_equation(&mut self, r: T, grad_r: &[T], w: T) -> Result<(), LsqError> {
        self.linearised.add_equation(-r, grad_r, w)?;
        self.add_residual(r, w);
        Ok(())
    }

    /// Add the equations `r(x) = 0` with a dense Jacobian, row by row.
    pub fn add_equations_dense<M: MatrixRef<T>>(
        &mut self,
        r: &[T],
        jacobian: &M,
        w: &[T],
    ) -> Result<(), LsqError> {
        check_len(r.len(), jacobian.nrows())?;
        check_weights(r.len(), w)?;
        check_len(self.n_parameters(), jacobian.ncols())?;
        let mut row = vec![T::zero(); jacobian.ncols()];
        for (i, &r_i) in r.iter().enumerate() {
            for (j, g) in row.iter_mut().enumerate() {
                *g = jacobian.get(i, j);
            }
            self.add_equation(r_i, &row, weight_at(w, i))?;
        }
        Ok(())
    }

    /// Add the equations `r(x) = 0` with a sparse Jacobian, through the
    /// weighted Gram matrix `JᵀWJ`.
    pub fn add_equations(
        &mut self,
        r: &[T],
        jacobian: &SparseMatrix<T>,
        w: &[T],
    ) -> Result<(), LsqError> {
        check_len(r.len(), jacobian.n_rows())?;
        check_weights(r.len(), w)?;
        check_len(self.n_parameters(), jacobian.n_cols())?;
        let unit;
        let w = if w.is_empty() {
            unit = vec![T::one(); r.len()];
            &unit[..]
        } else {
            w
        };
        self.linearised.add_equations(r, jacobian, w, true)?;
        self.add_residuals(r, w)
    }

    /// `L(x) = ½ Σ wᵢ rᵢ²`.
    #[inline]
    pub fn objective(&self) -> T {
        self.r_sq / (T::one() + T::one())
    }

    /// `Σ wᵢ rᵢ² / dof`.
    ///
    /// Only meaningful for residuals of the form model minus data; infinite
    /// or NaN when `dof() == 0`.
    pub fn chi_sq(&self) -> T {
        self.r_sq / T::from(self.dof()).unwrap_or_else(T::nan)
    }

    /// The linearised equations whose solution is the Gauss-Newton step.
    #[inline]
    pub fn step_equations(&mut self) -> &mut LinearLs<T> {
        &mut self.linearised
    }

    /// Back to no equations.
    pub fn reset(&mut self) {
        self.n_equations = 0;
        self.r_sq = T::zero();
        self.linearised.reset();
    }
}

/// Weights are either absent or one per equation.
fn check_weights<T>(n: usize, w: &[T]) -> Result<(), LsqError> {
    if w.is_empty() {
        Ok(())
    } else {
        check_len(n, w.len())
    }
}
