use alloc::vec;
use alloc::vec::Vec;

use crate::dense::PackedSymmetric;
use crate::linalg::{cholesky_solve_in_place, cholesky_u_in_place};
use crate::sparse::{upper_diagonal_of, SparseMatrix};
use crate::traits::FloatScalar;

use super::{check_len, LsqError};

/// Normal equations `AᵀWA·x = AᵀW·b` of the linear problem
/// `min Σ wᵢ (A_i·x − bᵢ)²`.
///
/// The normal matrix is kept as a packed upper triangle. Solving factorises
/// it in place as `UᵀU` and overwrites the right-hand side with the
/// solution, so the accumulated equations are only readable before
/// [`solve`](Self::solve) and the factor and solution only after.
///
/// Also serves as the step equations of [`NonLinearLs`](super::NonLinearLs).
#[derive(Debug, Clone)]
pub struct LinearLs<T> {
    solved: bool,
    normal: PackedSymmetric<T>,
    rhs: Vec<T>,
}

impl<T: FloatScalar> LinearLs<T> {
    /// Empty problem in `n_parameters` unknowns.
    pub fn new(n_parameters: usize) -> Self {
        Self {
            solved: false,
            normal: PackedSymmetric::zeros(n_parameters),
            rhs: vec![T::zero(); n_parameters],
        }
    }

    /// Problem with a given normal matrix and right-hand side.
    pub fn from_parts(normal: PackedSymmetric<T>, rhs: Vec<T>) -> Result<Self, LsqError> {
        check_len(normal.n(), rhs.len())?;
        Ok(Self {
            solved: false,
            normal,
            rhs,
        })
    }

    #[inline]
    pub fn n_parameters(&self) -> usize {
        self.rhs.len()
    }

    /// Add the equation `a_row·x = b_i` with weight `w`.
    pub fn add_equation(&mut self, b_i: T, a_row: &[T], w: T) -> Result<(), LsqError> {
        self.check_unsolved()?;
        check_len(self.n_parameters(), a_row.len())?;
        self.normal.add_rank_one(a_row, w);
        for (r, &a) in self.rhs.iter_mut().zip(a_row) {
            *r = *r + w * a * b_i;
        }
        Ok(())
    }

    /// Add the equations `A·x = b`, row `i` weighted by `w[i]`, in one go.
    ///
    /// With `negate_rhs` the equations read `A·x + b = 0` instead, which is
    /// how a residual vector and its Jacobian enter the step equations.
    pub fn add_equations(
        &mut self,
        b: &[T],
        a: &SparseMatrix<T>,
        w: &[T],
        negate_rhs: bool,
    ) -> Result<(), LsqError> {
        self.check_unsolved()?;
        check_len(a.n_rows(), b.len())?;
        check_len(b.len(), w.len())?;
        check_len(self.n_parameters(), a.n_cols())?;

        let at_w_a = a.this_transpose_times_diagonal_times_this(w)?;
        let w_b: Vec<T> = w.iter().zip(b).map(|(&w_i, &b_i)| w_i * b_i).collect();
        let at_w_b = a.transpose_times(&w_b)?;

        self.normal += &upper_diagonal_of(&at_w_a)?;
        for (r, &x) in self.rhs.iter_mut().zip(&at_w_b) {
            *r = if negate_rhs { *r - x } else { *r + x };
        }
        Ok(())
    }

    /// Back to an empty, unsolved problem of the same size.
    pub fn reset(&mut self) {
        self.solved = false;
        self.normal.fill_zero();
        for r in self.rhs.iter_mut() {
            *r = T::zero();
        }
    }

    /// Accumulated normal matrix `AᵀWA`, packed.
    pub fn normal_matrix(&self) -> Result<&PackedSymmetric<T>, LsqError> {
        self.check_unsolved()?;
        Ok(&self.normal)
    }

    /// Accumulated right-hand side `AᵀW·b`.
    pub fn right_hand_side(&self) -> Result<&[T], LsqError> {
        self.check_unsolved()?;
        Ok(&self.rhs)
    }

    /// Solve for the parameters (or, for linearised equations, the step).
    ///
    /// If the normal matrix is not positive definite, nothing is changed
    /// and [`LsqError::NotPositiveDefinite`] is returned.
    pub fn solve(&mut self) -> Result<(), LsqError> {
        self.check_unsolved()?;
        let mut u = self.normal.clone();
        cholesky_u_in_place(&mut u)?;
        cholesky_solve_in_place(&u, &mut self.rhs)?;
        self.normal = u;
        self.solved = true;
        Ok(())
    }

    #[inline]
    pub fn solved(&self) -> bool {
        self.solved
    }

    /// Upper triangular `U` with `AᵀWA = UᵀU`.
    pub fn cholesky_factor(&self) -> Result<&PackedSymmetric<T>, LsqError> {
        self.check_solved()?;
        Ok(&self.normal)
    }

    pub fn solution(&self) -> Result<&[T], LsqError> {
        self.check_solved()?;
        Ok(&self.rhs)
    }

    fn check_unsolved(&self) -> Result<(), LsqError> {
        if self.solved {
            Err(LsqError::AlreadySolved)
        } else {
            Ok(())
        }
    }

    fn check_solved(&self) -> Result<(), LsqError> {
        if self.solved {
            Ok(())
        } else {
            Err(LsqError::NotSolved)
        }
    }
}
