use alloc::vec;
use alloc::vec::Vec;

use crate::dense::PackedSymmetric;
use crate::traits::{FloatScalar, MatrixRef};

use super::{check_len, weight_at, LinearLs, LsqError, NonLinearLs};

/// Normal equations for fitting a model `y_c(x)` to data `y_o` up to an
/// overall scale factor `K`.
///
/// The objective is
///
/// ```text
/// L(K, x) = ½ Σ w (K·y_c(x) − y_o)² / Σ w y_o²
/// ```
///
/// or the same without the denominator when not normalised. For fixed `x`
/// the optimal `K*(x) = Σ w y_o y_c / Σ w y_c²` is known in closed form, so
/// the scale is eliminated and [`finalise`](Self::finalise) builds the
/// Gauss-Newton equations of the reduced problem `min_x L(K*(x), x)`.
///
/// Equations are added first; everything else is only available once
/// finalised.
///
/// # Example
///
/// ```
/// use sparsela::normal_eqns::SeparableScaleLs;
///
/// // y_c(x) = x·t at x = 1, data exactly 2·y_c
/// let mut ls = SeparableScaleLs::new(1, true);
/// for t in [1.0_f64, 2.0, 3.0] {
///     ls.add_equation(t, &[t], 2.0 * t, 1.0).unwrap();
/// }
/// ls.finalise(false).unwrap();
/// assert!((ls.optimal_scale_factor().unwrap() - 2.0).abs() < 1e-12);
/// assert!(ls.objective().unwrap().abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SeparableScaleLs<T> {
    n_params: usize,
    n_data: usize,
    normalised: bool,
    yo_dot_yc: T,
    yo_sq: T,
    yc_sq: T,
    /// Unnormalised `Σ w (K*·y_c − y_o)²`, set by `finalise`.
    r_sq: T,
    /// `L(K*, x)`, set by `finalise`.
    objective: T,
    /// `Σ w ∇y_c·∇y_cᵀ`.
    grad_yc_dot_grad_yc: PackedSymmetric<T>,
    yo_dot_grad_yc: Vec<T>,
    yc_dot_grad_yc: Vec<T>,
    grad_k_star: Vec<T>,
    reduced: Option<NonLinearLs<T>>,
}

impl<T: FloatScalar> SeparableScaleLs<T> {
    /// Empty problem in `n_parameters` unknowns, `K` not included.
    pub fn new(n_parameters: usize, normalised: bool) -> Self {
        Self {
            n_params: n_parameters,
            n_data: 0,
            normalised,
            yo_dot_yc: T::zero(),
            yo_sq: T::zero(),
            yc_sq: T::zero(),
            r_sq: T::zero(),
            objective: T::zero(),
            grad_yc_dot_grad_yc: PackedSymmetric::zeros(n_parameters),
            yo_dot_grad_yc: vec![T::zero(); n_parameters],
            yc_dot_grad_yc: vec![T::zero(); n_parameters],
            grad_k_star: vec![T::zero(); n_parameters],
            reduced: None,
        }
    }

    #[inline]
    pub fn n_parameters(&self) -> usize {
        self.n_params
    }

    /// Data points added, plus any equations later added to the
    /// [reduced problem](Self::reduced_problem).
    pub fn n_equations(&self) -> usize {
        match &self.reduced {
            Some(reduced) => reduced.n_equations(),
            None => self.n_data,
        }
    }

    pub fn dof(&self) -> usize {
        self.n_equations().saturating_sub(self.n_params)
    }

    /// Whether the objective is divided by `Σ w y_o²`.
    #[inline]
    pub fn normalised(&self) -> bool {
        self.normalised
    }

    #[inline]
    pub fn finalised(&self) -> bool {
        self.reduced.is_some()
    }

    /// Count the pair `(y_c, y_o)` in the objective only.
    pub fn add_residual(&mut self, yc: T, yo: T, w: T) -> Result<(), LsqError> {
        self.check_open()?;
        self.accumulate_residual(yc, yo, w);
        Ok(())
    }

    fn accumulate_residual(&mut self, yc: T, yo: T, w: T) {
        self.n_data += 1;
        self.yo_sq = self.yo_sq + w * yo * yo;
        self.yo_dot_yc = self.yo_dot_yc + w * yo * yc;
        self.yc_sq = self.yc_sq + w * yc * yc;
    }

    /// Add the linearisation of `K·y_c(x) ≈ y_o` with weight `w`.
    pub fn add_equation(&mut self, yc: T, grad_yc: &[T], yo: T, w: T) -> Result<(), LsqError> {
        self.check_open()?;
        check_len(self.n_params, grad_yc.len())?;
        self.accumulate_residual(yc, yo, w);
        self.grad_yc_dot_grad_yc.add_rank_one(grad_yc, w);
        for (i, &g) in grad_yc.iter().enumerate() {
            self.yo_dot_grad_yc[i] = self.yo_dot_grad_yc[i] + w * yo * g;
            self.yc_dot_grad_yc[i] = self.yc_dot_grad_yc[i] + w * yc * g;
        }
        Ok(())
    }

    /// Add one equation per row of `jacobian_yc`. An empty `w` means unit
    /// weights.
    pub fn add_equations<M: MatrixRef<T>>(
        &mut self,
        yc: &[T],
        jacobian_yc: &M,
        yo: &[T],
        w: &[T],
    ) -> Result<(), LsqError> {
        self.check_open()?;
        check_len(yc.len(), jacobian_yc.nrows())?;
        check_len(yc.len(), yo.len())?;
        if !w.is_empty() {
            check_len(yc.len(), w.len())?;
        }
        check_len(self.n_params, jacobian_yc.ncols())?;
        let mut row = vec![T::zero(); self.n_params];
        for i in 0..yc.len() {
            for (j, g) in row.iter_mut().enumerate() {
                *g = jacobian_yc.get(i, j);
            }
            self.add_equation(yc[i], &row, yo[i], weight_at(w, i))?;
        }
        Ok(())
    }

    /// Stop accumulating and build the reduced problem.
    ///
    /// With `objective_only`, only the objective is made available and the
    /// step equations hold the raw sums `Σ w ∇y_c·∇y_cᵀ` and `Σ w y_o ∇y_c`.
    pub fn finalise(&mut self, objective_only: bool) -> Result<(), LsqError> {
        self.check_open()?;
        if self.n_data == 0 {
            return Err(LsqError::NoEquations);
        }

        let k_star = self.yo_dot_yc / self.yc_sq;
        let k_star_sq = k_star * k_star;
        self.r_sq = self.yo_sq * (T::one() - k_star_sq * self.yc_sq / self.yo_sq);
        self.objective = self.r_sq / (T::one() + T::one());
        if self.normalised {
            self.objective = self.objective / self.yo_sq;
        }

        let mut a = self.grad_yc_dot_grad_yc.clone();
        let mut b = self.yo_dot_grad_yc.clone();

        if !objective_only {
            let r_dot_yc = self.yo_dot_yc - k_star * self.yc_sq;
            for i in 0..self.n_params {
                let r_dot_grad_yc_i = self.yo_dot_grad_yc[i] - k_star * self.yc_dot_grad_yc[i];
                self.grad_k_star[i] =
                    (r_dot_grad_yc_i - k_star * self.yc_dot_grad_yc[i]) / self.yc_sq;
                b[i] = k_star * r_dot_grad_yc_i + self.grad_k_star[i] * r_dot_yc;
            }
            let (g, dk) = (&self.yc_dot_grad_yc, &self.grad_k_star);
            for i in 0..self.n_params {
                for j in i..self.n_params {
                    let a_ij = a.get_mut(i, j);
                    *a_ij = k_star_sq * *a_ij
                        + k_star * (g[i] * dk[j] + g[j] * dk[i])
                        + dk[i] * dk[j] * self.yc_sq;
                }
            }
            if self.normalised {
                let inv = T::one() / self.yo_sq;
                a.scale(inv);
                for b_i in b.iter_mut() {
                    *b_i = *b_i * inv;
                }
            }
        }

        self.reduced = Some(NonLinearLs::from_parts(self.n_data, self.objective, b, a)?);
        Ok(())
    }

    /// `Σ w y_o²`, the normalisation bringing `L` into `[0, 1]`.
    pub fn sum_w_yo_sq(&self) -> Result<T, LsqError> {
        self.reduced()?;
        Ok(self.yo_sq)
    }

    /// `K*(x)` for the current `x`.
    pub fn optimal_scale_factor(&self) -> Result<T, LsqError> {
        self.reduced()?;
        Ok(self.yo_dot_yc / self.yc_sq)
    }

    /// `L(K*(x), x)` plus whatever was added to the reduced problem.
    pub fn objective(&self) -> Result<T, LsqError> {
        Ok(self.reduced()?.objective())
    }

    /// χ² of the fit of `K*·y_c` to `y_o`, unnormalised, including the
    /// contributions added to the reduced problem.
    pub fn chi_sq(&self) -> Result<T, LsqError> {
        let reduced = self.reduced()?;
        let two = T::one() + T::one();
        let dof = T::from(self.dof()).unwrap_or_else(T::nan);
        Ok((self.r_sq + two * (reduced.objective() - self.objective)) / dof)
    }

    /// The non-linear problem with `K` optimised away. Further residuals
    /// independent of `K` may be added to it.
    pub fn reduced_problem(&mut self) -> Result<&mut NonLinearLs<T>, LsqError> {
        self.reduced.as_mut().ok_or(LsqError::NotFinalised)
    }

    /// Step equations of the reduced problem.
    pub fn step_equations(&mut self) -> Result<&mut LinearLs<T>, LsqError> {
        Ok(self.reduced_problem()?.step_equations())
    }

    /// Ready for another accumulation at a new `x`.
    pub fn reset(&mut self) {
        self.n_data = 0;
        self.yo_dot_yc = T::zero();
        self.yo_sq = T::zero();
        self.yc_sq = T::zero();
        self.r_sq = T::zero();
        self.objective = T::zero();
        self.grad_yc_dot_grad_yc.fill_zero();
        for v in [
            &mut self.yo_dot_grad_yc,
            &mut self.yc_dot_grad_yc,
            &mut self.grad_k_star,
        ] {
            v.iter_mut().for_each(|x| *x = T::zero());
        }
        self.reduced = None;
    }

    fn reduced(&self) -> Result<&NonLinearLs<T>, LsqError> {
        self.reduced.as_ref().ok_or(LsqError::NotFinalised)
    }

    fn check_open(&self) -> Result<(), LsqError> {
        if self.finalised() {
            Err(LsqError::AlreadyFinalised)
        } else {
            Ok(())
        }
    }
}
