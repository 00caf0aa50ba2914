//! Gauss-Newton fit of an exponential decay through the sparse Jacobian path.

use sparsela::normal_eqns::{LsqError, NonLinearLs, SeparableScaleLs};
use sparsela::sparse::SparseMatrix;
use sparsela::DenseMatrix;

fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff {})",
        msg,
        a,
        b,
        (a - b).abs()
    );
}

/// Two independent decays `a·exp(−k·t)` sharing nothing: parameters
/// `[a0, k0, a1, k1]`, observations alternating between the two curves.
/// Each Jacobian row touches only two of the four columns.
fn residuals_and_jacobian(x: &[f64], ts: &[f64], ys: &[f64]) -> (Vec<f64>, SparseMatrix<f64>) {
    let mut r = Vec::with_capacity(ts.len());
    let mut jac = SparseMatrix::new(ts.len(), 4);
    for (i, (&t, &y)) in ts.iter().zip(ys).enumerate() {
        let c = 2 * (i % 2);
        let (a, k) = (x[c], x[c + 1]);
        let e = (-k * t).exp();
        r.push(a * e - y);
        jac.set(i, c, e);
        jac.set(i, c + 1, -a * t * e);
    }
    (r, jac)
}

fn observations(truth: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let ts: Vec<f64> = (0..24).map(|i| (i / 2) as f64 * 0.25).collect();
    let ys = ts
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let c = 2 * (i % 2);
            truth[c] * (-truth[c + 1] * t).exp()
        })
        .collect();
    (ts, ys)
}

#[test]
fn gauss_newton_converges_on_sparse_jacobian() {
    let truth = [3.0, 0.8, 1.5, 0.3];
    let (ts, ys) = observations(&truth);
    let mut x = vec![2.0, 0.5, 1.0, 0.5];

    let mut ls = NonLinearLs::new(4);
    for _ in 0..20 {
        ls.reset();
        let (r, jac) = residuals_and_jacobian(&x, &ts, &ys);
        assert_eq!(jac.non_zeroes(), 2 * ts.len());
        ls.add_equations(&r, &jac, &[]).unwrap();
        if ls.objective() < 1e-24 {
            break;
        }
        let step = ls.step_equations();
        step.solve().unwrap();
        for (x_k, d_k) in x.iter_mut().zip(step.solution().unwrap()) {
            *x_k += d_k;
        }
    }

    for k in 0..4 {
        assert_near(x[k], truth[k], 1e-9, "parameter");
    }
    assert_eq!(ls.n_equations(), 24);
    assert_eq!(ls.dof(), 20);
}

#[test]
fn decoupled_blocks_in_normal_matrix() {
    let (ts, ys) = observations(&[3.0, 0.8, 1.5, 0.3]);
    let (r, jac) = residuals_and_jacobian(&[2.0, 0.5, 1.0, 0.5], &ts, &ys);
    let gram = jac.this_transpose_times_this();
    for (p, q) in [(0, 2), (0, 3), (1, 2), (1, 3)] {
        assert!(gram.is_structural_zero(p, q), "({}, {})", p, q);
    }

    let mut ls = NonLinearLs::new(4);
    ls.add_equations(&r, &jac, &[]).unwrap();
    let normal = ls.step_equations().normal_matrix().unwrap();
    assert_eq!(normal.get(0, 2), 0.0);
    assert_eq!(normal.get(1, 3), 0.0);
}

#[test]
fn jacobian_shape_is_checked() {
    let mut ls = NonLinearLs::new(3);
    let jac = SparseMatrix::new(2, 4);
    assert_eq!(
        ls.add_equations(&[0.0, 0.0], &jac, &[]),
        Err(LsqError::SizeMismatch {
            expected: 3,
            got: 4
        })
    );
}

#[test]
fn separable_scale_recovers_amplitude() {
    // y_o = 4·exp(−0.6 t); the model carries the shape only
    let ts: Vec<f64> = (0..10).map(|i| i as f64 * 0.3).collect();
    let yo: Vec<f64> = ts.iter().map(|&t| 4.0 * (-0.6 * t).exp()).collect();
    let mut k: f64 = 1.0;

    let mut ls = SeparableScaleLs::new(1, true);
    for _ in 0..30 {
        ls.reset();
        let yc: Vec<f64> = ts.iter().map(|&t| (-k * t).exp()).collect();
        let jac = DenseMatrix::from_fn(ts.len(), 1, |i, _| -ts[i] * yc[i]);
        ls.add_equations(&yc, &jac, &yo, &[]).unwrap();
        ls.finalise(false).unwrap();
        if ls.objective().unwrap() < 1e-28 {
            break;
        }
        let step = ls.step_equations().unwrap();
        step.solve().unwrap();
        k += step.solution().unwrap()[0];
    }

    assert_near(k, 0.6, 1e-9, "decay rate");
    assert_near(ls.optimal_scale_factor().unwrap(), 4.0, 1e-8, "amplitude");
}
