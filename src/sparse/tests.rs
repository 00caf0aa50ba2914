use super::*;
use crate::dense::{DenseMatrix, PackedSymmetric};
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

const TOL: f64 = 1e-12;

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

fn vec_of(n: usize, entries: &[(usize, f64)]) -> SparseVector<f64> {
    let mut v = SparseVector::new(n);
    for &(i, x) in entries {
        v.set(i, x);
    }
    v
}

/// | 1 0 2 |
/// | 0 3 0 |
/// | 4 0 5 |
/// | 0 6 0 |
fn sample_matrix() -> SparseMatrix<f64> {
    SparseMatrix::from_columns(
        4,
        3,
        vec![
            vec![(0, 1.0), (2, 4.0)],
            vec![(1, 3.0), (3, 6.0)],
            vec![(0, 2.0), (2, 5.0)],
        ],
    )
    .unwrap()
}

fn dense_product(a: &DenseMatrix<f64>, b: &DenseMatrix<f64>) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(a.nrows(), b.ncols(), |i, j| {
        (0..a.ncols()).map(|k| a[(i, k)] * b[(k, j)]).sum()
    })
}

// ═══════════════════════════════════════════════════════════════════
// Deferred writes and compaction
// ═══════════════════════════════════════════════════════════════════

#[test]
fn assign_overwrites_earlier_history() {
    let mut v = SparseVector::new(3);
    v.set(1, 5.0);
    v.add(1, 2.0);
    v.sub(1, 10.0);
    v.set(1, 7.0);
    assert_eq!(v.get(1), 7.0);
}

#[test]
fn accumulate_law() {
    let mut v = SparseVector::new(3);
    v.set(0, 9.0);
    v.zero();
    v.set(1, 2.0);
    v.add(1, 3.0);
    v.sub(1, 1.0);
    assert_eq!(v.get(1), 4.0);
    assert_eq!(v.get(0), 0.0);
}

#[test]
fn interleaved_writes_replay_in_order() {
    let mut v = SparseVector::new(4);
    v.add(2, 1.0);
    v.add(2, 2.0);
    v.set(2, 4.0);
    v.sub(2, 1.0);
    v.set(2, 6.0);
    v.add(3, 1.0);
    v.add(2, 0.5);
    assert_eq!(v.get(2), 6.5);
    assert_eq!(v.get(3), 1.0);
}

#[test]
fn explicit_compaction_does_not_change_values() {
    let writes = |v: &mut SparseVector<f64>| {
        v.add(3, 1.0);
        v.set(0, 2.0);
        v.add(3, 4.0);
        v.set(1, 0.0);
        v.sub(0, 0.5);
    };
    let mut lazy = SparseVector::new(5);
    writes(&mut lazy);
    let mut eager = SparseVector::new(5);
    writes(&mut eager);
    assert!(!eager.is_compact());
    eager.compact();
    assert!(eager.is_compact());
    for i in 0..5 {
        assert_eq!(lazy.get(i), eager.get(i), "index {}", i);
    }
    assert_eq!(lazy, eager);
}

#[test]
fn reads_compact_lazily() {
    let mut v = SparseVector::new(3);
    v.add(2, 1.0);
    v.add(2, 1.0);
    assert!(!v.is_compact());
    assert_eq!(v.get(2), 2.0);
    assert!(v.is_compact());
    v.set(0, 1.0);
    assert!(!v.is_compact());
}

#[test]
fn out_of_range_writes_are_pruned() {
    let mut v = SparseVector::new(3);
    v.set(0, 1.0);
    v.set(5, 9.0);
    v.add(3, 2.0);
    assert!(!v.is_structurally_zero());
    assert_eq!(v.non_zeroes(), 1);
    assert_eq!(v.get(0), 1.0);
    assert_eq!(v, vec_of(3, &[(0, 1.0)]));
}

#[test]
fn structural_zero_versus_stored_zero() {
    let mut v = SparseVector::new(3);
    assert!(v.is_structurally_zero());
    v.set(1, 0.0);
    assert!(!v.is_structurally_zero());
    assert!(!v.is_structural_zero(1));
    assert!(v.is_structural_zero(0));
    assert_eq!(v.get(1), 0.0);
    assert_eq!(v.non_zeroes(), 1);
    v.zero();
    assert!(v.is_structurally_zero());
    assert!(v.is_compact());
}

#[test]
fn clone_is_independent_and_keeps_flag() {
    let mut v = SparseVector::new(3);
    v.add(1, 1.0);
    let mut w = v.clone();
    assert!(!w.is_compact());
    w.add(1, 1.0);
    assert_eq!(v.get(1), 1.0);
    assert_eq!(w.get(1), 2.0);
}

#[test]
fn selection_writes() {
    let mut v = SparseVector::new(4);
    v.set_selected(&[3, 1, 3], &[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(v.as_dense_vector(), vec![0.0, 2.0, 0.0, 3.0]);

    assert_eq!(
        v.set_selected(&[0, 1], &[1.0]),
        Err(SparseError::SizeMismatch {
            expected: 2,
            got: 1
        })
    );
    assert_eq!(
        v.set_selected_mask(&[true], &[1.0, 2.0]),
        Err(SparseError::SizeMismatch {
            expected: 1,
            got: 2
        })
    );
}

#[test]
fn iter_and_entries_are_canonical() {
    let mut v = SparseVector::new(6);
    v.set(4, 1.0);
    v.add(1, 2.0);
    v.add(4, 1.0);
    let pairs: Vec<_> = v.iter().collect();
    assert_eq!(pairs, vec![(1, 2.0), (4, 2.0)]);
    assert_eq!(v.iter().len(), 2);
    let entries = v.entries();
    assert!(entries.iter().all(|e| e.kind() == EntryKind::Assign));
    // reading while an entries borrow is alive
    assert_eq!(v.get(4), 2.0);
}

// ═══════════════════════════════════════════════════════════════════
// Dense conversions
// ═══════════════════════════════════════════════════════════════════

#[test]
fn dense_round_trip() {
    let v = vec_of(6, &[(5, -1.0), (0, 2.0), (3, 0.5)]);
    let dense = v.as_dense_vector();
    let mut w = SparseVector::new(6);
    for (i, &x) in dense.iter().enumerate() {
        if x != 0.0 {
            w.set(i, x);
        }
    }
    assert_eq!(v, w);
}

#[test]
fn assign_to_leaves_other_positions() {
    let v = vec_of(3, &[(1, 2.0)]);
    let mut w = [7.0, 7.0, 7.0];
    v.assign_to(&mut w).unwrap();
    assert_eq!(w, [7.0, 2.0, 7.0]);
    let mut short = [0.0; 2];
    assert!(v.assign_to(&mut short).is_err());
}

// ═══════════════════════════════════════════════════════════════════
// Reductions
// ═══════════════════════════════════════════════════════════════════

#[test]
fn merge_join_dot() {
    let u = vec_of(4, &[(0, 1.0), (2, 3.0)]);
    let v = vec_of(4, &[(1, 5.0), (2, 7.0)]);
    assert_eq!(u.dot(&v).unwrap(), 21.0);
    assert_eq!(u.dot(&u).unwrap(), 10.0);
    assert_eq!(
        u.dot(&SparseVector::new(3)),
        Err(SparseError::SizeMismatch {
            expected: 4,
            got: 3
        })
    );
}

#[test]
fn dot_on_raw_logs() {
    let mut u = SparseVector::new(3);
    u.add(1, 1.0);
    u.add(1, 1.0);
    let mut v = SparseVector::new(3);
    v.set(1, 3.0);
    v.set(1, 4.0);
    assert_eq!(u.dot(&v).unwrap(), 8.0);
}

#[test]
fn weighted_dot_uses_weights_at_shared_indices() {
    let u = vec_of(3, &[(0, 1.0), (1, 2.0), (2, 3.0)]);
    let v = vec_of(3, &[(1, 4.0), (2, 5.0)]);
    let w = [10.0, 100.0, 1000.0];
    assert_eq!(u.weighted_dot(&w, &v).unwrap(), 100.0 * 8.0 + 1000.0 * 15.0);
    assert_eq!(weighted_dot(&u, &w, &v), u.weighted_dot(&w, &v));
    assert!(u.weighted_dot(&w[..2], &v).is_err());
}

#[test]
fn dense_dot() {
    let v = vec_of(3, &[(0, 2.0), (2, -1.0)]);
    assert_eq!(v.dot_dense(&[1.0, 5.0, 3.0]).unwrap(), -1.0);
    assert!(v.dot_dense(&[1.0]).is_err());
}

#[test]
fn quadratic_forms_match_dense() {
    // | 2 1 0 |
    // | 1 3 4 |
    // | 0 4 5 |
    let a = PackedSymmetric::from_vec(3, vec![2.0, 1.0, 0.0, 3.0, 4.0, 5.0]);
    let u = vec_of(3, &[(0, 1.0), (2, 2.0)]);
    let v = vec_of(3, &[(1, 3.0), (2, -1.0)]);

    let dense = |x: &SparseVector<f64>, y: &SparseVector<f64>| {
        let (x, y) = (x.as_dense_vector(), y.as_dense_vector());
        let mut s = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                s += x[i] * a.get(i, j) * y[j];
            }
        }
        s
    };

    assert_near(u.quadratic_form(&a, &v).unwrap(), dense(&u, &v), TOL, "uᵀAv");
    assert_near(v.quadratic_form(&a, &u).unwrap(), dense(&u, &v), TOL, "vᵀAu");
    assert_near(u.quadratic_form_self(&a).unwrap(), dense(&u, &u), TOL, "uᵀAu");
    assert_near(quadratic_form_self(&a, &v).unwrap(), dense(&v, &v), TOL, "vᵀAv");
    assert_eq!(quadratic_form(&u, &a, &v), u.quadratic_form(&a, &v));

    let small = PackedSymmetric::<f64>::zeros(2);
    assert!(u.quadratic_form(&small, &v).is_err());
    assert!(u.quadratic_form_self(&small).is_err());
}

// ═══════════════════════════════════════════════════════════════════
// Permutations
// ═══════════════════════════════════════════════════════════════════

#[test]
fn permute_moves_entries() {
    let mut v = vec_of(4, &[(0, 1.0), (3, 4.0)]);
    v.compact();
    v.permute(&[2, 0, 3, 1]).unwrap();
    assert_eq!(v.as_dense_vector(), vec![0.0, 4.0, 1.0, 0.0]);
    assert_eq!(v.get(2), 1.0);
}

#[test]
fn permute_raw_log() {
    let mut v = SparseVector::new(3);
    v.add(0, 1.0);
    v.add(0, 1.0);
    v.set(2, 5.0);
    v.permute(&[1, 2, 0]).unwrap();
    assert_eq!(v.as_dense_vector(), vec![5.0, 2.0, 0.0]);
}

#[test]
fn permutations_compose() {
    let v = vec_of(5, &[(0, 1.0), (1, 2.0), (4, 5.0)]);
    let p = [3, 0, 4, 1, 2];
    let q = [1, 4, 0, 2, 3];
    let qp: Vec<usize> = p.iter().map(|&i| q[i]).collect();

    let mut stepwise = v.clone();
    stepwise.permute(&p).unwrap().permute(&q).unwrap();
    let composed = v.permuted(&qp).unwrap();
    assert_eq!(stepwise, composed);
    assert_eq!(v.permuted_dense(&qp).unwrap(), composed.as_dense_vector());
}

#[test]
fn permuted_dense_rejects_target_past_size() {
    let v = vec_of(3, &[(0, 1.0), (2, 3.0)]);
    assert_eq!(
        v.permuted_dense(&[5, 0, 1]),
        Err(SparseError::IndexOutOfBounds { index: 5, bound: 3 })
    );
    assert_eq!(v.permuted_dense(&[2, 0, 1]).unwrap(), vec![0.0, 3.0, 1.0]);
}

#[test]
fn unsigned_subtraction_is_deferred() {
    let mut v = SparseVector::<u32>::new(3);
    v.set(0, 5);
    v.sub(0, 2);
    v.add(1, 4);
    v.sub(1, 4);
    assert_eq!(v.get(0), 3);
    assert_eq!(v.get(1), 0);
    assert!(!v.is_structural_zero(1));

    let mut u = SparseVector::<u32>::new(3);
    u.set(0, 1);
    assert_eq!((&v - &u).get(0), 2);
}

#[test]
fn signed_negation() {
    let mut v = SparseVector::<i64>::new(3);
    v.sub(2, 7);
    assert_eq!((-&v).as_dense_vector(), vec![0, 0, 7]);
}

#[test]
fn permutation_size_checked() {
    let mut v = SparseVector::<f64>::new(3);
    assert_eq!(
        v.permute(&[0, 1]).err(),
        Some(SparseError::SizeMismatch {
            expected: 3,
            got: 2
        })
    );
}

// ═══════════════════════════════════════════════════════════════════
// Matrix structure
// ═══════════════════════════════════════════════════════════════════

#[test]
fn from_columns_checks_column_count() {
    let r = SparseMatrix::<f64>::from_columns(2, 3, vec![vec![(0, 1.0)]]);
    assert_eq!(
        r.unwrap_err(),
        SparseError::SizeMismatch {
            expected: 3,
            got: 1
        }
    );
}

#[test]
fn element_access_and_counts() {
    let mut a = sample_matrix();
    assert_eq!(a.n_rows(), 4);
    assert_eq!(a.n_cols(), 3);
    assert_eq!(a.get(2, 2), 5.0);
    assert_eq!(a.non_zeroes(), 6);
    a.add(2, 2, 1.0);
    a.sub(0, 0, 1.0);
    a.set(3, 0, 0.0);
    assert_eq!(a.get(2, 2), 6.0);
    assert_eq!(a.get(0, 0), 0.0);
    assert_eq!(a.non_zeroes(), 7);
    assert!(!a.is_structural_zero(3, 0));
    assert!(a.is_structural_zero(1, 0));
}

#[test]
fn item_access() {
    let mut a = sample_matrix();
    assert_eq!(a.get_item(RowIndex::At(2), 0), Ok(Item::Scalar(4.0)));
    match a.get_item(RowIndex::ALL, 1) {
        Ok(Item::Column(c)) => assert_eq!(c.as_dense_vector(), vec![0.0, 3.0, 0.0, 6.0]),
        other => panic!("unexpected {:?}", other),
    }

    a.set_item(RowIndex::At(1), 2, Item::Scalar(8.0)).unwrap();
    assert_eq!(a.get(1, 2), 8.0);
    a.set_item(RowIndex::ALL, 0, Item::Column(vec_of(4, &[(3, 1.0)])))
        .unwrap();
    assert_eq!(a.col(0).as_dense_vector(), vec![0.0, 0.0, 0.0, 1.0]);

    let bounded = RowIndex::Slice {
        start: None,
        stop: Some(2),
    };
    assert_eq!(a.get_item(bounded, 0), Err(SparseError::UnsupportedIndexing));
    assert_eq!(
        a.set_item(RowIndex::At(0), 0, Item::Column(SparseVector::new(4))),
        Err(SparseError::UnsupportedIndexing)
    );
    assert_eq!(
        a.set_item(RowIndex::ALL, 0, Item::Column(SparseVector::new(3))),
        Err(SparseError::SizeMismatch {
            expected: 4,
            got: 3
        })
    );
    assert!(matches!(
        a.get_item(RowIndex::At(0), 3),
        Err(SparseError::IndexOutOfBounds { index: 3, bound: 3 })
    ));
}

#[test]
fn column_handle_writes_through() {
    let mut a = SparseMatrix::new(3, 2);
    {
        let c = a.col_mut(1);
        c.add(0, 1.0);
        c.add(0, 2.0);
    }
    assert_eq!(a.get(0, 1), 3.0);
}

#[test]
fn triangular_predicates() {
    let u = SparseMatrix::from_columns(
        3,
        3,
        vec![vec![(0, 2.0)], vec![(0, 1.0), (1, 3.0)], vec![(2, 1.0)]],
    )
    .unwrap();
    assert!(u.is_upper_triangular());
    assert!(!u.is_unit_lower_triangular());

    let l = SparseMatrix::from_columns(
        3,
        3,
        vec![vec![(0, 1.0), (2, 4.0)], vec![(1, 1.0)], vec![(2, 1.0)]],
    )
    .unwrap();
    assert!(l.is_unit_lower_triangular());
    assert!(!l.is_upper_triangular());

    let mut not_unit = l.clone();
    not_unit.set(1, 1, 2.0);
    assert!(!not_unit.is_unit_lower_triangular());

    assert!(!sample_matrix().is_upper_triangular());
}

#[test]
fn transpose_involution() {
    let a = sample_matrix();
    let at = a.transpose();
    assert_eq!(at.n_rows(), 3);
    assert_eq!(at.n_cols(), 4);
    assert_eq!(at.get(2, 0), 2.0);
    assert_eq!(at.get(1, 3), 6.0);
    assert_eq!(at.transpose(), a);
}

#[test]
fn dense_and_sparse_blocks() {
    let mut a = SparseMatrix::new(4, 4);
    let block = DenseMatrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    a.assign_block(&block, 1, 2).unwrap();
    assert_eq!(a.get(1, 2), 1.0);
    assert_eq!(a.get(2, 3), 4.0);
    assert_eq!(a.non_zeroes(), 4);

    let mut s = SparseMatrix::new(2, 2);
    s.set(1, 0, 9.0);
    a.assign_sparse_block(&s, 0, 0).unwrap();
    assert_eq!(a.get(1, 0), 9.0);
    assert_eq!(a.non_zeroes(), 5);

    assert!(matches!(
        a.assign_block(&block, 3, 0),
        Err(SparseError::IndexOutOfBounds { index: 5, bound: 4 })
    ));
    assert!(a.assign_sparse_block(&s, 0, 3).is_err());
    assert!(matches!(
        a.assign_block(&block, usize::MAX, 0),
        Err(SparseError::IndexOutOfBounds { index: usize::MAX, bound: 4 })
    ));
    assert!(matches!(
        a.assign_sparse_block(&s, 0, usize::MAX - 1),
        Err(SparseError::IndexOutOfBounds { index: usize::MAX, bound: 4 })
    ));
    assert_eq!(a.non_zeroes(), 5);

    let sym = PackedSymmetric::from_vec(2, vec![1.0, 2.0, 3.0]);
    let mut b = SparseMatrix::new(2, 2);
    b.assign_block(&sym, 0, 0).unwrap();
    assert_eq!(b.get(1, 0), 2.0);
}

#[test]
fn permute_rows_and_select_columns() {
    let mut a = sample_matrix();
    let p = [3, 2, 1, 0];
    a.permute_rows(&p).unwrap();
    assert_eq!(a.get(3, 0), 1.0);
    assert_eq!(a.get(1, 0), 4.0);
    assert_eq!(a.get(0, 1), 6.0);
    assert!(a.permute_rows(&[0, 1]).is_err());

    let s = sample_matrix().select_columns(&[2, 0, 2]).unwrap();
    assert_eq!(s.n_cols(), 3);
    assert_eq!(s.col(0), sample_matrix().col(2));
    assert_eq!(s.col(1), sample_matrix().col(0));
    assert_eq!(s.col(2), sample_matrix().col(2));
    assert!(sample_matrix().select_columns(&[3]).is_err());
}

// ═══════════════════════════════════════════════════════════════════
// Matrix products
// ═══════════════════════════════════════════════════════════════════

#[test]
fn matrix_times_vectors() {
    let a = sample_matrix();
    let x = [1.0, 2.0, 3.0];
    assert_eq!(a.mul_dense(&x).unwrap(), vec![7.0, 6.0, 19.0, 12.0]);

    let v = vec_of(3, &[(1, 2.0), (2, 3.0)]);
    let av = a.mul_vector(&v).unwrap();
    assert_eq!(av.as_dense_vector(), vec![6.0, 6.0, 15.0, 12.0]);
    assert!(av.is_compact());

    let u = [1.0, 0.0, 1.0, 1.0];
    assert_eq!(a.transpose_times(&u).unwrap(), vec![5.0, 6.0, 7.0]);

    assert!(a.mul_dense(&[1.0]).is_err());
    assert!(a.transpose_times(&x).is_err());
    assert!(a.mul_vector(&SparseVector::new(4)).is_err());
}

#[test]
fn sparse_times_sparse_matches_dense() {
    let a = sample_matrix();
    let b = SparseMatrix::from_columns(3, 2, vec![vec![(0, 1.0), (2, -1.0)], vec![(1, 2.0)]])
        .unwrap();
    let c = a.mul_matrix(&b).unwrap();
    let expected = dense_product(&a.to_dense(), &b.to_dense());
    assert_eq!(c.to_dense(), expected);
    assert!(b.mul_matrix(&b).is_err());
}

#[test]
fn gram_matrices_match_dense() {
    let a = sample_matrix();
    let d = a.to_dense();
    let w = [1.0, 2.0, 0.5, 3.0];

    let wa = DenseMatrix::from_fn(4, 3, |i, j| w[i] * d[(i, j)]);
    let at = DenseMatrix::from_fn(3, 4, |i, j| d[(j, i)]);
    let expected = dense_product(&at, &wa);
    let atwa = a.this_transpose_times_diagonal_times_this(&w).unwrap();
    for p in 0..3 {
        for q in 0..3 {
            assert_near(atwa.get(p, q), expected[(p, q)], TOL, "AᵀWA");
            assert_eq!(atwa.get(p, q), atwa.get(q, p));
        }
    }

    let ata = a.this_transpose_times_this();
    let expected = dense_product(&at, &d);
    for p in 0..3 {
        for q in 0..3 {
            assert_near(ata.get(p, q), expected[(p, q)], TOL, "AᵀA");
        }
    }
    // columns 0 and 1 share no rows
    assert!(ata.is_structural_zero(0, 1));

    assert!(a.this_transpose_times_diagonal_times_this(&w[..3]).is_err());
}

#[test]
fn gram_stores_cancelled_overlap() {
    // columns share rows 0 and 1 but are orthogonal
    let a = SparseMatrix::from_columns(
        3,
        3,
        vec![vec![(0, 1.0), (1, 1.0)], vec![(0, 1.0), (1, -1.0)], vec![(2, 4.0)]],
    )
    .unwrap();
    let ata = a.this_transpose_times_this();
    assert!(!ata.is_structural_zero(0, 1));
    assert!(!ata.is_structural_zero(1, 0));
    assert_eq!(ata.get(0, 1), 0.0);
    assert!(ata.is_structural_zero(0, 2));
    assert!(ata.is_structural_zero(2, 1));
    assert_eq!(ata.non_zeroes(), 5);

    let atwa = a.this_transpose_times_diagonal_times_this(&[2.0, 2.0, 1.0]).unwrap();
    assert!(!atwa.is_structural_zero(0, 1));
    assert_eq!(atwa.get(0, 1), 0.0);
    assert_eq!(atwa.get(2, 2), 16.0);

    // an empty column gives an empty row and column in AᵀSA
    let b = SparseMatrix::from_columns(2, 2, vec![vec![(0, 1.0)], vec![]]).unwrap();
    let s = PackedSymmetric::from_fn(2, |_, _| 1.0);
    let btsb = b.this_transpose_times_symmetric_times_this(&s).unwrap();
    assert_eq!(btsb.non_zeroes(), 1);
    assert!(btsb.is_structural_zero(0, 1));
}

#[test]
fn symmetric_sandwiches_match_dense() {
    let a = sample_matrix();
    let d = a.to_dense();
    let at = DenseMatrix::from_fn(3, 4, |i, j| d[(j, i)]);

    let s4 = PackedSymmetric::from_fn(4, |i, j| 1.0 + (i + 2 * j) as f64);
    let expected = dense_product(&dense_product(&at, &s4.to_dense()), &d);
    let got = a.this_transpose_times_symmetric_times_this(&s4).unwrap();
    for p in 0..3 {
        for q in 0..3 {
            assert_near(got.get(p, q), expected[(p, q)], 1e-10, "AᵀSA");
        }
    }

    let s3 = PackedSymmetric::from_fn(3, |i, j| if i == j { 2.0 } else { 0.5 });
    let expected = dense_product(&dense_product(&d, &s3.to_dense()), &at);
    let got = a.this_times_symmetric_times_this_transpose(&s3).unwrap();
    assert_eq!(got.n_rows(), 4);
    for p in 0..4 {
        for q in 0..4 {
            assert_near(got.get(p, q), expected[(p, q)], 1e-10, "ASAᵀ");
        }
    }

    assert!(a.this_transpose_times_symmetric_times_this(&s3).is_err());
    assert!(a.this_times_symmetric_times_this_transpose(&s4).is_err());
}

#[test]
fn upper_diagonal_packs_gram_matrix() {
    let a = sample_matrix();
    let ata = a.this_transpose_times_this();
    let packed = upper_diagonal_of(&ata).unwrap();
    assert_eq!(packed.n(), 3);
    for p in 0..3 {
        for q in p..3 {
            assert_eq!(packed.get(p, q), ata.get(p, q));
        }
    }
    assert!(upper_diagonal_of(&a).is_err());
}

// ═══════════════════════════════════════════════════════════════════
// Triangular solves
// ═══════════════════════════════════════════════════════════════════

#[test]
fn upper_triangular_solve() {
    let u = SparseMatrix::from_columns(
        3,
        3,
        vec![vec![(0, 2.0)], vec![(0, 1.0), (1, 3.0)], vec![(1, -1.0), (2, 4.0)]],
    )
    .unwrap();
    let x = [1.0, -2.0, 0.5];
    let mut b = u.mul_dense(&x).unwrap();
    u.solve_upper_triangular(&mut b).unwrap();
    for i in 0..3 {
        assert_near(b[i], x[i], TOL, "x");
    }

    let mut missing = SparseMatrix::new(2, 2);
    missing.set(0, 0, 1.0);
    assert_eq!(
        missing.solve_upper_triangular(&mut [1.0, 1.0]),
        Err(SparseError::StructurallySingular { column: 1 })
    );
    assert_eq!(
        sample_matrix().solve_upper_triangular(&mut [0.0; 4]),
        Err(SparseError::NotTriangular)
    );
}

#[test]
fn unit_lower_triangular_solve() {
    let l = SparseMatrix::from_columns(
        3,
        3,
        vec![vec![(0, 1.0), (1, 2.0), (2, -1.0)], vec![(1, 1.0), (2, 3.0)], vec![(2, 1.0)]],
    )
    .unwrap();
    let x = [1.0, 2.0, 3.0];
    let mut b = l.mul_dense(&x).unwrap();
    l.solve_unit_lower_triangular(&mut b).unwrap();
    assert_eq!(b, x.to_vec());
    assert!(l.solve_unit_lower_triangular(&mut [0.0; 2]).is_err());
}

// ═══════════════════════════════════════════════════════════════════
// Display
// ═══════════════════════════════════════════════════════════════════

#[test]
fn display_forms() {
    let v = vec_of(5, &[(3, 2.5), (0, 1.0)]);
    assert_eq!(v.to_string(), "{0: 1, 3: 2.5}");
    assert_eq!(SparseVector::<f64>::new(2).to_string(), "{}");

    let mut m = SparseMatrix::new(2, 2);
    m.set(0, 0, 1.0);
    m.set(1, 1, 10.0);
    assert_eq!(m.to_string(), "│1   0│\n│0  10│");
}
