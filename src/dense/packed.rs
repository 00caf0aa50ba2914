use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ops::AddAssign;

use crate::traits::{MatrixRef, Scalar};

use super::DenseMatrix;

/// Symmetric `n x n` matrix stored as its packed upper triangle.
///
/// Row `i` contributes the `n - i` elements `a[i, i..n]`, so the storage
/// holds `n(n+1)/2` values. Reading `(i, j)` with `i > j` returns `a[j, i]`.
///
/// # Examples
///
/// ```
/// use sparsela::dense::PackedSymmetric;
///
/// // | 4 2 |
/// // | 2 3 |
/// let a = PackedSymmetric::from_vec(2, vec![4.0_f64, 2.0, 3.0]);
/// assert_eq!(a.get(1, 0), 2.0);
/// assert_eq!(a.get(1, 1), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PackedSymmetric<T> {
    data: Vec<T>,
    n: usize,
}

/// Number of stored elements for an `n x n` packed triangle.
#[inline]
pub(crate) fn packed_len(n: usize) -> usize {
    n * (n + 1) / 2
}

impl<T: Scalar> PackedSymmetric<T> {
    /// All-zero `n x n` matrix.
    pub fn zeros(n: usize) -> Self {
        Self {
            data: vec![T::zero(); packed_len(n)],
            n,
        }
    }

    /// Wrap packed upper-triangular storage.
    ///
    /// Panics if `data.len() != n(n+1)/2`.
    pub fn from_vec(n: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            packed_len(n),
            "packed length {} does not match {}x{} symmetric matrix",
            data.len(),
            n,
            n,
        );
        Self { data, n }
    }

    /// Build from `f(i, j)`, called for `i <= j` only.
    pub fn from_fn(n: usize, f: impl Fn(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(packed_len(n));
        for i in 0..n {
            for j in i..n {
                data.push(f(i, j));
            }
        }
        Self { data, n }
    }

    /// Element `(i, j)`, mirrored through the diagonal when `i > j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[self.offset(i, j)]
    }

    /// Mutable element `(i, j)`; `(i, j)` and `(j, i)` share storage.
    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        let k = self.offset(i, j);
        &mut self.data[k]
    }

    /// `self += w · g·gᵀ`.
    pub fn add_rank_one(&mut self, g: &[T], w: T) {
        assert_eq!(g.len(), self.n, "vector length mismatch");
        let mut k = 0;
        for i in 0..self.n {
            let wg_i = w * g[i];
            for j in i..self.n {
                self.data[k] = self.data[k] + wg_i * g[j];
                k += 1;
            }
        }
    }

    /// Multiply every element by `a`.
    pub fn scale(&mut self, a: T) {
        for x in self.data.iter_mut() {
            *x = *x * a;
        }
    }

    /// Reset every element to zero.
    pub fn fill_zero(&mut self) {
        for x in self.data.iter_mut() {
            *x = T::zero();
        }
    }

    /// Expand to a full dense matrix.
    pub fn to_dense(&self) -> DenseMatrix<T> {
        DenseMatrix::from_fn(self.n, self.n, |i, j| self.get(i, j))
    }
}

impl<T> PackedSymmetric<T> {
    /// Dimension `n`.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Packed storage, row by row.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        debug_assert!(j < self.n);
        i * self.n - i * (i + 1) / 2 + j
    }
}

impl<T: Scalar> AddAssign<&PackedSymmetric<T>> for PackedSymmetric<T> {
    fn add_assign(&mut self, rhs: &PackedSymmetric<T>) {
        assert_eq!(self.n, rhs.n, "dimension mismatch: {} += {}", self.n, rhs.n);
        for (a, &b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a = *a + b;
        }
    }
}

impl<T: Scalar> MatrixRef<T> for PackedSymmetric<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.n
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.n
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> T {
        PackedSymmetric::get(self, row, col)
    }
}

impl<T: Scalar + fmt::Display> fmt::Display for PackedSymmetric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        super::write_grid(f, self.n, self.n, |i, j| self.get(i, j))
    }
}
