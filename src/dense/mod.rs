//! Dense collaborators of the sparse engine.
//!
//! Dense vectors are plain slices (`&[T]` in, `Vec<T>` out). Dense matrices
//! come in two shapes:
//!
//! - [`DenseMatrix`]: runtime-sized, column-major `Vec<T>` storage, used as a
//!   block source for [`SparseMatrix::assign_block`](crate::sparse::SparseMatrix::assign_block)
//!   and as the target of [`SparseMatrix::to_dense`](crate::sparse::SparseMatrix::to_dense).
//! - [`PackedSymmetric`]: the upper triangle of a symmetric matrix stored row
//!   by row, the layout of normal matrices and of the `A` operand of quadratic
//!   forms.

mod packed;

pub use packed::PackedSymmetric;

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Index, IndexMut};

use crate::traits::{MatrixMut, MatrixRef, Scalar};

/// Dynamically-sized heap-allocated dense matrix.
///
/// Column-major `Vec<T>` storage.
///
/// # Examples
///
/// ```
/// use sparsela::dense::DenseMatrix;
///
/// let a = DenseMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
/// assert_eq!(a[(0, 1)], 2.0);
/// assert_eq!(a.nrows(), 2);
/// assert_eq!(a.col_slice(1), &[2.0, 4.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

impl<T: Scalar> DenseMatrix<T> {
    /// Create an `nrows x ncols` matrix of zeros.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![T::zero(); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Create a matrix from a flat slice in row-major order.
    ///
    /// Panics if `row_major.len() != nrows * ncols`.
    pub fn from_rows(nrows: usize, ncols: usize, row_major: &[T]) -> Self {
        assert_eq!(
            row_major.len(),
            nrows * ncols,
            "slice length {} does not match {}x{} matrix",
            row_major.len(),
            nrows,
            ncols,
        );
        let mut data = vec![T::zero(); nrows * ncols];
        for i in 0..nrows {
            for j in 0..ncols {
                data[j * nrows + i] = row_major[i * ncols + j];
            }
        }
        Self { data, nrows, ncols }
    }

    /// Create a matrix by calling `f(i, j)` for each element.
    ///
    /// ```
    /// use sparsela::dense::DenseMatrix;
    /// let m = DenseMatrix::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
    /// assert_eq!(m[(1, 2)], 5.0);
    /// ```
    pub fn from_fn(nrows: usize, ncols: usize, f: impl Fn(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Copy row `i` out of the column-major storage.
    pub fn row(&self, i: usize) -> Vec<T> {
        (0..self.ncols).map(|j| self[(i, j)]).collect()
    }
}

impl<T> DenseMatrix<T> {
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Contiguous column `j`.
    #[inline]
    pub fn col_slice(&self, j: usize) -> &[T] {
        &self.data[j * self.nrows..(j + 1) * self.nrows]
    }

    /// The whole column-major storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[j * self.nrows + i]
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.data[j * self.nrows + i]
    }
}

// ── MatrixRef / MatrixMut ───────────────────────────────────────────

impl<T: Scalar> MatrixRef<T> for DenseMatrix<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> T {
        self[(row, col)]
    }
}

impl<T: Scalar> MatrixMut<T> for DenseMatrix<T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self[(row, col)]
    }
}

// ── Display ─────────────────────────────────────────────────────────

impl<T: fmt::Display> fmt::Display for DenseMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_grid(f, self.nrows, self.ncols, |i, j| &self[(i, j)])
    }
}

/// Render an `m x n` grid framed with `│`, right-aligning each column to
/// its widest element.
pub(crate) fn write_grid<D: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    m: usize,
    n: usize,
    at: impl Fn(usize, usize) -> D,
) -> fmt::Result {
    let mut widths: Vec<usize> = vec![0; n];
    for (j, width) in widths.iter_mut().enumerate() {
        for i in 0..m {
            let w = WriteCounting::count(|wc| fmt::Write::write_fmt(wc, format_args!("{}", at(i, j))));
            if w > *width {
                *width = w;
            }
        }
    }

    for i in 0..m {
        write!(f, "│")?;
        for j in 0..n {
            if j > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{:>width$}", at(i, j), width = widths[j])?;
        }
        write!(f, "│")?;
        if i + 1 < m {
            writeln!(f)?;
        }
    }
    Ok(())
}

struct WriteCounting {
    count: usize,
}

impl WriteCounting {
    fn count(f: impl FnOnce(&mut Self) -> fmt::Result) -> usize {
        let mut wc = WriteCounting { count: 0 };
        let _ = f(&mut wc);
        wc.count
    }
}

impl fmt::Write for WriteCounting {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.count += s.chars().count();
        Ok(())
    }
}
