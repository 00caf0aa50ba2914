use alloc::vec::Vec;

use crate::dense::DenseMatrix;
use crate::traits::{MatrixRef, Scalar};

use super::{check_size, SparseError, SparseVector};

/// Sparse matrix stored as a sequence of [`SparseVector`] columns.
///
/// Every column has size `n_rows()`. Element writes go to the column's
/// deferred-write log, so building a matrix incrementally (accumulating
/// Jacobian contributions, say) costs O(1) per write.
///
/// # Examples
///
/// ```
/// use sparsela::sparse::SparseMatrix;
///
/// let mut a = SparseMatrix::new(3, 2);
/// a.set(0, 0, 1.0_f64);
/// a.add(2, 1, 2.0);
/// a.add(2, 1, 0.5);
/// assert_eq!(a.get(2, 1), 2.5);
/// assert_eq!(a.non_zeroes(), 2);
/// assert!(a.is_structural_zero(1, 0));
/// ```
#[derive(Debug, Clone)]
pub struct SparseMatrix<T> {
    n_rows: usize,
    n_cols: usize,
    columns: Vec<SparseVector<T>>,
}

/// Row part of a matrix item access `m[row, j]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIndex {
    /// A single row.
    At(usize),
    /// A row slice `start..stop`; only the unbounded `(:)` form is accepted.
    Slice {
        start: Option<usize>,
        stop: Option<usize>,
    },
}

impl RowIndex {
    /// The full slice `(:)`.
    pub const ALL: RowIndex = RowIndex::Slice {
        start: None,
        stop: None,
    };
}

/// What an item access reads or writes: one element or a whole column.
#[derive(Debug, Clone)]
pub enum Item<T> {
    Scalar(T),
    Column(SparseVector<T>),
}

impl<T: Scalar> PartialEq for Item<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Item::Scalar(x), Item::Scalar(y)) => x == y,
            (Item::Column(u), Item::Column(v)) => u == v,
            _ => false,
        }
    }
}

// ── Construction ────────────────────────────────────────────────────

impl<T: Scalar> SparseMatrix<T> {
    /// All-zero `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            n_rows: rows,
            n_cols: cols,
            columns: (0..cols).map(|_| SparseVector::new(rows)).collect(),
        }
    }

    /// Build from one `(row, value)` association per column.
    ///
    /// Fails with [`SparseError::SizeMismatch`] unless exactly `cols`
    /// columns are supplied.
    pub fn from_columns<I, C>(rows: usize, cols: usize, columns: I) -> Result<Self, SparseError>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = (usize, T)>,
    {
        let mut built = Vec::with_capacity(cols);
        for column in columns {
            let mut v = SparseVector::new(rows);
            for (i, x) in column {
                v.set(i, x);
            }
            built.push(v);
        }
        check_size(cols, built.len())?;
        Ok(Self {
            n_rows: rows,
            n_cols: cols,
            columns: built,
        })
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Column `j`. Panics if `j >= n_cols()`.
    #[inline]
    pub fn col(&self, j: usize) -> &SparseVector<T> {
        &self.columns[j]
    }

    /// Mutable column `j`, borrowed for as long as the matrix is.
    /// Panics if `j >= n_cols()`.
    #[inline]
    pub fn col_mut(&mut self, j: usize) -> &mut SparseVector<T> {
        &mut self.columns[j]
    }

    #[inline]
    pub fn columns(&self) -> &[SparseVector<T>] {
        &self.columns
    }

    /// Replace column `j` wholesale.
    pub fn set_col(&mut self, j: usize, v: SparseVector<T>) -> Result<(), SparseError> {
        self.check_col(j)?;
        check_size(self.n_rows, v.size())?;
        self.columns[j] = v;
        Ok(())
    }

    fn check_col(&self, j: usize) -> Result<(), SparseError> {
        if j < self.n_cols {
            Ok(())
        } else {
            Err(SparseError::IndexOutOfBounds {
                index: j,
                bound: self.n_cols,
            })
        }
    }
}

// ── Element access ──────────────────────────────────────────────────

impl<T: Scalar> SparseMatrix<T> {
    /// Element `(i, j)`, zero if structurally absent.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.columns[j].get(i)
    }

    /// `m[i, j] = x`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, x: T) {
        self.columns[j].set(i, x);
    }

    /// `m[i, j] += x`.
    #[inline]
    pub fn add(&mut self, i: usize, j: usize, x: T) {
        self.columns[j].add(i, x);
    }

    /// `m[i, j] -= x`.
    #[inline]
    pub fn sub(&mut self, i: usize, j: usize, x: T) {
        self.columns[j].sub(i, x);
    }

    /// Read `m[row, j]`: an element for [`RowIndex::At`], a copy of the
    /// column for [`RowIndex::ALL`].
    ///
    /// ```
    /// use sparsela::sparse::{Item, RowIndex, SparseError, SparseMatrix};
    /// let mut m = SparseMatrix::new(2, 2);
    /// m.set(1, 0, 3.0_f64);
    /// assert_eq!(m.get_item(RowIndex::At(1), 0), Ok(Item::Scalar(3.0)));
    /// let bounded = RowIndex::Slice { start: Some(0), stop: None };
    /// assert_eq!(m.get_item(bounded, 0), Err(SparseError::UnsupportedIndexing));
    /// ```
    pub fn get_item(&self, row: RowIndex, j: usize) -> Result<Item<T>, SparseError> {
        match row {
            RowIndex::At(i) => {
                self.check_col(j)?;
                Ok(Item::Scalar(self.get(i, j)))
            }
            RowIndex::Slice {
                start: None,
                stop: None,
            } => {
                self.check_col(j)?;
                Ok(Item::Column(self.columns[j].clone()))
            }
            RowIndex::Slice { .. } => Err(SparseError::UnsupportedIndexing),
        }
    }

    /// Write `m[row, j]`: `(At(i), Scalar(x))` assigns one element,
    /// `(ALL, Column(v))` replaces column `j`. Any other pairing fails with
    /// [`SparseError::UnsupportedIndexing`].
    pub fn set_item(&mut self, row: RowIndex, j: usize, item: Item<T>) -> Result<(), SparseError> {
        match (row, item) {
            (RowIndex::At(i), Item::Scalar(x)) => {
                self.check_col(j)?;
                self.set(i, j, x);
                Ok(())
            }
            (
                RowIndex::Slice {
                    start: None,
                    stop: None,
                },
                Item::Column(v),
            ) => self.set_col(j, v),
            _ => Err(SparseError::UnsupportedIndexing),
        }
    }
}

// ── Structure ───────────────────────────────────────────────────────

impl<T: Scalar> SparseMatrix<T> {
    /// Compact every column.
    pub fn compact(&self) -> &Self {
        for c in &self.columns {
            c.compact();
        }
        self
    }

    pub fn is_structural_zero(&self, i: usize, j: usize) -> bool {
        self.columns[j].is_structural_zero(i)
    }

    /// Total number of stored elements.
    pub fn non_zeroes(&self) -> usize {
        self.columns.iter().map(|c| c.non_zeroes()).sum()
    }

    /// Square, with nothing stored below the diagonal.
    pub fn is_upper_triangular(&self) -> bool {
        self.n_rows == self.n_cols
            && self
                .columns
                .iter()
                .enumerate()
                .all(|(j, c)| c.entries().iter().all(|e| e.index() <= j))
    }

    /// Square, with nothing stored above the diagonal and every diagonal
    /// element stored and equal to one.
    pub fn is_unit_lower_triangular(&self) -> bool {
        self.n_rows == self.n_cols
            && self.columns.iter().enumerate().all(|(j, c)| {
                // sorted, so the diagonal must come first
                matches!(
                    c.entries().first(),
                    Some(d) if d.index() == j && d.value() == T::one()
                )
            })
    }

    /// `cols x rows` transpose: every stored `(i, j, x)` becomes `(j, i, x)`.
    pub fn transpose(&self) -> Self {
        let mut result = Self::new(self.n_cols, self.n_rows);
        for (j, c) in self.columns.iter().enumerate() {
            for (i, x) in c.iter() {
                result.columns[i].set(j, x);
            }
        }
        result
    }

    /// Copy every element of a dense block into `self`, with the block's
    /// `(0, 0)` landing at `(row_offset, col_offset)`.
    pub fn assign_block<M: MatrixRef<T>>(
        &mut self,
        block: &M,
        row_offset: usize,
        col_offset: usize,
    ) -> Result<(), SparseError> {
        self.check_block(block.nrows(), block.ncols(), row_offset, col_offset)?;
        for j in 0..block.ncols() {
            let c = &mut self.columns[col_offset + j];
            for i in 0..block.nrows() {
                c.set(row_offset + i, block.get(i, j));
            }
        }
        Ok(())
    }

    /// Copy the stored elements of a sparse block into `self` at the given
    /// offset. Structural zeros of the block leave `self` untouched.
    pub fn assign_sparse_block(
        &mut self,
        block: &SparseMatrix<T>,
        row_offset: usize,
        col_offset: usize,
    ) -> Result<(), SparseError> {
        self.check_block(block.n_rows, block.n_cols, row_offset, col_offset)?;
        for (j, src) in block.columns.iter().enumerate() {
            let c = &mut self.columns[col_offset + j];
            for (i, x) in src.iter() {
                c.set(row_offset + i, x);
            }
        }
        Ok(())
    }

    fn check_block(
        &self,
        rows: usize,
        cols: usize,
        row_offset: usize,
        col_offset: usize,
    ) -> Result<(), SparseError> {
        block_end(row_offset, rows, self.n_rows)?;
        block_end(col_offset, cols, self.n_cols)?;
        Ok(())
    }

    /// Move row `i` to row `p[i]`, in place.
    pub fn permute_rows(&mut self, p: &[usize]) -> Result<&mut Self, SparseError> {
        check_size(self.n_rows, p.len())?;
        for c in self.columns.iter_mut() {
            c.permute(p)?;
        }
        Ok(self)
    }

    /// New matrix made of copies of the given columns, in the given order.
    /// Repeats are allowed.
    pub fn select_columns(&self, indices: &[usize]) -> Result<Self, SparseError> {
        let mut columns = Vec::with_capacity(indices.len());
        for &j in indices {
            self.check_col(j)?;
            columns.push(self.columns[j].clone());
        }
        Ok(Self {
            n_rows: self.n_rows,
            n_cols: indices.len(),
            columns,
        })
    }

    /// The equivalent dense matrix.
    pub fn to_dense(&self) -> DenseMatrix<T> {
        let mut d = DenseMatrix::zeros(self.n_rows, self.n_cols);
        for (j, c) in self.columns.iter().enumerate() {
            for (i, x) in c.iter() {
                d[(i, j)] = x;
            }
        }
        d
    }
}

impl<T: Scalar> PartialEq for SparseMatrix<T> {
    /// Same shape and same stored elements, column by column.
    fn eq(&self, other: &Self) -> bool {
        self.n_rows == other.n_rows && self.n_cols == other.n_cols && self.columns == other.columns
    }
}

/// `offset + len`, failing when it passes `bound` or overflows.
fn block_end(offset: usize, len: usize, bound: usize) -> Result<usize, SparseError> {
    match offset.checked_add(len) {
        Some(end) if end <= bound => Ok(end),
        _ => Err(SparseError::IndexOutOfBounds {
            index: offset.saturating_add(len),
            bound,
        }),
    }
}
