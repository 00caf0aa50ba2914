//! Sparse vectors and column-compressed sparse matrices.
//!
//! # Deferred writes
//!
//! A [`SparseVector`] records writes in a log instead of applying them:
//!
//! ```
//! use sparsela::sparse::SparseVector;
//!
//! let mut v = SparseVector::new(4);
//! v.set(2, 2.0_f64);
//! v.add(2, 3.0);
//! v.sub(2, 1.0);
//! v.add(0, 1.0);
//! assert_eq!(v.get(2), 4.0);
//! ```
//!
//! The log is compacted (sorted by index, one entry per index, out-of-range
//! indices pruned) the first time the vector is read. Compaction never changes
//! what the vector holds, only how it is stored.
//!
//! # Matrices
//!
//! A [`SparseMatrix`] is a sequence of [`SparseVector`] columns. Products and
//! Gram matrices work column by column on the stored entries only:
//!
//! ```
//! use sparsela::sparse::{upper_diagonal_of, SparseMatrix};
//!
//! // | 1 0 |
//! // | 2 3 |
//! // | 0 4 |
//! let a = SparseMatrix::from_columns(3, 2, vec![
//!     vec![(0, 1.0_f64), (1, 2.0)],
//!     vec![(1, 3.0), (2, 4.0)],
//! ]).unwrap();
//!
//! let ata = a.this_transpose_times_diagonal_times_this(&[1.0, 1.0, 1.0]).unwrap();
//! let packed = upper_diagonal_of(&ata).unwrap();
//! assert_eq!(packed.as_slice(), &[5.0, 6.0, 25.0]);
//!
//! let y = a.mul_dense(&[1.0, 1.0]).unwrap();
//! assert_eq!(y, vec![1.0, 5.0, 4.0]);
//! ```
//!
//! # Threads
//!
//! Reads compact through interior mutability, so neither type is `Sync`.

mod display;
mod entry;
mod matrix;
mod ops;
mod products;
mod triangular;
mod vector;

#[cfg(test)]
mod tests;

pub use display::Compressed;
pub use entry::{Entry, EntryKind};
pub use matrix::{Item, RowIndex, SparseMatrix};
pub use products::upper_diagonal_of;
pub use vector::{quadratic_form, quadratic_form_self, weighted_dot, NonZeros, SparseVector};

/// Errors from sparse vector and matrix operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SparseError {
    /// Operand shapes disagree.
    SizeMismatch {
        /// Size required by the receiver.
        expected: usize,
        /// Size supplied.
        got: usize,
    },
    /// Matrix item access other than `(i, j)` or the full column slice `(:, j)`.
    UnsupportedIndexing,
    /// A column index or block extent past the matrix bounds.
    IndexOutOfBounds {
        index: usize,
        bound: usize,
    },
    /// Triangular solve on a matrix that is not triangular of the right kind.
    NotTriangular,
    /// Triangular solve with no stored diagonal element in `column`.
    StructurallySingular {
        column: usize,
    },
}

impl core::fmt::Display for SparseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SparseError::SizeMismatch { expected, got } => {
                write!(f, "size mismatch: expected {}, got {}", expected, got)
            }
            SparseError::UnsupportedIndexing => {
                write!(f, "only self[i, j] and self[:, j] are supported")
            }
            SparseError::IndexOutOfBounds { index, bound } => {
                write!(f, "index {} out of bounds (limit {})", index, bound)
            }
            SparseError::NotTriangular => write!(f, "matrix is not triangular"),
            SparseError::StructurallySingular { column } => {
                write!(f, "no diagonal element in column {}", column)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SparseError {}

#[inline]
pub(crate) fn check_size(expected: usize, got: usize) -> Result<(), SparseError> {
    if expected == got {
        Ok(())
    } else {
        Err(SparseError::SizeMismatch { expected, got })
    }
}
