//! # sparsela
//!
//! Sparse vectors and column-compressed sparse matrices with deferred writes,
//! and the least-squares normal equations built on them. No-std compatible
//! (requires `alloc`).
//!
//! ## Quick start
//!
//! ```
//! use sparsela::sparse::{SparseMatrix, SparseVector};
//!
//! // Writes are logged, and only sorted and merged on the first read
//! let mut v = SparseVector::new(5);
//! v.add(3, 1.0_f64);
//! v.set(0, 2.0);
//! v.add(3, 0.5);
//! assert_eq!(v.get(3), 1.5);
//! assert_eq!(v.non_zeroes(), 2);
//!
//! // Matrices are sequences of sparse columns
//! let mut a = SparseMatrix::new(5, 2);
//! a.set(0, 0, 1.0);
//! a.set(3, 1, 2.0);
//! let av = a.transpose_times(&v.as_dense_vector()).unwrap();
//! assert_eq!(av, vec![2.0, 3.0]);
//! ```
//!
//! ## Modules
//!
//! - [`sparse`]: [`SparseVector`] (deferred-write log, lazy compaction,
//!   merge-join reductions, permutations) and [`SparseMatrix`] (element and
//!   column access, transpose, blocks, products, Gram matrices `AᵀWA`,
//!   triangular solves). [`upper_diagonal_of`] packs a symmetric sparse
//!   matrix for the dense factorisation.
//!
//! - [`dense`]: the dense side of the boundary. [`DenseMatrix`] (runtime
//!   sized, column-major) and [`PackedSymmetric`] (upper triangle, packed row
//!   by row). Dense vectors are plain slices.
//!
//! - [`linalg`]: packed `UᵀU` Cholesky factorisation and solve.
//!
//! - [`normal_eqns`]: normal-equation accumulators for linear
//!   ([`LinearLs`]), Gauss-Newton ([`NonLinearLs`]) and scale-separable
//!   ([`SeparableScaleLs`]) least squares.
//!
//! - [`traits`]: element traits [`Scalar`] / [`FloatScalar`] and the
//!   [`MatrixRef`] / [`MatrixMut`] access traits for dense sources.
//!
//! ## Threads
//!
//! Reads of a sparse vector may compact its log through interior mutability,
//! so [`SparseVector`] and [`SparseMatrix`] are `Send` but not `Sync`.
//!
//! ## Cargo features
//!
//! | Feature | Default  | Description |
//! |---------|----------|-------------|
//! | `std`   | yes      | Hardware FPU via system libm, `std::error::Error` impls |
//! | `libm`  | baseline | Pure-Rust software float fallback |

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod dense;
pub mod linalg;
pub mod normal_eqns;
pub mod sparse;
pub mod traits;

pub use dense::{DenseMatrix, PackedSymmetric};
pub use linalg::{LinalgError, PackedCholesky};
pub use normal_eqns::{LinearLs, LsqError, NonLinearLs, SeparableScaleLs};
pub use sparse::{upper_diagonal_of, SparseError, SparseMatrix, SparseVector};
pub use traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};
