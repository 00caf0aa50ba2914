use core::fmt::Debug;
use num_traits::{Float, Num, One, Zero};

/// Trait for types that can be stored in sparse and dense containers.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, and all integer types.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for floating-point elements.
///
/// Required by the factorisations behind the normal equations
/// (square roots, positivity tests).
pub trait FloatScalar: Scalar + Float {}

impl<T: Scalar + Float> FloatScalar for T {}

/// Read-only access to a dense matrix-like type.
///
/// Lets sparse operations take dense blocks from either
/// [`DenseMatrix`](crate::dense::DenseMatrix) or
/// [`PackedSymmetric`](crate::dense::PackedSymmetric).
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> T;
}

/// Mutable access to a dense matrix-like type.
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;
}
