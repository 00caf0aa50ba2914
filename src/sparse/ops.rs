//! Operator sugar over the fallible methods.
//!
//! Operators cannot return a `Result`, so a shape mismatch panics with the
//! error message; use the named method to get the error instead.

use alloc::vec::Vec;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_traits::Signed;

use crate::traits::Scalar;

use super::{SparseError, SparseMatrix, SparseVector};

#[inline]
fn or_panic<R>(r: Result<R, SparseError>) -> R {
    match r {
        Ok(x) => x,
        Err(e) => panic!("{}", e),
    }
}

// ── Vector ± vector ─────────────────────────────────────────────────

impl<T: Scalar> Add for &SparseVector<T> {
    type Output = SparseVector<T>;

    fn add(self, rhs: &SparseVector<T>) -> SparseVector<T> {
        or_panic(self.try_add(rhs))
    }
}

impl<T: Scalar> Sub for &SparseVector<T> {
    type Output = SparseVector<T>;

    fn sub(self, rhs: &SparseVector<T>) -> SparseVector<T> {
        or_panic(self.try_sub(rhs))
    }
}

impl<T: Scalar> AddAssign<&SparseVector<T>> for SparseVector<T> {
    fn add_assign(&mut self, rhs: &SparseVector<T>) {
        *self = &*self + rhs;
    }
}

impl<T: Scalar> SubAssign<&SparseVector<T>> for SparseVector<T> {
    fn sub_assign(&mut self, rhs: &SparseVector<T>) {
        *self = &*self - rhs;
    }
}

impl<T: Scalar + Signed> Neg for &SparseVector<T> {
    type Output = SparseVector<T>;

    fn neg(self) -> SparseVector<T> {
        self.negated()
    }
}

// ── Vector · scalar ─────────────────────────────────────────────────

impl<T: Scalar> Mul<T> for &SparseVector<T> {
    type Output = SparseVector<T>;

    fn mul(self, a: T) -> SparseVector<T> {
        self.scaled(a)
    }
}

impl<T: Scalar> Div<T> for &SparseVector<T> {
    type Output = SparseVector<T>;

    fn div(self, a: T) -> SparseVector<T> {
        let mut v = self.clone();
        v.div_in_place(a);
        v
    }
}

impl<T: Scalar> MulAssign<T> for SparseVector<T> {
    fn mul_assign(&mut self, a: T) {
        self.scale_in_place(a);
    }
}

impl<T: Scalar> DivAssign<T> for SparseVector<T> {
    fn div_assign(&mut self, a: T) {
        self.div_in_place(a);
    }
}

/// Scalar product.
impl<T: Scalar> Mul for &SparseVector<T> {
    type Output = T;

    fn mul(self, rhs: &SparseVector<T>) -> T {
        or_panic(self.dot(rhs))
    }
}

// ── Matrix products ─────────────────────────────────────────────────

impl<T: Scalar> Mul<&SparseVector<T>> for &SparseMatrix<T> {
    type Output = SparseVector<T>;

    fn mul(self, rhs: &SparseVector<T>) -> SparseVector<T> {
        or_panic(self.mul_vector(rhs))
    }
}

impl<T: Scalar> Mul<&[T]> for &SparseMatrix<T> {
    type Output = Vec<T>;

    fn mul(self, rhs: &[T]) -> Vec<T> {
        or_panic(self.mul_dense(rhs))
    }
}

impl<T: Scalar> Mul for &SparseMatrix<T> {
    type Output = SparseMatrix<T>;

    fn mul(self, rhs: &SparseMatrix<T>) -> SparseMatrix<T> {
        or_panic(self.mul_matrix(rhs))
    }
}
