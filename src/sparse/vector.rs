use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell};
use core::cmp::Ordering;

use crate::dense::PackedSymmetric;
use num_traits::Signed;

use crate::traits::Scalar;

use super::entry::{Entry, EntryLog};
use super::{check_size, SparseError};

/// Sparse vector of fixed size with deferred writes.
///
/// Writes ([`set`](Self::set), [`add`](Self::add), [`sub`](Self::sub)) only
/// append to a log and run in O(1). The log is compacted to one sorted entry
/// per index the first time the vector is read, so reads take `&self` and
/// may still rewrite the internal representation. That makes the type
/// `!Sync`: a vector must not be shared across threads without a lock, even
/// for reading.
///
/// An index never written is a *structural zero*; an index assigned the
/// value zero is stored and is not.
///
/// Writes at an index `>= size()` are accepted and silently dropped by the
/// next compaction.
///
/// # Examples
///
/// ```
/// use sparsela::sparse::SparseVector;
///
/// let mut v = SparseVector::new(3);
/// v.add(1, 1.0_f64); // v[1] == 1
/// v.add(1, 2.0);     // v[1] == 3
/// v.set(1, 4.0);     // v[1] == 4
/// v.sub(1, 1.0);     // v[1] == 3
/// assert_eq!(v.get(1), 3.0);
/// assert_eq!(v.get(0), 0.0);
/// assert!(v.is_structural_zero(0));
/// assert_eq!(v.non_zeroes(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SparseVector<T> {
    size: usize,
    log: RefCell<EntryLog<T>>,
}

// ── Construction ────────────────────────────────────────────────────

impl<T: Scalar> SparseVector<T> {
    /// Zero vector of size `n` with no stored entries.
    pub fn new(n: usize) -> Self {
        Self {
            size: n,
            log: RefCell::new(EntryLog::new()),
        }
    }

    /// Build from canonical `(index, value)` entries, sorted by strictly
    /// increasing index, all `< n`.
    pub(crate) fn from_canonical(n: usize, entries: Vec<Entry<T>>) -> Self {
        debug_assert!(entries.last().map_or(true, |e| e.index() < n));
        Self {
            size: n,
            log: RefCell::new(EntryLog::from_canonical(entries)),
        }
    }

    /// Dimension of the vector, counting zero and non-zero elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Compacted log, compacting it first if needed.
    fn canonical(&self) -> Ref<'_, EntryLog<T>> {
        // A live `Ref` implies the log was already compacted, so the mutable
        // borrow below can never overlap one.
        if !self.log.borrow().is_compacted() {
            self.log.borrow_mut().compact(self.size);
        }
        self.log.borrow()
    }
}

// ── Deferred writes ─────────────────────────────────────────────────

impl<T: Scalar> SparseVector<T> {
    /// `v[i] = x`: discards every earlier write at `i`.
    #[inline]
    pub fn set(&mut self, i: usize, x: T) {
        self.log.get_mut().push(Entry::assign(i, x));
    }

    /// `v[i] += x`.
    #[inline]
    pub fn add(&mut self, i: usize, x: T) {
        self.log.get_mut().push(Entry::accumulate(i, x));
    }

    /// `v[i] -= x`.
    #[inline]
    pub fn sub(&mut self, i: usize, x: T) {
        self.log.get_mut().push(Entry::subtract(i, x));
    }

    /// Assign `values[i]` at every `i` where `mask[i]` is set.
    ///
    /// ```
    /// use sparsela::sparse::SparseVector;
    /// let mut v = SparseVector::new(4);
    /// v.set_selected_mask(&[true, false, false, true], &[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(v.as_dense_vector(), vec![1.0, 0.0, 0.0, 4.0]);
    /// ```
    pub fn set_selected_mask(&mut self, mask: &[bool], values: &[T]) -> Result<(), SparseError> {
        check_size(mask.len(), values.len())?;
        let log = self.log.get_mut();
        for (i, (&selected, &x)) in mask.iter().zip(values).enumerate() {
            if selected {
                log.push(Entry::assign(i, x));
            }
        }
        Ok(())
    }

    /// Assign `values[k]` at index `indices[k]`, for every `k`.
    pub fn set_selected(&mut self, indices: &[usize], values: &[T]) -> Result<(), SparseError> {
        check_size(indices.len(), values.len())?;
        let log = self.log.get_mut();
        for (&i, &x) in indices.iter().zip(values) {
            log.push(Entry::assign(i, x));
        }
        Ok(())
    }

    /// Drop every stored entry.
    pub fn zero(&mut self) {
        self.log.get_mut().clear();
    }
}

// ── Reads ───────────────────────────────────────────────────────────

impl<T: Scalar> SparseVector<T> {
    /// Value at `i`, zero if structurally absent.
    ///
    /// O(log n) in the number of stored entries once compacted.
    pub fn get(&self, i: usize) -> T {
        let log = self.canonical();
        match log.find(i) {
            Ok(k) => log.entries()[k].value(),
            Err(_) => T::zero(),
        }
    }

    /// Sort, merge and prune the log now rather than at the next read.
    pub fn compact(&self) -> &Self {
        drop(self.canonical());
        self
    }

    /// Whether the log is currently in canonical form.
    #[inline]
    pub fn is_compact(&self) -> bool {
        self.log.borrow().is_compacted()
    }

    /// Whether nothing at all is stored, compacted or not.
    pub fn is_structurally_zero(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Whether no entry is stored at index `i`.
    pub fn is_structural_zero(&self, i: usize) -> bool {
        self.canonical().find(i).is_err()
    }

    /// Number of stored (structurally non-zero) elements.
    pub fn non_zeroes(&self) -> usize {
        self.canonical().len()
    }

    /// Canonical entries, sorted by index.
    pub fn entries(&self) -> Ref<'_, [Entry<T>]> {
        Ref::map(self.canonical(), |log| log.entries())
    }

    /// Iterator over the canonical `(index, value)` pairs.
    ///
    /// ```
    /// use sparsela::sparse::SparseVector;
    /// let mut v = SparseVector::new(5);
    /// v.set(3, 1.0_f64);
    /// v.set(0, 2.0);
    /// let pairs: Vec<_> = v.iter().collect();
    /// assert_eq!(pairs, vec![(0, 2.0), (3, 1.0)]);
    /// ```
    pub fn iter(&self) -> NonZeros<'_, T> {
        NonZeros {
            log: self.canonical(),
            pos: 0,
        }
    }

    /// Write each stored element into `w` at its index. Other positions of
    /// `w` are left untouched.
    pub fn assign_to(&self, w: &mut [T]) -> Result<(), SparseError> {
        check_size(self.size, w.len())?;
        for e in self.canonical().entries() {
            w[e.index()] = e.value();
        }
        Ok(())
    }

    /// The equivalent dense vector.
    pub fn as_dense_vector(&self) -> Vec<T> {
        let mut w = vec![T::zero(); self.size];
        for e in self.canonical().entries() {
            w[e.index()] = e.value();
        }
        w
    }
}

/// Iterator over the canonical entries of a [`SparseVector`].
pub struct NonZeros<'a, T> {
    log: Ref<'a, EntryLog<T>>,
    pos: usize,
}

impl<T: Scalar> Iterator for NonZeros<'_, T> {
    type Item = (usize, T);

    fn next(&mut self) -> Option<(usize, T)> {
        let e = *self.log.entries().get(self.pos)?;
        self.pos += 1;
        Some((e.index(), e.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.log.len() - self.pos;
        (n, Some(n))
    }
}

impl<T: Scalar> ExactSizeIterator for NonZeros<'_, T> {}

// ── Permutation ─────────────────────────────────────────────────────

impl<T: Scalar> SparseVector<T> {
    /// Move the element at index `i` to index `p[i]`, in place.
    ///
    /// Fails with [`SparseError::SizeMismatch`] unless `p.len() == size()`.
    ///
    /// ```
    /// use sparsela::sparse::SparseVector;
    /// let mut v = SparseVector::new(3);
    /// v.set(0, 1.0_f64);
    /// v.set(2, 3.0);
    /// v.permute(&[2, 0, 1]).unwrap();
    /// assert_eq!(v.as_dense_vector(), vec![0.0, 3.0, 1.0]);
    /// ```
    pub fn permute(&mut self, p: &[usize]) -> Result<&mut Self, SparseError> {
        check_size(self.size, p.len())?;
        self.log.get_mut().remap(p);
        Ok(self)
    }

    /// Permuted copy, leaving `self` untouched.
    pub fn permuted(&self, p: &[usize]) -> Result<Self, SparseError> {
        let mut w = self.clone();
        w.permute(p)?;
        Ok(w)
    }

    /// Dense vector `w` with `w[p[i]] = self[i]`.
    ///
    /// Every target `p[i]` must lie below the size.
    pub fn permuted_dense(&self, p: &[usize]) -> Result<Vec<T>, SparseError> {
        check_size(self.size, p.len())?;
        if let Some(&k) = p.iter().find(|&&k| k >= self.size) {
            return Err(SparseError::IndexOutOfBounds {
                index: k,
                bound: self.size,
            });
        }
        let mut w = vec![T::zero(); self.size];
        for e in self.canonical().entries() {
            w[p[e.index()]] = e.value();
        }
        Ok(w)
    }
}

// ── Reductions ──────────────────────────────────────────────────────

impl<T: Scalar> SparseVector<T> {
    /// Walk the canonical entries of `self` and `v` in step, calling
    /// `f(i, u[i], v[i])` for every index stored in both.
    ///
    /// Callers check that the sizes agree.
    pub(super) fn merge_join(&self, v: &Self, mut f: impl FnMut(usize, T, T)) {
        debug_assert_eq!(self.size, v.size);
        let u = self.canonical();
        let v = v.canonical();
        let (a, b) = (u.entries(), v.entries());
        let (mut p, mut q) = (0, 0);
        while p < a.len() && q < b.len() {
            let (i, j) = (a[p].index(), b[q].index());
            match i.cmp(&j) {
                Ordering::Less => p += 1,
                Ordering::Greater => q += 1,
                Ordering::Equal => {
                    f(i, a[p].value(), b[q].value());
                    p += 1;
                    q += 1;
                }
            }
        }
    }

    /// `uᵀ·A·v` with sizes already checked.
    pub(super) fn bilinear(&self, a: &PackedSymmetric<T>, v: &Self) -> T {
        let u = self.canonical();
        let v = v.canonical();
        let mut sum = T::zero();
        for p in u.entries() {
            for q in v.entries() {
                sum = sum + p.value() * a.get(p.index(), q.index()) * q.value();
            }
        }
        sum
    }

    /// Canonical scalar product `Σ u[i]·v[i]`.
    ///
    /// Runs in time proportional to the stored entries of both operands.
    ///
    /// ```
    /// use sparsela::sparse::SparseVector;
    /// let mut u = SparseVector::new(4);
    /// u.set(0, 1.0_f64);
    /// u.set(2, 3.0);
    /// let mut v = SparseVector::new(4);
    /// v.set(1, 5.0);
    /// v.set(2, 7.0);
    /// assert_eq!(u.dot(&v).unwrap(), 21.0);
    /// ```
    pub fn dot(&self, v: &Self) -> Result<T, SparseError> {
        check_size(self.size, v.size)?;
        let mut sum = T::zero();
        self.merge_join(v, |_, x, y| sum = sum + x * y);
        Ok(sum)
    }

    /// `uᵀ·diag(w)·v = Σ w[i]·u[i]·v[i]`.
    pub fn weighted_dot(&self, w: &[T], v: &Self) -> Result<T, SparseError> {
        check_size(self.size, v.size)?;
        check_size(self.size, w.len())?;
        let mut sum = T::zero();
        self.merge_join(v, |i, x, y| sum = sum + w[i] * x * y);
        Ok(sum)
    }

    /// Scalar product with a dense vector.
    pub fn dot_dense(&self, u: &[T]) -> Result<T, SparseError> {
        check_size(self.size, u.len())?;
        let mut sum = T::zero();
        for e in self.canonical().entries() {
            sum = sum + u[e.index()] * e.value();
        }
        Ok(sum)
    }

    /// `uᵀ·A·v` for a symmetric `A` in packed upper-triangular storage.
    pub fn quadratic_form(&self, a: &PackedSymmetric<T>, v: &Self) -> Result<T, SparseError> {
        check_size(self.size, v.size)?;
        check_size(self.size, a.n())?;
        Ok(self.bilinear(a, v))
    }

    /// `vᵀ·A·v`, visiting each off-diagonal pair once.
    pub fn quadratic_form_self(&self, a: &PackedSymmetric<T>) -> Result<T, SparseError> {
        check_size(self.size, a.n())?;
        let log = self.canonical();
        let entries = log.entries();
        let two = T::one() + T::one();
        let mut sum = T::zero();
        for (k, p) in entries.iter().enumerate() {
            let (i, v_i) = (p.index(), p.value());
            sum = sum + a.get(i, i) * v_i * v_i;
            for q in &entries[k + 1..] {
                sum = sum + two * a.get(i, q.index()) * v_i * q.value();
            }
        }
        Ok(sum)
    }
}

// ── Vector space ────────────────────────────────────────────────────

impl<T: Scalar> SparseVector<T> {
    /// `w[i] = op(u[i], v[i])` over the union of stored indices, with
    /// structural zeros read as zero. The result is built compacted.
    fn additive_op(&self, v: &Self, op: impl Fn(T, T) -> T) -> Result<Self, SparseError> {
        check_size(self.size, v.size)?;
        let u = self.canonical();
        let v = v.canonical();
        let (a, b) = (u.entries(), v.entries());
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut p, mut q) = (0, 0);
        loop {
            let next = match (a.get(p), b.get(q)) {
                (None, None) => break,
                (Some(x), None) => {
                    p += 1;
                    Entry::assign(x.index(), op(x.value(), T::zero()))
                }
                (None, Some(y)) => {
                    q += 1;
                    Entry::assign(y.index(), op(T::zero(), y.value()))
                }
                (Some(x), Some(y)) => match x.index().cmp(&y.index()) {
                    Ordering::Less => {
                        p += 1;
                        Entry::assign(x.index(), op(x.value(), T::zero()))
                    }
                    Ordering::Greater => {
                        q += 1;
                        Entry::assign(y.index(), op(T::zero(), y.value()))
                    }
                    Ordering::Equal => {
                        p += 1;
                        q += 1;
                        Entry::assign(x.index(), op(x.value(), y.value()))
                    }
                },
            };
            out.push(next);
        }
        Ok(Self::from_canonical(self.size, out))
    }

    /// `u + v`, failing on a size mismatch.
    pub fn try_add(&self, v: &Self) -> Result<Self, SparseError> {
        self.additive_op(v, |x, y| x + y)
    }

    /// `u - v`, failing on a size mismatch.
    ///
    /// With an unsigned `T` every stored difference must be non-negative.
    pub fn try_sub(&self, v: &Self) -> Result<Self, SparseError> {
        self.additive_op(v, |x, y| x - y)
    }

    /// Multiply every stored element by `a`, in place. Works on the raw log.
    pub fn scale_in_place(&mut self, a: T) -> &mut Self {
        self.log.get_mut().map_values(|x| x * a);
        self
    }

    /// Divide every stored element by `a`, in place. Works on the raw log.
    pub fn div_in_place(&mut self, a: T) -> &mut Self {
        self.log.get_mut().map_values(|x| x / a);
        self
    }

    /// `a·u`.
    pub fn scaled(&self, a: T) -> Self {
        let mut v = self.clone();
        v.scale_in_place(a);
        v
    }
}

impl<T: Scalar + Signed> SparseVector<T> {
    /// `-u`, same sparsity pattern.
    pub fn negated(&self) -> Self {
        let out = self
            .canonical()
            .entries()
            .iter()
            .map(|e| Entry::assign(e.index(), -e.value()))
            .collect();
        Self::from_canonical(self.size, out)
    }
}

// ── Equality ────────────────────────────────────────────────────────

impl<T: Scalar> PartialEq for SparseVector<T> {
    /// Same size and same stored `(index, value)` pairs once compacted.
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && *self.entries() == *other.entries()
    }
}

// ── Free-function forms ─────────────────────────────────────────────

/// `uᵀ·diag(w)·v`.
pub fn weighted_dot<T: Scalar>(
    u: &SparseVector<T>,
    w: &[T],
    v: &SparseVector<T>,
) -> Result<T, SparseError> {
    u.weighted_dot(w, v)
}

/// `uᵀ·A·v` for symmetric `A`.
pub fn quadratic_form<T: Scalar>(
    u: &SparseVector<T>,
    a: &PackedSymmetric<T>,
    v: &SparseVector<T>,
) -> Result<T, SparseError> {
    u.quadratic_form(a, v)
}

/// `vᵀ·A·v` for symmetric `A`.
pub fn quadratic_form_self<T: Scalar>(
    a: &PackedSymmetric<T>,
    v: &SparseVector<T>,
) -> Result<T, SparseError> {
    v.quadratic_form_self(a)
}
