//! Write log of a sparse vector and its compaction.
//!
//! Writes are never applied in place. `v.set(i, x)` appends an
//! [`EntryKind::Assign`] record and `v.add(i, x)` an
//! [`EntryKind::Accumulate`] record (`v.sub(i, x)` an
//! [`EntryKind::Subtract`] one); a log may therefore hold several
//! records per index, in any order, including indices past the vector size.
//! [`EntryLog::compact`] reduces it to one record per index, sorted by index.

use alloc::vec::Vec;

use crate::traits::Scalar;

/// How a logged value combines with what came before it at the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Replace the value and discard earlier history for the index.
    Assign,
    /// Add onto the current value.
    Accumulate,
    /// Subtract from the current value.
    Subtract,
}

/// One record of the write log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<T> {
    index: usize,
    kind: EntryKind,
    value: T,
}

impl<T: Copy> Entry<T> {
    #[inline]
    pub(crate) fn assign(index: usize, value: T) -> Self {
        Self {
            index,
            kind: EntryKind::Assign,
            value,
        }
    }

    #[inline]
    pub(crate) fn accumulate(index: usize, value: T) -> Self {
        Self {
            index,
            kind: EntryKind::Accumulate,
            value,
        }
    }

    #[inline]
    pub(crate) fn subtract(index: usize, value: T) -> Self {
        Self {
            index,
            kind: EntryKind::Subtract,
            value,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    #[inline]
    pub fn value(&self) -> T {
        self.value
    }
}

/// Append-only sequence of writes plus a flag recording whether it is
/// currently in canonical (compacted) form.
#[derive(Debug, Clone)]
pub(crate) struct EntryLog<T> {
    entries: Vec<Entry<T>>,
    compacted: bool,
}

impl<T: Scalar> EntryLog<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            compacted: true,
        }
    }

    /// Log holding `entries` verbatim, already known to be canonical.
    pub(crate) fn from_canonical(entries: Vec<Entry<T>>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].index < w[1].index));
        Self {
            entries,
            compacted: true,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, entry: Entry<T>) {
        self.entries.push(entry);
        self.compacted = false;
    }

    #[inline]
    pub(crate) fn is_compacted(&self) -> bool {
        self.compacted
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.compacted = true;
    }

    /// Apply `f` to every logged value.
    ///
    /// Only valid on a raw log for maps that distribute over addition
    /// (scaling), since accumulated values are summed later.
    pub(crate) fn map_values(&mut self, f: impl Fn(T) -> T) {
        for e in self.entries.iter_mut() {
            e.value = f(e.value);
        }
    }

    /// Send every logged index `i` to `p[i]`.
    ///
    /// Indices with no image in `p` are past the vector size and are left
    /// for compaction to prune.
    pub(crate) fn remap(&mut self, p: &[usize]) {
        for e in self.entries.iter_mut() {
            if let Some(&k) = p.get(e.index) {
                e.index = k;
            }
        }
        if !self.entries.is_empty() {
            self.compacted = false;
        }
    }

    /// Reduce the log to one entry per index `< size`, sorted by index.
    ///
    /// Within a run of equal indices, the last `Assign` wins and every
    /// `Accumulate` / `Subtract` logged after it is applied in order; with no
    /// `Assign` in the run, they are applied to zero. No-op when already
    /// compacted.
    pub(crate) fn compact(&mut self, size: usize) {
        if self.compacted {
            return;
        }
        // stable: equal indices keep their append order
        self.entries.sort_by_key(|e| e.index);

        let mut out = 0;
        let mut start = 0;
        let n = self.entries.len();
        while start < n {
            let index = self.entries[start].index;
            if index >= size {
                // sorted, so everything from here on is out of range
                break;
            }
            let mut end = start + 1;
            while end < n && self.entries[end].index == index {
                end += 1;
            }

            let run = &self.entries[start..end];
            let (mut value, rest) = match run.iter().rposition(|e| e.kind == EntryKind::Assign) {
                Some(base) => (run[base].value, &run[base + 1..]),
                None => (T::zero(), run),
            };
            for e in rest {
                value = match e.kind {
                    EntryKind::Subtract => value - e.value,
                    _ => value + e.value,
                };
            }

            self.entries[out] = Entry::assign(index, value);
            out += 1;
            start = end;
        }
        self.entries.truncate(out);
        self.compacted = true;
    }

    /// Binary search of a canonical log.
    pub(crate) fn find(&self, index: usize) -> Result<usize, usize> {
        debug_assert!(self.compacted);
        self.entries.binary_search_by_key(&index, |e| e.index)
    }
}
