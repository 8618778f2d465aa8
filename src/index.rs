//! Ordered tree index over column values (spec.md §4.C), backed by a
//! `BTreeSet` keyed by `(value, row_id)` as spec.md §4.C recommends.
//! Grounded on `original_source/lib/grnxx/index.cpp`'s tree-index
//! contract (exact/range lookup, forward/reverse iteration, N/A never
//! indexed).

use std::collections::BTreeSet;

use bitflags::bitflags;

use crate::record::{Record, RecordSet};
use crate::value::{Float, Int};

bitflags! {
    /// Which ends of an [`IndexRange`] are inclusive. A bound with no
    /// value at all (unbounded) ignores its corresponding flag.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct BoundKind: u8 {
        const LOWER_INCLUSIVE = 0b01;
        const UPPER_INCLUSIVE = 0b10;
    }
}

impl Default for BoundKind {
    fn default() -> Self {
        BoundKind::LOWER_INCLUSIVE | BoundKind::UPPER_INCLUSIVE
    }
}

/// A key type usable in a [`TreeIndex`]: totally ordered, and cheap
/// enough to clone into the index's backing set.
pub trait IndexKey: Ord + Clone {}
impl IndexKey for i64 {}
impl IndexKey for Vec<u8> {}
impl IndexKey for FloatKey {}

/// `Float` doesn't implement `Ord` (NaN), but N/A floats are never
/// indexed (spec.md §4.C), so every key actually stored is non-NaN and
/// has a well-defined total order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatKey(pub f64);

impl FloatKey {
    pub fn from_float(v: Float) -> Option<Self> {
        if v.is_na() {
            None
        } else {
            Some(FloatKey(v.raw()))
        }
    }
}

impl Eq for FloatKey {}
impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A half-open or closed range over `K`. A missing bound is unbounded.
#[derive(Clone, Debug)]
pub struct IndexRange<K> {
    pub lower: Option<K>,
    pub upper: Option<K>,
    pub bounds: BoundKind,
}

impl<K> IndexRange<K> {
    pub fn unbounded() -> Self {
        IndexRange {
            lower: None,
            upper: None,
            bounds: BoundKind::default(),
        }
    }

    pub fn new(lower: Option<K>, upper: Option<K>, bounds: BoundKind) -> Self {
        IndexRange { lower, upper, bounds }
    }
}

/// Cursor output order (spec.md §4.C): forward is ascending value then
/// ascending row id within ties; reverse is the mirror image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Reverse,
}

/// An ordered `(value, row_id)` multiset, one entry per `insert`.
#[derive(Clone, Debug, Default)]
pub struct TreeIndex<K: IndexKey> {
    entries: BTreeSet<(K, i64)>,
}

impl<K: IndexKey> TreeIndex<K> {
    pub fn new() -> Self {
        TreeIndex {
            entries: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// No-op on N/A (`key.is_none()`), per spec.md §4.C.
    pub fn insert(&mut self, row_id: Int, key: Option<K>) {
        if let Some(k) = key {
            self.entries.insert((k, row_id.raw()));
        }
    }

    pub fn remove(&mut self, row_id: Int, key: Option<K>) {
        if let Some(k) = key {
            self.entries.remove(&(k, row_id.raw()));
        }
    }

    /// Exact match, ascending row-id order.
    pub fn find(&self, key: &K) -> Vec<Int> {
        self.entries
            .range((key.clone(), i64::MIN)..=(key.clone(), i64::MAX))
            .map(|(_, id)| Int::new(*id))
            .collect()
    }

    /// Range scan honoring `range.bounds`, `direction`, `offset` and
    /// `limit`. Scores in the returned records are all zero: an index
    /// carries no score, only the `RecordSet` shape callers expect.
    pub fn find_in_range(
        &self,
        range: &IndexRange<K>,
        direction: ScanDirection,
        offset: usize,
        limit: Option<usize>,
    ) -> RecordSet {
        use std::ops::Bound;

        let lower = match &range.lower {
            None => Bound::Unbounded,
            Some(k) => {
                if range.bounds.contains(BoundKind::LOWER_INCLUSIVE) {
                    Bound::Included((k.clone(), i64::MIN))
                } else {
                    Bound::Excluded((k.clone(), i64::MAX))
                }
            }
        };
        let upper = match &range.upper {
            None => Bound::Unbounded,
            Some(k) => {
                if range.bounds.contains(BoundKind::UPPER_INCLUSIVE) {
                    Bound::Included((k.clone(), i64::MAX))
                } else {
                    Bound::Excluded((k.clone(), i64::MIN))
                }
            }
        };

        let iter = self.entries.range((lower, upper)).map(|(_, id)| *id);
        let ids: Vec<i64> = match direction {
            ScanDirection::Forward => iter.collect(),
            ScanDirection::Reverse => {
                let mut v: Vec<i64> = iter.collect();
                v.reverse();
                v
            }
        };

        let page = ids.into_iter().skip(offset);
        let page: Vec<Record> = match limit {
            Some(n) => page.take(n).map(|id| Record::new(Int::new(id), Float::new(0.0))).collect(),
            None => page.map(|id| Record::new(Int::new(id), Float::new(0.0))).collect(),
        };
        RecordSet::from(page)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exact_lookup_na_not_indexed() {
        let mut idx: TreeIndex<i64> = TreeIndex::new();
        idx.insert(Int::new(1), Some(10));
        idx.insert(Int::new(2), Some(10));
        idx.insert(Int::new(3), None);
        assert_eq!(idx.len(), 2);
        let found = idx.find(&10);
        assert_eq!(found, vec![Int::new(1), Int::new(2)]);
    }

    #[test]
    fn range_scan_forward_and_reverse_with_offset_limit() {
        let mut idx: TreeIndex<i64> = TreeIndex::new();
        for (row, value) in [(1, 10), (2, 20), (3, 30), (4, 40)] {
            idx.insert(Int::new(row), Some(value));
        }
        let range = IndexRange::new(Some(15), Some(35), BoundKind::default());
        let fwd = idx.find_in_range(&range, ScanDirection::Forward, 0, None);
        assert_eq!(fwd.as_slice().iter().map(|r| r.row_id.raw()).collect::<Vec<_>>(), vec![2, 3]);

        let rev = idx.find_in_range(&IndexRange::unbounded(), ScanDirection::Reverse, 1, Some(2));
        assert_eq!(rev.as_slice().iter().map(|r| r.row_id.raw()).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn exclusive_bounds() {
        let mut idx: TreeIndex<i64> = TreeIndex::new();
        for row in 1..=5 {
            idx.insert(Int::new(row), Some(row * 10));
        }
        let range = IndexRange::new(Some(10), Some(50), BoundKind::empty());
        let got = idx.find_in_range(&range, ScanDirection::Forward, 0, None);
        assert_eq!(
            got.as_slice().iter().map(|r| r.row_id.raw()).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn remove_then_absent() {
        let mut idx: TreeIndex<i64> = TreeIndex::new();
        idx.insert(Int::new(1), Some(5));
        idx.remove(Int::new(1), Some(5));
        assert!(idx.is_empty());
    }
}
