//! Vector types (spec.md §3). `Vector<Bool>` is bit-packed into a
//! single word; all other element types are backed by a borrowed
//! contiguous slice, grounded on
//! `original_source/include/grnxx/data_types/vector/*.hpp`.

use std::borrow::Cow;
use std::fmt;

use super::data_type::DataType;
use super::scalar::{Bool, Int};

/// An immutable, indexable sequence of `T`. N/A is `None`;
/// `Vector::length()` reuses `Int`'s N/A convention (spec.md §3).
///
/// Backed by `Cow` rather than a bare `&'a [T]`: most vectors (Int,
/// Float, GeoPoint, Bool-bit-packed) are read straight out of
/// column-owned contiguous storage and so borrow it directly, but a
/// `Vector<Text>` read from a column has to assemble its `Text`
/// headers on the fly from a row-local byte arena (spec.md §4.B), so
/// it is built as an owned `Vec` for the duration of the borrow that
/// produced it. Both cases are the same type to the expression engine.
#[derive(Clone)]
pub struct Vector<'a, T: Clone>(Option<Cow<'a, [T]>>);

impl<'a, T: Clone> Vector<'a, T> {
    pub const fn new(data: &'a [T]) -> Self {
        Vector(Some(Cow::Borrowed(data)))
    }

    pub fn from_owned(data: Vec<T>) -> Self {
        Vector(Some(Cow::Owned(data)))
    }

    pub const fn na() -> Self {
        Vector(None)
    }

    pub const fn is_na(&self) -> bool {
        self.0.is_none()
    }

    pub fn length(&self) -> Int {
        match &self.0 {
            Some(d) => Int::new(d.len() as i64),
            None => Int::na(),
        }
    }

    pub fn as_slice(&self) -> Option<&[T]> {
        self.0.as_deref()
    }

    pub fn get(&self, index: Int) -> Option<T> {
        let data = self.0.as_deref()?;
        if index.is_na() {
            return None;
        }
        let i = index.raw();
        if i < 0 || i as usize >= data.len() {
            return None;
        }
        Some(data[i as usize].clone())
    }
}

impl<'a, T: Clone + PartialEq> Vector<'a, T> {
    pub fn match_(&self, rhs: &Vector<'_, T>) -> bool {
        match (self.as_slice(), rhs.as_slice()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }

    pub fn unmatch(&self, rhs: &Vector<'_, T>) -> bool {
        !self.match_(rhs)
    }
}

impl<'a, T: Clone + fmt::Debug> fmt::Debug for Vector<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => write!(f, "Vector(N/A)"),
            Some(d) => write!(f, "Vector({:?})", d),
        }
    }
}

impl<'a, T: Clone> Default for Vector<'a, T> {
    fn default() -> Self {
        Vector(Some(Cow::Borrowed(&[])))
    }
}

/// `Vector<Bool>`: up to 58 values plus a 6-bit length packed into a
/// single `u64` word (spec.md §3).
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct BoolVector(u64);

impl BoolVector {
    pub const MAX_LEN: usize = 58;
    const LEN_BITS: u32 = 6;
    const LEN_MASK: u64 = (1 << Self::LEN_BITS) - 1;
    const NA_LEN: u64 = 63;

    pub const fn na() -> Self {
        BoolVector(Self::NA_LEN)
    }

    pub const fn empty() -> Self {
        BoolVector(0)
    }

    /// Build from an iterator of at most [`Self::MAX_LEN`] bools.
    /// Returns `na()` if more than `MAX_LEN` values are supplied.
    pub fn from_bools(values: impl IntoIterator<Item = bool>) -> Self {
        let mut word: u64 = 0;
        let mut len: u64 = 0;
        for v in values {
            if len as usize >= Self::MAX_LEN {
                return Self::na();
            }
            if v {
                word |= 1 << (Self::LEN_BITS as u64 + len);
            }
            len += 1;
        }
        BoolVector(word | len)
    }

    pub const fn is_na(self) -> bool {
        (self.0 & Self::LEN_MASK) == Self::NA_LEN
    }

    pub fn length(self) -> Int {
        if self.is_na() {
            Int::na()
        } else {
            Int::new((self.0 & Self::LEN_MASK) as i64)
        }
    }

    pub fn get(self, index: Int) -> Bool {
        if self.is_na() || index.is_na() {
            return Bool::na();
        }
        let len = self.0 & Self::LEN_MASK;
        let i = index.raw();
        if i < 0 || i as u64 >= len {
            return Bool::na();
        }
        let bit = (self.0 >> (Self::LEN_BITS as u64 + i as u64)) & 1;
        Bool::new(bit == 1)
    }

    pub fn match_(self, rhs: BoolVector) -> bool {
        self.0 == rhs.0
    }

    pub fn unmatch(self, rhs: BoolVector) -> bool {
        self.0 != rhs.0
    }

    pub const fn type_() -> DataType {
        DataType::BoolVector
    }
}

impl fmt::Debug for BoolVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_na() {
            return write!(f, "BoolVector(N/A)");
        }
        let len = (self.0 & Self::LEN_MASK) as usize;
        let bits: Vec<bool> = (0..len)
            .map(|i| (self.0 >> (Self::LEN_BITS as usize + i)) & 1 == 1)
            .collect();
        write!(f, "BoolVector({:?})", bits)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn int_vector_index_out_of_bounds_is_na() {
        let v = Vector::new(&[Int::new(1), Int::new(2), Int::new(3)][..]);
        assert_eq!(v.get(Int::new(1)).unwrap().raw(), 2);
        assert!(v.get(Int::new(10)).is_none());
        assert!(v.get(Int::na()).is_none());
    }

    #[test]
    fn na_vector_index_is_na() {
        let v: Vector<Int> = Vector::na();
        assert!(v.get(Int::new(0)).is_none());
        assert!(v.length().is_na());
    }

    #[test]
    fn bool_vector_packing_roundtrip() {
        let values = vec![true, false, true, true, false];
        let v = BoolVector::from_bools(values.clone());
        assert_eq!(v.length().raw(), 5);
        for (i, expected) in values.iter().enumerate() {
            assert_eq!(v.get(Int::new(i as i64)).is_true(), *expected);
        }
        assert!(v.get(Int::new(5)).is_na());
    }

    #[test]
    fn bool_vector_na() {
        let v = BoolVector::na();
        assert!(v.is_na());
        assert!(v.length().is_na());
        assert!(v.get(Int::new(0)).is_na());
    }

    #[test]
    fn bool_vector_max_len_boundary() {
        let values = vec![true; BoolVector::MAX_LEN];
        let v = BoolVector::from_bools(values);
        assert!(!v.is_na());
        assert_eq!(v.length().raw(), BoolVector::MAX_LEN as i64);

        let too_many = vec![true; BoolVector::MAX_LEN + 1];
        assert!(BoolVector::from_bools(too_many).is_na());
    }
}
