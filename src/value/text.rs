//! Borrowed byte string with byte-lexicographic ordering (spec.md §3),
//! grounded on `original_source/include/grnxx/data_types/scalar/text.hpp`.

use std::fmt;

use super::data_type::DataType;
use super::scalar::Bool;

/// `None` represents N/A — the natural safe-Rust reading of "length
/// field reuses Int's N/A encoding" (spec.md §3/§9).
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Text<'a>(Option<&'a [u8]>);

impl<'a> Text<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Text(Some(bytes))
    }

    pub const fn na() -> Self {
        Text(None)
    }

    pub const fn is_na(self) -> bool {
        self.0.is_none()
    }

    pub fn as_bytes(self) -> Option<&'a [u8]> {
        self.0
    }

    pub fn eq3(self, rhs: Text<'_>) -> Bool {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Bool::new(a == b),
            _ => Bool::na(),
        }
    }

    pub fn ne3(self, rhs: Text<'_>) -> Bool {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Bool::new(a != b),
            _ => Bool::na(),
        }
    }

    pub fn lt(self, rhs: Text<'_>) -> Bool {
        self.order_bool(rhs, |o| o == std::cmp::Ordering::Less)
    }

    pub fn le(self, rhs: Text<'_>) -> Bool {
        self.order_bool(rhs, |o| o != std::cmp::Ordering::Greater)
    }

    pub fn gt(self, rhs: Text<'_>) -> Bool {
        self.order_bool(rhs, |o| o == std::cmp::Ordering::Greater)
    }

    pub fn ge(self, rhs: Text<'_>) -> Bool {
        self.order_bool(rhs, |o| o != std::cmp::Ordering::Less)
    }

    fn order_bool(self, rhs: Text<'_>, pred: impl Fn(std::cmp::Ordering) -> bool) -> Bool {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Bool::new(pred(a.cmp(b))),
            _ => Bool::na(),
        }
    }

    pub fn starts_with(self, prefix: Text<'_>) -> Bool {
        match (self.0, prefix.0) {
            (Some(a), Some(b)) => Bool::new(a.starts_with(b)),
            _ => Bool::na(),
        }
    }

    pub fn ends_with(self, suffix: Text<'_>) -> Bool {
        match (self.0, suffix.0) {
            (Some(a), Some(b)) => Bool::new(a.ends_with(b)),
            _ => Bool::na(),
        }
    }

    pub fn contains(self, needle: Text<'_>) -> Bool {
        match (self.0, needle.0) {
            (Some(a), Some(b)) => {
                Bool::new(b.is_empty() || a.windows(b.len().max(1)).any(|w| w == b))
            }
            _ => Bool::na(),
        }
    }

    pub fn match_(self, rhs: Text<'_>) -> bool {
        self.0 == rhs.0
    }

    pub fn unmatch(self, rhs: Text<'_>) -> bool {
        self.0 != rhs.0
    }

    pub const fn type_() -> DataType {
        DataType::Text
    }
}

impl<'a> fmt::Debug for Text<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(f, "Text(N/A)"),
            Some(b) => write!(f, "Text({:?})", String::from_utf8_lossy(b)),
        }
    }
}

impl<'a> Default for Text<'a> {
    fn default() -> Self {
        Text(Some(&[]))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lexicographic_ordering_shorter_is_less() {
        let a = Text::new(b"ab");
        let b = Text::new(b"abc");
        assert!(a.lt(b).is_true());
        assert!(b.gt(a).is_true());
    }

    #[test]
    fn na_propagates() {
        let na = Text::na();
        let a = Text::new(b"x");
        assert!(na.eq3(a).is_na());
        assert!(na.starts_with(a).is_na());
    }

    #[test]
    fn starts_ends_contains() {
        let s = Text::new(b"hello world");
        assert!(s.starts_with(Text::new(b"hello")).is_true());
        assert!(s.ends_with(Text::new(b"world")).is_true());
        assert!(s.contains(Text::new(b"lo wo")).is_true());
        assert!(s.contains(Text::new(b"xyz")).is_false());
    }

    #[test]
    fn range_scenario_s4_ordering() {
        // S4: values like "25" < "3" lexicographically (byte compare).
        assert!(Text::new(b"25").lt(Text::new(b"3")).is_true());
        assert!(Text::new(b"75").le(Text::new(b"75")).is_true());
    }
}
