//! Scalar types with explicit N/A encodings (spec.md §3/§4.A), grounded
//! on `original_source/include/grnxx/data_types/scalar/*.hpp`.

use std::fmt;

use super::data_type::DataType;

/// Three-valued boolean: `{ true, false, N/A }`.
///
/// Encoded as a 2-bit code so that AND/OR reduce to plain bitwise
/// `&`/`|` on the codes, exactly as `grnxx::Bool` does:
/// `true = 0b11`, `false = 0b00`, `na = 0b01`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Bool(u8);

impl Bool {
    const TRUE: u8 = 0b11;
    const FALSE: u8 = 0b00;
    const NA: u8 = 0b01;

    pub const fn new(value: bool) -> Self {
        Bool(if value { Self::TRUE } else { Self::FALSE })
    }

    pub const fn na() -> Self {
        Bool(Self::NA)
    }

    pub const fn is_true(self) -> bool {
        self.0 == Self::TRUE
    }

    pub const fn is_false(self) -> bool {
        self.0 == Self::FALSE
    }

    pub const fn is_na(self) -> bool {
        self.0 == Self::NA
    }

    pub const fn code(self) -> u8 {
        self.0
    }

    pub const fn not(self) -> Bool {
        if self.is_na() {
            self
        } else {
            Bool(self.0 ^ Self::TRUE)
        }
    }

    pub const fn and(self, rhs: Bool) -> Bool {
        Bool(self.0 & rhs.0)
    }

    pub const fn or(self, rhs: Bool) -> Bool {
        Bool(self.0 | rhs.0)
    }

    pub const fn xor(self, rhs: Bool) -> Bool {
        if self.is_na() || rhs.is_na() {
            Self::na()
        } else {
            Bool(self.0 ^ rhs.0)
        }
    }

    pub const fn eq3(self, rhs: Bool) -> Bool {
        if self.is_na() || rhs.is_na() {
            Self::na()
        } else {
            Bool(self.0 ^ rhs.0 ^ Self::TRUE)
        }
    }

    pub const fn ne3(self, rhs: Bool) -> Bool {
        if self.is_na() || rhs.is_na() {
            Self::na()
        } else {
            Bool(self.0 ^ rhs.0)
        }
    }

    pub const fn match_(self, rhs: Bool) -> bool {
        self.0 == rhs.0
    }

    pub const fn unmatch(self, rhs: Bool) -> bool {
        self.0 != rhs.0
    }

    pub const fn type_() -> DataType {
        DataType::Bool
    }
}

impl fmt::Debug for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_na() {
            write!(f, "Bool(N/A)")
        } else {
            write!(f, "Bool({})", self.is_true())
        }
    }
}

impl Default for Bool {
    fn default() -> Self {
        Bool::new(false)
    }
}

/// 64-bit signed integer; `i64::MIN` is reserved as N/A (spec.md §3).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int(i64);

impl Int {
    pub const fn new(raw: i64) -> Self {
        Int(raw)
    }

    pub const fn na() -> Self {
        Int(i64::MIN)
    }

    pub const fn min() -> Self {
        Int(i64::MIN + 1)
    }

    pub const fn max() -> Self {
        Int(i64::MAX)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    pub const fn is_na(self) -> bool {
        self.0 == i64::MIN
    }

    pub fn neg(self) -> Int {
        if self.is_na() {
            self
        } else {
            Int(-self.0)
        }
    }

    pub fn not(self) -> Int {
        if self.is_na() {
            self
        } else {
            Int(!self.0)
        }
    }

    pub fn add(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() {
            return Self::na();
        }
        match self.0.checked_add(rhs.0) {
            Some(v) if v != i64::MIN => Int(v),
            _ => Self::na(),
        }
    }

    pub fn sub(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() {
            return Self::na();
        }
        match self.0.checked_sub(rhs.0) {
            Some(v) if v != i64::MIN => Int(v),
            _ => Self::na(),
        }
    }

    pub fn mul(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() {
            return Self::na();
        }
        match self.0.checked_mul(rhs.0) {
            Some(v) if v != i64::MIN => Int(v),
            _ => Self::na(),
        }
    }

    pub fn div(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() || rhs.0 == 0 {
            return Self::na();
        }
        match self.0.checked_div(rhs.0) {
            Some(v) if v != i64::MIN => Int(v),
            _ => Self::na(),
        }
    }

    pub fn rem(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() || rhs.0 == 0 {
            return Self::na();
        }
        match self.0.checked_rem(rhs.0) {
            Some(v) => Int(v),
            None => Self::na(),
        }
    }

    pub fn bitand(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() {
            Self::na()
        } else {
            Int(self.0 & rhs.0)
        }
    }

    pub fn bitor(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() {
            Self::na()
        } else {
            Int(self.0 | rhs.0)
        }
    }

    pub fn bitxor(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() {
            Self::na()
        } else {
            Int(self.0 ^ rhs.0)
        }
    }

    pub fn shl(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() || (rhs.0 as u64) >= 64 {
            Self::na()
        } else {
            Int(self.0 << rhs.0)
        }
    }

    pub fn shr(self, rhs: Int) -> Int {
        if self.is_na() || rhs.is_na() || (rhs.0 as u64) >= 64 {
            Self::na()
        } else {
            Int(self.0 >> rhs.0)
        }
    }

    pub fn eq3(self, rhs: Int) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 == rhs.0)
        }
    }

    pub fn ne3(self, rhs: Int) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 != rhs.0)
        }
    }

    pub fn lt(self, rhs: Int) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 < rhs.0)
        }
    }

    pub fn le(self, rhs: Int) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 <= rhs.0)
        }
    }

    pub fn gt(self, rhs: Int) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 > rhs.0)
        }
    }

    pub fn ge(self, rhs: Int) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 >= rhs.0)
        }
    }

    pub const fn match_(self, rhs: Int) -> bool {
        self.0 == rhs.0
    }

    pub const fn unmatch(self, rhs: Int) -> bool {
        self.0 != rhs.0
    }

    pub fn to_float(self) -> Float {
        if self.is_na() {
            Float::na()
        } else {
            Float::new(self.0 as f64)
        }
    }

    pub const fn type_() -> DataType {
        DataType::Int
    }
}

impl fmt::Debug for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_na() {
            write!(f, "Int(N/A)")
        } else {
            write!(f, "Int({})", self.0)
        }
    }
}

impl Default for Int {
    fn default() -> Self {
        Int(0)
    }
}

/// IEEE-754 double; N/A is any NaN bit pattern (spec.md §3).
#[derive(Copy, Clone)]
pub struct Float(f64);

impl Float {
    pub const fn new(raw: f64) -> Self {
        Float(raw)
    }

    pub fn na() -> Self {
        Float(f64::NAN)
    }

    pub fn raw(self) -> f64 {
        self.0
    }

    pub fn is_na(self) -> bool {
        self.0.is_nan()
    }

    pub fn neg(self) -> Float {
        Float(-self.0)
    }

    pub fn add(self, rhs: Float) -> Float {
        Float(self.0 + rhs.0)
    }

    pub fn sub(self, rhs: Float) -> Float {
        Float(self.0 - rhs.0)
    }

    pub fn mul(self, rhs: Float) -> Float {
        Float(self.0 * rhs.0)
    }

    pub fn div(self, rhs: Float) -> Float {
        Float(self.0 / rhs.0)
    }

    pub fn rem(self, rhs: Float) -> Float {
        Float(self.0 % rhs.0)
    }

    pub fn eq3(self, rhs: Float) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 == rhs.0)
        }
    }

    pub fn ne3(self, rhs: Float) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 != rhs.0)
        }
    }

    pub fn lt(self, rhs: Float) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 < rhs.0)
        }
    }

    pub fn le(self, rhs: Float) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 <= rhs.0)
        }
    }

    pub fn gt(self, rhs: Float) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 > rhs.0)
        }
    }

    pub fn ge(self, rhs: Float) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self.0 >= rhs.0)
        }
    }

    /// Total byte equality (N/A matches N/A), used for hashing/indexing.
    pub fn match_(self, rhs: Float) -> bool {
        if self.is_na() && rhs.is_na() {
            true
        } else {
            self.0.to_bits() == rhs.0.to_bits()
        }
    }

    pub fn unmatch(self, rhs: Float) -> bool {
        !self.match_(rhs)
    }

    /// Truncate toward zero; N/A or out-of-range becomes `Int::na()`.
    pub fn to_int(self) -> Int {
        if self.is_na() {
            return Int::na();
        }
        let truncated = self.0.trunc();
        if truncated < Int::min().raw() as f64 || truncated > Int::max().raw() as f64 {
            Int::na()
        } else {
            Int::new(truncated as i64)
        }
    }

    pub const fn type_() -> DataType {
        DataType::Float
    }
}

impl fmt::Debug for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_na() {
            write!(f, "Float(N/A)")
        } else {
            write!(f, "Float({})", self.0)
        }
    }
}

impl Default for Float {
    fn default() -> Self {
        Float(0.0)
    }
}

/// A latitude/longitude pair in milliseconds of arc (spec.md §3),
/// grounded on `scalar/geo_point.hpp`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct GeoPoint {
    raw_latitude: i32,
    raw_longitude: i32,
}

impl GeoPoint {
    const fn raw_na() -> i32 {
        i32::MIN
    }

    const fn raw_min_latitude() -> i32 {
        -90 * 60 * 60 * 1000
    }

    const fn raw_max_latitude() -> i32 {
        90 * 60 * 60 * 1000
    }

    const fn raw_min_longitude() -> i32 {
        -180 * 60 * 60 * 1000
    }

    const fn raw_max_longitude() -> i32 {
        180 * 60 * 60 * 1000
    }

    pub const fn na() -> Self {
        GeoPoint {
            raw_latitude: Self::raw_na(),
            raw_longitude: Self::raw_na(),
        }
    }

    pub const fn is_na(self) -> bool {
        self.raw_latitude == Self::raw_na()
    }

    /// Construct from milliseconds of arc. Out-of-range input, or a
    /// pole latitude, normalises longitude to 0; an out-of-range
    /// longitude at the antimeridian normalises to the min value.
    pub fn from_milliseconds(latitude: Int, longitude: Int) -> Self {
        let raw_lat = latitude.raw();
        let raw_lon = longitude.raw();
        if raw_lat < Self::raw_min_latitude() as i64
            || raw_lat > Self::raw_max_latitude() as i64
            || raw_lon < Self::raw_min_longitude() as i64
            || raw_lon > Self::raw_max_longitude() as i64
        {
            return Self::na();
        }
        let mut raw_lat = raw_lat as i32;
        let mut raw_lon = raw_lon as i32;
        if raw_lat == Self::raw_min_latitude() || raw_lat == Self::raw_max_latitude() {
            raw_lon = 0;
        } else if raw_lon == Self::raw_max_longitude() {
            raw_lon = Self::raw_min_longitude();
        }
        raw_lat = raw_lat.clamp(Self::raw_min_latitude(), Self::raw_max_latitude());
        GeoPoint {
            raw_latitude: raw_lat,
            raw_longitude: raw_lon,
        }
    }

    /// Construct from degrees. Out-of-range input (including NaN) is N/A.
    pub fn from_degrees(latitude: Float, longitude: Float) -> Self {
        let lat = latitude.raw();
        let lon = longitude.raw();
        if !(lat >= -90.0 && lat <= 90.0 && lon >= -180.0 && lon <= 180.0) {
            return Self::na();
        }
        let mut raw_lat = (lat * 60.0 * 60.0 * 1000.0) as i32;
        let mut raw_lon = (lon * 60.0 * 60.0 * 1000.0) as i32;
        if raw_lat == Self::raw_min_latitude() || raw_lat == Self::raw_max_latitude() {
            raw_lon = 0;
        } else if raw_lon == Self::raw_max_longitude() {
            raw_lon = Self::raw_min_longitude();
        }
        raw_lat = raw_lat.clamp(Self::raw_min_latitude(), Self::raw_max_latitude());
        GeoPoint {
            raw_latitude: raw_lat,
            raw_longitude: raw_lon,
        }
    }

    pub fn latitude_in_milliseconds(self) -> Int {
        if self.is_na() {
            Int::na()
        } else {
            Int::new(self.raw_latitude as i64)
        }
    }

    pub fn longitude_in_milliseconds(self) -> Int {
        if self.is_na() {
            Int::na()
        } else {
            Int::new(self.raw_longitude as i64)
        }
    }

    pub fn eq3(self, rhs: GeoPoint) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self == rhs)
        }
    }

    pub fn ne3(self, rhs: GeoPoint) -> Bool {
        if self.is_na() || rhs.is_na() {
            Bool::na()
        } else {
            Bool::new(self != rhs)
        }
    }

    pub const fn match_(self, rhs: GeoPoint) -> bool {
        self.raw_latitude == rhs.raw_latitude && self.raw_longitude == rhs.raw_longitude
    }

    pub const fn unmatch(self, rhs: GeoPoint) -> bool {
        !self.match_(rhs)
    }

    pub const fn type_() -> DataType {
        DataType::GeoPoint
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_na() {
            write!(f, "GeoPoint(N/A)")
        } else {
            write!(f, "GeoPoint({}, {})", self.raw_latitude, self.raw_longitude)
        }
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        GeoPoint {
            raw_latitude: 0,
            raw_longitude: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bool_three_valued_and() {
        let t = Bool::new(true);
        let f = Bool::new(false);
        let n = Bool::na();
        assert!(t.and(t).is_true());
        assert!(t.and(f).is_false());
        assert!(t.and(n).is_na());
        assert!(f.and(f).is_false());
        assert!(f.and(n).is_false());
        assert!(n.and(n).is_na());
    }

    #[test]
    fn bool_three_valued_or() {
        let t = Bool::new(true);
        let f = Bool::new(false);
        let n = Bool::na();
        assert!(t.or(t).is_true());
        assert!(t.or(f).is_true());
        assert!(t.or(n).is_true());
        assert!(f.or(f).is_false());
        assert!(f.or(n).is_na());
        assert!(n.or(n).is_na());
    }

    #[test]
    fn bool_not_and_xor() {
        assert!(Bool::new(true).not().is_false());
        assert!(Bool::na().not().is_na());
        assert!(Bool::new(true).xor(Bool::new(false)).is_true());
        assert!(Bool::new(true).xor(Bool::na()).is_na());
    }

    #[test]
    fn int_overflow_is_na_not_panic() {
        let max = Int::max();
        let one = Int::new(1);
        assert!(max.add(one).is_na());
        assert!(Int::na().neg().is_na());
        assert!(Int::min().div(Int::new(-1)).is_na());
        assert!(Int::new(5).div(Int::new(0)).is_na());
        assert!(Int::new(5).rem(Int::new(0)).is_na());
    }

    #[test]
    fn int_shift_na_rules() {
        assert!(Int::new(1).shl(Int::new(64)).is_na());
        assert!(Int::new(1).shl(Int::na()).is_na());
        assert_eq!(Int::new(1).shl(Int::new(3)).raw(), 8);
    }

    #[test]
    fn float_na_is_nan_and_propagates_through_comparisons() {
        let na = Float::na();
        assert!(na.is_na());
        assert!(na.lt(Float::new(1.0)).is_na());
        assert!(Float::new(1.0).eq3(Float::new(1.0)).is_true());
    }

    #[test]
    fn float_to_int_truncates_and_na_on_out_of_range() {
        assert_eq!(Float::new(3.9).to_int().raw(), 3);
        assert_eq!(Float::new(-3.9).to_int().raw(), -3);
        assert!(Float::na().to_int().is_na());
        assert!(Float::new(1e30).to_int().is_na());
    }

    #[test]
    fn geo_point_pole_normalizes_longitude() {
        let p = GeoPoint::from_degrees(Float::new(90.0), Float::new(45.0));
        assert_eq!(p.longitude_in_milliseconds().raw(), 0);
        let na = GeoPoint::from_degrees(Float::new(91.0), Float::new(0.0));
        assert!(na.is_na());
    }

    #[test]
    fn geo_point_equality_na_propagation() {
        assert!(GeoPoint::na().eq3(GeoPoint::na()).is_na());
        let a = GeoPoint::from_milliseconds(Int::new(1000), Int::new(2000));
        let b = GeoPoint::from_milliseconds(Int::new(1000), Int::new(2000));
        assert!(a.eq3(b).is_true());
    }
}
