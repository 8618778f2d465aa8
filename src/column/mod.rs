//! Typed, dense, row-indexed column storage (spec.md §4.B), grounded
//! on `original_source/lib/grnxx/column.cpp` and `column_impl.hpp`'s
//! `ColumnImpl<T>` (scalar: flat `std::vector<T>`) and
//! `ColumnImpl<String>` (header + body arena) split.
//!
//! Row ids are 1-based; row id `r` lives at storage index `r - 1`.

pub mod varlen;

use log::{trace, warn};

use crate::errors::{CoreError, CoreResult};
use crate::index::{FloatKey, IndexRange, ScanDirection, TreeIndex};
use crate::record::RecordSet;
use crate::value::{Bool, BoolVector, DataType, Datum, Float, GeoPoint, Int, Text, Vector};

fn row_index(row_id: Int) -> CoreResult<usize> {
    let raw = row_id.raw();
    if row_id.is_na() || raw < 1 {
        return Err(CoreError::InvalidOperation(format!(
            "row id {:?} is not a valid storage index",
            row_id
        )));
    }
    Ok((raw - 1) as usize)
}

/// Per-row header + shared body arena for `Text` columns (spec.md
/// §4.B's variable-length encoding). `None` marks a stored N/A; this
/// mirrors the `Option<RawHeader>` choice recorded in SPEC_FULL.md
/// rather than relying on a single sentinel header bit pattern.
#[derive(Clone, Debug, Default)]
struct TextStorage {
    headers: Vec<Option<u64>>,
    body: Vec<u8>,
}

impl TextStorage {
    fn resize(&mut self, len: usize) {
        self.headers.resize(len, None);
    }

    fn get(&self, idx: usize) -> Text<'_> {
        match self.headers.get(idx).copied().flatten() {
            None => Text::na(),
            Some(word) => Text::new(varlen::decode_bytes(&self.body, word)),
        }
    }

    fn set(&mut self, idx: usize, value: Text<'_>) {
        self.headers[idx] = value.as_bytes().map(|b| varlen::encode_bytes(&mut self.body, b));
    }
}

/// Per-row header + typed element arena for `Vector<T>` columns where
/// `T` ∈ {Int, Float, GeoPoint} (spec.md §4.B). The arena's unit is
/// `T`-elements rather than bytes, so an oversized vector's true
/// length is kept in a side table instead of being reinterpreted out
/// of the (non-byte) arena — see SPEC_FULL.md's documented deviation.
#[derive(Clone, Debug, Default)]
struct VectorStorage<T> {
    headers: Vec<Option<u64>>,
    body: Vec<T>,
    overflow_len: std::collections::HashMap<u64, u64>,
}

impl<T: Copy> VectorStorage<T> {
    fn resize(&mut self, len: usize) {
        self.headers.resize(len, None);
    }

    fn get(&self, idx: usize) -> Vector<'_, T> {
        match self.headers.get(idx).copied().flatten() {
            None => Vector::na(),
            Some(word) => {
                let overflow = &self.overflow_len;
                let header = varlen::decode(word, |off| *overflow.get(&off).unwrap());
                let start = header.offset as usize;
                Vector::new(&self.body[start..start + header.size as usize])
            }
        }
    }

    fn set(&mut self, idx: usize, value: &Vector<'_, T>) {
        match value.as_slice() {
            None => self.headers[idx] = None,
            Some(slice) => {
                let offset = self.body.len() as u64;
                let size = slice.len() as u64;
                self.body.extend_from_slice(slice);
                if varlen::needs_escape(size) {
                    self.overflow_len.insert(offset, size);
                }
                self.headers[idx] = Some(varlen::encode(offset, size));
            }
        }
    }
}

/// Per-row header into an index arena of per-element `Text` headers,
/// which themselves point into a shared byte arena (spec.md §4.B:
/// "for Text it is an array of Text headers plus a shared body
/// arena", applied one level up for `Vector<Text>` columns). Building
/// a read requires assembling an owned `Vec<Text<'a>>` from the two
/// arenas, which is exactly the case `Vector<'a, T>`'s `Cow` backing
/// exists for.
#[derive(Clone, Debug, Default)]
struct TextVectorStorage {
    headers: Vec<Option<u64>>,
    index_arena: Vec<u64>,
    index_overflow: std::collections::HashMap<u64, u64>,
    body: Vec<u8>,
}

/// Sentinel element header marking an individual N/A `Text` inside an
/// otherwise-present vector. Never produced by `varlen::encode`
/// because its low 16 bits equal the escape marker while its offset
/// field is all-ones, which `encode_bytes` never generates.
const NA_ELEMENT: u64 = u64::MAX;

impl TextVectorStorage {
    fn resize(&mut self, len: usize) {
        self.headers.resize(len, None);
    }

    fn get<'s>(&'s self, idx: usize) -> Vector<'s, Text<'s>> {
        match self.headers.get(idx).copied().flatten() {
            None => Vector::na(),
            Some(word) => {
                let overflow = &self.index_overflow;
                let header = varlen::decode(word, |off| *overflow.get(&off).unwrap());
                let start = header.offset as usize;
                let elements: Vec<Text<'_>> = self.index_arena[start..start + header.size as usize]
                    .iter()
                    .map(|&w| {
                        if w == NA_ELEMENT {
                            Text::na()
                        } else {
                            Text::new(varlen::decode_bytes(&self.body, w))
                        }
                    })
                    .collect();
                Vector::from_owned(elements)
            }
        }
    }

    fn set(&mut self, idx: usize, value: &Vector<'_, Text<'_>>) {
        match value.as_slice() {
            None => self.headers[idx] = None,
            Some(elements) => {
                let idx_offset = self.index_arena.len() as u64;
                for text in elements {
                    let word = match text.as_bytes() {
                        None => NA_ELEMENT,
                        Some(bytes) => varlen::encode_bytes(&mut self.body, bytes),
                    };
                    self.index_arena.push(word);
                }
                let n = elements.len() as u64;
                if varlen::needs_escape(n) {
                    self.index_overflow.insert(idx_offset, n);
                }
                self.headers[idx] = Some(varlen::encode(idx_offset, n));
            }
        }
    }
}

#[derive(Clone, Debug)]
enum Storage {
    Bool(Vec<Bool>),
    Int(Vec<Int>),
    Float(Vec<Float>),
    GeoPoint(Vec<GeoPoint>),
    Text(TextStorage),
    BoolVector(Vec<BoolVector>),
    IntVector(VectorStorage<Int>),
    FloatVector(VectorStorage<Float>),
    GeoPointVector(VectorStorage<GeoPoint>),
    TextVector(TextVectorStorage),
}

impl Storage {
    fn new(data_type: DataType) -> Self {
        match data_type {
            DataType::Bool => Storage::Bool(Vec::new()),
            DataType::Int => Storage::Int(Vec::new()),
            DataType::Float => Storage::Float(Vec::new()),
            DataType::GeoPoint => Storage::GeoPoint(Vec::new()),
            DataType::Text => Storage::Text(TextStorage::default()),
            DataType::BoolVector => Storage::BoolVector(Vec::new()),
            DataType::IntVector => Storage::IntVector(VectorStorage::default()),
            DataType::FloatVector => Storage::FloatVector(VectorStorage::default()),
            DataType::GeoPointVector => Storage::GeoPointVector(VectorStorage::default()),
            DataType::TextVector => Storage::TextVector(TextVectorStorage::default()),
        }
    }

    fn data_type(&self) -> DataType {
        match self {
            Storage::Bool(_) => DataType::Bool,
            Storage::Int(_) => DataType::Int,
            Storage::Float(_) => DataType::Float,
            Storage::GeoPoint(_) => DataType::GeoPoint,
            Storage::Text(_) => DataType::Text,
            Storage::BoolVector(_) => DataType::BoolVector,
            Storage::IntVector(_) => DataType::IntVector,
            Storage::FloatVector(_) => DataType::FloatVector,
            Storage::GeoPointVector(_) => DataType::GeoPointVector,
            Storage::TextVector(_) => DataType::TextVector,
        }
    }

    fn len(&self) -> usize {
        match self {
            Storage::Bool(v) => v.len(),
            Storage::Int(v) => v.len(),
            Storage::Float(v) => v.len(),
            Storage::GeoPoint(v) => v.len(),
            Storage::Text(s) => s.headers.len(),
            Storage::BoolVector(v) => v.len(),
            Storage::IntVector(s) => s.headers.len(),
            Storage::FloatVector(s) => s.headers.len(),
            Storage::GeoPointVector(s) => s.headers.len(),
            Storage::TextVector(s) => s.headers.len(),
        }
    }

    fn resize(&mut self, len: usize) {
        match self {
            Storage::Bool(v) => v.resize(len, Bool::default()),
            Storage::Int(v) => v.resize(len, Int::default()),
            Storage::Float(v) => v.resize(len, Float::default()),
            Storage::GeoPoint(v) => v.resize(len, GeoPoint::default()),
            Storage::Text(s) => s.resize(len),
            Storage::BoolVector(v) => v.resize(len, BoolVector::empty()),
            Storage::IntVector(s) => s.resize(len),
            Storage::FloatVector(s) => s.resize(len),
            Storage::GeoPointVector(s) => s.resize(len),
            Storage::TextVector(s) => s.resize(len),
        }
    }

    fn get(&self, idx: usize) -> Datum<'_> {
        match self {
            Storage::Bool(v) => Datum::Bool(v.get(idx).copied().unwrap_or_default()),
            Storage::Int(v) => Datum::Int(v.get(idx).copied().unwrap_or_default()),
            Storage::Float(v) => Datum::Float(v.get(idx).copied().unwrap_or_default()),
            Storage::GeoPoint(v) => Datum::GeoPoint(v.get(idx).copied().unwrap_or_default()),
            Storage::Text(s) => {
                if idx < s.headers.len() {
                    Datum::Text(s.get(idx))
                } else {
                    Datum::Text(Text::default())
                }
            }
            Storage::BoolVector(v) => Datum::BoolVector(v.get(idx).copied().unwrap_or_default()),
            Storage::IntVector(s) => {
                if idx < s.headers.len() {
                    Datum::IntVector(s.get(idx))
                } else {
                    Datum::IntVector(Vector::default())
                }
            }
            Storage::FloatVector(s) => {
                if idx < s.headers.len() {
                    Datum::FloatVector(s.get(idx))
                } else {
                    Datum::FloatVector(Vector::default())
                }
            }
            Storage::GeoPointVector(s) => {
                if idx < s.headers.len() {
                    Datum::GeoPointVector(s.get(idx))
                } else {
                    Datum::GeoPointVector(Vector::default())
                }
            }
            Storage::TextVector(s) => {
                if idx < s.headers.len() {
                    Datum::TextVector(s.get(idx))
                } else {
                    Datum::TextVector(Vector::default())
                }
            }
        }
    }

    fn set(&mut self, idx: usize, value: &Datum<'_>) -> CoreResult<()> {
        match (self, value) {
            (Storage::Bool(v), Datum::Bool(x)) => v[idx] = *x,
            (Storage::Int(v), Datum::Int(x)) => v[idx] = *x,
            (Storage::Float(v), Datum::Float(x)) => v[idx] = *x,
            (Storage::GeoPoint(v), Datum::GeoPoint(x)) => v[idx] = *x,
            (Storage::Text(s), Datum::Text(x)) => s.set(idx, *x),
            (Storage::BoolVector(v), Datum::BoolVector(x)) => v[idx] = *x,
            (Storage::IntVector(s), Datum::IntVector(x)) => s.set(idx, x),
            (Storage::FloatVector(s), Datum::FloatVector(x)) => s.set(idx, x),
            (Storage::GeoPointVector(s), Datum::GeoPointVector(x)) => s.set(idx, x),
            (Storage::TextVector(s), Datum::TextVector(x)) => s.set(idx, x),
            (storage, value) => {
                return Err(CoreError::TypeMismatch {
                    expected: storage.data_type(),
                    found: value.data_type(),
                })
            }
        }
        Ok(())
    }

    fn default_datum(&self) -> Datum<'static> {
        match self {
            Storage::Bool(_) => Datum::Bool(Bool::default()),
            Storage::Int(_) => Datum::Int(Int::default()),
            Storage::Float(_) => Datum::Float(Float::default()),
            Storage::GeoPoint(_) => Datum::GeoPoint(GeoPoint::default()),
            Storage::Text(_) => Datum::Text(Text::default()),
            Storage::BoolVector(_) => Datum::BoolVector(BoolVector::empty()),
            Storage::IntVector(_) => Datum::IntVector(Vector::default()),
            Storage::FloatVector(_) => Datum::FloatVector(Vector::default()),
            Storage::GeoPointVector(_) => Datum::GeoPointVector(Vector::default()),
            Storage::TextVector(_) => Datum::TextVector(Vector::default()),
        }
    }
}

/// The index(es) attached to a column, if its type is orderable
/// (spec.md §4.B/§4.C: `is_orderable()` is Int/Float/Text only).
#[derive(Clone, Debug, Default)]
enum Indexes {
    #[default]
    None,
    Int(Vec<TreeIndex<i64>>),
    Float(Vec<TreeIndex<FloatKey>>),
    Text(Vec<TreeIndex<Vec<u8>>>),
}

/// A typed, dense, row-indexed container (spec.md §3 "Tables and
/// columns", §4.B).
#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    storage: Storage,
    indexes: Indexes,
    is_key: bool,
    is_reference: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            name: name.into(),
            storage: Storage::new(data_type),
            indexes: Indexes::default(),
            is_key: false,
            is_reference: false,
        }
    }

    /// Declares this column a reference column (spec.md §3): only
    /// valid for `Int` or `IntVector` columns, whose values must be
    /// live row ids of another table (checked by `set`'s caller, which
    /// passes the target table's liveness predicate).
    pub fn mark_reference(&mut self) -> CoreResult<()> {
        match self.storage.data_type() {
            DataType::Int | DataType::IntVector => {
                self.is_reference = true;
                Ok(())
            }
            other => Err(CoreError::InvalidOperation(format!(
                "{:?} columns cannot be reference columns",
                other
            ))),
        }
    }

    pub fn mark_key(&mut self) -> CoreResult<()> {
        if self.storage.data_type() == DataType::BoolVector {
            return Err(CoreError::InvalidOperation(
                "BoolVector columns cannot be key columns".into(),
            ));
        }
        self.is_key = true;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.storage.data_type()
    }

    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.len() == 0
    }

    pub(crate) fn resize(&mut self, len: usize) {
        self.storage.resize(len);
    }

    /// Create an index on this column. Only orderable types (spec.md
    /// §4.C) may be indexed; the new index is back-filled from every
    /// row already present.
    pub fn create_index(&mut self) -> CoreResult<()> {
        if !self.storage.data_type().is_orderable() {
            return Err(CoreError::InvalidOperation(format!(
                "{:?} is not an orderable type and cannot be indexed",
                self.storage.data_type()
            )));
        }
        match (&self.storage, &mut self.indexes) {
            (Storage::Int(values), Indexes::None) => {
                let mut index = TreeIndex::new();
                for (i, v) in values.iter().enumerate() {
                    index.insert(Int::new((i + 1) as i64), int_key(*v));
                }
                self.indexes = Indexes::Int(vec![index]);
            }
            (Storage::Int(values), Indexes::Int(list)) => {
                let mut index = TreeIndex::new();
                for (i, v) in values.iter().enumerate() {
                    index.insert(Int::new((i + 1) as i64), int_key(*v));
                }
                list.push(index);
            }
            (Storage::Float(values), Indexes::None) => {
                let mut index = TreeIndex::new();
                for (i, v) in values.iter().enumerate() {
                    index.insert(Int::new((i + 1) as i64), FloatKey::from_float(*v));
                }
                self.indexes = Indexes::Float(vec![index]);
            }
            (Storage::Float(values), Indexes::Float(list)) => {
                let mut index = TreeIndex::new();
                for (i, v) in values.iter().enumerate() {
                    index.insert(Int::new((i + 1) as i64), FloatKey::from_float(*v));
                }
                list.push(index);
            }
            (Storage::Text(s), Indexes::None) => {
                let mut index = TreeIndex::new();
                for i in 0..s.headers.len() {
                    index.insert(Int::new((i + 1) as i64), text_key(s.get(i)));
                }
                self.indexes = Indexes::Text(vec![index]);
            }
            (Storage::Text(s), Indexes::Text(list)) => {
                let mut index = TreeIndex::new();
                for i in 0..s.headers.len() {
                    index.insert(Int::new((i + 1) as i64), text_key(s.get(i)));
                }
                list.push(index);
            }
            _ => unreachable!("is_orderable() guards storage/index kind agreement"),
        }
        Ok(())
    }

    /// `get(row_id)` (spec.md §4.B): out-of-range reads a typed
    /// default; N/A is returned only when actually stored.
    pub fn get(&self, row_id: Int) -> Datum<'_> {
        if row_id.is_na() || row_id.raw() < 1 {
            return self.storage.default_datum();
        }
        self.storage.get((row_id.raw() - 1) as usize)
    }

    /// `set(row_id, value)` (spec.md §4.B): validates type, key
    /// uniqueness and reference liveness, then updates every attached
    /// index before writing the new value. `row_is_live` and
    /// `reference_is_live` let the caller (`Table`) supply liveness
    /// facts this column cannot know on its own.
    pub fn set(
        &mut self,
        row_id: Int,
        value: Datum<'_>,
        row_is_live: impl Fn(Int) -> bool,
        reference_is_live: impl Fn(Int) -> bool,
    ) -> CoreResult<()> {
        if value.data_type() != self.storage.data_type() {
            return Err(CoreError::TypeMismatch {
                expected: self.storage.data_type(),
                found: value.data_type(),
            });
        }
        if !row_is_live(row_id) {
            return Err(CoreError::NotFound(format!("row {:?} is not live", row_id)));
        }
        if self.is_reference {
            self.check_reference_liveness(&value, &reference_is_live)?;
        }
        let idx = row_index(row_id)?;
        if self.is_key {
            if let Some(existing) = self.find_one(&value) {
                if existing.raw() != row_id.raw() {
                    return Err(CoreError::KeyDuplicate);
                }
            }
        }

        // Capture the old indexed key before storage is overwritten.
        // Per spec.md §4.B, the new value is inserted into every
        // attached index before the old one is removed, so that an
        // index is never briefly missing an entry for a live row.
        let old_int_key = match &self.storage {
            Storage::Int(v) => int_key(v[idx]),
            _ => None,
        };
        let old_float_key = match &self.storage {
            Storage::Float(v) => FloatKey::from_float(v[idx]),
            _ => None,
        };
        let old_text_key = match &self.storage {
            Storage::Text(s) => text_key(s.get(idx)),
            _ => None,
        };

        self.index_insert(row_id, &value);
        match &mut self.indexes {
            Indexes::Int(list) => {
                for index in list {
                    index.remove(row_id, old_int_key);
                }
            }
            Indexes::Float(list) => {
                for index in list {
                    index.remove(row_id, old_float_key);
                }
            }
            Indexes::Text(list) => {
                for index in list {
                    index.remove(row_id, old_text_key.clone());
                }
            }
            Indexes::None => {}
        }
        self.storage.set(idx, &value)
    }

    fn check_reference_liveness(
        &self,
        value: &Datum<'_>,
        reference_is_live: &impl Fn(Int) -> bool,
    ) -> CoreResult<()> {
        match value {
            Datum::Int(v) => {
                if !v.is_na() && !reference_is_live(*v) {
                    return Err(CoreError::InvalidReference);
                }
            }
            Datum::IntVector(v) => {
                if let Some(slice) = v.as_slice() {
                    for id in slice {
                        if !id.is_na() && !reference_is_live(*id) {
                            return Err(CoreError::InvalidReference);
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn set_default_value(
        &mut self,
        row_id: Int,
        row_is_live: impl Fn(Int) -> bool,
    ) -> CoreResult<()> {
        if self.is_key {
            return Err(CoreError::InvalidOperation(
                "set_default_value is disallowed on key columns".into(),
            ));
        }
        let default = self.storage.default_datum();
        self.set(row_id, default, row_is_live, |_| true)
    }

    pub fn unset(&mut self, row_id: Int) -> CoreResult<()> {
        let idx = row_index(row_id)?;
        let old_int_key = match &self.storage {
            Storage::Int(v) => int_key(v[idx]),
            _ => None,
        };
        let old_float_key = match &self.storage {
            Storage::Float(v) => FloatKey::from_float(v[idx]),
            _ => None,
        };
        let old_text_key = match &self.storage {
            Storage::Text(s) => text_key(s.get(idx)),
            _ => None,
        };
        match &mut self.indexes {
            Indexes::Int(list) => {
                for index in list {
                    index.remove(row_id, old_int_key);
                }
            }
            Indexes::Float(list) => {
                for index in list {
                    index.remove(row_id, old_float_key);
                }
            }
            Indexes::Text(list) => {
                for index in list {
                    index.remove(row_id, old_text_key.clone());
                }
            }
            Indexes::None => {}
        }
        let default = self.storage.default_datum();
        self.storage.set(idx, &default)
    }

    /// `find_one(value)` (spec.md §4.B): delegates to an attached
    /// index when present, otherwise falls back to a linear scan.
    pub fn find_one(&self, value: &Datum<'_>) -> Option<Int> {
        match (&self.indexes, value) {
            (Indexes::Int(list), Datum::Int(v)) => {
                let key = int_key(*v)?;
                list.first()?.find(&key).into_iter().next()
            }
            (Indexes::Float(list), Datum::Float(v)) => {
                let key = FloatKey::from_float(*v)?;
                list.first()?.find(&key).into_iter().next()
            }
            (Indexes::Text(list), Datum::Text(v)) => {
                let key = text_key(*v)?;
                list.first()?.find(&key).into_iter().next()
            }
            _ => self.linear_find(value),
        }
    }

    fn linear_find(&self, value: &Datum<'_>) -> Option<Int> {
        for i in 0..self.storage.len() {
            if datum_match(&self.storage.get(i), value) {
                return Some(Int::new((i + 1) as i64));
            }
        }
        None
    }

    /// Range scan over an attached index (spec.md §4.C). Returns
    /// `None` if this column has no index of a matching kind.
    pub fn find_in_range_int(
        &self,
        range: &IndexRange<i64>,
        direction: ScanDirection,
        offset: usize,
        limit: Option<usize>,
    ) -> Option<RecordSet> {
        match &self.indexes {
            Indexes::Int(list) => Some(list.first()?.find_in_range(range, direction, offset, limit)),
            _ => None,
        }
    }

    pub fn find_in_range_float(
        &self,
        range: &IndexRange<FloatKey>,
        direction: ScanDirection,
        offset: usize,
        limit: Option<usize>,
    ) -> Option<RecordSet> {
        match &self.indexes {
            Indexes::Float(list) => Some(list.first()?.find_in_range(range, direction, offset, limit)),
            _ => None,
        }
    }

    pub fn find_in_range_text(
        &self,
        range: &IndexRange<Vec<u8>>,
        direction: ScanDirection,
        offset: usize,
        limit: Option<usize>,
    ) -> Option<RecordSet> {
        match &self.indexes {
            Indexes::Text(list) => Some(list.first()?.find_in_range(range, direction, offset, limit)),
            _ => None,
        }
    }

    /// `clear_references(row_id)` (spec.md §4.B): called on a
    /// referencing column when `row_id` is removed from its target
    /// table. Scalar references are set to N/A; vector references
    /// have that row id filtered out.
    pub(crate) fn clear_references(&mut self, row_id: Int) {
        if !self.is_reference {
            return;
        }
        match &mut self.storage {
            Storage::Int(values) => {
                for (i, v) in values.iter_mut().enumerate() {
                    if v.match_(row_id) {
                        trace!(
                            "column {:?}: row {} cleared (referenced row {:?} removed)",
                            self.name,
                            i + 1,
                            row_id
                        );
                        *v = Int::na();
                    }
                }
            }
            Storage::IntVector(storage) => {
                for i in 0..storage.headers.len() {
                    let current = storage.get(i);
                    let Some(slice) = current.as_slice() else { continue };
                    if !slice.iter().any(|id| id.match_(row_id)) {
                        continue;
                    }
                    warn!(
                        "column {:?}: row {} vector rewritten (referenced row {:?} removed)",
                        self.name,
                        i + 1,
                        row_id
                    );
                    let filtered: Vec<Int> = slice.iter().copied().filter(|id| !id.match_(row_id)).collect();
                    storage.set(i, &Vector::from_owned(filtered));
                }
            }
            _ => {}
        }
    }

    fn index_insert(&mut self, row_id: Int, value: &Datum<'_>) {
        match (&mut self.indexes, value) {
            (Indexes::Int(list), Datum::Int(v)) => {
                for idx in list {
                    idx.insert(row_id, int_key(*v));
                }
            }
            (Indexes::Float(list), Datum::Float(v)) => {
                for idx in list {
                    idx.insert(row_id, FloatKey::from_float(*v));
                }
            }
            (Indexes::Text(list), Datum::Text(v)) => {
                for idx in list {
                    idx.insert(row_id, text_key(*v));
                }
            }
            _ => {}
        }
    }

}

fn int_key(v: Int) -> Option<i64> {
    if v.is_na() {
        None
    } else {
        Some(v.raw())
    }
}

fn text_key(v: Text<'_>) -> Option<Vec<u8>> {
    v.as_bytes().map(|b| b.to_vec())
}

fn datum_match(a: &Datum<'_>, b: &Datum<'_>) -> bool {
    match (a, b) {
        (Datum::Bool(x), Datum::Bool(y)) => x.match_(*y),
        (Datum::Int(x), Datum::Int(y)) => x.match_(*y),
        (Datum::Float(x), Datum::Float(y)) => x.match_(*y),
        (Datum::GeoPoint(x), Datum::GeoPoint(y)) => x.match_(*y),
        (Datum::Text(x), Datum::Text(y)) => x.match_(*y),
        (Datum::BoolVector(x), Datum::BoolVector(y)) => x.match_(*y),
        (Datum::IntVector(x), Datum::IntVector(y)) => x.match_(y),
        (Datum::FloatVector(x), Datum::FloatVector(y)) => x.match_(y),
        (Datum::GeoPointVector(x), Datum::GeoPointVector(y)) => x.match_(y),
        (Datum::TextVector(x), Datum::TextVector(y)) => x.match_(y),
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn always_live(_: Int) -> bool {
        true
    }

    #[test]
    fn scalar_get_set_roundtrip_and_out_of_range_default() {
        let mut col = Column::new("age", DataType::Int);
        col.resize(3);
        col.set(Int::new(1), Datum::Int(Int::new(30)), always_live, always_live)
            .unwrap();
        assert_eq!(col.get(Int::new(1)).as_int().unwrap().raw(), 30);
        assert_eq!(col.get(Int::new(999)).as_int().unwrap().raw(), 0);
    }

    #[test]
    fn text_column_roundtrip_inline_and_escaped() {
        let mut col = Column::new("bio", DataType::Text);
        col.resize(2);
        let long = "x".repeat(70_000);
        col.set(Int::new(1), Datum::Text(Text::new(b"hi")), always_live, always_live)
            .unwrap();
        col.set(
            Int::new(2),
            Datum::Text(Text::new(long.as_bytes())),
            always_live,
            always_live,
        )
        .unwrap();
        assert_eq!(col.get(Int::new(1)).as_text().unwrap().as_bytes().unwrap(), b"hi");
        assert_eq!(
            col.get(Int::new(2)).as_text().unwrap().as_bytes().unwrap().len(),
            70_000
        );
    }

    #[test]
    fn key_column_rejects_duplicate() {
        let mut col = Column::new("email", DataType::Text);
        col.mark_key().unwrap();
        col.resize(2);
        col.set(Int::new(1), Datum::Text(Text::new(b"a@x.com")), always_live, always_live)
            .unwrap();
        let err = col
            .set(Int::new(2), Datum::Text(Text::new(b"a@x.com")), always_live, always_live)
            .unwrap_err();
        assert_eq!(err, CoreError::KeyDuplicate);
    }

    #[test]
    fn reference_column_rejects_dead_target() {
        let mut col = Column::new("author_id", DataType::Int);
        col.mark_reference().unwrap();
        col.resize(1);
        let err = col
            .set(Int::new(1), Datum::Int(Int::new(42)), always_live, |_| false)
            .unwrap_err();
        assert_eq!(err, CoreError::InvalidReference);
    }

    #[test]
    fn clear_references_scalar_and_vector() {
        let mut scalar = Column::new("author_id", DataType::Int);
        scalar.mark_reference().unwrap();
        scalar.resize(1);
        scalar
            .set(Int::new(1), Datum::Int(Int::new(5)), always_live, always_live)
            .unwrap();
        scalar.clear_references(Int::new(5));
        assert!(scalar.get(Int::new(1)).as_int().unwrap().is_na());

        let mut vector = Column::new("tag_ids", DataType::IntVector);
        vector.mark_reference().unwrap();
        vector.resize(1);
        let ids = vec![Int::new(5), Int::new(6), Int::new(7)];
        vector
            .set(Int::new(1), Datum::IntVector(Vector::new(&ids)), always_live, always_live)
            .unwrap();
        vector.clear_references(Int::new(6));
        let got = vector.get(Int::new(1));
        let remaining: Vec<i64> = got.as_int_vector().unwrap().as_slice().unwrap().iter().map(|v| v.raw()).collect();
        assert_eq!(remaining, vec![5, 7]);
    }

    #[test]
    fn index_find_one_and_range() {
        let mut col = Column::new("score", DataType::Int);
        col.resize(4);
        for (row, value) in [(1, 10), (2, 20), (3, 30), (4, 40)] {
            col.set(Int::new(row), Datum::Int(Int::new(value)), always_live, always_live)
                .unwrap();
        }
        col.create_index().unwrap();
        assert_eq!(col.find_one(&Datum::Int(Int::new(30))).unwrap().raw(), 3);

        let range = IndexRange::new(Some(15), Some(35), crate::index::BoundKind::default());
        let rs = col
            .find_in_range_int(&range, ScanDirection::Forward, 0, None)
            .unwrap();
        assert_eq!(rs.as_slice().iter().map(|r| r.row_id.raw()).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn text_vector_column_roundtrip_with_na_element() {
        let mut col = Column::new("aliases", DataType::TextVector);
        col.resize(1);
        let values = vec![Text::new(b"a"), Text::na(), Text::new(b"ccc")];
        col.set(Int::new(1), Datum::TextVector(Vector::from_owned(values)), always_live, always_live)
            .unwrap();
        let got = col.get(Int::new(1));
        let slice = got.as_text_vector().unwrap();
        let elements = slice.as_slice().unwrap();
        assert_eq!(elements[0].as_bytes().unwrap(), b"a");
        assert!(elements[1].is_na());
        assert_eq!(elements[2].as_bytes().unwrap(), b"ccc");
    }
}
