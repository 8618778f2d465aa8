//! `Table`: a named collection of same-length [`Column`]s sharing one
//! row-id space (spec.md §3, §6's "Catalog" surface). Grounded on
//! `original_source/lib/grnxx/column.cpp`'s `table_->test_row(...)`
//! calls, which are the only surviving evidence of the original
//! `Table` API in the retrieved corpus — the row-id lifecycle and
//! reference-cascade behaviour here are otherwise derived directly
//! from spec.md §4.B/§6/§8 invariant 6.

use std::collections::HashSet;

use log::debug;

use crate::column::Column;
use crate::cursor::{CursorOptions, TableCursor};
use crate::errors::{CoreError, CoreResult};
use crate::value::{DataType, Datum, Int};

/// Row ids are 1-based and monotonically increasing; `remove_row`
/// permanently retires an id rather than reusing it (spec.md §3: "0/NA
/// mean no row").
#[derive(Debug, Default)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    key_column: Option<usize>,
    max_row_id: i64,
    removed: HashSet<i64>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
            key_column: None,
            max_row_id: 0,
            removed: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_rows(&self) -> usize {
        (self.max_row_id as usize) - self.removed.len()
    }

    pub fn max_row_id(&self) -> Int {
        Int::new(self.max_row_id)
    }

    /// `test_row(id)` (spec.md §6): whether `id` currently names a live
    /// row — in range and not removed.
    pub fn test_row(&self, row_id: Int) -> bool {
        if row_id.is_na() {
            return false;
        }
        let raw = row_id.raw();
        raw >= 1 && raw <= self.max_row_id && !self.removed.contains(&raw)
    }

    pub fn create_column(&mut self, name: impl Into<String>, data_type: DataType) -> CoreResult<&mut Column> {
        let name = name.into();
        if self.find_column(&name).is_some() {
            return Err(CoreError::InvalidOperation(format!("column {:?} already exists", name)));
        }
        let mut column = Column::new(name, data_type);
        column.resize(self.max_row_id as usize);
        self.columns.push(column);
        Ok(self.columns.last_mut().unwrap())
    }

    /// At most one key column per table (spec.md §3).
    pub fn mark_key_column(&mut self, name: &str) -> CoreResult<()> {
        if self.key_column.is_some() {
            return Err(CoreError::InvalidOperation("table already has a key column".into()));
        }
        let idx = self.find_column_index(name).ok_or_else(|| CoreError::NotFound(name.to_string()))?;
        self.columns[idx].mark_key()?;
        self.key_column = Some(idx);
        Ok(())
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn find_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name() == name)
    }

    fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Insert a new row, growing every column by one and returning the
    /// freshly minted row id. If this table has a key column, `key`
    /// must be `Some` and unique (checked the same way `Column::set`
    /// checks key uniqueness); otherwise `key` must be `None`.
    pub fn insert_row(&mut self, key: Option<Datum<'_>>) -> CoreResult<Int> {
        match (self.key_column, &key) {
            (Some(_), None) => {
                return Err(CoreError::InvalidOperation(
                    "table has a key column; insert_row requires a key value".into(),
                ))
            }
            (None, Some(_)) => {
                return Err(CoreError::InvalidOperation(
                    "table has no key column; insert_row must not be given a key value".into(),
                ))
            }
            _ => {}
        }

        self.max_row_id += 1;
        let row_id = Int::new(self.max_row_id);
        for column in &mut self.columns {
            column.resize(self.max_row_id as usize);
        }
        if let (Some(idx), Some(key_value)) = (self.key_column, key) {
            if let Err(e) = self.columns[idx].set(row_id, key_value, |_| true, |_| true) {
                // Roll back the row entirely: no column has this row
                // marked live for readers since max_row_id already
                // counts it, so mark it removed before surfacing the error.
                self.removed.insert(self.max_row_id);
                return Err(e);
            }
        }
        debug!("table {:?}: inserted row {:?}", self.name, row_id);
        Ok(row_id)
    }

    /// `remove_row(t, r)` (spec.md §8 invariant 6): permanently retires
    /// `row_id` and cascades reference-clearing across every reference
    /// column of this table that targets it. Cross-table references
    /// are out of scope here — spec.md §6 reduces "Catalog" to
    /// `Table`'s own inherent methods, so clearing references living
    /// in a *different* table is the responsibility of whatever owns
    /// both tables (a database/catalog layer this engine doesn't
    /// define).
    pub fn remove_row(&mut self, row_id: Int) -> CoreResult<()> {
        if !self.test_row(row_id) {
            return Err(CoreError::NotFound(format!("row {:?} is not live", row_id)));
        }
        self.removed.insert(row_id.raw());
        for column in &mut self.columns {
            column.clear_references(row_id);
        }
        debug!("table {:?}: removed row {:?}", self.name, row_id);
        Ok(())
    }

    pub fn create_cursor(&self, options: CursorOptions) -> TableCursor<'_> {
        TableCursor::new(self, options)
    }
}
