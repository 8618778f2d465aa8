//! Cursors: the pull-based iteration contract over a table's live rows
//! (spec.md §6's "Cursor factory": `Table::create_cursor()` yielding
//! records in ascending row id; `Cursor::read(max, &mut records)`
//! appending up to `max` records and returning the count appended, 0
//! meaning exhausted).

use crate::record::{Record, RecordSet};
use crate::table::Table;
use crate::value::{Float, Int};

/// Row order a cursor walks in (spec.md §6).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum OrderType {
    #[default]
    Regular,
    Reverse,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct CursorOptions {
    pub offset: usize,
    pub limit: Option<usize>,
    pub order_type: OrderType,
}

impl CursorOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A pull-based source of [`Record`]s. `read` appends up to `max`
/// records to `records` and returns how many were appended; 0 means
/// exhausted.
pub trait Cursor {
    fn read(&mut self, max: usize, records: &mut RecordSet) -> usize;
}

/// Walks a table's live row ids in ascending or descending order,
/// honoring `offset`/`limit` (spec.md §6's `CursorOptions`).
pub struct TableCursor<'a> {
    table: &'a Table,
    remaining: Box<dyn Iterator<Item = i64> + 'a>,
}

impl<'a> TableCursor<'a> {
    pub fn new(table: &'a Table, options: CursorOptions) -> Self {
        let live_ids: Vec<i64> = match options.order_type {
            OrderType::Regular => (1..=table.max_row_id().raw())
                .filter(|&id| table.test_row(Int::new(id)))
                .collect(),
            OrderType::Reverse => (1..=table.max_row_id().raw())
                .rev()
                .filter(|&id| table.test_row(Int::new(id)))
                .collect(),
        };
        let page: Vec<i64> = match options.limit {
            Some(n) => live_ids.into_iter().skip(options.offset).take(n).collect(),
            None => live_ids.into_iter().skip(options.offset).collect(),
        };
        TableCursor {
            table,
            remaining: Box::new(page.into_iter()),
        }
    }
}

impl<'a> Cursor for TableCursor<'a> {
    fn read(&mut self, max: usize, records: &mut RecordSet) -> usize {
        let _ = self.table;
        let mut count = 0;
        for _ in 0..max {
            match self.remaining.next() {
                Some(id) => {
                    records.push(Record::new(Int::new(id), Float::new(0.0)));
                    count += 1;
                }
                None => break,
            }
        }
        count
    }
}
