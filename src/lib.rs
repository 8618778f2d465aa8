//! `grnxx_core`: a columnar in-memory analytical table engine — typed
//! values with N/A semantics, dense column storage, ordered tree
//! indexes and a vectorised expression tree (spec.md §§1-9). Grounded
//! on `camdencheek-sqlite_rs` for module layout and error/logging
//! conventions, with core semantics ported from
//! `original_source/lib/grnxx/{column,calc_impl,expression2}.cpp` and
//! `original_source/include/grnxx/data_types/*`.

pub mod builder;
pub mod column;
pub mod cursor;
pub mod errors;
pub mod expr;
pub mod expression;
pub mod index;
pub mod record;
pub mod table;
pub mod value;

pub use builder::{ExpressionBuilder, OperatorKind};
pub use column::Column;
pub use cursor::{Cursor, CursorOptions, OrderType, TableCursor};
pub use errors::{CoreError, CoreResult};
pub use expr::{BinaryOp, UnaryOp};
pub use expression::{Expression, ExpressionOptions};
pub use index::{BoundKind, FloatKey, IndexRange, ScanDirection, TreeIndex};
pub use record::{Record, RecordSet};
pub use table::Table;
pub use value::{Bool, BoolVector, DataType, Datum, Float, GeoPoint, Int, Text, Vector};
