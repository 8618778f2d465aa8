//! Error taxonomy for the core engine (spec.md §7).
//!
//! Arithmetic anomalies (overflow, division by zero, out-of-range
//! casts) are never errors here — they produce an N/A value. Only
//! structural failures (bad types at build time, missing
//! columns/indexes, constraint violations) are surfaced through
//! [`CoreError`].

use thiserror::Error;

use crate::value::DataType;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("type mismatch: expected {expected:?}, found {found:?}")]
    TypeMismatch { expected: DataType, found: DataType },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("key duplicate: value already present in key column")]
    KeyDuplicate,

    #[error("invalid reference: row id does not live in the target table")]
    InvalidReference,

    #[error("out of memory while growing scratch buffers")]
    OutOfMemory,
}
