//! Typed value model with N/A (missing) semantics (spec.md §3/§4.A).

mod data_type;
mod datum;
mod scalar;
mod text;
mod vector;

pub use data_type::DataType;
pub use datum::Datum;
pub use scalar::{Bool, Float, GeoPoint, Int};
pub use text::Text;
pub use vector::{BoolVector, Vector};
