//! `Datum`: a tagged sum over all ten data types (spec.md §9's
//! "Tagged sum for Datum" recommendation), used by
//! `ExpressionBuilder::push_constant` and column `get`/`set`.

use super::data_type::DataType;
use super::scalar::{Bool, Float, GeoPoint, Int};
use super::text::Text;
use super::vector::{BoolVector, Vector};

/// Not `Copy`: the vector variants hold a `Vector<'a, T>`, which may
/// own its elements (`Cow::Owned`, built for `Vector<Text>` column
/// reads — see `value/vector.rs`) and so cannot be bitwise-duplicated.
#[derive(Clone, Debug)]
pub enum Datum<'a> {
    Bool(Bool),
    Int(Int),
    Float(Float),
    GeoPoint(GeoPoint),
    Text(Text<'a>),
    BoolVector(BoolVector),
    IntVector(Vector<'a, Int>),
    FloatVector(Vector<'a, Float>),
    GeoPointVector(Vector<'a, GeoPoint>),
    TextVector(Vector<'a, Text<'a>>),
}

impl<'a> Datum<'a> {
    pub fn data_type(&self) -> DataType {
        match self {
            Datum::Bool(_) => DataType::Bool,
            Datum::Int(_) => DataType::Int,
            Datum::Float(_) => DataType::Float,
            Datum::GeoPoint(_) => DataType::GeoPoint,
            Datum::Text(_) => DataType::Text,
            Datum::BoolVector(_) => DataType::BoolVector,
            Datum::IntVector(_) => DataType::IntVector,
            Datum::FloatVector(_) => DataType::FloatVector,
            Datum::GeoPointVector(_) => DataType::GeoPointVector,
            Datum::TextVector(_) => DataType::TextVector,
        }
    }

    pub fn as_bool(&self) -> Option<Bool> {
        match self {
            Datum::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<Int> {
        match self {
            Datum::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<Float> {
        match self {
            Datum::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_geo_point(&self) -> Option<GeoPoint> {
        match self {
            Datum::GeoPoint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<Text<'a>> {
        match self {
            Datum::Text(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool_vector(&self) -> Option<BoolVector> {
        match self {
            Datum::BoolVector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int_vector(&self) -> Option<Vector<'a, Int>> {
        match self {
            Datum::IntVector(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_float_vector(&self) -> Option<Vector<'a, Float>> {
        match self {
            Datum::FloatVector(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_geo_point_vector(&self) -> Option<Vector<'a, GeoPoint>> {
        match self {
            Datum::GeoPointVector(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_text_vector(&self) -> Option<Vector<'a, Text<'a>>> {
        match self {
            Datum::TextVector(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl<'a> From<Bool> for Datum<'a> {
    fn from(v: Bool) -> Self {
        Datum::Bool(v)
    }
}

impl<'a> From<Int> for Datum<'a> {
    fn from(v: Int) -> Self {
        Datum::Int(v)
    }
}

impl<'a> From<Float> for Datum<'a> {
    fn from(v: Float) -> Self {
        Datum::Float(v)
    }
}

impl<'a> From<GeoPoint> for Datum<'a> {
    fn from(v: GeoPoint) -> Self {
        Datum::GeoPoint(v)
    }
}

impl<'a> From<Text<'a>> for Datum<'a> {
    fn from(v: Text<'a>) -> Self {
        Datum::Text(v)
    }
}
