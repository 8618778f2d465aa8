//! Operator enumeration and elementwise scalar semantics (spec.md
//! §4.E). One `match` on operator+type at evaluate entry, per spec.md
//! §9's explicit license: "a strategy-object or generic-over-operator
//! design is equivalent [to the C++ template explosion]; a match...
//! is acceptable if block sizes are large enough".

use crate::errors::{CoreError, CoreResult};
use crate::value::{Datum, DataType};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    LogicalNot,
    BitwiseNot,
    Negative,
    ToInt,
    ToFloat,
}

impl UnaryOp {
    /// Result type for a given argument type, or `None` if this
    /// operator does not accept that argument (spec.md §4.E's unary
    /// operator table; `POSITIVE` is omitted — the builder treats it
    /// as identity with no node inserted).
    pub fn result_type(self, arg: DataType) -> Option<DataType> {
        use DataType::*;
        match (self, arg) {
            (UnaryOp::LogicalNot, Bool) => Some(Bool),
            (UnaryOp::BitwiseNot, Bool) => Some(Bool),
            (UnaryOp::BitwiseNot, Int) => Some(Int),
            (UnaryOp::Negative, Int) => Some(Int),
            (UnaryOp::Negative, Float) => Some(Float),
            (UnaryOp::ToInt, Float) => Some(Int),
            (UnaryOp::ToFloat, Int) => Some(Float),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    LogicalAnd,
    LogicalOr,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Plus,
    Minus,
    Multiplication,
    Division,
    Modulus,
    StartsWith,
    EndsWith,
    Contains,
    Subscript,
}

impl BinaryOp {
    /// Result type for a pair of argument types, or `None` if invalid
    /// (spec.md §4.E's binary operator table). No implicit numeric
    /// conversion: `lhs`/`rhs` must already agree except for
    /// `SUBSCRIPT`, whose `rhs` is always `Int`.
    pub fn result_type(self, lhs: DataType, rhs: DataType) -> Option<DataType> {
        use BinaryOp::*;
        use DataType::*;
        match self {
            LogicalAnd | LogicalOr => (lhs == Bool && rhs == Bool).then_some(Bool),
            Equal | NotEqual => (lhs == rhs).then_some(Bool),
            Less | LessEqual | Greater | GreaterEqual => {
                (lhs == rhs && lhs.is_orderable()).then_some(Bool)
            }
            BitwiseAnd | BitwiseOr | BitwiseXor => match (lhs, rhs) {
                (Bool, Bool) => Some(Bool),
                (Int, Int) => Some(Int),
                _ => None,
            },
            Plus | Minus | Multiplication | Division | Modulus => match (lhs, rhs) {
                (Int, Int) => Some(Int),
                (Float, Float) => Some(Float),
                _ => None,
            },
            StartsWith | EndsWith | Contains => (lhs == Text && rhs == Text).then_some(Bool),
            Subscript => {
                if rhs != Int {
                    return None;
                }
                element_type(lhs)
            }
        }
    }
}

/// The scalar element type of a vector type, or `None` for a scalar
/// type (used by `SUBSCRIPT`'s result-type rule).
pub fn element_type(vector_type: DataType) -> Option<DataType> {
    use DataType::*;
    match vector_type {
        BoolVector => Some(Bool),
        IntVector => Some(Int),
        FloatVector => Some(Float),
        GeoPointVector => Some(GeoPoint),
        TextVector => Some(Text),
        _ => None,
    }
}

/// The vector type whose elements are `element_type`, or `None` if
/// `element_type` is itself a vector type (used by `VECTOR_DEREFERENCE`
/// to pick the output `Datum` variant).
pub fn vector_type_of(element_type: DataType) -> Option<DataType> {
    use DataType::*;
    match element_type {
        Bool => Some(BoolVector),
        Int => Some(IntVector),
        Float => Some(FloatVector),
        GeoPoint => Some(GeoPointVector),
        Text => Some(TextVector),
        _ => None,
    }
}

/// Elementwise unary application (spec.md §4.A for per-type N/A
/// propagation). Caller guarantees `op.result_type(v.data_type())` is
/// `Some` — the builder never constructs a mismatched node.
pub fn apply_unary<'a>(op: UnaryOp, v: Datum<'a>) -> CoreResult<Datum<'a>> {
    let mismatch = || {
        CoreError::TypeMismatch {
            expected: DataType::Bool,
            found: v.data_type(),
        }
    };
    Ok(match (op, v) {
        (UnaryOp::LogicalNot, Datum::Bool(b)) => Datum::Bool(b.not()),
        (UnaryOp::BitwiseNot, Datum::Bool(b)) => Datum::Bool(b.not()),
        (UnaryOp::BitwiseNot, Datum::Int(i)) => Datum::Int(i.not()),
        (UnaryOp::Negative, Datum::Int(i)) => Datum::Int(i.neg()),
        (UnaryOp::Negative, Datum::Float(f)) => Datum::Float(f.neg()),
        (UnaryOp::ToInt, Datum::Float(f)) => Datum::Int(f.to_int()),
        (UnaryOp::ToFloat, Datum::Int(i)) => Datum::Float(i.to_float()),
        _ => return Err(mismatch()),
    })
}

/// Elementwise binary application for every operator except
/// `SUBSCRIPT`, which needs the vector's full slice rather than a
/// single `Datum` and is handled directly in `expr::Node::evaluate`.
pub fn apply_binary<'a>(op: BinaryOp, l: Datum<'a>, r: Datum<'a>) -> CoreResult<Datum<'a>> {
    use BinaryOp::*;
    let mismatch = || CoreError::TypeMismatch {
        expected: l.data_type(),
        found: r.data_type(),
    };
    Ok(match op {
        LogicalAnd => Datum::Bool(l.as_bool().ok_or_else(mismatch)?.and(r.as_bool().ok_or_else(mismatch)?)),
        LogicalOr => Datum::Bool(l.as_bool().ok_or_else(mismatch)?.or(r.as_bool().ok_or_else(mismatch)?)),
        Equal => Datum::Bool(datum_match_bool(&l, &r)),
        NotEqual => Datum::Bool(datum_match_bool(&l, &r).not()),
        Less => datum_order(&l, &r, |o| matches!(o, std::cmp::Ordering::Less))?,
        LessEqual => datum_order(&l, &r, |o| o != std::cmp::Ordering::Greater)?,
        Greater => datum_order(&l, &r, |o| matches!(o, std::cmp::Ordering::Greater))?,
        GreaterEqual => datum_order(&l, &r, |o| o != std::cmp::Ordering::Less)?,
        BitwiseAnd => match (l, r) {
            (Datum::Bool(a), Datum::Bool(b)) => Datum::Bool(a.and(b)),
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(a.bitand(b)),
            _ => return Err(mismatch()),
        },
        BitwiseOr => match (l, r) {
            (Datum::Bool(a), Datum::Bool(b)) => Datum::Bool(a.or(b)),
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(a.bitor(b)),
            _ => return Err(mismatch()),
        },
        BitwiseXor => match (l, r) {
            (Datum::Bool(a), Datum::Bool(b)) => Datum::Bool(a.xor(b)),
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(a.bitxor(b)),
            _ => return Err(mismatch()),
        },
        Plus => match (l, r) {
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(a.add(b)),
            (Datum::Float(a), Datum::Float(b)) => Datum::Float(a.add(b)),
            _ => return Err(mismatch()),
        },
        Minus => match (l, r) {
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(a.sub(b)),
            (Datum::Float(a), Datum::Float(b)) => Datum::Float(a.sub(b)),
            _ => return Err(mismatch()),
        },
        Multiplication => match (l, r) {
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(a.mul(b)),
            (Datum::Float(a), Datum::Float(b)) => Datum::Float(a.mul(b)),
            _ => return Err(mismatch()),
        },
        Division => match (l, r) {
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(a.div(b)),
            (Datum::Float(a), Datum::Float(b)) => Datum::Float(a.div(b)),
            _ => return Err(mismatch()),
        },
        Modulus => match (l, r) {
            (Datum::Int(a), Datum::Int(b)) => Datum::Int(a.rem(b)),
            (Datum::Float(a), Datum::Float(b)) => Datum::Float(a.rem(b)),
            _ => return Err(mismatch()),
        },
        StartsWith => Datum::Bool(as_text(&l)?.starts_with(as_text(&r)?)),
        EndsWith => Datum::Bool(as_text(&l)?.ends_with(as_text(&r)?)),
        Contains => Datum::Bool(as_text(&l)?.contains(as_text(&r)?)),
        Subscript => {
            return Err(CoreError::InvalidOperation(
                "SUBSCRIPT is evaluated directly by expr::Node, not apply_binary".into(),
            ))
        }
    })
}

fn as_text<'a>(d: &Datum<'a>) -> CoreResult<crate::value::Text<'a>> {
    d.as_text().ok_or_else(|| CoreError::TypeMismatch {
        expected: DataType::Text,
        found: d.data_type(),
    })
}

/// `match_`-based total equality (N/A matches N/A), used for `EQUAL`
/// across every data type including vectors, which have no dedicated
/// three-valued `eq3` (spec.md §4.A only defines `eq3` for scalars).
fn datum_match_bool(a: &Datum<'_>, b: &Datum<'_>) -> crate::value::Bool {
    use crate::value::Bool;
    match (a, b) {
        (Datum::Bool(x), Datum::Bool(y)) => x.eq3(*y),
        (Datum::Int(x), Datum::Int(y)) => x.eq3(*y),
        (Datum::Float(x), Datum::Float(y)) => x.eq3(*y),
        (Datum::GeoPoint(x), Datum::GeoPoint(y)) => x.eq3(*y),
        (Datum::Text(x), Datum::Text(y)) => x.eq3(*y),
        (Datum::BoolVector(x), Datum::BoolVector(y)) => Bool::new(x.match_(*y)),
        (Datum::IntVector(x), Datum::IntVector(y)) => Bool::new(x.match_(y)),
        (Datum::FloatVector(x), Datum::FloatVector(y)) => Bool::new(x.match_(y)),
        (Datum::GeoPointVector(x), Datum::GeoPointVector(y)) => Bool::new(x.match_(y)),
        (Datum::TextVector(x), Datum::TextVector(y)) => Bool::new(x.match_(y)),
        _ => Bool::na(),
    }
}

fn datum_order<'a>(
    a: &Datum<'a>,
    b: &Datum<'a>,
    pred: impl Fn(std::cmp::Ordering) -> bool,
) -> CoreResult<Datum<'a>> {
    use crate::value::Bool;
    Ok(Datum::Bool(match (a, b) {
        (Datum::Int(x), Datum::Int(y)) => {
            if x.is_na() || y.is_na() {
                Bool::na()
            } else {
                Bool::new(pred(x.raw().cmp(&y.raw())))
            }
        }
        (Datum::Float(x), Datum::Float(y)) => {
            if x.is_na() || y.is_na() {
                Bool::na()
            } else {
                Bool::new(pred(x.raw().partial_cmp(&y.raw()).unwrap()))
            }
        }
        (Datum::Text(x), Datum::Text(y)) => match (x.as_bytes(), y.as_bytes()) {
            (Some(xb), Some(yb)) => Bool::new(pred(xb.cmp(yb))),
            _ => Bool::na(),
        },
        _ => {
            return Err(CoreError::TypeMismatch {
                expected: a.data_type(),
                found: b.data_type(),
            })
        }
    }))
}
