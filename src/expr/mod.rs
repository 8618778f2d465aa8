//! The typed expression tree (spec.md §4.E), grounded on
//! `original_source/lib/grnxx/expression2.cpp` and
//! `original_source/lib/grnxx/impl/expression.cpp`'s node taxonomy
//! (constant/row-id/score/column leaves, unary/binary operators,
//! subscript, dereference) — reshaped from one C++ class per
//! operator×type into a single recursive `Node` enum plus a
//! `match` on operator in [`operator`], per spec.md §9's explicit
//! license for that simplification.

pub mod operator;

use crate::column::Column;
use crate::errors::{CoreError, CoreResult};
use crate::record::{Record, RecordSet};
use crate::table::Table;
use crate::value::{DataType, Datum, Vector};

pub use operator::{BinaryOp, UnaryOp};

/// Coarse node kind exposed to callers (spec.md §4.E). Distinct from
/// `DataType`: every operator variant, regardless of arity or result
/// type, reports `Operator`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeType {
    Constant,
    RowId,
    Score,
    Column,
    Operator,
}

/// A node in the expression tree, generic over the lifetime of the
/// tables/columns it borrows (spec.md §3 "Lifecycles": the expression
/// borrows columns, never owns them).
#[derive(Debug)]
pub enum Node<'a> {
    Constant(Datum<'a>),
    RowId,
    Score,
    Column {
        column: &'a Column,
        reference_table: Option<&'a Table>,
    },
    Unary {
        op: UnaryOp,
        data_type: DataType,
        arg: Box<Node<'a>>,
    },
    Binary {
        op: BinaryOp,
        data_type: DataType,
        lhs: Box<Node<'a>>,
        rhs: Box<Node<'a>>,
    },
    /// `Int.child`: `reference` is an Int reference-column node
    /// targeting `table`; `child` is evaluated over a temporary record
    /// set built from the dereferenced row ids (spec.md §4.E).
    Dereference {
        reference: Box<Node<'a>>,
        table: &'a Table,
        child: Box<Node<'a>>,
    },
    /// `Vector<Int>.child`: one `child` evaluation per target row id,
    /// collected into an owned `Vector<T>` per input record. Builds
    /// owned vectors directly via `Vector::from_owned` rather than the
    /// growing result-arena pool spec.md §4.E/§5 describes for the
    /// original raw-pointer-based `Vector<T>` — `Vector`'s `Cow`
    /// backing (see `value/vector.rs`) already lets an owned vector
    /// outlive any particular borrow, so no arena bookkeeping is
    /// needed for correctness.
    VectorDereference {
        reference: Box<Node<'a>>,
        table: &'a Table,
        child: Box<Node<'a>>,
        element_type: DataType,
    },
}

impl<'a> Node<'a> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Constant(_) => NodeType::Constant,
            Node::RowId => NodeType::RowId,
            Node::Score => NodeType::Score,
            Node::Column { .. } => NodeType::Column,
            Node::Unary { .. } | Node::Binary { .. } | Node::Dereference { .. } | Node::VectorDereference { .. } => {
                NodeType::Operator
            }
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Node::Constant(d) => d.data_type(),
            Node::RowId => DataType::Int,
            Node::Score => DataType::Float,
            Node::Column { column, .. } => column.data_type(),
            Node::Unary { data_type, .. } => *data_type,
            Node::Binary { data_type, .. } => *data_type,
            Node::Dereference { child, .. } => child.data_type(),
            Node::VectorDereference { element_type, .. } => {
                operator::vector_type_of(*element_type).expect("element_type is always scalar")
            }
        }
    }

    /// Non-null only for an Int/IntVector reference-column node
    /// (spec.md §4.E: "Exposes reference_table() when T = Int and the
    /// column is a reference column").
    pub fn reference_table(&self) -> Option<&'a Table> {
        match self {
            Node::Column { reference_table, .. } => *reference_table,
            _ => None,
        }
    }

    /// `evaluate(in, out)` (spec.md §4.E): `out[i]` corresponds to
    /// `in[i]`.
    pub fn evaluate(&self, records: &[Record]) -> CoreResult<Vec<Datum<'a>>> {
        match self {
            Node::Constant(d) => Ok(records.iter().map(|_| d.clone()).collect()),
            Node::RowId => Ok(records.iter().map(|r| Datum::Int(r.row_id)).collect()),
            Node::Score => Ok(records.iter().map(|r| Datum::Float(r.score)).collect()),
            Node::Column { column, .. } => Ok(records.iter().map(|r| column.get(r.row_id)).collect()),
            Node::Unary { op, arg, .. } => {
                let args = arg.evaluate(records)?;
                args.into_iter().map(|v| operator::apply_unary(*op, v)).collect()
            }
            Node::Binary { op, lhs, rhs, .. } if *op == BinaryOp::Subscript => {
                let vectors = lhs.evaluate(records)?;
                let indices = rhs.evaluate(records)?;
                vectors
                    .into_iter()
                    .zip(indices)
                    .map(|(v, i)| subscript(v, i))
                    .collect()
            }
            Node::Binary { op, lhs, rhs, .. } => {
                let lvals = lhs.evaluate(records)?;
                let rvals = rhs.evaluate(records)?;
                lvals
                    .into_iter()
                    .zip(rvals)
                    .map(|(l, r)| operator::apply_binary(*op, l, r))
                    .collect()
            }
            Node::Dereference { reference, table, child } => {
                let targets = reference.evaluate(records)?;
                let temp: Vec<Record> = targets
                    .iter()
                    .zip(records)
                    .map(|(t, r)| Record::new(t.as_int().unwrap_or_default(), r.score))
                    .collect();
                let _ = table;
                child.evaluate(&temp)
            }
            Node::VectorDereference {
                reference,
                table: _,
                child,
                element_type,
            } => {
                let vectors = reference.evaluate(records)?;
                let mut out = Vec::with_capacity(records.len());
                for (v, rec) in vectors.iter().zip(records) {
                    out.push(evaluate_vector_dereference(v, rec.score, child, *element_type)?);
                }
                Ok(out)
            }
        }
    }

    /// `filter(in, out)` (spec.md §4.E): only defined for Bool-valued
    /// nodes; keeps records whose value is strictly true, in order.
    pub fn filter(&self, records: &[Record]) -> CoreResult<RecordSet> {
        if self.data_type() != DataType::Bool {
            return Err(CoreError::InvalidOperation("filter is only defined for Bool-valued nodes".into()));
        }
        match self {
            Node::Unary { op: UnaryOp::LogicalNot, arg, .. } => {
                let kept = arg.filter(records)?;
                Ok(not_merge(records, &kept))
            }
            Node::Binary { op: BinaryOp::LogicalAnd, lhs, rhs, .. } => {
                let stage1 = lhs.filter(records)?;
                rhs.filter(stage1.as_slice())
            }
            Node::Binary { op: BinaryOp::LogicalOr, lhs, rhs, .. } => {
                let true_set = lhs.filter(records)?;
                if true_set.len() == records.len() {
                    return Ok(true_set);
                }
                let false_set: Vec<Record> = records
                    .iter()
                    .filter(|r| !true_set.as_slice().iter().any(|k| k.row_id.match_(r.row_id)))
                    .copied()
                    .collect();
                if false_set.is_empty() {
                    return Ok(true_set);
                }
                let rhs_true = rhs.filter(&false_set)?;
                Ok(merge_preserving_order(records, &true_set, &rhs_true))
            }
            _ => {
                let values = self.evaluate(records)?;
                let kept: Vec<Record> = records
                    .iter()
                    .zip(values)
                    .filter(|(_, v)| v.as_bool().map(|b| b.is_true()).unwrap_or(false))
                    .map(|(r, _)| *r)
                    .collect();
                Ok(RecordSet::from(kept))
            }
        }
    }

    /// `adjust(records)` (spec.md §4.E): only defined for Float-valued
    /// nodes; writes each record's score in place.
    pub fn adjust(&self, records: &mut RecordSet) -> CoreResult<()> {
        if self.data_type() != DataType::Float {
            return Err(CoreError::InvalidOperation("adjust is only defined for Float-valued nodes".into()));
        }
        let values = self.evaluate(records.as_slice())?;
        for (i, v) in values.into_iter().enumerate() {
            records.set_score(i, v.as_float().expect("data_type()==Float checked above"));
        }
        Ok(())
    }
}

fn subscript<'a>(vector: Datum<'a>, index: Datum<'a>) -> CoreResult<Datum<'a>> {
    let idx = index.as_int().ok_or_else(|| CoreError::TypeMismatch {
        expected: DataType::Int,
        found: index.data_type(),
    })?;
    Ok(match vector {
        Datum::BoolVector(v) => Datum::Bool(v.get(idx)),
        Datum::IntVector(v) => Datum::Int(v.get(idx).unwrap_or_default()),
        Datum::FloatVector(v) => Datum::Float(v.get(idx).unwrap_or_else(crate::value::Float::na)),
        Datum::GeoPointVector(v) => Datum::GeoPoint(v.get(idx).unwrap_or_else(crate::value::GeoPoint::na)),
        Datum::TextVector(v) => Datum::Text(v.get(idx).unwrap_or_else(crate::value::Text::na)),
        other => {
            return Err(CoreError::TypeMismatch {
                expected: DataType::IntVector,
                found: other.data_type(),
            })
        }
    })
}

fn evaluate_vector_dereference<'a>(
    vector: &Datum<'a>,
    score: crate::value::Float,
    child: &Node<'a>,
    element_type: DataType,
) -> CoreResult<Datum<'a>> {
    let targets = vector.as_int_vector().ok_or_else(|| CoreError::TypeMismatch {
        expected: DataType::IntVector,
        found: vector.data_type(),
    })?;
    let ids: Vec<crate::value::Int> = targets.as_slice().map(|s| s.to_vec()).unwrap_or_default();
    let mut elements = Vec::with_capacity(ids.len());
    for id in ids {
        let temp = [Record::new(id, score)];
        let mut one = child.evaluate(&temp)?;
        elements.push(one.pop().expect("evaluate over one record returns one value"));
    }
    Ok(match element_type {
        DataType::Bool => Datum::BoolVector(crate::value::BoolVector::from_bools(
            elements.into_iter().map(|d| d.as_bool().unwrap_or_default().is_true()),
        )),
        DataType::Int => Datum::IntVector(Vector::from_owned(
            elements.into_iter().map(|d| d.as_int().unwrap_or_default()).collect(),
        )),
        DataType::Float => Datum::FloatVector(Vector::from_owned(
            elements
                .into_iter()
                .map(|d| d.as_float().unwrap_or_else(crate::value::Float::na))
                .collect(),
        )),
        DataType::GeoPoint => Datum::GeoPointVector(Vector::from_owned(
            elements
                .into_iter()
                .map(|d| d.as_geo_point().unwrap_or_else(crate::value::GeoPoint::na))
                .collect(),
        )),
        DataType::Text => Datum::TextVector(Vector::from_owned(
            elements.into_iter().map(|d| d.as_text().unwrap_or_else(crate::value::Text::na)).collect(),
        )),
        other => {
            return Err(CoreError::InvalidOperation(format!(
                "{:?} cannot be the element type of a vector dereference",
                other
            )))
        }
    })
}

/// `LOGICAL_NOT` filter (spec.md §4.E): records from `records` whose
/// row id is absent from `kept`. `kept` is always a subsequence of
/// `records` in the same relative order, so `j` advances positionally
/// on an exact row-id match rather than on magnitude — this makes the
/// merge order-agnostic, matching records produced by a `Reverse`
/// cursor (descending row id) as well as an ascending one.
fn not_merge(records: &[Record], kept: &RecordSet) -> RecordSet {
    let kept = kept.as_slice();
    let mut out = Vec::with_capacity(records.len());
    let mut j = 0;
    for r in records {
        if j < kept.len() && kept[j].row_id.raw() == r.row_id.raw() {
            j += 1;
        } else {
            out.push(*r);
        }
    }
    RecordSet::from(out)
}

/// Merge two already-ascending-row-id subsequences of `records` back
/// into `records`' relative order (spec.md §4.E's `LOGICAL_OR` filter).
fn merge_preserving_order(records: &[Record], a: &RecordSet, b: &RecordSet) -> RecordSet {
    let a = a.as_slice();
    let b = b.as_slice();
    let mut ai = 0;
    let mut bi = 0;
    let mut out = Vec::with_capacity(a.len() + b.len());
    for r in records {
        let from_a = ai < a.len() && a[ai].row_id.raw() == r.row_id.raw();
        let from_b = bi < b.len() && b[bi].row_id.raw() == r.row_id.raw();
        if from_a {
            ai += 1;
        }
        if from_b {
            bi += 1;
        }
        if from_a || from_b {
            out.push(*r);
        }
    }
    RecordSet::from(out)
}
