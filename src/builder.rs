//! `ExpressionBuilder`: stack-based construction with subexpression
//! scoping (spec.md §4.F), grounded on
//! `original_source/lib/grnxx/impl/expression.cpp`'s builder pattern —
//! reshaped to push `Node` variants directly rather than building one
//! C++ class instance per operator.
//!
//! This engine has no database/catalog layer linking a reference
//! column to the `Table` it targets (spec.md §6 reduces "Catalog" to
//! `Table`'s own inherent methods) — so unlike a column's *name*,
//! which `Table::find_column` resolves on its own, a reference
//! column's *target table* must be supplied by the caller building the
//! expression, who knows the schema. `push_column` takes it as an
//! explicit argument.

use crate::errors::{CoreError, CoreResult};
use crate::expr::{BinaryOp, Node, UnaryOp};
use crate::expression::{Expression, ExpressionOptions};
use crate::table::Table;
use crate::value::{DataType, Datum};

/// An operator to push via [`ExpressionBuilder::push_operator`].
/// `Positive` is kept distinct because spec.md §4.E gives it no node:
/// it only validates its operand's type and leaves it on the stack.
#[derive(Copy, Clone, Debug)]
pub enum OperatorKind {
    Positive,
    Unary(UnaryOp),
    Binary(BinaryOp),
}

pub struct ExpressionBuilder<'a> {
    frames: Vec<Vec<Node<'a>>>,
    current_tables: Vec<&'a Table>,
    ref_tables: Vec<&'a Table>,
}

impl<'a> ExpressionBuilder<'a> {
    pub fn new(root_table: &'a Table) -> Self {
        ExpressionBuilder {
            frames: vec![Vec::new()],
            current_tables: vec![root_table],
            ref_tables: Vec::new(),
        }
    }

    fn top(&mut self) -> &mut Vec<Node<'a>> {
        self.frames.last_mut().expect("frames is never empty")
    }

    pub fn push_constant(&mut self, datum: Datum<'a>) {
        self.top().push(Node::Constant(datum));
    }

    pub fn push_row_id(&mut self) {
        self.top().push(Node::RowId);
    }

    pub fn push_score(&mut self) {
        self.top().push(Node::Score);
    }

    /// `reference_target` must be `Some` iff the column is a reference
    /// column (see module docs).
    pub fn push_column(&mut self, name: &str, reference_target: Option<&'a Table>) -> CoreResult<()> {
        let table = *self.current_tables.last().expect("current_tables is never empty");
        let column = table.find_column(name).ok_or_else(|| CoreError::NotFound(name.to_string()))?;
        if column.is_reference() != reference_target.is_some() {
            return Err(CoreError::InvalidOperation(format!(
                "column {:?}: reference_target must be given if and only if it is a reference column",
                name
            )));
        }
        self.top().push(Node::Column {
            column,
            reference_table: reference_target,
        });
        Ok(())
    }

    fn pop(&mut self) -> CoreResult<Node<'a>> {
        self.top()
            .pop()
            .ok_or_else(|| CoreError::InvalidOperation("operand stack is empty".into()))
    }

    pub fn push_operator(&mut self, op: OperatorKind) -> CoreResult<()> {
        match op {
            OperatorKind::Positive => {
                let top = self
                    .top()
                    .last()
                    .ok_or_else(|| CoreError::InvalidOperation("operand stack is empty".into()))?;
                match top.data_type() {
                    DataType::Int | DataType::Float => Ok(()),
                    other => Err(CoreError::TypeMismatch {
                        expected: DataType::Float,
                        found: other,
                    }),
                }
            }
            OperatorKind::Unary(u) => {
                let arg = self.pop()?;
                let data_type = u.result_type(arg.data_type()).ok_or(CoreError::TypeMismatch {
                    expected: DataType::Bool,
                    found: arg.data_type(),
                })?;
                self.top().push(Node::Unary {
                    op: u,
                    data_type,
                    arg: Box::new(arg),
                });
                Ok(())
            }
            OperatorKind::Binary(b) => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                let data_type = b.result_type(lhs.data_type(), rhs.data_type()).ok_or(CoreError::TypeMismatch {
                    expected: lhs.data_type(),
                    found: rhs.data_type(),
                })?;
                self.top().push(Node::Binary {
                    op: b,
                    data_type,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                });
                Ok(())
            }
        }
    }

    /// The top of stack must expose a non-null `reference_table()`
    /// (spec.md §4.F); subsequent pushes go to a nested frame rooted
    /// at that table until [`Self::end_subexpression`].
    pub fn begin_subexpression(&mut self) -> CoreResult<()> {
        let top = self
            .top()
            .last()
            .ok_or_else(|| CoreError::InvalidOperation("begin_subexpression requires an operand on the stack".into()))?;
        let target = top
            .reference_table()
            .ok_or_else(|| CoreError::InvalidOperation("top of stack is not a reference-column node".into()))?;
        self.ref_tables.push(target);
        self.current_tables.push(target);
        self.frames.push(Vec::new());
        Ok(())
    }

    /// `block_size` is accepted for fidelity with spec.md §4.F's
    /// `end_subexpression(options)`, but unused: the original needed
    /// it to batch evaluation through a growing arena pool for
    /// `VECTOR_DEREFERENCE`, and this engine's `Vector` is `Cow`-backed
    /// (see `value/vector.rs`) and so never needs that pool.
    pub fn end_subexpression(&mut self, _block_size: usize) -> CoreResult<()> {
        if self.frames.len() < 2 {
            return Err(CoreError::InvalidOperation(
                "end_subexpression without a matching begin_subexpression".into(),
            ));
        }
        let mut inner = self.frames.pop().unwrap();
        self.current_tables.pop();
        let table = self.ref_tables.pop().unwrap();
        if inner.len() != 1 {
            return Err(CoreError::InvalidOperation(
                "a subexpression must reduce to exactly one node before end_subexpression".into(),
            ));
        }
        let child = inner.pop().unwrap();
        let reference = self.pop().expect("begin_subexpression verified a reference node was on top");
        let node = match reference.data_type() {
            DataType::Int => Node::Dereference {
                reference: Box::new(reference),
                table,
                child: Box::new(child),
            },
            DataType::IntVector => Node::VectorDereference {
                element_type: child.data_type(),
                reference: Box::new(reference),
                table,
                child: Box::new(child),
            },
            other => {
                return Err(CoreError::TypeMismatch {
                    expected: DataType::Int,
                    found: other,
                })
            }
        };
        self.top().push(node);
        Ok(())
    }

    pub fn clear(&mut self) {
        let root = self.current_tables[0];
        self.frames = vec![Vec::new()];
        self.current_tables = vec![root];
        self.ref_tables.clear();
    }

    /// The stack must hold exactly one node (spec.md §4.F).
    pub fn release(mut self, options: ExpressionOptions) -> CoreResult<Expression<'a>> {
        if self.frames.len() != 1 {
            return Err(CoreError::InvalidOperation(
                "release called with an unclosed subexpression".into(),
            ));
        }
        let mut root_frame = self.frames.pop().unwrap();
        if root_frame.len() != 1 {
            return Err(CoreError::InvalidOperation(format!(
                "release requires exactly one node on the stack, found {}",
                root_frame.len()
            )));
        }
        Ok(Expression::new(root_frame.pop().unwrap(), options))
    }
}
