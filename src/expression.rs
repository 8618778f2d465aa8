//! `Expression`: the vectorised driver facade (spec.md §4.G), grounded
//! on `original_source/lib/grnxx/calc_impl.cpp`'s block-oriented
//! evaluate/filter/adjust orchestration. Processes records in chunks
//! of `block_size`, concatenating block outputs in input order
//! (spec.md §5).

use crate::errors::{CoreError, CoreResult};
use crate::expr::Node;
use crate::record::{Record, RecordSet};
use crate::value::{Bool, BoolVector, DataType, Datum, Float, GeoPoint, Int, Text, Vector};

#[derive(Copy, Clone, Debug)]
pub struct ExpressionOptions {
    pub block_size: usize,
}

impl Default for ExpressionOptions {
    fn default() -> Self {
        ExpressionOptions { block_size: 1024 }
    }
}

/// An immutable, released expression tree (spec.md §3 "Lifecycles":
/// "Expressions are immutable after release; they own all child
/// nodes"). Borrows the tables/columns it was built over.
pub struct Expression<'a> {
    root: Node<'a>,
    options: ExpressionOptions,
}

impl<'a> Expression<'a> {
    pub(crate) fn new(root: Node<'a>, options: ExpressionOptions) -> Self {
        Expression { root, options }
    }

    pub fn data_type(&self) -> DataType {
        self.root.data_type()
    }

    fn require(&self, expected: DataType) -> CoreResult<()> {
        if self.data_type() != expected {
            return Err(CoreError::TypeMismatch {
                expected,
                found: self.data_type(),
            });
        }
        Ok(())
    }

    /// Block-wise filter into a caller-supplied output set; `out` is
    /// shortened to the final selected count (spec.md §4.G).
    pub fn filter(&self, in_slice: &[Record], out: &mut RecordSet) -> CoreResult<()> {
        self.require(DataType::Bool)?;
        out.clear();
        for chunk in in_slice.chunks(self.options.block_size.max(1)) {
            let kept = self.root.filter(chunk)?;
            out.extend_from_slice(kept.as_slice());
        }
        Ok(())
    }

    /// `filter(records, input_offset, output_offset, output_limit)`
    /// (spec.md §6): operates on `records[input_offset..]`, writes
    /// kept records back starting at `input_offset + output_offset`,
    /// keeps at most `output_limit`, and truncates `records` to the
    /// final length.
    pub fn filter_in_place(
        &self,
        records: &mut RecordSet,
        input_offset: usize,
        output_offset: usize,
        output_limit: Option<usize>,
    ) -> CoreResult<()> {
        self.require(DataType::Bool)?;
        let tail_len = records.len() - input_offset;
        let input = records.cref(input_offset, tail_len).to_vec();
        let mut kept = Vec::new();
        for chunk in input.chunks(self.options.block_size.max(1)) {
            let filtered = self.root.filter(chunk)?;
            kept.extend_from_slice(filtered.as_slice());
        }
        if let Some(limit) = output_limit {
            kept.truncate(limit);
        }
        records.truncate(input_offset + output_offset);
        records.extend_from_slice(&kept);
        Ok(())
    }

    /// Block-wise in-place score update over a slice (spec.md §4.G).
    pub fn adjust(&self, slice: &mut [Record]) -> CoreResult<()> {
        self.require(DataType::Float)?;
        for chunk in slice.chunks_mut(self.options.block_size.max(1)) {
            let values = self.root.evaluate(chunk)?;
            for (rec, v) in chunk.iter_mut().zip(values) {
                rec.score = v.as_float().expect("require(Float) checked above");
            }
        }
        Ok(())
    }

    /// `adjust(records, offset)` (spec.md §6): in-place score update
    /// over `records[offset..]`.
    pub fn adjust_in_place(&self, records: &mut RecordSet, offset: usize) -> CoreResult<()> {
        self.require(DataType::Float)?;
        let len = records.len();
        let mut i = offset;
        while i < len {
            let end = (i + self.options.block_size.max(1)).min(len);
            let chunk = records.ref_mut(i, end - i);
            let values = self.root.evaluate(chunk)?;
            for (rec, v) in chunk.iter_mut().zip(values) {
                rec.score = v.as_float().expect("require(Float) checked above");
            }
            i = end;
        }
        Ok(())
    }

    /// `evaluate(records, &mut out_array)` (spec.md §4.G): `out` is
    /// resized to `records.len()` and filled block-wise.
    pub fn evaluate(&self, records: &[Record], out: &mut Vec<Datum<'a>>) -> CoreResult<()> {
        out.clear();
        out.reserve(records.len());
        for chunk in records.chunks(self.options.block_size.max(1)) {
            out.extend(self.root.evaluate(chunk)?);
        }
        Ok(())
    }

    pub fn evaluate_bool(&self, records: &[Record], out: &mut Vec<Bool>) -> CoreResult<()> {
        self.require(DataType::Bool)?;
        self.evaluate_typed(records, out, |d| d.as_bool().unwrap())
    }

    pub fn evaluate_int(&self, records: &[Record], out: &mut Vec<Int>) -> CoreResult<()> {
        self.require(DataType::Int)?;
        self.evaluate_typed(records, out, |d| d.as_int().unwrap())
    }

    pub fn evaluate_float(&self, records: &[Record], out: &mut Vec<Float>) -> CoreResult<()> {
        self.require(DataType::Float)?;
        self.evaluate_typed(records, out, |d| d.as_float().unwrap())
    }

    pub fn evaluate_geo_point(&self, records: &[Record], out: &mut Vec<GeoPoint>) -> CoreResult<()> {
        self.require(DataType::GeoPoint)?;
        self.evaluate_typed(records, out, |d| d.as_geo_point().unwrap())
    }

    pub fn evaluate_text(&self, records: &[Record], out: &mut Vec<Text<'a>>) -> CoreResult<()> {
        self.require(DataType::Text)?;
        self.evaluate_typed(records, out, |d| d.as_text().unwrap())
    }

    pub fn evaluate_bool_vector(&self, records: &[Record], out: &mut Vec<BoolVector>) -> CoreResult<()> {
        self.require(DataType::BoolVector)?;
        self.evaluate_typed(records, out, |d| d.as_bool_vector().unwrap())
    }

    pub fn evaluate_int_vector(&self, records: &[Record], out: &mut Vec<Vector<'a, Int>>) -> CoreResult<()> {
        self.require(DataType::IntVector)?;
        self.evaluate_typed(records, out, |d| d.as_int_vector().unwrap())
    }

    pub fn evaluate_float_vector(&self, records: &[Record], out: &mut Vec<Vector<'a, Float>>) -> CoreResult<()> {
        self.require(DataType::FloatVector)?;
        self.evaluate_typed(records, out, |d| d.as_float_vector().unwrap())
    }

    pub fn evaluate_geo_point_vector(&self, records: &[Record], out: &mut Vec<Vector<'a, GeoPoint>>) -> CoreResult<()> {
        self.require(DataType::GeoPointVector)?;
        self.evaluate_typed(records, out, |d| d.as_geo_point_vector().unwrap())
    }

    pub fn evaluate_text_vector(&self, records: &[Record], out: &mut Vec<Vector<'a, Text<'a>>>) -> CoreResult<()> {
        self.require(DataType::TextVector)?;
        self.evaluate_typed(records, out, |d| d.as_text_vector().unwrap())
    }

    fn evaluate_typed<T>(&self, records: &[Record], out: &mut Vec<T>, extract: impl Fn(Datum<'a>) -> T) -> CoreResult<()> {
        out.clear();
        out.reserve(records.len());
        for chunk in records.chunks(self.options.block_size.max(1)) {
            for v in self.root.evaluate(chunk)? {
                out.push(extract(v));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builder::{ExpressionBuilder, OperatorKind};
    use crate::expr::BinaryOp;
    use crate::table::Table;
    use crate::value::DataType as DT;

    fn bool_column_table(name_values: &[(&str, &[Option<bool>])]) -> Table {
        let mut table = Table::new("t");
        let num_rows = name_values.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        for (name, _) in name_values {
            table.create_column(*name, DT::Bool).unwrap();
        }
        for _ in 0..num_rows {
            table.insert_row(None).unwrap();
        }
        for (name, values) in name_values {
            let col = table.find_column_mut(name).unwrap();
            for (i, v) in values.iter().enumerate() {
                let row_id = Int::new((i + 1) as i64);
                let datum = match v {
                    Some(b) => Datum::Bool(Bool::new(*b)),
                    None => Datum::Bool(Bool::na()),
                };
                col.set(row_id, datum, |_| true, |_| true).unwrap();
            }
        }
        table
    }

    #[test]
    fn s1_simple_column_filter() {
        let mut table = Table::new("rows");
        table.create_column("b", DT::Bool).unwrap();
        for _ in 0..5 {
            table.insert_row(None).unwrap();
        }
        let values = [None, Some(true), Some(false), Some(true), Some(false), Some(true)];
        let col = table.find_column_mut("b").unwrap();
        for (i, v) in values.iter().enumerate().skip(1) {
            col.set(Int::new(i as i64), Datum::Bool(Bool::new(v.unwrap())), |_| true, |_| true)
                .unwrap();
        }

        let mut builder = ExpressionBuilder::new(&table);
        builder.push_column("b", None).unwrap();
        let expr = builder.release(ExpressionOptions::default()).unwrap();

        let records: Vec<Record> = (1..=5).map(|i| Record::new(Int::new(i), Float::new(0.0))).collect();
        let mut out = RecordSet::new();
        expr.filter(&records, &mut out).unwrap();
        let ids: Vec<i64> = out.as_slice().iter().map(|r| r.row_id.raw()).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn s2_three_valued_and() {
        let table = bool_column_table(&[
            ("a", &[None, Some(true), Some(true), Some(false), None]),
            ("b", &[None, Some(true), None, Some(true), None]),
        ]);
        let mut builder = ExpressionBuilder::new(&table);
        builder.push_column("a", None).unwrap();
        builder.push_column("b", None).unwrap();
        builder.push_operator(OperatorKind::Binary(BinaryOp::LogicalAnd)).unwrap();
        let expr = builder.release(ExpressionOptions::default()).unwrap();

        let records: Vec<Record> = (1..=4).map(|i| Record::new(Int::new(i), Float::new(0.0))).collect();
        let mut values = Vec::new();
        expr.evaluate_bool(&records, &mut values).unwrap();
        let rendered: Vec<&str> = values
            .iter()
            .map(|b| if b.is_na() { "N" } else if b.is_true() { "T" } else { "F" })
            .collect();
        assert_eq!(rendered, vec!["T", "N", "F", "N"]);

        let mut filtered = RecordSet::new();
        expr.filter(&records, &mut filtered).unwrap();
        let ids: Vec<i64> = filtered.as_slice().iter().map(|r| r.row_id.raw()).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn s3_overflow_is_na_not_error() {
        let mut table = Table::new("t");
        table.create_column("x", DT::Int).unwrap();
        table.insert_row(None).unwrap();
        table.insert_row(None).unwrap();
        table
            .find_column_mut("x")
            .unwrap()
            .set(Int::new(1), Datum::Int(Int::max()), |_| true, |_| true)
            .unwrap();

        let mut builder = ExpressionBuilder::new(&table);
        builder.push_column("x", None).unwrap();
        builder.push_constant(Datum::Int(Int::new(1)));
        builder.push_operator(OperatorKind::Binary(BinaryOp::Plus)).unwrap();
        let expr = builder.release(ExpressionOptions::default()).unwrap();

        let records = [Record::new(Int::new(1), Float::new(0.0))];
        let mut out = Vec::new();
        expr.evaluate_int(&records, &mut out).unwrap();
        assert!(out[0].is_na());
    }

    #[test]
    fn s5_dereference_through_reference_column() {
        let mut target = Table::new("target");
        target.create_column("k", DT::Int).unwrap();
        for _ in 0..3 {
            target.insert_row(None).unwrap();
        }
        let k = target.find_column_mut("k").unwrap();
        for (row, value) in [(1, 10), (2, 20), (3, 30)] {
            k.set(Int::new(row), Datum::Int(Int::new(value)), |_| true, |_| true).unwrap();
        }

        let mut source = Table::new("source");
        source.create_column("r", DT::Int).unwrap();
        source.find_column_mut("r").unwrap().mark_reference().unwrap();
        for _ in 0..3 {
            source.insert_row(None).unwrap();
        }
        let live = |id: Int| id.raw() >= 1 && id.raw() <= 3;
        let r = source.find_column_mut("r").unwrap();
        for (row, target_row) in [(1, 3), (2, 1), (3, 2)] {
            r.set(Int::new(row), Datum::Int(Int::new(target_row)), live, live).unwrap();
        }

        let mut builder = ExpressionBuilder::new(&source);
        builder.push_column("r", Some(&target)).unwrap();
        builder.begin_subexpression().unwrap();
        builder.push_column("k", None).unwrap();
        builder.end_subexpression(1024).unwrap();
        let expr = builder.release(ExpressionOptions::default()).unwrap();

        let records: Vec<Record> = (1..=3).map(|i| Record::new(Int::new(i), Float::new(0.0))).collect();
        let mut out = Vec::new();
        expr.evaluate_int(&records, &mut out).unwrap();
        assert_eq!(out.iter().map(|v| v.raw()).collect::<Vec<_>>(), vec![30, 10, 20]);
    }

    #[test]
    fn adjust_writes_score_from_float_expression() {
        let mut table = Table::new("t");
        table.create_column("score", DT::Float).unwrap();
        for _ in 0..2 {
            table.insert_row(None).unwrap();
        }
        table
            .find_column_mut("score")
            .unwrap()
            .set(Int::new(1), Datum::Float(Float::new(9.5)), |_| true, |_| true)
            .unwrap();

        let mut builder = ExpressionBuilder::new(&table);
        builder.push_column("score", None).unwrap();
        let expr = builder.release(ExpressionOptions::default()).unwrap();

        let mut records = RecordSet::from_row_ids([Int::new(1), Int::new(2)]);
        expr.adjust_in_place(&mut records, 0).unwrap();
        assert_eq!(records.get(0).score.raw(), 9.5);
        assert_eq!(records.get(1).score.raw(), 0.0);
    }
}
