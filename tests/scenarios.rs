//! End-to-end scenarios from spec.md §8, driven through the public
//! crate surface (`Table`, `Column`, indexes, `ExpressionBuilder`,
//! `Expression`) rather than any internal module.

use grnxx_core::{
    BoundKind, BinaryOp, CoreResult, CursorOptions, Cursor, DataType, Datum, ExpressionBuilder,
    ExpressionOptions, IndexRange, Int, OperatorKind, OrderType, Record, RecordSet, ScanDirection,
    Table, UnaryOp,
};

fn insert_rows(table: &mut Table, n: usize) {
    for _ in 0..n {
        table.insert_row(None).unwrap();
    }
}

/// S4 — Text range index: values `["_","0","1",...,"99"]`, range
/// `(>"25", <="75")` by byte-lexicographic order.
#[test]
fn s4_text_range_index() {
    let mut table = Table::new("items");
    table.create_column("label", DataType::Text).unwrap();
    insert_rows(&mut table, 100);
    let col = table.find_column_mut("label").unwrap();
    for i in 0..100 {
        let text = i.to_string();
        col.set(
            Int::new((i + 1) as i64),
            Datum::Text(grnxx_core::Text::new(text.as_bytes())),
            |_| true,
            |_| true,
        )
        .unwrap();
    }
    col.create_index().unwrap();

    let range = IndexRange::new(Some(b"25".to_vec()), Some(b"75".to_vec()), BoundKind::UPPER_INCLUSIVE);
    let found = col
        .find_in_range_text(&range, ScanDirection::Forward, 0, None)
        .unwrap();

    let expected: Vec<i64> = (0..100)
        .filter(|i: &i32| {
            let s = i.to_string();
            s.as_bytes() > b"25".as_slice() && s.as_bytes() <= b"75".as_slice()
        })
        .map(|i| (i + 1) as i64)
        .collect();
    let got: Vec<i64> = found.as_slice().iter().map(|r| r.row_id.raw()).collect();
    assert_eq!(got, expected);
}

/// S6 — Offset/limit on index: 65,536 random rows in an Int column
/// index; `find_in_range(all, {offset: 1000, limit: 100})` must match
/// positions 1000..1099 of a full ascending scan.
#[test]
fn s6_offset_limit_matches_full_scan_window() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut table = Table::new("big");
    table.create_column("v", DataType::Int).unwrap();
    insert_rows(&mut table, 65_536);
    let mut rng = StdRng::seed_from_u64(42);
    let col = table.find_column_mut("v").unwrap();
    for row in 1..=65_536i64 {
        let value = rng.gen_range(0..1_000_000_000i64);
        col.set(Int::new(row), Datum::Int(Int::new(value)), |_| true, |_| true)
            .unwrap();
    }
    col.create_index().unwrap();

    let full = col
        .find_in_range_int(&IndexRange::unbounded(), ScanDirection::Forward, 0, None)
        .unwrap();
    let windowed = col
        .find_in_range_int(&IndexRange::unbounded(), ScanDirection::Forward, 1000, Some(100))
        .unwrap();

    assert_eq!(windowed.len(), 100);
    let expected: Vec<i64> = full.as_slice()[1000..1100].iter().map(|r| r.row_id.raw()).collect();
    let got: Vec<i64> = windowed.as_slice().iter().map(|r| r.row_id.raw()).collect();
    assert_eq!(got, expected);
}

/// Invariant 1: elementwise purity — evaluating `a + b` agrees with
/// evaluating `a` and `b` separately and adding in Rust.
#[test]
fn invariant_elementwise_purity_for_plus() -> CoreResult<()> {
    let mut table = Table::new("t");
    table.create_column("a", DataType::Int).unwrap();
    table.create_column("b", DataType::Int).unwrap();
    insert_rows(&mut table, 4);
    for (row, a, b) in [(1, 1, 10), (2, 2, 20), (3, 3, 30), (4, 4, 40)] {
        table
            .find_column_mut("a")
            .unwrap()
            .set(Int::new(row), Datum::Int(Int::new(a)), |_| true, |_| true)?;
        table
            .find_column_mut("b")
            .unwrap()
            .set(Int::new(row), Datum::Int(Int::new(b)), |_| true, |_| true)?;
    }

    let mut builder = ExpressionBuilder::new(&table);
    builder.push_column("a", None)?;
    builder.push_column("b", None)?;
    builder.push_operator(OperatorKind::Binary(BinaryOp::Plus))?;
    let sum_expr = builder.release(ExpressionOptions::default())?;

    let mut a_builder = ExpressionBuilder::new(&table);
    a_builder.push_column("a", None)?;
    let a_expr = a_builder.release(ExpressionOptions::default())?;

    let mut b_builder = ExpressionBuilder::new(&table);
    b_builder.push_column("b", None)?;
    let b_expr = b_builder.release(ExpressionOptions::default())?;

    let records: Vec<Record> = (1..=4).map(|i| Record::new(Int::new(i), grnxx_core::Float::new(0.0))).collect();
    let mut sums = Vec::new();
    let mut as_ = Vec::new();
    let mut bs = Vec::new();
    sum_expr.evaluate_int(&records, &mut sums)?;
    a_expr.evaluate_int(&records, &mut as_)?;
    b_expr.evaluate_int(&records, &mut bs)?;

    for i in 0..4 {
        assert_eq!(sums[i].raw(), as_[i].raw() + bs[i].raw());
    }
    Ok(())
}

/// Invariant 6: removing a row clears it from every scalar/vector
/// reference column of the same table.
#[test]
fn invariant_reference_integrity_on_remove() {
    let mut table = Table::new("t");
    table.create_column("ref", DataType::Int).unwrap();
    table.find_column_mut("ref").unwrap().mark_reference().unwrap();
    insert_rows(&mut table, 3);
    let live = |id: Int| id.raw() >= 1 && id.raw() <= 3;
    for (row, target) in [(1, 2), (2, 3), (3, 1)] {
        table
            .find_column_mut("ref")
            .unwrap()
            .set(Int::new(row), Datum::Int(Int::new(target)), live, live)
            .unwrap();
    }
    table.remove_row(Int::new(2)).unwrap();
    assert!(table.find_column("ref").unwrap().get(Int::new(1)).as_int().unwrap().is_na());
    assert_eq!(table.find_column("ref").unwrap().get(Int::new(2)).as_int().unwrap().raw(), 3);
    assert_eq!(table.find_column("ref").unwrap().get(Int::new(3)).as_int().unwrap().raw(), 1);
}

/// A cursor over live rows, chained into an expression filter, matches
/// what a direct column scan would produce.
#[test]
fn cursor_into_expression_filter_roundtrip() -> CoreResult<()> {
    let mut table = Table::new("t");
    table.create_column("flag", DataType::Bool).unwrap();
    insert_rows(&mut table, 6);
    table.remove_row(Int::new(2)).unwrap();
    let values = [false, false, true, false, true, true, true];
    for row in 1..=6i64 {
        if row == 2 {
            continue;
        }
        table.find_column_mut("flag").unwrap().set(
            Int::new(row),
            Datum::Bool(grnxx_core::Bool::new(values[row as usize])),
            |_| true,
            |_| true,
        )?;
    }

    let mut cursor = table.create_cursor(CursorOptions::new());
    let mut records = RecordSet::new();
    cursor.read(100, &mut records);

    let mut builder = ExpressionBuilder::new(&table);
    builder.push_column("flag", None)?;
    let expr = builder.release(ExpressionOptions::default())?;
    let mut out = RecordSet::new();
    expr.filter(records.as_slice(), &mut out)?;

    let ids: Vec<i64> = out.as_slice().iter().map(|r| r.row_id.raw()).collect();
    assert_eq!(ids, vec![3, 5, 6]);
    Ok(())
}

/// `LOGICAL_NOT` over a descending, non-ascending record set (as
/// produced by a `Reverse` cursor) must still drop exactly the rows
/// that are true, in the input's own order.
#[test]
fn logical_not_filter_over_reverse_cursor_order() -> CoreResult<()> {
    let mut table = Table::new("t");
    table.create_column("flag", DataType::Bool).unwrap();
    insert_rows(&mut table, 6);
    let values = [true, false, true, false, true, false];
    for row in 1..=6i64 {
        table.find_column_mut("flag").unwrap().set(
            Int::new(row),
            Datum::Bool(grnxx_core::Bool::new(values[(row - 1) as usize])),
            |_| true,
            |_| true,
        )?;
    }

    let options = CursorOptions {
        offset: 0,
        limit: None,
        order_type: OrderType::Reverse,
    };
    let mut cursor = table.create_cursor(options);
    let mut records = RecordSet::new();
    cursor.read(100, &mut records);
    let input_ids: Vec<i64> = records.as_slice().iter().map(|r| r.row_id.raw()).collect();
    assert_eq!(input_ids, vec![6, 5, 4, 3, 2, 1]);

    let mut builder = ExpressionBuilder::new(&table);
    builder.push_column("flag", None)?;
    builder.push_operator(OperatorKind::Unary(UnaryOp::LogicalNot))?;
    let expr = builder.release(ExpressionOptions::default())?;
    let mut out = RecordSet::new();
    expr.filter(records.as_slice(), &mut out)?;

    let ids: Vec<i64> = out.as_slice().iter().map(|r| r.row_id.raw()).collect();
    assert_eq!(ids, vec![6, 4, 2]);
    Ok(())
}
