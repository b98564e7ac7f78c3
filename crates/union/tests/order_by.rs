//! ORDER BY resolution against a union's output columns

mod common;

use common::*;
use proven_union::ast::{
    Direction, Expression, LimitElement, Literal, Operator, OrderByElement, SelectStatement,
    TableRef,
};
use proven_union::{Error, UnionOperand, UnionStatement};

fn ordinal(position: i128) -> Expression {
    Literal::Integer(position).into()
}

fn col(name: &str) -> Expression {
    Expression::Column(None, name.to_string())
}

fn ordered(operands: Vec<UnionOperand>, order_by: Vec<OrderByElement>) -> UnionStatement {
    UnionStatement::new(operands, order_by, LimitElement::default())
}

fn three_columns(order_by: Vec<OrderByElement>) -> UnionStatement {
    ordered(
        vec![
            first(select(&["a", "b", "c"], "t1")),
            all(select(&["a", "b", "c"], "t2")),
        ],
        order_by,
    )
}

#[test]
fn test_ordinal_resolves_to_output_column() {
    let mut stmt = three_columns(vec![OrderByElement::new(ordinal(2), Direction::Asc)]);
    stmt.analyze(&mut context()).unwrap();

    let sort = stmt.sort_info().unwrap();
    assert_eq!(sort.ordering_exprs(), &[stmt.result_exprs()[1].expr.clone()]);
    assert_eq!(sort.is_asc_order(), &[true]);
    assert_eq!(sort.nulls_first(), &[None]);

    // The statement's own ORDER BY is left as written
    assert_eq!(stmt.order_by()[0].expr, ordinal(2));
}

#[test]
fn test_ordinal_out_of_range() {
    let mut stmt = three_columns(vec![OrderByElement::new(ordinal(0), Direction::Asc)]);
    let err = stmt.analyze(&mut context()).unwrap_err();
    assert_eq!(
        err,
        Error::OrdinalTooSmall {
            context: "ORDER BY".into(),
            ordinal: "0".into(),
        }
    );

    let mut stmt = three_columns(vec![OrderByElement::new(ordinal(4), Direction::Asc)]);
    let err = stmt.analyze(&mut context()).unwrap_err();
    assert!(err.is_ordinal_range());
    assert_eq!(
        err.to_string(),
        "ORDER BY: ordinal exceeds number of items in select list: 4"
    );
}

#[test]
fn test_order_by_label() {
    let mut element = OrderByElement::new(col("b"), Direction::Desc);
    element.nulls_first = Some(true);
    let mut stmt = three_columns(vec![element, OrderByElement::new(ordinal(1), Direction::Asc)]);
    stmt.analyze(&mut context()).unwrap();

    let sort = stmt.sort_info().unwrap();
    assert_eq!(
        sort.ordering_exprs(),
        &[
            stmt.result_exprs()[1].expr.clone(),
            stmt.result_exprs()[0].expr.clone()
        ]
    );
    assert_eq!(sort.is_asc_order(), &[false, true]);
    assert_eq!(sort.nulls_first(), &[Some(true), None]);
}

#[test]
fn test_order_by_expression_over_labels() {
    let element = OrderByElement::new(
        Operator::Add(Box::new(col("a")), Box::new(ordinal(1))),
        Direction::Asc,
    );
    let mut stmt = three_columns(vec![element]);
    stmt.analyze(&mut context()).unwrap();

    let output = stmt.result_exprs()[0].unwrap_slot_ref().unwrap().slot;
    let sort = stmt.sort_info().unwrap();
    assert_eq!(sort.ordering_exprs()[0].slot_ids(), vec![output]);
}

#[test]
fn test_ambiguous_label() {
    let mut stmt = ordered(
        vec![first(select(&["a", "a"], "t1")), all(select(&["a", "a"], "t2"))],
        vec![OrderByElement::new(col("a"), Direction::Asc)],
    );
    let err = stmt.analyze(&mut context()).unwrap_err();
    assert_eq!(err, Error::AmbiguousColumn("a".into()));
    assert_eq!(err.to_string(), "Column 'a' in ORDER BY clause is ambiguous");

    // Ordinals still work
    let mut stmt = ordered(
        vec![first(select(&["a", "a"], "t1")), all(select(&["a", "a"], "t2"))],
        vec![OrderByElement::new(ordinal(2), Direction::Asc)],
    );
    stmt.analyze(&mut context()).unwrap();
    assert!(stmt.aliases().is_ambiguous("A"));
}

#[test]
fn test_unknown_column() {
    let mut stmt = three_columns(vec![OrderByElement::new(col("nope"), Direction::Asc)]);
    let err = stmt.analyze(&mut context()).unwrap_err();
    assert_eq!(err, Error::ColumnNotFound("nope".into()));

    let qualified = Expression::Column(Some("t1".into()), "a".into());
    let mut stmt = three_columns(vec![OrderByElement::new(qualified, Direction::Asc)]);
    let err = stmt.analyze(&mut context()).unwrap_err();
    assert_eq!(err, Error::ColumnNotFound("t1.a".into()));
}

#[test]
fn test_labels_come_from_first_operand() {
    // SELECT x FROM t3 UNION ALL SELECT a FROM t1 ORDER BY ...
    let operands = || vec![first(select(&["x"], "t3")), all(select(&["a"], "t1"))];

    let mut stmt = ordered(
        operands(),
        vec![OrderByElement::new(col("a"), Direction::Asc)],
    );
    let err = stmt.analyze(&mut context()).unwrap_err();
    assert_eq!(err, Error::ColumnNotFound("a".into()));

    let mut stmt = ordered(
        operands(),
        vec![OrderByElement::new(col("x"), Direction::Asc)],
    );
    stmt.analyze(&mut context()).unwrap();
    assert_eq!(stmt.col_labels(), vec!["x"]);
}

#[test]
fn test_select_alias_is_a_label() {
    let aliased = SelectStatement::new(
        vec![(col("a"), Some("total".into()))],
        vec![TableRef::new("t1", None)],
    );
    let mut stmt = ordered(
        vec![first(aliased), all(select(&["a"], "t2"))],
        vec![OrderByElement::new(col("TOTAL"), Direction::Desc)],
    );
    stmt.analyze(&mut context()).unwrap();

    let sort = stmt.sort_info().unwrap();
    assert_eq!(sort.ordering_exprs(), &[stmt.result_exprs()[0].expr.clone()]);
    assert_eq!(
        stmt.to_sql(),
        "SELECT a AS total FROM t1 UNION ALL (SELECT a FROM t2) ORDER BY TOTAL DESC"
    );
}

#[test]
fn test_no_order_by_means_no_sort_info() {
    let mut stmt = three_columns(vec![]);
    stmt.analyze(&mut context()).unwrap();
    assert!(stmt.sort_info().is_none());
    // Labels are resolvable regardless
    assert!(stmt.aliases().resolve("c").unwrap().is_some());
}
