//! SQL text of a union statement

use super::operand::{Qualifier, UnionOperand};
use crate::ast::{LimitElement, OrderByElement, WithClause};

/// Render a union from its parts.
///
/// Later operands are parenthesized when they are unions themselves. The
/// final operand is also parenthesized when the statement has an ORDER BY,
/// LIMIT or OFFSET and the operand has neither ORDER BY nor LIMIT, so the
/// clause cannot be read as belonging to it.
pub fn render_union(
    with: Option<&WithClause>,
    operands: &[UnionOperand],
    order_by: &[OrderByElement],
    limit: &LimitElement,
) -> String {
    let mut sql = String::new();
    if let Some(with) = with {
        sql.push_str(&with.to_sql());
        sql.push(' ');
    }

    let statement_has_clauses =
        !order_by.is_empty() || limit.has_limit() || limit.offset.is_some();
    for (i, operand) in operands.iter().enumerate() {
        let statement = operand.statement();
        if i == 0 {
            sql.push_str(&statement.to_sql());
            continue;
        }

        sql.push_str(" UNION ");
        if operand.qualifier() == Some(Qualifier::All) {
            sql.push_str("ALL ");
        }
        let is_last = i == operands.len() - 1;
        let parenthesize = statement.is_union()
            || (is_last
                && statement_has_clauses
                && !statement.has_limit()
                && !statement.has_order_by());
        if parenthesize {
            sql.push_str(&format!("({})", statement.to_sql()));
        } else {
            sql.push_str(&statement.to_sql());
        }
    }

    if !order_by.is_empty() {
        let elements: Vec<String> = order_by.iter().map(|e| e.to_sql()).collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&elements.join(", "));
    }
    sql.push_str(&limit.to_sql());
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Direction, Expression, Literal, SelectStatement, WithView};
    use crate::set_operation::UnionStatement;

    fn op(name: &str, qualifier: Option<Qualifier>) -> UnionOperand {
        let select =
            SelectStatement::new(vec![(Expression::Column(None, name.into()), None)], vec![]);
        UnionOperand::new(select, qualifier)
    }

    #[test]
    fn test_plain_chain() {
        let operands = vec![
            op("a", None),
            op("b", Some(Qualifier::All)),
            op("c", Some(Qualifier::Distinct)),
        ];
        assert_eq!(
            render_union(None, &operands, &[], &LimitElement::default()),
            "SELECT a UNION ALL SELECT b UNION SELECT c"
        );
    }

    #[test]
    fn test_final_operand_parenthesized_for_trailing_clauses() {
        let operands = vec![op("a", None), op("b", Some(Qualifier::All))];
        let order_by = vec![OrderByElement::new(Literal::Integer(1), Direction::Asc)];
        let limit = LimitElement::new(Some(Literal::Integer(3).into()), None);

        assert_eq!(
            render_union(None, &operands, &order_by, &limit),
            "SELECT a UNION ALL (SELECT b) ORDER BY 1 ASC LIMIT 3"
        );

        // The final operand's own LIMIT already delimits it
        let mut last =
            SelectStatement::new(vec![(Expression::Column(None, "b".into()), None)], vec![]);
        last.limit = LimitElement::new(Some(Literal::Integer(5).into()), None);
        let operands = vec![op("a", None), UnionOperand::new(last, Some(Qualifier::All))];
        assert_eq!(
            render_union(None, &operands, &[], &limit),
            "SELECT a UNION ALL SELECT b LIMIT 5 LIMIT 3"
        );
    }

    #[test]
    fn test_final_operand_parenthesized_for_offset_only() {
        let operands = vec![op("a", None), op("b", Some(Qualifier::Distinct))];
        let offset = LimitElement::new(None, Some(Literal::Integer(4).into()));
        assert_eq!(
            render_union(None, &operands, &[], &offset),
            "SELECT a UNION (SELECT b) OFFSET 4"
        );
    }

    #[test]
    fn test_nested_union_and_with_clause() {
        let nested = UnionStatement::new(
            vec![op("b", None), op("c", Some(Qualifier::All))],
            vec![],
            LimitElement::default(),
        );
        let operands = vec![
            op("a", None),
            UnionOperand::new(nested, Some(Qualifier::Distinct)),
            op("d", Some(Qualifier::All)),
        ];
        let with = WithClause::new(vec![WithView {
            name: "v".into(),
            query: SelectStatement::new(vec![(Literal::Integer(1).into(), None)], vec![]).into(),
        }]);

        assert_eq!(
            render_union(Some(&with), &operands, &[], &LimitElement::default()),
            "WITH v AS (SELECT 1) SELECT a UNION (SELECT b UNION ALL SELECT c) UNION ALL SELECT d"
        );
    }
}
