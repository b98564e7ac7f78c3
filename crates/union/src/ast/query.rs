//! Query blocks: SELECT statements and the clauses shared with unions

use super::expressions::{Expression, TypedExpr};
use crate::semantic::AnalyzedSelect;
use crate::set_operation::QueryStatement;
use crate::types::TupleId;

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

/// A single ORDER BY item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderByElement {
    pub expr: Expression,
    pub direction: Direction,
    /// Explicit NULLS FIRST (true) / NULLS LAST (false), if given
    pub nulls_first: Option<bool>,
}

impl OrderByElement {
    pub fn new(expr: impl Into<Expression>, direction: Direction) -> Self {
        Self {
            expr: expr.into(),
            direction,
            nulls_first: None,
        }
    }

    pub fn is_asc(&self) -> bool {
        self.direction == Direction::Asc
    }

    pub fn to_sql(&self) -> String {
        let mut sql = self.expr.to_string();
        sql.push_str(if self.is_asc() { " ASC" } else { " DESC" });
        match self.nulls_first {
            Some(true) => sql.push_str(" NULLS FIRST"),
            Some(false) => sql.push_str(" NULLS LAST"),
            None => {}
        }
        sql
    }
}

/// LIMIT / OFFSET clause
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LimitElement {
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
}

impl LimitElement {
    pub fn new(limit: Option<Expression>, offset: Option<Expression>) -> Self {
        Self { limit, offset }
    }

    pub fn has_limit(&self) -> bool {
        self.limit.is_some()
    }

    /// Clause text with a leading space, or the empty string.
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        if let Some(limit) = &self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = &self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        sql
    }
}

/// A named view introduced by a WITH clause
#[derive(Debug, Clone)]
pub struct WithView {
    pub name: String,
    pub query: QueryStatement,
}

/// WITH clause: views visible to every operand of the statement
#[derive(Debug, Clone, Default)]
pub struct WithClause {
    pub views: Vec<WithView>,
}

impl WithClause {
    pub fn new(views: Vec<WithView>) -> Self {
        Self { views }
    }

    pub fn to_sql(&self) -> String {
        let views: Vec<String> = self
            .views
            .iter()
            .map(|view| format!("{} AS ({})", view.name, view.query.to_sql()))
            .collect();
        format!("WITH {}", views.join(", "))
    }

    /// Copy of the clause whose view queries carry no analysis state
    pub fn clone_unanalyzed(&self) -> Self {
        Self {
            views: self
                .views
                .iter()
                .map(|view| WithView {
                    name: view.name.clone(),
                    query: view.query.clone_unanalyzed(),
                })
                .collect(),
        }
    }
}

/// A FROM item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    /// The table or view name.
    pub name: String,
    /// An optional alias for the table.
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            name: name.into(),
            alias,
        }
    }

    /// Name other clauses use to qualify this table's columns
    pub fn visible_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// SELECT statement structure
#[derive(Debug, Clone, Default)]
pub struct SelectStatement {
    /// DISTINCT: whether to deduplicate result rows.
    pub distinct: bool,
    /// Expressions to select, with an optional column alias.
    pub select: Vec<(Expression, Option<String>)>,
    /// FROM: tables to select from.
    pub from: Vec<TableRef>,
    /// WHERE: optional condition to filter rows.
    pub r#where: Option<Expression>,
    /// GROUP BY: expressions to group and aggregate by.
    pub group_by: Vec<Expression>,
    /// HAVING: expression to filter groups by.
    pub having: Option<Expression>,
    /// ORDER BY: expressions to sort by.
    pub order_by: Vec<OrderByElement>,
    /// LIMIT / OFFSET.
    pub limit: LimitElement,
    /// Output of select-level analysis; None until analyzed.
    analysis: Option<AnalyzedSelect>,
}

impl SelectStatement {
    pub fn new(select: Vec<(Expression, Option<String>)>, from: Vec<TableRef>) -> Self {
        Self {
            select,
            from,
            ..Default::default()
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn analysis(&self) -> Option<&AnalyzedSelect> {
        self.analysis.as_ref()
    }

    pub(crate) fn set_analysis(&mut self, analysis: AnalyzedSelect) {
        self.analysis = Some(analysis);
    }

    /// Analyzed result expressions; empty before analysis.
    pub fn result_exprs(&self) -> &[TypedExpr] {
        self.analysis
            .as_ref()
            .map(|a| a.result_exprs.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn set_result_exprs(&mut self, exprs: Vec<TypedExpr>) {
        if let Some(analysis) = &mut self.analysis {
            analysis.result_exprs = exprs;
        }
    }

    /// Output labels: the alias if given, else the expression's label.
    pub fn col_labels(&self) -> Vec<String> {
        self.select
            .iter()
            .map(|(expr, alias)| alias.clone().unwrap_or_else(|| expr.label()))
            .collect()
    }

    pub fn has_limit(&self) -> bool {
        self.limit.has_limit()
    }

    pub fn has_order_by(&self) -> bool {
        !self.order_by.is_empty()
    }

    pub fn materialized_tuple_ids(&self) -> Vec<TupleId> {
        self.analysis
            .as_ref()
            .map(|a| a.tuple_ids.clone())
            .unwrap_or_default()
    }

    pub fn clone_unanalyzed(&self) -> Self {
        Self {
            analysis: None,
            ..self.clone()
        }
    }

    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        let items: Vec<String> = self
            .select
            .iter()
            .map(|(expr, alias)| match alias {
                Some(alias) => format!("{} AS {}", expr, alias),
                None => expr.to_string(),
            })
            .collect();
        sql.push_str(&items.join(", "));

        if !self.from.is_empty() {
            let tables: Vec<String> = self
                .from
                .iter()
                .map(|table| match &table.alias {
                    Some(alias) => format!("{} {}", table.name, alias),
                    None => table.name.clone(),
                })
                .collect();
            sql.push_str(" FROM ");
            sql.push_str(&tables.join(", "));
        }
        if let Some(r#where) = &self.r#where {
            sql.push_str(&format!(" WHERE {}", r#where));
        }
        if !self.group_by.is_empty() {
            let exprs: Vec<String> = self.group_by.iter().map(|e| e.to_string()).collect();
            sql.push_str(&format!(" GROUP BY {}", exprs.join(", ")));
        }
        if let Some(having) = &self.having {
            sql.push_str(&format!(" HAVING {}", having));
        }
        if self.has_order_by() {
            let elements: Vec<String> = self.order_by.iter().map(|e| e.to_sql()).collect();
            sql.push_str(&format!(" ORDER BY {}", elements.join(", ")));
        }
        sql.push_str(&self.limit.to_sql());
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Literal, Operator};

    fn column(name: &str) -> Expression {
        Expression::Column(None, name.to_string())
    }

    #[test]
    fn test_select_to_sql() {
        let mut select = SelectStatement::new(
            vec![
                (column("a"), None),
                (
                    Expression::Function("count".into(), vec![column("b")]),
                    Some("n".into()),
                ),
            ],
            vec![TableRef::new("t", Some("x".into()))],
        );
        select.r#where = Some(
            Operator::GreaterThan(Box::new(column("a")), Box::new(Literal::Integer(1).into()))
                .into(),
        );
        select.group_by = vec![column("a")];
        select.order_by = vec![OrderByElement::new(column("a"), Direction::Desc)];
        select.limit = LimitElement::new(Some(Literal::Integer(10).into()), None);

        assert_eq!(
            select.to_sql(),
            "SELECT a, count(b) AS n FROM t x WHERE (a > 1) GROUP BY a ORDER BY a DESC LIMIT 10"
        );
        assert_eq!(select.col_labels(), vec!["a".to_string(), "n".to_string()]);
        assert!(select.has_limit());
        assert!(select.has_order_by());
    }

    #[test]
    fn test_limit_element_sql() {
        assert_eq!(LimitElement::default().to_sql(), "");
        let limit = LimitElement::new(
            Some(Literal::Integer(5).into()),
            Some(Literal::Integer(2).into()),
        );
        assert_eq!(limit.to_sql(), " LIMIT 5 OFFSET 2");

        let offset_only = LimitElement::new(None, Some(Literal::Integer(2).into()));
        assert!(!offset_only.has_limit());
    }

    #[test]
    fn test_order_by_element_sql() {
        let mut element = OrderByElement::new(Literal::Integer(2), Direction::Asc);
        assert_eq!(element.to_sql(), "2 ASC");
        element.nulls_first = Some(false);
        assert_eq!(element.to_sql(), "2 ASC NULLS LAST");
    }
}
