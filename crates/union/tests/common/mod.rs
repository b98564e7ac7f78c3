//! Common test utilities for union analysis integration tests
#![allow(dead_code)]

use proven_union::ast::{Expression, Operator, SelectStatement, TableRef, TypedExpr};
use proven_union::semantic::coercion::widen;
use proven_union::{
    AnalysisContext, AnalyzedSelect, ColumnStats, DataType, Error, OperandFailure, Qualifier,
    QueryStatement, Scope, SelectAnalyzer, UnionOperand, UnionStatement,
};
use std::collections::HashMap;
use std::sync::Arc;

/// A column of a catalog table
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub stats: ColumnStats,
}

/// Select analyzer backed by an in-memory catalog. Views from WITH clauses
/// are looked up in the scope before the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogAnalyzer {
    tables: HashMap<String, Vec<Column>>,
}

impl CatalogAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: Vec<Column>) -> Self {
        self.tables.insert(name.to_string(), columns);
        self
    }
}

/// A column binding visible in a select block
struct Binding {
    table: String,
    name: String,
    expr: TypedExpr,
}

impl SelectAnalyzer for CatalogAnalyzer {
    fn analyze_select(
        &self,
        select: &SelectStatement,
        scope: &Arc<Scope>,
        ctx: &mut AnalysisContext,
    ) -> Result<AnalyzedSelect, OperandFailure> {
        let mut missing = Vec::new();
        let mut bindings = Vec::new();
        let mut tuple_ids = Vec::new();

        for table in &select.from {
            if let Some(view) = scope.lookup_view(&table.name) {
                // A view body may refer to views visible where it is used
                let mut view = view.clone_unanalyzed();
                view.analyze_in_scope(scope, ctx)?;
                for (label, expr) in view.col_labels().into_iter().zip(view.result_exprs()) {
                    bindings.push(Binding {
                        table: table.visible_name().to_string(),
                        name: label,
                        expr: expr.clone(),
                    });
                }
                tuple_ids.extend(view.materialized_tuple_ids());
            } else if let Some(columns) = self.tables.get(&table.name) {
                let descriptors = ctx.descriptors_mut();
                let tuple = descriptors.create_tuple();
                descriptors.tuple_mut(tuple)?.table = Some(table.name.clone());
                for column in columns {
                    let slot_id = descriptors.add_slot(tuple)?;
                    let slot = descriptors.slot_mut(slot_id)?;
                    slot.label = Some(column.name.clone());
                    slot.data_type = Some(column.data_type.clone());
                    slot.stats = column.stats.clone();
                    bindings.push(Binding {
                        table: table.visible_name().to_string(),
                        name: column.name.clone(),
                        expr: TypedExpr::slot_ref(
                            slot_id,
                            column.name.clone(),
                            column.data_type.clone(),
                        ),
                    });
                }
                tuple_ids.push(tuple);
            } else {
                missing.push(table.name.clone());
            }
        }
        if !missing.is_empty() {
            return Err(OperandFailure::Missing(missing));
        }

        let result_exprs = select
            .select
            .iter()
            .map(|(expr, _)| resolve(expr, &bindings))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(AnalyzedSelect {
            result_exprs,
            tuple_ids,
        })
    }
}

fn resolve(expr: &Expression, bindings: &[Binding]) -> Result<TypedExpr, Error> {
    match expr {
        Expression::Column(table, name) => {
            let mut matches = bindings.iter().filter(|b| {
                b.name == *name && table.as_ref().is_none_or(|table| b.table == *table)
            });
            let binding = matches
                .next()
                .ok_or_else(|| Error::ColumnNotFound(name.clone()))?;
            if matches.next().is_some() {
                return Err(Error::Analysis(format!("ambiguous column {}", name)));
            }
            Ok(binding.expr.clone())
        }
        Expression::SlotRef(_) => Err(Error::Analysis("unexpected slot reference".into())),
        Expression::Literal(literal) => Ok(TypedExpr::new(literal.clone(), literal.data_type())),
        Expression::Cast { expr, to, implicit } => {
            let inner = resolve(expr, bindings)?;
            Ok(TypedExpr::new(
                Expression::Cast {
                    expr: Box::new(inner.expr),
                    to: to.clone(),
                    implicit: *implicit,
                },
                to.clone(),
            ))
        }
        Expression::Function(name, args) => {
            let args = args
                .iter()
                .map(|arg| resolve(arg, bindings).map(|typed| typed.expr))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypedExpr::new(
                Expression::Function(name.clone(), args),
                DataType::I64,
            ))
        }
        Expression::Operator(op) => match op {
            Operator::Add(lhs, rhs)
            | Operator::Subtract(lhs, rhs)
            | Operator::Multiply(lhs, rhs) => {
                let (lhs, rhs) = (resolve(lhs, bindings)?, resolve(rhs, bindings)?);
                let data_type = widen(&lhs.data_type, &rhs.data_type).ok_or_else(|| {
                    Error::Analysis(format!(
                        "cannot apply {} to {}",
                        lhs.data_type, rhs.data_type
                    ))
                })?;
                let (lhs, rhs) = (Box::new(lhs.expr), Box::new(rhs.expr));
                let op = match op {
                    Operator::Add(_, _) => Operator::Add(lhs, rhs),
                    Operator::Subtract(_, _) => Operator::Subtract(lhs, rhs),
                    _ => Operator::Multiply(lhs, rhs),
                };
                Ok(TypedExpr::new(op, data_type))
            }
            _ => Err(Error::Analysis(format!("unsupported operator {}", expr))),
        },
    }
}

/// Known statistics for a column
pub fn stats(ndv: u64, nulls: u64, avg_size: f64, max_size: u64) -> ColumnStats {
    ColumnStats {
        avg_size: Some(avg_size),
        max_size: Some(max_size),
        num_distinct_values: Some(ndv),
        num_nulls: Some(nulls),
    }
}

pub fn column(name: &str, data_type: DataType, stats: ColumnStats) -> Column {
    Column {
        name: name.to_string(),
        data_type,
        stats,
    }
}

/// Catalog used by the tests:
/// - t1(a INT, b VARCHAR, c DOUBLE)
/// - t2(a INT, b VARCHAR, c DOUBLE)
/// - t3(x BIGINT, y VARCHAR, z INT) without statistics
pub fn catalog() -> CatalogAnalyzer {
    CatalogAnalyzer::new()
        .with_table(
            "t1",
            vec![
                column("a", DataType::I32, stats(10, 0, 4.0, 4)),
                column("b", DataType::Str, stats(5, 2, 12.5, 40)),
                column("c", DataType::F64, stats(100, 1, 8.0, 8)),
            ],
        )
        .with_table(
            "t2",
            vec![
                column("a", DataType::I32, stats(20, 1, 4.0, 4)),
                column("b", DataType::Str, stats(7, 0, 20.0, 64)),
                column("c", DataType::F64, stats(50, 3, 8.0, 8)),
            ],
        )
        .with_table(
            "t3",
            vec![
                column("x", DataType::I64, ColumnStats::unknown()),
                column("y", DataType::Str, ColumnStats::unknown()),
                column("z", DataType::I32, ColumnStats::unknown()),
            ],
        )
}

/// A fresh analysis context over the test catalog
pub fn context() -> AnalysisContext {
    AnalysisContext::new(Arc::new(catalog()))
}

/// `SELECT <columns> FROM <table>`
pub fn select(columns: &[&str], table: &str) -> SelectStatement {
    select_exprs(
        columns
            .iter()
            .map(|c| Expression::Column(None, c.to_string()))
            .collect(),
        table,
    )
}

/// `SELECT <exprs> FROM <table>`
pub fn select_exprs(exprs: Vec<Expression>, table: &str) -> SelectStatement {
    SelectStatement::new(
        exprs.into_iter().map(|e| (e, None)).collect(),
        vec![TableRef::new(table, None)],
    )
}

pub fn first(statement: impl Into<QueryStatement>) -> UnionOperand {
    UnionOperand::new(statement, None)
}

pub fn all(statement: impl Into<QueryStatement>) -> UnionOperand {
    UnionOperand::new(statement, Some(Qualifier::All))
}

pub fn distinct(statement: impl Into<QueryStatement>) -> UnionOperand {
    UnionOperand::new(statement, Some(Qualifier::Distinct))
}

/// A union without ORDER BY or LIMIT
pub fn union(operands: Vec<UnionOperand>) -> UnionStatement {
    UnionStatement::new(operands, vec![], Default::default())
}

/// SQL text of each operand, in order
pub fn operand_sqls(operands: &[UnionOperand]) -> Vec<String> {
    operands.iter().map(|o| o.statement().to_sql()).collect()
}

pub fn qualifiers(operands: &[UnionOperand]) -> Vec<Option<Qualifier>> {
    operands.iter().map(|o| o.qualifier()).collect()
}
