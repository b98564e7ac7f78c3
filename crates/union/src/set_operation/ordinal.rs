//! ORDER BY resolution over a union's output columns

use super::metadata::AliasMap;
use crate::ast::{Expression, Literal, OrderByElement, TypedExpr};
use crate::error::{Error, Result};

/// Replace integer literals, read as 1-based column ordinals, with a copy of
/// the matching result expression. `context` names the clause in errors.
pub fn substitute_ordinals(
    exprs: &[Expression],
    result_exprs: &[TypedExpr],
    context: &str,
) -> Result<Vec<Expression>> {
    exprs
        .iter()
        .map(|expr| {
            let Expression::Literal(Literal::Integer(position)) = expr else {
                return Ok(expr.clone());
            };
            if *position < 1 {
                return Err(Error::OrdinalTooSmall {
                    context: context.to_string(),
                    ordinal: expr.to_string(),
                });
            }
            let index = usize::try_from(*position - 1).unwrap_or(usize::MAX);
            result_exprs
                .get(index)
                .map(|result| result.expr.clone())
                .ok_or_else(|| Error::OrdinalTooLarge {
                    context: context.to_string(),
                    ordinal: expr.to_string(),
                })
        })
        .collect()
}

/// Resolved ordering of a union's output
#[derive(Debug, Clone, PartialEq)]
pub struct SortInfo {
    ordering_exprs: Vec<Expression>,
    is_asc_order: Vec<bool>,
    nulls_first: Vec<Option<bool>>,
}

impl SortInfo {
    /// Resolve ORDER BY elements against the output columns: ordinals pick a
    /// column by position, bare names pick a column by label.
    pub fn create(
        order_by: &[OrderByElement],
        result_exprs: &[TypedExpr],
        aliases: &AliasMap,
    ) -> Result<Self> {
        let exprs: Vec<Expression> = order_by.iter().map(|e| e.expr.clone()).collect();
        let mut ordering_exprs = substitute_ordinals(&exprs, result_exprs, "ORDER BY")?;
        for expr in &mut ordering_exprs {
            expr.transform(&mut |node| -> Result<()> {
                match node {
                    Expression::Column(None, name) => {
                        let resolved = aliases
                            .resolve(name)?
                            .ok_or_else(|| Error::ColumnNotFound(name.clone()))?;
                        *node = resolved.expr.clone();
                    }
                    Expression::Column(Some(table), name) => {
                        return Err(Error::ColumnNotFound(format!("{}.{}", table, name)));
                    }
                    _ => {}
                }
                Ok(())
            })?;
        }

        Ok(Self {
            ordering_exprs,
            is_asc_order: order_by.iter().map(|e| e.is_asc()).collect(),
            nulls_first: order_by.iter().map(|e| e.nulls_first).collect(),
        })
    }

    pub fn ordering_exprs(&self) -> &[Expression] {
        &self.ordering_exprs
    }

    pub fn is_asc_order(&self) -> &[bool] {
        &self.is_asc_order
    }

    pub fn nulls_first(&self) -> &[Option<bool>] {
        &self.nulls_first
    }
}
