//! Union compatibility: equal column counts and a common type per column

use super::operand::UnionOperand;
use crate::error::{Error, Result};
use crate::semantic::TypeCoercion;
use crate::types::DataType;

/// Every operand must produce as many columns as the first one.
pub fn check_column_counts(operands: &[UnionOperand]) -> Result<()> {
    let Some((first, rest)) = operands.split_first() else {
        return Ok(());
    };
    let first_count = first.result_exprs().len();
    for operand in rest {
        let operand_count = operand.result_exprs().len();
        if operand_count != first_count {
            return Err(Error::ColumnCountMismatch {
                first_sql: first.statement().to_sql(),
                first_count,
                operand_sql: operand.statement().to_sql(),
                operand_count,
            });
        }
    }
    Ok(())
}

/// Determine the common type of each column, position by position, and cast
/// every operand expression of a different type to it.
///
/// Fails on the first column without a common type; the operands are left
/// untouched in that case. Returns the unified column types.
pub fn unify_column_types(
    operands: &mut [UnionOperand],
    coercion: &dyn TypeCoercion,
) -> Result<Vec<DataType>> {
    let Some(first) = operands.first() else {
        return Ok(Vec::new());
    };
    let num_columns = first.result_exprs().len();

    let mut column_types = Vec::with_capacity(num_columns);
    for column in 0..num_columns {
        let first_expr = &operands[0].result_exprs()[column];
        let mut compatible = first_expr.data_type.clone();
        // Last expression folded in, for error reporting
        let mut last_expr = first_expr;
        for operand in &operands[1..] {
            let expr = &operand.result_exprs()[column];
            compatible = coercion.compatible_type(&compatible, &expr.data_type, last_expr, expr)?;
            last_expr = expr;
        }
        column_types.push(compatible);
    }

    for operand in operands.iter_mut() {
        let needs_cast = operand
            .result_exprs()
            .iter()
            .zip(&column_types)
            .any(|(expr, data_type)| &expr.data_type != data_type);
        if !needs_cast {
            continue;
        }
        let cast_exprs = operand
            .result_exprs()
            .iter()
            .zip(&column_types)
            .map(|(expr, data_type)| {
                if &expr.data_type == data_type {
                    expr.clone()
                } else {
                    tracing::trace!("casting {} from {} to {}", expr, expr.data_type, data_type);
                    expr.cast_to(data_type.clone())
                }
            })
            .collect();
        operand.statement_mut().set_result_exprs(cast_exprs);
    }

    Ok(column_types)
}
