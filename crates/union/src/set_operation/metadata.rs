//! The tuple materialized by a union
//!
//! A union produces one tuple with one slot per column. Each slot takes its
//! label from the first operand, the unified column type, and the statistics
//! of every operand's column merged together.

use super::operand::UnionOperand;
use crate::ast::TypedExpr;
use crate::error::{Error, Result};
use crate::semantic::AnalysisContext;
use crate::types::{ColumnStats, TupleId};
use std::collections::{HashMap, HashSet};

/// Output column labels, resolvable by name from the union's ORDER BY.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasMap {
    aliases: HashMap<String, TypedExpr>,
    ambiguous: HashSet<String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label. A label registered twice becomes ambiguous.
    pub fn insert(&mut self, label: &str, expr: TypedExpr) {
        let key = label.to_lowercase();
        if self.aliases.contains_key(&key) {
            self.ambiguous.insert(key);
        } else {
            self.aliases.insert(key, expr);
        }
    }

    /// Look up a label, case-insensitively.
    pub fn resolve(&self, label: &str) -> Result<Option<&TypedExpr>> {
        let key = label.to_lowercase();
        if self.ambiguous.contains(&key) {
            return Err(Error::AmbiguousColumn(label.to_string()));
        }
        Ok(self.aliases.get(&key))
    }

    pub fn is_ambiguous(&self, label: &str) -> bool {
        self.ambiguous.contains(&label.to_lowercase())
    }
}

/// Result of building the union's output tuple
#[derive(Debug, Clone)]
pub struct MaterializedTuple {
    pub tuple_id: TupleId,
    /// One slot reference per output column
    pub result_exprs: Vec<TypedExpr>,
    pub aliases: AliasMap,
}

/// Create the output tuple for analyzed, type-unified operands, and register
/// a value transfer from each output slot to every operand column that is a
/// plain slot reference.
pub fn create_tuple(
    operands: &[UnionOperand],
    labels: &[String],
    ctx: &mut AnalysisContext,
) -> Result<MaterializedTuple> {
    let first = operands
        .first()
        .ok_or_else(|| Error::Internal("union without operands".into()))?;
    let first_exprs = first.result_exprs();
    if labels.len() != first_exprs.len() {
        return Err(Error::Internal(format!(
            "{} labels for {} union columns",
            labels.len(),
            first_exprs.len()
        )));
    }

    // Merge column statistics across operands
    let mut column_stats: Vec<ColumnStats> = first_exprs
        .iter()
        .map(|expr| ColumnStats::from_expr(expr, ctx.descriptors()))
        .collect();
    for operand in &operands[1..] {
        for (stats, expr) in column_stats.iter_mut().zip(operand.result_exprs()) {
            stats.merge(&ColumnStats::from_expr(expr, ctx.descriptors()));
        }
    }

    let descriptors = ctx.descriptors_mut();
    let tuple_id = descriptors.create_tuple();
    descriptors.tuple_mut(tuple_id)?.materialized = true;
    tracing::info!("union create_tuple: tuple_id={}", tuple_id);

    let mut result_exprs = Vec::with_capacity(first_exprs.len());
    let mut aliases = AliasMap::new();
    for (column, (expr, stats)) in first_exprs.iter().zip(column_stats).enumerate() {
        let label = &labels[column];
        let slot_id = ctx.descriptors_mut().add_slot(tuple_id)?;
        let slot = ctx.descriptors_mut().slot_mut(slot_id)?;
        slot.label = Some(label.clone());
        slot.data_type = Some(expr.data_type.clone());
        slot.stats = stats;

        let output = TypedExpr::slot_ref(slot_id, label.clone(), expr.data_type.clone());
        aliases.insert(label, output.clone());
        result_exprs.push(output);

        for operand in operands {
            if let Some(slot_ref) = operand.result_exprs()[column].unwrap_slot_ref() {
                ctx.register_value_transfer(slot_id, slot_ref.slot);
            }
        }
    }

    Ok(MaterializedTuple {
        tuple_id,
        result_exprs,
        aliases,
    })
}
