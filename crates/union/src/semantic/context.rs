//! Analysis context for tracking state during semantic analysis

use super::analyzer::SelectAnalyzer;
use super::coercion::{StandardCoercion, TypeCoercion};
use crate::ast::TypedExpr;
use crate::error::Result;
use crate::types::{DescriptorTable, SlotId};
use std::sync::Arc;

/// Context for semantic analysis of one statement
pub struct AnalysisContext {
    /// Tuple and slot descriptors created so far
    descriptors: DescriptorTable,
    /// One-directional value transfers (from, to) for predicate propagation
    value_transfers: Vec<(SlotId, SlotId)>,
    /// Analyzer for individual SELECT blocks
    select_analyzer: Arc<dyn SelectAnalyzer>,
    /// Type compatibility oracle
    coercion: Arc<dyn TypeCoercion>,
}

impl AnalysisContext {
    /// Create a new analysis context using the standard coercion rules
    pub fn new(select_analyzer: Arc<dyn SelectAnalyzer>) -> Self {
        Self {
            descriptors: DescriptorTable::new(),
            value_transfers: Vec::new(),
            select_analyzer,
            coercion: Arc::new(StandardCoercion),
        }
    }

    /// Replace the type compatibility oracle
    pub fn with_coercion(mut self, coercion: Arc<dyn TypeCoercion>) -> Self {
        self.coercion = coercion;
        self
    }

    pub fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    pub fn descriptors_mut(&mut self) -> &mut DescriptorTable {
        &mut self.descriptors
    }

    pub fn select_analyzer(&self) -> Arc<dyn SelectAnalyzer> {
        Arc::clone(&self.select_analyzer)
    }

    pub fn coercion(&self) -> Arc<dyn TypeCoercion> {
        Arc::clone(&self.coercion)
    }

    /// Record that every value of `from` is also a value of `to`.
    pub fn register_value_transfer(&mut self, from: SlotId, to: SlotId) {
        if !self.value_transfers.contains(&(from, to)) {
            self.value_transfers.push((from, to));
        }
    }

    /// Value transfers in registration order
    pub fn value_transfers(&self) -> &[(SlotId, SlotId)] {
        &self.value_transfers
    }

    /// Whether a value transfer from `from` to `to` was registered
    pub fn has_value_transfer(&self, from: SlotId, to: SlotId) -> bool {
        self.value_transfers.contains(&(from, to))
    }

    /// Mark every slot referenced by the expressions, and its tuple, as
    /// materialized.
    pub fn materialize_slots(&mut self, exprs: &[TypedExpr]) -> Result<()> {
        for expr in exprs {
            for slot_id in expr.expr.slot_ids() {
                let slot = self.descriptors.slot_mut(slot_id)?;
                slot.materialized = true;
                let parent = slot.parent;
                self.descriptors.tuple_mut(parent)?.materialized = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SelectStatement;
    use crate::semantic::{AnalyzedSelect, OperandFailure, Scope};
    use crate::types::DataType;

    struct NoSelects;

    impl SelectAnalyzer for NoSelects {
        fn analyze_select(
            &self,
            _select: &SelectStatement,
            _scope: &Arc<Scope>,
            _ctx: &mut AnalysisContext,
        ) -> std::result::Result<AnalyzedSelect, OperandFailure> {
            Ok(AnalyzedSelect::default())
        }
    }

    #[test]
    fn test_value_transfers_are_deduplicated() {
        let mut ctx = AnalysisContext::new(Arc::new(NoSelects));
        ctx.register_value_transfer(SlotId(2), SlotId(0));
        ctx.register_value_transfer(SlotId(2), SlotId(1));
        ctx.register_value_transfer(SlotId(2), SlotId(0));

        assert_eq!(
            ctx.value_transfers(),
            &[(SlotId(2), SlotId(0)), (SlotId(2), SlotId(1))]
        );
        assert!(ctx.has_value_transfer(SlotId(2), SlotId(1)));
        assert!(!ctx.has_value_transfer(SlotId(1), SlotId(2)));
    }

    #[test]
    fn test_materialize_slots_marks_slot_and_tuple() {
        let mut ctx = AnalysisContext::new(Arc::new(NoSelects));
        let tuple = ctx.descriptors_mut().create_tuple();
        let a = ctx.descriptors_mut().add_slot(tuple).unwrap();
        let b = ctx.descriptors_mut().add_slot(tuple).unwrap();

        ctx.materialize_slots(&[TypedExpr::slot_ref(b, "b", DataType::I32)])
            .unwrap();

        let descriptors = ctx.descriptors();
        assert!(!descriptors.slot(a).unwrap().materialized);
        assert!(descriptors.slot(b).unwrap().materialized);
        assert!(descriptors.tuple(tuple).unwrap().materialized);
    }
}
