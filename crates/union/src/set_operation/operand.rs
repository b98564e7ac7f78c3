//! Union operands and their substitution maps

use super::statement::QueryStatement;
use crate::ast::{Expression, TypedExpr};
use crate::semantic::{AnalysisContext, OperandFailure, Scope};
use crate::types::SlotId;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

/// The set operator joining an operand to everything on its left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
    All,
    Distinct,
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::All => write!(f, "ALL"),
            Qualifier::Distinct => write!(f, "DISTINCT"),
        }
    }
}

/// Maps the union's output slots to one operand's result expressions.
/// Keys are unique; adding an existing key replaces its expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionMap {
    mappings: Vec<(SlotId, TypedExpr)>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mapping(&mut self, slot: SlotId, expr: TypedExpr) {
        match self.mappings.iter_mut().find(|(key, _)| *key == slot) {
            Some((_, existing)) => *existing = expr,
            None => self.mappings.push((slot, expr)),
        }
    }

    pub fn get(&self, slot: SlotId) -> Option<&TypedExpr> {
        self.mappings
            .iter()
            .find(|(key, _)| *key == slot)
            .map(|(_, expr)| expr)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &TypedExpr)> {
        self.mappings.iter().map(|(slot, expr)| (*slot, expr))
    }

    /// Rewrite references to mapped slots into the mapped expressions.
    pub fn substitute(&self, expr: &Expression) -> Expression {
        let mut result = expr.clone();
        result
            .transform(&mut |node| -> Result<(), Infallible> {
                if let Expression::SlotRef(slot_ref) = node
                    && let Some(mapped) = self.get(slot_ref.slot)
                {
                    *node = mapped.expr.clone();
                }
                Ok(())
            })
            .unwrap_or_else(|never| match never {});
        result
    }
}

/// One query block of a union, created by the parser.
#[derive(Debug, Clone)]
pub struct UnionOperand {
    statement: QueryStatement,
    /// None for the first operand, which is implicitly ALL
    qualifier: Option<Qualifier>,
    /// Scope the operand was analyzed in. Set during analysis.
    scope: Option<Arc<Scope>>,
    /// Output slot of the union -> this operand's result expression
    smap: SubstitutionMap,
    /// Set if the operand is known to return no rows. Used by the planner.
    dropped: bool,
}

impl UnionOperand {
    pub fn new(statement: impl Into<QueryStatement>, qualifier: Option<Qualifier>) -> Self {
        Self {
            statement: statement.into(),
            qualifier,
            scope: None,
            smap: SubstitutionMap::new(),
            dropped: false,
        }
    }

    pub fn statement(&self) -> &QueryStatement {
        &self.statement
    }

    pub fn statement_mut(&mut self) -> &mut QueryStatement {
        &mut self.statement
    }

    pub fn qualifier(&self) -> Option<Qualifier> {
        self.qualifier
    }

    pub fn set_qualifier(&mut self, qualifier: Option<Qualifier>) {
        self.qualifier = qualifier;
    }

    pub fn scope(&self) -> Option<&Arc<Scope>> {
        self.scope.as_ref()
    }

    pub fn smap(&self) -> &SubstitutionMap {
        &self.smap
    }

    pub(crate) fn set_smap(&mut self, smap: SubstitutionMap) {
        self.smap = smap;
    }

    pub fn drop_operand(&mut self) {
        self.dropped = true;
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    /// Result expressions of the operand's statement
    pub fn result_exprs(&self) -> &[TypedExpr] {
        self.statement.result_exprs()
    }

    /// Analyze the statement in a fresh child scope of `parent`.
    pub(crate) fn analyze(
        &mut self,
        parent: &Arc<Scope>,
        ctx: &mut AnalysisContext,
    ) -> Result<(), OperandFailure> {
        let scope = Scope::child(parent);
        self.scope = Some(Arc::clone(&scope));
        self.statement.analyze_in_scope(&scope, ctx)
    }

    /// Copy of the statement and qualifier only, ready for re-analysis
    pub fn clone_unanalyzed(&self) -> Self {
        Self::new(self.statement.clone_unanalyzed(), self.qualifier)
    }
}
