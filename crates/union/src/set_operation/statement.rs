//! Query statements that can appear as union operands

use super::UnionStatement;
use crate::ast::{SelectStatement, TypedExpr};
use crate::error::{Error, Result};
use crate::semantic::{AnalysisContext, OperandFailure, Scope};
use crate::types::TupleId;
use std::sync::Arc;

/// A query block: either a single SELECT or a nested union
#[derive(Debug, Clone)]
pub enum QueryStatement {
    Select(Box<SelectStatement>),
    Union(Box<UnionStatement>),
}

impl From<SelectStatement> for QueryStatement {
    fn from(select: SelectStatement) -> Self {
        QueryStatement::Select(Box::new(select))
    }
}

impl From<UnionStatement> for QueryStatement {
    fn from(union: UnionStatement) -> Self {
        QueryStatement::Union(Box::new(union))
    }
}

impl QueryStatement {
    pub fn as_select(&self) -> Option<&SelectStatement> {
        match self {
            QueryStatement::Select(select) => Some(select),
            QueryStatement::Union(_) => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionStatement> {
        match self {
            QueryStatement::Union(union) => Some(union),
            QueryStatement::Select(_) => None,
        }
    }

    pub fn as_union_mut(&mut self) -> Option<&mut UnionStatement> {
        match self {
            QueryStatement::Union(union) => Some(union),
            QueryStatement::Select(_) => None,
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(self, QueryStatement::Union(_))
    }

    pub fn is_analyzed(&self) -> bool {
        match self {
            QueryStatement::Select(select) => select.is_analyzed(),
            QueryStatement::Union(union) => union.is_analyzed(),
        }
    }

    /// Typed result expressions; empty before analysis
    pub fn result_exprs(&self) -> &[TypedExpr] {
        match self {
            QueryStatement::Select(select) => select.result_exprs(),
            QueryStatement::Union(union) => union.result_exprs(),
        }
    }

    /// Replace the result expressions, e.g. with implicitly cast versions.
    pub(crate) fn set_result_exprs(&mut self, exprs: Vec<TypedExpr>) {
        match self {
            QueryStatement::Select(select) => select.set_result_exprs(exprs),
            QueryStatement::Union(union) => union.set_result_exprs(exprs),
        }
    }

    pub fn col_labels(&self) -> Vec<String> {
        match self {
            QueryStatement::Select(select) => select.col_labels(),
            QueryStatement::Union(union) => union.col_labels(),
        }
    }

    pub fn has_limit(&self) -> bool {
        match self {
            QueryStatement::Select(select) => select.has_limit(),
            QueryStatement::Union(union) => union.has_limit(),
        }
    }

    pub fn has_order_by(&self) -> bool {
        match self {
            QueryStatement::Select(select) => select.has_order_by(),
            QueryStatement::Union(union) => union.has_order_by(),
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            QueryStatement::Select(select) => select.to_sql(),
            QueryStatement::Union(union) => union.to_sql(),
        }
    }

    pub fn materialized_tuple_ids(&self) -> Vec<TupleId> {
        match self {
            QueryStatement::Select(select) => select.materialized_tuple_ids(),
            QueryStatement::Union(union) => union.materialized_tuple_ids(),
        }
    }

    /// Copy without any analysis state
    pub fn clone_unanalyzed(&self) -> Self {
        match self {
            QueryStatement::Select(select) => select.clone_unanalyzed().into(),
            QueryStatement::Union(union) => union.clone_unanalyzed().into(),
        }
    }

    /// Analyze the statement as a top-level query.
    pub fn analyze(&mut self, ctx: &mut AnalysisContext) -> Result<()> {
        let scope = Scope::root();
        self.analyze_in_scope(&scope, ctx)
            .map_err(OperandFailure::into_error)
    }

    /// Analyze the statement in a given scope, e.g. a view body in the scope
    /// of the block referencing it. Missing references stay soft.
    pub fn analyze_in_scope(
        &mut self,
        scope: &Arc<Scope>,
        ctx: &mut AnalysisContext,
    ) -> std::result::Result<(), OperandFailure> {
        match self {
            QueryStatement::Select(select) => {
                if select.is_analyzed() {
                    return Err(Error::Internal("select statement already analyzed".into()).into());
                }
                let analyzer = ctx.select_analyzer();
                let analysis = analyzer.analyze_select(select, scope, ctx)?;
                select.set_analysis(analysis);
                Ok(())
            }
            QueryStatement::Union(union) => union.analyze_in_scope(scope, ctx),
        }
    }

    pub fn materialize_required_slots(&self, ctx: &mut AnalysisContext) -> Result<()> {
        match self {
            QueryStatement::Select(select) => {
                let analyzer = ctx.select_analyzer();
                analyzer.materialize_required_slots(select, ctx)
            }
            QueryStatement::Union(union) => union.materialize_required_slots(ctx),
        }
    }
}
