//! The select-level analysis seam
//!
//! Resolving the tables, columns and functions of a single SELECT block is
//! the job of the host front-end. It plugs in through [`SelectAnalyzer`].

use super::context::AnalysisContext;
use super::scope::Scope;
use crate::ast::{SelectStatement, TypedExpr};
use crate::error::{Error, Result};
use crate::types::TupleId;
use std::sync::Arc;

/// Output of analyzing one SELECT block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzedSelect {
    /// One typed expression per select-list item, in order
    pub result_exprs: Vec<TypedExpr>,
    /// Tuples materialized by the block (its table scans)
    pub tuple_ids: Vec<TupleId>,
}

/// Why analyzing an operand failed.
///
/// Missing references are soft: the caller keeps analyzing the remaining
/// operands and reports every missing name at once. Anything else is fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum OperandFailure {
    /// Tables or views that could not be found
    Missing(Vec<String>),
    Fatal(Error),
}

impl From<Error> for OperandFailure {
    fn from(error: Error) -> Self {
        OperandFailure::Fatal(error)
    }
}

impl OperandFailure {
    /// Collapse into a statement-level error.
    pub fn into_error(self) -> Error {
        match self {
            OperandFailure::Missing(names) => Error::MissingReferences(names),
            OperandFailure::Fatal(error) => error,
        }
    }
}

/// Analyzes individual SELECT blocks on behalf of union analysis.
pub trait SelectAnalyzer: Send + Sync {
    /// Resolve the block's references and type its select list.
    ///
    /// Base tuples and slots go into `ctx`'s descriptor table. Views named
    /// in FROM are looked up through `scope`.
    fn analyze_select(
        &self,
        select: &SelectStatement,
        scope: &Arc<Scope>,
        ctx: &mut AnalysisContext,
    ) -> std::result::Result<AnalyzedSelect, OperandFailure>;

    /// Mark the slots the block needs to produce its result as materialized.
    fn materialize_required_slots(
        &self,
        select: &SelectStatement,
        ctx: &mut AnalysisContext,
    ) -> Result<()> {
        ctx.materialize_slots(select.result_exprs())
    }
}
