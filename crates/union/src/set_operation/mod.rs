//! UNION analysis
//!
//! Analyzing a union runs these steps in order:
//! 1. DISTINCT is propagated right to left ([`qualifier`])
//! 2. Every operand is analyzed in its own child scope; missing references
//!    are collected across all operands before failing
//! 3. Column counts are checked and column types unified, inserting
//!    implicit casts ([`compatibility`])
//! 4. The output tuple is created with merged statistics ([`metadata`])
//! 5. ORDER BY is resolved against the output columns ([`ordinal`])
//! 6. The SQL text is captured, before the operand list is rewritten
//! 7. Nested unions are flattened into a distinct run followed by an all
//!    run, and every operand gets a substitution map ([`unnest`])
//! 8. A distinct run gets a duplicate-eliminating aggregation
//!    ([`aggregation`])

pub mod aggregation;
pub mod compatibility;
pub mod metadata;
pub mod operand;
pub mod ordinal;
pub mod qualifier;
pub mod render;
pub mod statement;
pub mod unnest;

pub use aggregation::AggregateInfo;
pub use metadata::AliasMap;
pub use operand::{Qualifier, SubstitutionMap, UnionOperand};
pub use ordinal::SortInfo;
pub use statement::QueryStatement;

use crate::ast::{LimitElement, OrderByElement, TypedExpr, WithClause};
use crate::error::{Error, Result};
use crate::semantic::{AnalysisContext, OperandFailure, Scope};
use crate::types::TupleId;
use std::sync::Arc;

/// A chain of query blocks joined by UNION [ALL | DISTINCT]
#[derive(Debug, Clone)]
pub struct UnionStatement {
    /// Before analysis: the operands as written. After analysis: the
    /// distinct run followed by the all run.
    operands: Vec<UnionOperand>,
    /// Length of the distinct run at the front of `operands`
    distinct_count: usize,
    order_by: Vec<OrderByElement>,
    limit: LimitElement,
    with: Option<WithClause>,

    // Analysis state
    analyzed: bool,
    tuple_id: Option<TupleId>,
    result_exprs: Vec<TypedExpr>,
    aliases: AliasMap,
    sort_info: Option<SortInfo>,
    distinct_agg: Option<AggregateInfo>,
    /// SQL text captured before unnesting
    sql: Option<String>,
}

impl UnionStatement {
    pub fn new(
        operands: Vec<UnionOperand>,
        order_by: Vec<OrderByElement>,
        limit: LimitElement,
    ) -> Self {
        Self {
            operands,
            distinct_count: 0,
            order_by,
            limit,
            with: None,
            analyzed: false,
            tuple_id: None,
            result_exprs: Vec::new(),
            aliases: AliasMap::new(),
            sort_info: None,
            distinct_agg: None,
            sql: None,
        }
    }

    /// Attach a WITH clause whose views are visible to every operand
    pub fn with_clause(mut self, with: WithClause) -> Self {
        self.with = Some(with);
        self
    }

    pub fn with(&self) -> Option<&WithClause> {
        self.with.as_ref()
    }

    pub fn operands(&self) -> &[UnionOperand] {
        &self.operands
    }

    /// Operands deduplicated together. Empty before analysis.
    pub fn distinct_operands(&self) -> &[UnionOperand] {
        if !self.analyzed {
            return &[];
        }
        &self.operands[..self.distinct_count]
    }

    /// Operands appended without deduplication. Empty before analysis.
    pub fn all_operands(&self) -> &[UnionOperand] {
        if !self.analyzed {
            return &[];
        }
        &self.operands[self.distinct_count..]
    }

    pub fn has_distinct_ops(&self) -> bool {
        !self.distinct_operands().is_empty()
    }

    pub fn has_all_ops(&self) -> bool {
        !self.all_operands().is_empty()
    }

    /// Remove the all run, returning its operands.
    pub fn remove_all_operands(&mut self) -> Vec<UnionOperand> {
        if !self.analyzed {
            return Vec::new();
        }
        self.operands.split_off(self.distinct_count)
    }

    /// Move every operand out, leaving the statement empty.
    pub(crate) fn take_operands(&mut self) -> Vec<UnionOperand> {
        self.distinct_count = 0;
        std::mem::take(&mut self.operands)
    }

    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    /// The tuple materialized by the union; None before analysis
    pub fn tuple_id(&self) -> Option<TupleId> {
        self.tuple_id
    }

    pub fn result_exprs(&self) -> &[TypedExpr] {
        &self.result_exprs
    }

    pub(crate) fn set_result_exprs(&mut self, exprs: Vec<TypedExpr>) {
        self.result_exprs = exprs;
    }

    /// Duplicate elimination over the distinct run, if there is one
    pub fn distinct_agg_info(&self) -> Option<&AggregateInfo> {
        self.distinct_agg.as_ref()
    }

    pub fn sort_info(&self) -> Option<&SortInfo> {
        self.sort_info.as_ref()
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    pub fn order_by(&self) -> &[OrderByElement] {
        &self.order_by
    }

    pub fn limit(&self) -> &LimitElement {
        &self.limit
    }

    /// Output labels, taken from the first operand
    pub fn col_labels(&self) -> Vec<String> {
        self.operands
            .first()
            .map(|operand| operand.statement().col_labels())
            .unwrap_or_default()
    }

    pub fn has_limit(&self) -> bool {
        self.limit.has_limit()
    }

    pub fn has_order_by(&self) -> bool {
        !self.order_by.is_empty()
    }

    pub fn materialized_tuple_ids(&self) -> Vec<TupleId> {
        self.tuple_id.into_iter().collect()
    }

    /// The statement's SQL. Once analyzed this is the text captured before
    /// nested unions were flattened.
    pub fn to_sql(&self) -> String {
        if let Some(sql) = &self.sql {
            return sql.clone();
        }
        render::render_union(
            self.with.as_ref(),
            &self.operands,
            &self.order_by,
            &self.limit,
        )
    }

    /// Copy of the operands and clauses without analysis state
    pub fn clone_unanalyzed(&self) -> Self {
        let operands = self
            .operands
            .iter()
            .map(UnionOperand::clone_unanalyzed)
            .collect();
        let mut clone = Self::new(operands, self.order_by.clone(), self.limit.clone());
        clone.with = self.with.as_ref().map(WithClause::clone_unanalyzed);
        clone
    }

    /// Analyze the union as a top-level statement.
    pub fn analyze(&mut self, ctx: &mut AnalysisContext) -> Result<()> {
        let scope = Scope::root();
        self.analyze_in_scope(&scope, ctx)
            .map_err(OperandFailure::into_error)
    }

    pub(crate) fn analyze_in_scope(
        &mut self,
        parent: &Arc<Scope>,
        ctx: &mut AnalysisContext,
    ) -> std::result::Result<(), OperandFailure> {
        if self.analyzed {
            return Err(Error::Internal("union statement already analyzed".into()).into());
        }
        if self.operands.is_empty() {
            return Err(Error::Internal("union statement has no operands".into()).into());
        }

        let scope = match &self.with {
            Some(with) => Scope::with_views(parent, with),
            None => Arc::clone(parent),
        };

        qualifier::propagate_distinct(&mut self.operands);

        let mut missing: Vec<String> = Vec::new();
        for operand in &mut self.operands {
            match operand.analyze(&scope, ctx) {
                Ok(()) => {}
                Err(OperandFailure::Missing(names)) => {
                    for name in names {
                        if !missing.contains(&name) {
                            missing.push(name);
                        }
                    }
                }
                Err(fatal) => return Err(fatal),
            }
        }
        if !missing.is_empty() {
            tracing::debug!("union analysis found missing references: {:?}", missing);
            return Err(OperandFailure::Missing(missing));
        }

        compatibility::check_column_counts(&self.operands)?;
        let coercion = ctx.coercion();
        compatibility::unify_column_types(&mut self.operands, coercion.as_ref())?;

        self.create_metadata(ctx)?;
        self.create_sort_info()?;

        self.sql = Some(self.to_sql());

        self.unnest_operands(ctx)?;
        self.analyzed = true;
        Ok(())
    }

    fn create_metadata(&mut self, ctx: &mut AnalysisContext) -> Result<()> {
        if self.tuple_id.is_some() {
            return Err(Error::Internal("union tuple already created".into()));
        }
        let labels = self.col_labels();
        let tuple = metadata::create_tuple(&self.operands, &labels, ctx)?;
        self.tuple_id = Some(tuple.tuple_id);
        self.result_exprs = tuple.result_exprs;
        self.aliases = tuple.aliases;
        Ok(())
    }

    fn create_sort_info(&mut self) -> Result<()> {
        if self.has_order_by() {
            self.sort_info = Some(SortInfo::create(
                &self.order_by,
                &self.result_exprs,
                &self.aliases,
            )?);
        }
        Ok(())
    }

    fn unnest_operands(&mut self, ctx: &mut AnalysisContext) -> Result<()> {
        let tuple_id = self
            .tuple_id
            .ok_or_else(|| Error::Internal("union tuple not created".into()))?;

        let operands = std::mem::take(&mut self.operands);
        let (operands, distinct_count) = unnest::unnest_operands(operands).into_canonical();
        self.operands = operands;
        self.distinct_count = distinct_count;
        tracing::debug!(
            "union unnested into {} distinct and {} all operands",
            distinct_count,
            self.operands.len() - distinct_count
        );

        for operand in &mut self.operands {
            let smap = operand_smap(&self.result_exprs, operand)?;
            operand.set_smap(smap);
        }

        if distinct_count > 0 {
            self.distinct_agg = Some(aggregation::build_distinct_agg(
                &self.result_exprs,
                tuple_id,
                ctx.descriptors(),
            )?);
        }
        Ok(())
    }

    /// Mark the slots needed to produce the materialized output slots, then
    /// let every operand do the same for its own slots.
    pub fn materialize_required_slots(&self, ctx: &mut AnalysisContext) -> Result<()> {
        let tuple_id = self
            .tuple_id
            .ok_or_else(|| Error::Internal("union statement not analyzed".into()))?;
        let output_slots = ctx.descriptors().tuple(tuple_id)?.slots.clone();

        if self.has_distinct_ops() {
            // Every output column is a grouping column
            for slot in &output_slots {
                ctx.descriptors_mut().slot_mut(*slot)?.materialized = true;
            }
        }

        let mut exprs = Vec::new();
        for (column, slot) in output_slots.iter().enumerate() {
            if !ctx.descriptors().slot(*slot)?.materialized {
                continue;
            }
            for operand in &self.operands {
                if let Some(expr) = operand.result_exprs().get(column) {
                    exprs.push(expr.clone());
                }
            }
            if let Some(agg) = &self.distinct_agg {
                let agg_slot = ctx
                    .descriptors()
                    .tuple(agg.output_tuple())?
                    .slots
                    .get(column)
                    .copied();
                if let Some(agg_slot) = agg_slot {
                    ctx.descriptors_mut().slot_mut(agg_slot)?.materialized = true;
                }
            }
        }
        ctx.materialize_slots(&exprs)?;

        for operand in &self.operands {
            operand.statement().materialize_required_slots(ctx)?;
        }
        Ok(())
    }
}

/// Map each output slot to the operand's expression for that column, cast
/// to the output type where an absorbed operand's type differs.
fn operand_smap(result_exprs: &[TypedExpr], operand: &UnionOperand) -> Result<SubstitutionMap> {
    let mut smap = SubstitutionMap::new();
    for (output, expr) in result_exprs.iter().zip(operand.result_exprs()) {
        let slot_ref = output
            .unwrap_slot_ref()
            .ok_or_else(|| Error::Internal(format!("union output {} is not a slot", output)))?;
        let mapped = if expr.data_type == output.data_type {
            expr.clone()
        } else {
            expr.cast_to(output.data_type.clone())
        };
        smap.add_mapping(slot_ref.slot, mapped);
    }
    Ok(smap)
}
