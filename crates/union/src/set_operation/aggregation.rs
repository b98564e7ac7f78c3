//! Grouping descriptors for duplicate elimination

use crate::ast::TypedExpr;
use crate::error::{Error, Result};
use crate::types::{DescriptorTable, TupleId};

/// Describes an aggregation: grouping expressions, aggregate functions and
/// the tuple the aggregation produces.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateInfo {
    grouping_exprs: Vec<TypedExpr>,
    aggregate_exprs: Vec<TypedExpr>,
    output_tuple: TupleId,
}

impl AggregateInfo {
    /// A grouping-only aggregation writing into an existing tuple. The tuple
    /// must have exactly one slot per grouping expression, of the same type.
    pub fn create(
        grouping_exprs: Vec<TypedExpr>,
        output_tuple: TupleId,
        descriptors: &DescriptorTable,
    ) -> Result<Self> {
        let slots = descriptors.tuple_slots(output_tuple)?;
        if slots.len() != grouping_exprs.len() {
            return Err(Error::Analysis(format!(
                "aggregation output tuple {} has {} slots for {} grouping exprs",
                output_tuple,
                slots.len(),
                grouping_exprs.len()
            )));
        }
        for (slot, expr) in slots.iter().zip(&grouping_exprs) {
            if slot.data_type.as_ref() != Some(&expr.data_type) {
                return Err(Error::Analysis(format!(
                    "grouping expr {} of type {} does not match slot {}",
                    expr, expr.data_type, slot.id
                )));
            }
        }

        Ok(Self {
            grouping_exprs,
            aggregate_exprs: Vec::new(),
            output_tuple,
        })
    }

    pub fn grouping_exprs(&self) -> &[TypedExpr] {
        &self.grouping_exprs
    }

    pub fn aggregate_exprs(&self) -> &[TypedExpr] {
        &self.aggregate_exprs
    }

    pub fn output_tuple(&self) -> TupleId {
        self.output_tuple
    }

    /// Whether this aggregation only removes duplicates
    pub fn is_distinct_only(&self) -> bool {
        self.aggregate_exprs.is_empty()
    }
}

/// Duplicate elimination over a union's output: groups on every output
/// column and produces the union's own tuple.
pub fn build_distinct_agg(
    result_exprs: &[TypedExpr],
    tuple_id: TupleId,
    descriptors: &DescriptorTable,
) -> Result<AggregateInfo> {
    AggregateInfo::create(result_exprs.to_vec(), tuple_id, descriptors).map_err(|e| {
        tracing::debug!("distinct aggregation failed: {}", e);
        Error::Internal("error creating agg info in union analysis".into())
    })
}
