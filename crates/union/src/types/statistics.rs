//! Column statistics carried by materialized slots
//!
//! Statistics are collected from storage by the catalog and attached to base
//! table slots. A union merges the statistics of every operand's column into
//! the slot of its materialized tuple, so the planner can size the output.

use super::DataType;
use super::descriptor::DescriptorTable;
use crate::ast::TypedExpr;
use serde::{Deserialize, Serialize};

/// Column-level statistics. `None` means unknown.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ColumnStats {
    /// Average serialized size of a value in bytes
    pub avg_size: Option<f64>,
    /// Maximum serialized size of a value in bytes
    pub max_size: Option<u64>,
    /// Number of distinct values
    pub num_distinct_values: Option<u64>,
    /// Number of null values
    pub num_nulls: Option<u64>,
}

impl ColumnStats {
    /// Statistics with every field unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Statistics for a computed value of the given type: only the sizes of
    /// fixed-width types are known.
    pub fn for_type(data_type: &DataType) -> Self {
        let size = data_type.slot_size();
        Self {
            avg_size: size.map(|s| s as f64),
            max_size: size,
            num_distinct_values: None,
            num_nulls: None,
        }
    }

    /// Statistics of a result expression. A direct column reference reuses
    /// the referenced slot's statistics; anything else only knows its type.
    pub fn from_expr(expr: &TypedExpr, descriptors: &DescriptorTable) -> Self {
        expr.unwrap_slot_ref()
            .and_then(|slot_ref| descriptors.slot(slot_ref.slot).ok())
            .map(|slot| slot.stats.clone())
            .unwrap_or_else(|| Self::for_type(&expr.data_type))
    }

    /// Accumulate the statistics of another column into this one, as if the
    /// rows of both were concatenated. Unknown on either side stays unknown.
    pub fn merge(&mut self, other: &ColumnStats) {
        self.num_distinct_values = self
            .num_distinct_values
            .zip(other.num_distinct_values)
            .map(|(a, b)| a.saturating_add(b));
        self.num_nulls = self
            .num_nulls
            .zip(other.num_nulls)
            .map(|(a, b)| a.saturating_add(b));
        self.avg_size = self.avg_size.zip(other.avg_size).map(|(a, b)| a.max(b));
        self.max_size = self.max_size.zip(other.max_size).map(|(a, b)| a.max(b));
    }

    pub fn has_distinct_values(&self) -> bool {
        self.num_distinct_values.is_some()
    }
}
