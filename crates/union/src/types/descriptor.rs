//! Tuple and slot descriptors
//!
//! Every row layout produced during analysis (base table scans, union
//! outputs, aggregation outputs) is a tuple descriptor owning an ordered list
//! of slots. Descriptors live in a single arena, the [`DescriptorTable`], and
//! are referred to by id everywhere else.

use super::DataType;
use super::statistics::ColumnStats;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a tuple descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TupleId(pub u32);

/// Identifier of a slot descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single column of a tuple
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDescriptor {
    pub id: SlotId,
    /// Tuple this slot belongs to
    pub parent: TupleId,
    /// Output label, if any (union outputs use the first operand's labels)
    pub label: Option<String>,
    /// Resolved type; None until the owner assigns it
    pub data_type: Option<DataType>,
    pub stats: ColumnStats,
    /// Whether this slot is required downstream. Set by projection passes.
    pub materialized: bool,
}

/// An ordered row layout
#[derive(Debug, Clone, PartialEq)]
pub struct TupleDescriptor {
    pub id: TupleId,
    /// Slots in output order
    pub slots: Vec<SlotId>,
    pub materialized: bool,
    /// Base table this tuple scans, if any
    pub table: Option<String>,
}

/// Arena of all tuple and slot descriptors of a statement
#[derive(Debug, Clone, Default)]
pub struct DescriptorTable {
    tuples: Vec<TupleDescriptor>,
    slots: Vec<SlotDescriptor>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new, empty tuple descriptor
    pub fn create_tuple(&mut self) -> TupleId {
        let id = TupleId(self.tuples.len() as u32);
        self.tuples.push(TupleDescriptor {
            id,
            slots: Vec::new(),
            materialized: false,
            table: None,
        });
        id
    }

    /// Append a new slot to the given tuple
    pub fn add_slot(&mut self, tuple: TupleId) -> Result<SlotId> {
        let id = SlotId(self.slots.len() as u32);
        self.tuple_mut(tuple)?.slots.push(id);
        self.slots.push(SlotDescriptor {
            id,
            parent: tuple,
            label: None,
            data_type: None,
            stats: ColumnStats::unknown(),
            materialized: false,
        });
        Ok(id)
    }

    pub fn tuple(&self, id: TupleId) -> Result<&TupleDescriptor> {
        self.tuples
            .get(id.0 as usize)
            .ok_or_else(|| Error::Internal(format!("Unknown tuple id {}", id)))
    }

    pub fn tuple_mut(&mut self, id: TupleId) -> Result<&mut TupleDescriptor> {
        self.tuples
            .get_mut(id.0 as usize)
            .ok_or_else(|| Error::Internal(format!("Unknown tuple id {}", id)))
    }

    pub fn slot(&self, id: SlotId) -> Result<&SlotDescriptor> {
        self.slots
            .get(id.0 as usize)
            .ok_or_else(|| Error::Internal(format!("Unknown slot id {}", id)))
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Result<&mut SlotDescriptor> {
        self.slots
            .get_mut(id.0 as usize)
            .ok_or_else(|| Error::Internal(format!("Unknown slot id {}", id)))
    }

    /// Slots of a tuple, in order
    pub fn tuple_slots(&self, id: TupleId) -> Result<Vec<&SlotDescriptor>> {
        self.tuple(id)?
            .slots
            .iter()
            .map(|slot| self.slot(*slot))
            .collect()
    }

    pub fn num_tuples(&self) -> usize {
        self.tuples.len()
    }
}
