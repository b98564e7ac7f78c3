//! The data model of union analysis: data types, descriptors and statistics.

pub mod data_type;
pub mod descriptor;
pub mod statistics;

pub use data_type::DataType;
pub use descriptor::{DescriptorTable, SlotDescriptor, SlotId, TupleDescriptor, TupleId};
pub use statistics::ColumnStats;
