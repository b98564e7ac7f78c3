//! Semantic analysis and normalization of SQL UNION statements
//!
//! This crate analyzes a chain of query blocks joined by `UNION [ALL |
//! DISTINCT]` for a SQL front-end that:
//! - Parses statements into the [`ast`] nodes
//! - Analyzes individual SELECT blocks through a [`SelectAnalyzer`]
//! - Plans the union from the analyzed [`UnionStatement`]
//!
//! Analysis propagates DISTINCT across the chain, unifies column types,
//! builds the union's output tuple with merged statistics, resolves ORDER
//! BY ordinals, and flattens nested unions into a distinct run followed by
//! an all run.

pub mod ast;
mod error;
pub mod semantic;
pub mod set_operation;
pub mod types;

pub use error::{Error, Result};
pub use semantic::{
    AnalysisContext, AnalyzedSelect, OperandFailure, Scope, SelectAnalyzer, StandardCoercion,
    TypeCoercion,
};
pub use set_operation::{
    AggregateInfo, Qualifier, QueryStatement, SortInfo, SubstitutionMap, UnionOperand,
    UnionStatement,
};
pub use types::{ColumnStats, DataType, DescriptorTable, SlotId, TupleId};
