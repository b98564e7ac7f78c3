//! Semantic analysis services shared by every query block
//!
//! Union analysis does not resolve tables or columns itself. It drives the
//! analysis of its operands through these services:
//! - A [`SelectAnalyzer`] that analyzes a single SELECT block
//! - A [`TypeCoercion`] oracle that widens two column types to a common one
//! - An [`AnalysisContext`] owning the descriptor table and the facts
//!   collected for the planner
//! - A read-only [`Scope`] chain carrying the views visible to an operand

pub mod analyzer;
pub mod coercion;
pub mod context;
pub mod scope;

pub use analyzer::{AnalyzedSelect, OperandFailure, SelectAnalyzer};
pub use coercion::{StandardCoercion, TypeCoercion};
pub use context::AnalysisContext;
pub use scope::Scope;
