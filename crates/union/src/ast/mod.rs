//! Abstract Syntax Tree (AST) for the query blocks a union is built from
//!
//! The parser produces these nodes; select-level analysis annotates them with
//! typed result expressions, and union analysis rewrites them.

pub mod expressions;
pub mod query;

pub use expressions::{Expression, Literal, Operator, SlotRef, TypedExpr};
pub use query::{
    Direction, LimitElement, OrderByElement, SelectStatement, TableRef, WithClause, WithView,
};
