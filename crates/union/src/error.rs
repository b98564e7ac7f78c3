//! Error types for UNION analysis

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Structural errors, aggregated across all operands
    #[error("Found missing references. Aborting analysis: {}", .0.join(", "))]
    MissingReferences(Vec<String>),

    // Operand shape errors
    #[error(
        "Operands have unequal number of columns:\n'{first_sql}' has {first_count} column(s)\n'{operand_sql}' has {operand_count} column(s)"
    )]
    ColumnCountMismatch {
        first_sql: String,
        first_count: usize,
        operand_sql: String,
        operand_count: usize,
    },

    // Type errors
    #[error(
        "Incompatible return types '{left_type}' and '{right_type}' of exprs '{left_sql}' and '{right_sql}'."
    )]
    TypeIncompatibility {
        left_type: String,
        right_type: String,
        left_sql: String,
        right_sql: String,
    },

    // ORDER BY resolution errors
    #[error("{context}: ordinal must be >= 1: {ordinal}")]
    OrdinalTooSmall { context: String, ordinal: String },

    #[error("{context}: ordinal exceeds number of items in select list: {ordinal}")]
    OrdinalTooLarge { context: String, ordinal: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column '{0}' in ORDER BY clause is ambiguous")]
    AmbiguousColumn(String),

    // Errors raised by the select-level analyzer
    #[error("Analysis error: {0}")]
    Analysis(String),

    // System errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this is an ORDER BY ordinal range error.
    pub fn is_ordinal_range(&self) -> bool {
        matches!(
            self,
            Error::OrdinalTooSmall { .. } | Error::OrdinalTooLarge { .. }
        )
    }
}
