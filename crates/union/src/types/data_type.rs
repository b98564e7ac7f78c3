//! SQL data types of union result columns

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL data types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    // Boolean
    Bool,
    // Integer types
    I8,
    I16,
    I32,
    I64,
    I128,
    // Float types
    F32,
    F64,
    // Decimal with precision and scale
    Decimal(Option<u32>, Option<u32>), // precision, scale (optional for flexibility)
    // String types
    Str,
    // Date/Time types
    Date,
    Time,
    Timestamp,
    // Explicit Null type (for NULL literals)
    Null,
}

impl DataType {
    /// Check if this type is a signed integer
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::I8 | DataType::I16 | DataType::I32 | DataType::I64 | DataType::I128
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }

    /// Width of an integer type in bytes, used to order integer widening.
    pub fn integer_width(&self) -> Option<u32> {
        match self {
            DataType::I8 => Some(1),
            DataType::I16 => Some(2),
            DataType::I32 => Some(4),
            DataType::I64 => Some(8),
            DataType::I128 => Some(16),
            _ => None,
        }
    }

    /// Number of decimal digits needed to hold any value of an integer type.
    pub fn integer_digits(&self) -> Option<u32> {
        match self {
            DataType::I8 => Some(3),
            DataType::I16 => Some(5),
            DataType::I32 => Some(10),
            DataType::I64 => Some(19),
            DataType::I128 => Some(39),
            _ => None,
        }
    }

    /// Size in bytes of a materialized slot of this type, if fixed.
    pub fn slot_size(&self) -> Option<u64> {
        match self {
            DataType::Bool | DataType::I8 => Some(1),
            DataType::I16 => Some(2),
            DataType::I32 | DataType::F32 | DataType::Date => Some(4),
            DataType::I64 | DataType::F64 | DataType::Time => Some(8),
            DataType::I128 | DataType::Decimal(_, _) => Some(16),
            DataType::Timestamp => Some(12),
            DataType::Null => Some(0),
            DataType::Str => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "BOOLEAN"),
            DataType::I8 => write!(f, "TINYINT"),
            DataType::I16 => write!(f, "SMALLINT"),
            DataType::I32 => write!(f, "INT"),
            DataType::I64 => write!(f, "BIGINT"),
            DataType::I128 => write!(f, "HUGEINT"),
            DataType::F32 => write!(f, "REAL"),
            DataType::F64 => write!(f, "DOUBLE PRECISION"),
            DataType::Decimal(p, s) => match (p, s) {
                (Some(p), Some(s)) => write!(f, "DECIMAL({}, {})", p, s),
                (Some(p), None) => write!(f, "DECIMAL({})", p),
                _ => write!(f, "DECIMAL"),
            },
            DataType::Str => write!(f, "VARCHAR"),
            DataType::Date => write!(f, "DATE"),
            DataType::Time => write!(f, "TIME"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Null => write!(f, "NULL"),
        }
    }
}
