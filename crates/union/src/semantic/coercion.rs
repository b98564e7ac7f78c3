//! Type compatibility for union result columns
//! Finds the common type two operands' columns can both be cast to

use crate::ast::TypedExpr;
use crate::error::{Error, Result};
use crate::types::DataType;

/// Maximum precision of a DECIMAL
const MAX_DECIMAL_PRECISION: u32 = 38;

/// Oracle deciding the common type of two columns.
pub trait TypeCoercion: Send + Sync {
    /// The type both `left` and `right` can be implicitly cast to. The
    /// expressions are only used to describe a failure.
    fn compatible_type(
        &self,
        left: &DataType,
        right: &DataType,
        left_expr: &TypedExpr,
        right_expr: &TypedExpr,
    ) -> Result<DataType>;
}

/// The built-in widening lattice
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCoercion;

impl TypeCoercion for StandardCoercion {
    fn compatible_type(
        &self,
        left: &DataType,
        right: &DataType,
        left_expr: &TypedExpr,
        right_expr: &TypedExpr,
    ) -> Result<DataType> {
        widen(left, right).ok_or_else(|| Error::TypeIncompatibility {
            left_type: left.to_string(),
            right_type: right.to_string(),
            left_sql: left_expr.to_string(),
            right_sql: right_expr.to_string(),
        })
    }
}

/// Widest type of the two, or None if they have no common type
pub fn widen(left: &DataType, right: &DataType) -> Option<DataType> {
    match (left, right) {
        // NULL is compatible with any type
        (DataType::Null, other) | (other, DataType::Null) => Some(other.clone()),

        // Same type is always compatible
        (l, r) if l == r => Some(l.clone()),

        // Integer widening
        (l, r) if l.is_integer() && r.is_integer() => {
            if l.integer_width() >= r.integer_width() {
                Some(l.clone())
            } else {
                Some(r.clone())
            }
        }

        // Integer to float promotion; REAL only holds integers up to INT
        (int, DataType::F32) | (DataType::F32, int) if int.is_integer() => {
            if int.integer_width() <= Some(4) {
                Some(DataType::F32)
            } else {
                Some(DataType::F64)
            }
        }
        (int, DataType::F64) | (DataType::F64, int) if int.is_integer() => Some(DataType::F64),
        (DataType::F32, DataType::F64) | (DataType::F64, DataType::F32) => Some(DataType::F64),

        // Decimal merging
        (DataType::Decimal(p1, s1), DataType::Decimal(p2, s2)) => {
            Some(merge_decimals((*p1, *s1), (*p2, *s2)))
        }
        (int, DataType::Decimal(p, s)) | (DataType::Decimal(p, s), int) if int.is_integer() => {
            let digits = int.integer_digits()?;
            Some(merge_decimals((Some(digits), Some(0)), (*p, *s)))
        }
        (float, DataType::Decimal(_, _)) | (DataType::Decimal(_, _), float) if float.is_float() => {
            Some(DataType::F64)
        }

        // Date/time promotion
        (DataType::Date, DataType::Timestamp) | (DataType::Timestamp, DataType::Date) => {
            Some(DataType::Timestamp)
        }

        // All other combinations are incompatible
        _ => None,
    }
}

/// Smallest decimal holding both: the larger integer part and the larger
/// scale. An unspecified precision or scale stays unspecified.
fn merge_decimals(left: (Option<u32>, Option<u32>), right: (Option<u32>, Option<u32>)) -> DataType {
    match (left, right) {
        ((Some(p1), Some(s1)), (Some(p2), Some(s2))) => {
            let scale = s1.max(s2);
            let integer_digits = p1.saturating_sub(s1).max(p2.saturating_sub(s2));
            let precision = (integer_digits + scale).min(MAX_DECIMAL_PRECISION);
            DataType::Decimal(Some(precision), Some(scale.min(precision)))
        }
        _ => DataType::Decimal(None, None),
    }
}
