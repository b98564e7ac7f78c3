//! DISTINCT propagation across a union chain
//!
//! A union chain is left-associative, so a DISTINCT operator deduplicates
//! everything to its left:
//!
//! ```text
//! A UNION ALL B UNION DISTINCT C
//!   = (A UNION ALL B) UNION DISTINCT C
//!   = A UNION DISTINCT B UNION DISTINCT C
//! ```

use super::operand::{Qualifier, UnionOperand};

/// Force every operand left of the rightmost DISTINCT to DISTINCT. The first
/// operand has no qualifier and is never touched.
pub fn propagate_distinct(operands: &mut [UnionOperand]) {
    let Some(last_distinct) = operands
        .iter()
        .rposition(|operand| operand.qualifier() == Some(Qualifier::Distinct))
    else {
        return;
    };

    for operand in operands.iter_mut().take(last_distinct).skip(1) {
        if operand.qualifier() != Some(Qualifier::Distinct) {
            tracing::trace!("propagating DISTINCT to {}", operand.statement().to_sql());
            operand.set_qualifier(Some(Qualifier::Distinct));
        }
    }
}
