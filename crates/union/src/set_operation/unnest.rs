//! Flattening of nested unions into the canonical two-run form
//!
//! After analysis a union's operands are a distinct run followed by an all
//! run. The distinct run is deduplicated together; the all run is appended to
//! its output as-is. Nested unions are absorbed into the runs where that
//! preserves their semantics:
//!
//! - A nested union with a LIMIT or its own WITH clause is never absorbed.
//!   Its operands may refer to the WITH views, which only it introduces.
//! - Absorbing into the distinct run is always safe, since the whole run is
//!   deduplicated anyway.
//! - Absorbing into the all run is only safe for the nested all run; a
//!   nested distinct run stays behind as one opaque operand.

use super::operand::{Qualifier, UnionOperand};

/// Operands split into runs, before they are rejoined
#[derive(Debug, Default)]
pub struct UnnestedOperands {
    pub distinct: Vec<UnionOperand>,
    pub all: Vec<UnionOperand>,
}

impl UnnestedOperands {
    /// Join the runs into the canonical operand list, returning it with the
    /// length of its distinct prefix. Qualifiers are normalized to match the
    /// runs: the first operand has none, the rest take their run's qualifier.
    pub fn into_canonical(self) -> (Vec<UnionOperand>, usize) {
        let distinct_count = self.distinct.len();
        let mut operands = self.distinct;
        operands.extend(self.all);
        for (i, operand) in operands.iter_mut().enumerate() {
            let qualifier = match i {
                0 => None,
                i if i < distinct_count => Some(Qualifier::Distinct),
                _ => Some(Qualifier::All),
            };
            operand.set_qualifier(qualifier);
        }
        (operands, distinct_count)
    }
}

/// Index of the first all-run operand. The first operand is implicitly ALL,
/// so an ALL at index 1 means nothing is deduplicated.
pub fn split_index(operands: &[UnionOperand]) -> usize {
    operands
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, operand)| operand.qualifier() == Some(Qualifier::All))
        .map(|(i, _)| if i == 1 { 0 } else { i })
        .unwrap_or(operands.len())
}

/// Split operands with propagated qualifiers into runs, absorbing nested
/// unions along the way.
pub fn unnest_operands(operands: Vec<UnionOperand>) -> UnnestedOperands {
    let mut unnested = UnnestedOperands::default();
    if operands.len() == 1 {
        unnested.all = operands;
        return unnested;
    }

    let split = split_index(&operands);
    tracing::debug!("unnesting {} operands, all run starts at {}", operands.len(), split);
    for (i, operand) in operands.into_iter().enumerate() {
        if i < split {
            unnest_operand(&mut unnested.distinct, Qualifier::Distinct, operand);
        } else {
            unnest_operand(&mut unnested.all, Qualifier::All, operand);
        }
    }
    unnested
}

fn unnest_operand(target: &mut Vec<UnionOperand>, run: Qualifier, mut operand: UnionOperand) {
    let Some(nested) = operand.statement_mut().as_union_mut() else {
        target.push(operand);
        return;
    };

    if nested.has_limit() || nested.with().is_some() {
        tracing::debug!("keeping nested union opaque: {}", nested.to_sql());
        target.push(operand);
    } else if run == Qualifier::Distinct || !nested.has_distinct_ops() {
        tracing::debug!("absorbing nested union into {} run", run);
        target.extend(nested.take_operands());
    } else {
        tracing::debug!("absorbing all run of nested union, keeping its distinct run");
        target.extend(nested.remove_all_operands());
        target.push(operand);
    }
}
