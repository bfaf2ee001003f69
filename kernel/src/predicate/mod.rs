//! Storage-level predicates.
//!
//! A [`Predicate`] is the output contract of filter conversion: a normalized
//! tree the storage layer evaluates against per-file statistics (min/max
//! values, null counts) to decide whether a file can be skipped. Every leaf
//! holds a schema field index and literals in the internal representation;
//! nothing is resolved or converted after construction.
//!
//! The statistics evaluator itself lives with the file store. This module
//! carries a reference row-level evaluator ([`Predicate::test`]), used by the
//! conversion tests and for partition-level pruning where whole values are
//! known.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::datum::Datum;

mod builder;
mod convert;

#[cfg(test)]
mod tests;

pub use builder::PredicateBuilder;
pub use convert::{convert, from_map, PredicateConverter};

/// A comparison between a field and a literal, expressed field-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Returns the operator `op2` such that `B op2 A` is equivalent to
    /// `A op B`. Used to normalize literal-first comparisons to field-first.
    pub(crate) fn commute(&self) -> CompareOp {
        use CompareOp::*;
        match self {
            Eq => Eq,
            NotEq => NotEq,
            Gt => Lt,
            Gte => Lte,
            Lt => Gt,
            Lte => Gte,
        }
    }

    fn matches(&self, ord: Ordering) -> bool {
        use CompareOp::*;
        match self {
            Eq => ord == Ordering::Equal,
            NotEq => ord != Ordering::Equal,
            Gt => ord == Ordering::Greater,
            Gte => ord != Ordering::Less,
            Lt => ord == Ordering::Less,
            Lte => ord != Ordering::Greater,
        }
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use CompareOp::*;
        let symbol = match self {
            Eq => "=",
            NotEq => "!=",
            Gt => ">",
            Gte => ">=",
            Lt => "<",
            Lte => "<=",
        };
        write!(f, "{symbol}")
    }
}

/// A storage predicate tree.
///
/// Combinators are strictly binary; a chained conjunction is represented as
/// nested `And` nodes. Each node owns its children; the tree is immutable
/// after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Compare {
        op: CompareOp,
        field: usize,
        literal: Datum,
    },
    /// Set membership over deduplicated literals. An empty set is always
    /// false.
    In { field: usize, literals: Vec<Datum> },
    IsNull { field: usize },
    IsNotNull { field: usize },
    /// The field's value begins with `prefix`; the remainder is
    /// unconstrained.
    StartsWith { field: usize, prefix: String },
}

impl Predicate {
    /// Evaluates this predicate against a whole row with SQL `WHERE`
    /// semantics: a comparison whose operands are incomparable (a null value,
    /// a null literal, a type mismatch) does not satisfy the predicate.
    ///
    /// Fields missing from `row` never satisfy a leaf.
    pub fn test(&self, row: &[Datum]) -> bool {
        match self {
            Predicate::And(left, right) => left.test(row) && right.test(row),
            Predicate::Or(left, right) => left.test(row) || right.test(row),
            Predicate::Compare { op, field, literal } => row
                .get(*field)
                .and_then(|value| value.partial_cmp(literal))
                .is_some_and(|ord| op.matches(ord)),
            Predicate::In { field, literals } => row.get(*field).is_some_and(|value| {
                literals
                    .iter()
                    .any(|literal| value.partial_cmp(literal) == Some(Ordering::Equal))
            }),
            Predicate::IsNull { field } => row.get(*field).is_some_and(Datum::is_null),
            Predicate::IsNotNull { field } => {
                row.get(*field).is_some_and(|value| !value.is_null())
            }
            Predicate::StartsWith { field, prefix } => {
                row.get(*field).is_some_and(|value| match value {
                    Datum::Text(text) => text.starts_with(prefix),
                    _ => false,
                })
            }
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::And(left, right) => write!(f, "AND({left}, {right})"),
            Predicate::Or(left, right) => write!(f, "OR({left}, {right})"),
            Predicate::Compare { op, field, literal } => {
                write!(f, "field#{field} {op} {literal}")
            }
            Predicate::In { field, literals } => {
                let literals = literals.iter().map(|lit| format!("{lit}")).join(", ");
                write!(f, "field#{field} IN ({literals})")
            }
            Predicate::IsNull { field } => write!(f, "field#{field} IS NULL"),
            Predicate::IsNotNull { field } => write!(f, "field#{field} IS NOT NULL"),
            Predicate::StartsWith { field, prefix } => {
                write!(f, "field#{field} STARTS WITH '{prefix}'")
            }
        }
    }
}
