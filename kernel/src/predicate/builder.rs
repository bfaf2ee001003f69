//! Predicate construction against a row schema.

use crate::datum::Datum;
use crate::predicate::{CompareOp, Predicate};
use crate::schema::RowType;

/// Builds well-typed leaf predicates for a row schema.
///
/// All constructors are pure. A field index outside the schema is a
/// programming error and panics; fallible callers (the expression converter)
/// validate indexes before reaching the builder.
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder<'a> {
    row_type: &'a RowType,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(row_type: &'a RowType) -> Self {
        Self { row_type }
    }

    pub fn equal(&self, field: usize, literal: Datum) -> Predicate {
        self.compare(CompareOp::Eq, field, literal)
    }

    pub fn not_equal(&self, field: usize, literal: Datum) -> Predicate {
        self.compare(CompareOp::NotEq, field, literal)
    }

    pub fn greater_than(&self, field: usize, literal: Datum) -> Predicate {
        self.compare(CompareOp::Gt, field, literal)
    }

    pub fn greater_or_equal(&self, field: usize, literal: Datum) -> Predicate {
        self.compare(CompareOp::Gte, field, literal)
    }

    pub fn less_than(&self, field: usize, literal: Datum) -> Predicate {
        self.compare(CompareOp::Lt, field, literal)
    }

    pub fn less_or_equal(&self, field: usize, literal: Datum) -> Predicate {
        self.compare(CompareOp::Lte, field, literal)
    }

    pub(crate) fn compare(&self, op: CompareOp, field: usize, literal: Datum) -> Predicate {
        self.check_field(field);
        Predicate::Compare { op, field, literal }
    }

    /// Set membership over the given literals, deduplicated in first-seen
    /// order.
    ///
    /// An empty input is permitted and yields an always-false predicate;
    /// callers wanting a different semantic for empty `IN` lists must
    /// special-case them before building.
    pub fn in_list(&self, field: usize, literals: impl IntoIterator<Item = Datum>) -> Predicate {
        self.check_field(field);
        let mut unique: Vec<Datum> = Vec::new();
        for literal in literals {
            if !unique.contains(&literal) {
                unique.push(literal);
            }
        }
        Predicate::In {
            field,
            literals: unique,
        }
    }

    pub fn is_null(&self, field: usize) -> Predicate {
        self.check_field(field);
        Predicate::IsNull { field }
    }

    pub fn is_not_null(&self, field: usize) -> Predicate {
        self.check_field(field);
        Predicate::IsNotNull { field }
    }

    pub fn starts_with(&self, field: usize, prefix: impl Into<String>) -> Predicate {
        self.check_field(field);
        Predicate::StartsWith {
            field,
            prefix: prefix.into(),
        }
    }

    fn check_field(&self, field: usize) {
        assert!(
            field < self.row_type.len(),
            "field index {field} out of range for schema with {} fields",
            self.row_type.len()
        );
    }
}

impl Predicate {
    /// Conjunction of two predicates. No simplification is performed.
    pub fn and(left: Predicate, right: Predicate) -> Predicate {
        Predicate::And(Box::new(left), Box::new(right))
    }

    /// Disjunction of two predicates. No simplification is performed.
    pub fn or(left: Predicate, right: Predicate) -> Predicate {
        Predicate::Or(Box::new(left), Box::new(right))
    }
}
