//! Conversion of resolved filter expressions to storage predicates.
//!
//! [`convert`] walks a resolved [`Expression`] and produces the equivalent
//! [`Predicate`], or `None` when no storage-level predicate exists for the
//! filter. The walk is all-or-nothing: any unconvertible sub-expression makes
//! the whole filter unconvertible, so a returned predicate is always a faithful
//! narrowing of the original filter, never a partial one. Callers treat `None`
//! as "evaluate this filter without file skipping", not as an error.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::cast::{StandardCoercion, TypeCoercion};
use crate::datum::Datum;
use crate::error::{Error, KernelResult};
use crate::expressions::{Expression, ScalarFunction};
use crate::predicate::{CompareOp, Predicate, PredicateBuilder};
use crate::schema::{DataType, RowType};

/// Converts a resolved filter to a storage predicate using the standard
/// coercion rules. Returns `None` for any filter shape that has no sound
/// storage-level equivalent.
pub fn convert(row_type: &RowType, filter: &Expression) -> Option<Predicate> {
    PredicateConverter::new(row_type).convert(filter)
}

/// Builds an all-equality conjunction from a field name to literal text
/// mapping, as used by static filter configuration.
///
/// An empty map yields `Ok(None)`, i.e. no predicate at all rather than a
/// match-everything or match-nothing value; callers depend on this convention.
/// Unlike expression conversion, a mapping that names an unknown field or
/// carries unparseable text is a configuration mistake and surfaces as an
/// `Err`.
pub fn from_map(
    row_type: &RowType,
    map: &HashMap<String, String>,
) -> KernelResult<Option<Predicate>> {
    let builder = PredicateBuilder::new(row_type);
    let coercion = StandardCoercion;
    let mut predicate = None;
    for (name, text) in map {
        let index = row_type
            .index_of(name)
            .ok_or_else(|| Error::unknown_field(name))?;
        let data_type = &row_type.fields()[index].data_type;
        let literal = coercion
            .cast_from_text(text, data_type)
            .ok_or_else(|| Error::invalid_literal(text, data_type))?;
        let equal = builder.equal(index, literal);
        predicate = Some(match predicate {
            None => equal,
            Some(left) => Predicate::and(left, equal),
        });
    }
    Ok(predicate)
}

/// Recursive-descent converter from resolved expressions to predicates.
///
/// Conversion is a pure function of the expression and schema: the converter
/// holds no mutable state and may be shared freely across calls.
pub struct PredicateConverter<'a> {
    builder: PredicateBuilder<'a>,
    coercion: &'a dyn TypeCoercion,
}

impl<'a> PredicateConverter<'a> {
    /// A converter over `row_type` using [`StandardCoercion`].
    pub fn new(row_type: &'a RowType) -> Self {
        Self::with_coercion(row_type, &StandardCoercion)
    }

    /// A converter over `row_type` with a caller-supplied coercion capability.
    pub fn with_coercion(row_type: &'a RowType, coercion: &'a dyn TypeCoercion) -> Self {
        Self {
            builder: PredicateBuilder::new(row_type),
            coercion,
        }
    }

    /// Converts `filter` to a predicate, or `None` if any part of it is
    /// unsupported.
    pub fn convert(&self, filter: &Expression) -> Option<Predicate> {
        use ScalarFunction::*;
        let Expression::Call(call) = filter else {
            debug!("Unsupported expression at predicate position: {filter}");
            return None;
        };
        let children = call.children.as_slice();
        match call.function {
            And => {
                let [left, right] = children else { return None };
                Some(Predicate::and(self.convert(left)?, self.convert(right)?))
            }
            Or => {
                let [left, right] = children else { return None };
                Some(Predicate::or(self.convert(left)?, self.convert(right)?))
            }
            Equal => self.convert_comparison(CompareOp::Eq, children),
            NotEqual => self.convert_comparison(CompareOp::NotEq, children),
            GreaterThan => self.convert_comparison(CompareOp::Gt, children),
            GreaterThanOrEqual => self.convert_comparison(CompareOp::Gte, children),
            LessThan => self.convert_comparison(CompareOp::Lt, children),
            LessThanOrEqual => self.convert_comparison(CompareOp::Lte, children),
            In => self.convert_in(children),
            IsNull => {
                let [child] = children else { return None };
                Some(self.builder.is_null(child.as_field_ref()?.index))
            }
            IsNotNull => {
                let [child] = children else { return None };
                Some(self.builder.is_not_null(child.as_field_ref()?.index))
            }
            Like => self.convert_like(children),
            Not | Between | SimilarTo | NotIn | Cast | Plus | Minus | Multiply | Divide => {
                debug!("Unsupported function: {}", call.function);
                None
            }
        }
    }

    /// Normalizes a binary comparison to field-first form. The field reference
    /// may sit on either side; a literal-first comparison commutes the
    /// operator. Neither or both sides being a field reference is
    /// unconvertible.
    fn convert_comparison(&self, op: CompareOp, children: &[Expression]) -> Option<Predicate> {
        let [left, right] = children else { return None };
        let (op, field, other) = if let Some(field) = left.as_field_ref() {
            (op, field, right)
        } else if let Some(field) = right.as_field_ref() {
            (op.commute(), field, left)
        } else {
            debug!("Unsupported comparison operands: {left} {op} {right}");
            return None;
        };
        let literal = self.extract_literal(&field.data_type, other)?;
        Some(self.builder.compare(op, field.index, literal))
    }

    fn convert_in(&self, children: &[Expression]) -> Option<Predicate> {
        let [first, rest @ ..] = children else { return None };
        let field = first.as_field_ref()?;
        if rest.is_empty() {
            return None;
        }
        let literals = rest
            .iter()
            .map(|child| self.extract_literal(&field.data_type, child))
            .collect::<Option<Vec<_>>>()?;
        Some(self.builder.in_list(field.index, literals))
    }

    fn convert_like(&self, children: &[Expression]) -> Option<Predicate> {
        let (value, pattern, escape) = match children {
            [value, pattern] => (value, pattern, None),
            [value, pattern, escape] => (value, pattern, Some(escape)),
            _ => return None,
        };
        let field = value.as_field_ref()?;
        if !field.data_type.is_character_string() {
            debug!("Unsupported LIKE over non-string field#{}", field.index);
            return None;
        }
        let pattern = self.extract_text(&field.data_type, pattern)?;
        let escape = match escape {
            Some(expr) => Some(self.extract_text(&field.data_type, expr)?),
            None => None,
        };
        match reduce_like_pattern(&pattern, escape.as_deref())? {
            LikeShape::Literal(text) => Some(self.builder.equal(field.index, Datum::Text(text))),
            LikeShape::Prefix(prefix) => Some(self.builder.starts_with(field.index, prefix)),
        }
    }

    fn extract_text(&self, expected: &DataType, expr: &Expression) -> Option<String> {
        match self.extract_literal(expected, expr)? {
            Datum::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Extracts a literal typed against `expected`, converting it to the
    /// internal representation. This is the only place source literals become
    /// [`Datum`]s.
    ///
    /// A declared-null literal extracts as a typed null operand; null *tests*
    /// are routed through `IS [NOT] NULL` upstream, so a null operand simply
    /// builds a comparison no row satisfies.
    fn extract_literal(&self, expected: &DataType, expr: &Expression) -> Option<Datum> {
        if !expected.supports_pushdown() {
            debug!("Type {expected} is not pushdown-eligible");
            return None;
        }
        let Expression::Literal(literal) = expr else {
            return None;
        };
        let Some(value) = &literal.value else {
            return Some(Datum::Null(expected.clone()));
        };
        if literal.data_type.same_root(expected) {
            value.to_datum(expected)
        } else if self
            .coercion
            .supports_implicit_cast(&literal.data_type, expected)
        {
            self.coercion.cast_from_text(&value.render_text(), expected)
        } else {
            debug!(
                "No implicit cast from {} to {expected}",
                literal.data_type
            );
            None
        }
    }
}

enum LikeShape {
    /// The pattern holds no wildcard; `LIKE` degenerates to equality.
    Literal(String),
    /// The pattern is a wildcard-free prefix followed by a single trailing
    /// `%`.
    Prefix(String),
}

/// Reduces a SQL `LIKE` pattern to an equality or prefix shape, or `None` when
/// the pattern cannot be expressed that way.
///
/// An un-escaped `_` is never expressible as a prefix. An un-escaped `%` must
/// be the final character and follow a non-empty prefix. With an escape
/// character given, the escape must be followed by `%`, `_`, or itself;
/// anything else is a malformed pattern and fails the whole filter.
fn reduce_like_pattern(pattern: &str, escape: Option<&str>) -> Option<LikeShape> {
    let Some(escape) = escape else {
        if pattern.contains('_') {
            return None;
        }
        return match pattern.strip_suffix('%') {
            None if pattern.contains('%') => None,
            None => Some(LikeShape::Literal(pattern.to_string())),
            Some(prefix) if !prefix.is_empty() && !prefix.contains('%') => {
                Some(LikeShape::Prefix(prefix.to_string()))
            }
            Some(_) => None,
        };
    };

    let mut escape_chars = escape.chars();
    let escape_char = match (escape_chars.next(), escape_chars.next()) {
        (Some(c), None) => c,
        _ => {
            warn!("Invalid LIKE escape '{escape}': must be a single character");
            return None;
        }
    };

    let mut prefix = String::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == escape_char {
            match chars.next() {
                Some(next) if next == '%' || next == '_' || next == escape_char => {
                    prefix.push(next);
                }
                _ => {
                    warn!("Invalid escape sequence in LIKE pattern '{pattern}'");
                    return None;
                }
            }
        } else if c == '_' {
            return None;
        } else if c == '%' {
            if chars.next().is_some() || prefix.is_empty() {
                return None;
            }
            return Some(LikeShape::Prefix(prefix));
        } else {
            prefix.push(c);
        }
    }
    Some(LikeShape::Literal(prefix))
}
