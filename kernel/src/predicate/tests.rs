use super::*;
use crate::datum::{Datum, DecimalData};
use crate::expressions::{Expression, ScalarFunction};
use crate::schema::{DataField, DataType, RowType};

use std::collections::HashMap;

fn person_schema() -> RowType {
    RowType::new([
        DataField::new("name", DataType::STRING),
        DataField::new("age", DataType::INT),
        DataField::new("email", DataType::STRING),
    ])
}

fn name() -> Expression {
    Expression::field(0, DataType::STRING)
}

fn age() -> Expression {
    Expression::field(1, DataType::INT)
}

fn email() -> Expression {
    Expression::field(2, DataType::STRING)
}

fn int_lit(value: i32) -> Expression {
    Expression::literal(DataType::INT, value)
}

fn str_lit(value: &str) -> Expression {
    Expression::literal(DataType::STRING, value)
}

fn compare(op: CompareOp, field: usize, literal: Datum) -> Predicate {
    Predicate::Compare { op, field, literal }
}

#[test]
fn test_and_of_comparison_and_null_check() {
    let schema = person_schema();
    let filter = Expression::and(age().ge(int_lit(18)), email().is_not_null());
    assert_eq!(
        convert(&schema, &filter),
        Some(Predicate::and(
            compare(CompareOp::Gte, 1, Datum::Int(18)),
            Predicate::IsNotNull { field: 2 },
        ))
    );
}

#[test]
fn test_or_combines_both_sides() {
    let schema = person_schema();
    let filter = Expression::or(age().lt(int_lit(18)), name().eq(str_lit("carol")));
    assert_eq!(
        convert(&schema, &filter),
        Some(Predicate::or(
            compare(CompareOp::Lt, 1, Datum::Int(18)),
            compare(CompareOp::Eq, 0, Datum::Text("carol".into())),
        ))
    );
}

#[test]
fn test_comparison_symmetry() {
    use ScalarFunction::*;
    let schema = person_schema();
    let cases = [
        (Equal, CompareOp::Eq),
        (NotEqual, CompareOp::NotEq),
        (GreaterThan, CompareOp::Gt),
        (GreaterThanOrEqual, CompareOp::Gte),
        (LessThan, CompareOp::Lt),
        (LessThanOrEqual, CompareOp::Lte),
    ];
    for (function, op) in cases {
        let field_first = Expression::call(function, [age(), int_lit(5)]);
        assert_eq!(
            convert(&schema, &field_first),
            Some(compare(op, 1, Datum::Int(5))),
            "{field_first}"
        );
        let literal_first = Expression::call(function, [int_lit(5), age()]);
        assert_eq!(
            convert(&schema, &literal_first),
            Some(compare(op.commute(), 1, Datum::Int(5))),
            "{literal_first}"
        );
    }
    // `age > 5` and `5 < age` are the same predicate once normalized.
    assert_eq!(
        convert(&schema, &age().gt(int_lit(5))),
        convert(&schema, &int_lit(5).lt(age()))
    );
}

#[test]
fn test_comparison_requires_exactly_one_field_ref() {
    let schema = person_schema();
    let cases = [
        // both sides are field references
        name().eq(email()),
        // neither side is
        int_lit(1).eq(int_lit(1)),
        // wrong arity
        Expression::call(ScalarFunction::Equal, [age()]),
        Expression::call(ScalarFunction::Equal, [age(), int_lit(1), int_lit(2)]),
    ];
    for filter in cases {
        assert_eq!(convert(&schema, &filter), None, "{filter}");
    }
}

#[test]
fn test_in_collapses_duplicates() {
    let schema = person_schema();
    let filter = age().in_list([int_lit(1), int_lit(2), int_lit(2), int_lit(3)]);
    assert_eq!(
        convert(&schema, &filter),
        Some(Predicate::In {
            field: 1,
            literals: vec![Datum::Int(1), Datum::Int(2), Datum::Int(3)],
        })
    );
}

#[test]
fn test_in_shapes() {
    let schema = person_schema();
    let cases = [
        // first child must be a field reference
        int_lit(1).in_list([int_lit(1)]),
        // at least one item required
        Expression::call(ScalarFunction::In, [age()]),
        // one uncoercible item poisons the whole list
        age().in_list([int_lit(1), str_lit("x")]),
    ];
    for filter in cases {
        assert_eq!(convert(&schema, &filter), None, "{filter}");
    }
}

#[test]
fn test_null_tests() {
    let schema = person_schema();
    assert_eq!(
        convert(&schema, &email().is_null()),
        Some(Predicate::IsNull { field: 2 })
    );
    assert_eq!(
        convert(&schema, &email().is_not_null()),
        Some(Predicate::IsNotNull { field: 2 })
    );
    // operand must be a field reference
    assert_eq!(convert(&schema, &str_lit("x").is_null()), None);
}

#[test]
fn test_like_reduction() {
    let schema = person_schema();
    let cases = [
        // trailing wildcard becomes a prefix predicate
        (
            name().like(str_lit("abc%")),
            Some(Predicate::StartsWith {
                field: 0,
                prefix: "abc".into(),
            }),
        ),
        // no wildcard at all degenerates to equality
        (
            name().like(str_lit("abc")),
            Some(compare(CompareOp::Eq, 0, Datum::Text("abc".into()))),
        ),
        // interior single-character wildcard is never a prefix
        (name().like(str_lit("a_c%")), None),
        // wildcard not at the very end
        (name().like(str_lit("abc%def")), None),
        (name().like(str_lit("a%b%")), None),
        // empty prefix would match everything
        (name().like(str_lit("%")), None),
        (name().like(str_lit("%abc")), None),
    ];
    for (filter, expected) in cases {
        assert_eq!(convert(&schema, &filter), expected, "{filter}");
    }
}

#[test]
fn test_like_with_escape() {
    let schema = person_schema();
    let escape = || str_lit("\\");
    let cases = [
        // escaped % is a literal % inside the prefix
        (
            name().like_escape(str_lit(r"a\%b%"), escape()),
            Some(Predicate::StartsWith {
                field: 0,
                prefix: "a%b".into(),
            }),
        ),
        // escaped _ likewise
        (
            name().like_escape(str_lit(r"a\_c%"), escape()),
            Some(Predicate::StartsWith {
                field: 0,
                prefix: "a_c".into(),
            }),
        ),
        // escape escaping itself
        (
            name().like_escape(str_lit(r"a\\b"), escape()),
            Some(compare(CompareOp::Eq, 0, Datum::Text(r"a\b".into()))),
        ),
        // un-escaped _ stays a wildcard
        (name().like_escape(str_lit("a_c"), escape()), None),
    ];
    for (filter, expected) in cases {
        assert_eq!(convert(&schema, &filter), expected, "{filter}");
    }
}

#[test_log::test]
fn test_malformed_like_escapes_fail_whole_filter() {
    let schema = person_schema();
    let cases = [
        // escape must be a single character
        name().like_escape(str_lit("abc%"), str_lit("ab")),
        name().like_escape(str_lit("abc%"), str_lit("")),
        // escape at end of pattern
        name().like_escape(str_lit(r"abc\"), str_lit("\\")),
        // escape before an ordinary character
        name().like_escape(str_lit(r"a\bc"), str_lit("\\")),
    ];
    for filter in cases {
        assert_eq!(convert(&schema, &filter), None, "{filter}");
    }
}

#[test]
fn test_like_requires_string_field() {
    let schema = person_schema();
    assert_eq!(convert(&schema, &age().like(str_lit("1%"))), None);
    // a null pattern is not a pattern
    assert_eq!(
        convert(
            &schema,
            &name().like(Expression::null_literal(DataType::STRING))
        ),
        None
    );
}

#[test_log::test]
fn test_unconvertible_branch_aborts_whole_filter() {
    let schema = person_schema();
    let similar = Expression::call(ScalarFunction::SimilarTo, [name(), str_lit("x")]);
    let filter = Expression::and(age().ge(int_lit(18)), similar);
    assert_eq!(convert(&schema, &filter), None);
}

#[test]
fn test_deferred_functions_never_convert() {
    use ScalarFunction::*;
    let schema = person_schema();
    for function in [Not, Between, SimilarTo, NotIn, Cast, Plus, Minus, Multiply, Divide] {
        let filter = Expression::call(function, [age(), int_lit(1)]);
        assert_eq!(convert(&schema, &filter), None, "{function}");
    }
}

#[test]
fn test_bare_expressions_unconvertible() {
    let schema = person_schema();
    let cases = [
        age(),
        int_lit(1),
        Expression::TypeLiteral(DataType::INT),
    ];
    for filter in cases {
        assert_eq!(convert(&schema, &filter), None, "{filter}");
    }
}

#[test]
fn test_impossible_cast_fails_extraction() {
    let schema = person_schema();
    // no implicit cast from INT to STRING, and none the other way either
    assert_eq!(
        convert(&schema, &name().eq(Expression::literal(DataType::INT, 1))),
        None
    );
    assert_eq!(convert(&schema, &age().eq(str_lit("18"))), None);
}

#[test]
fn test_implicit_widening_round_trips() {
    let schema = RowType::new([
        DataField::new("id", DataType::BIGINT),
        DataField::new("ratio", DataType::DOUBLE),
        DataField::new("amount", DataType::decimal(10, 2)),
    ]);
    let id = Expression::field(0, DataType::BIGINT);
    assert_eq!(
        convert(&schema, &id.eq(int_lit(42))),
        Some(compare(CompareOp::Eq, 0, Datum::BigInt(42)))
    );
    let ratio = Expression::field(1, DataType::DOUBLE);
    assert_eq!(
        convert(&schema, &ratio.gt(int_lit(2))),
        Some(compare(CompareOp::Gt, 1, Datum::Double(2.0)))
    );
    let amount = Expression::field(2, DataType::decimal(10, 2));
    assert_eq!(
        convert(&schema, &amount.le(int_lit(5))),
        Some(compare(
            CompareOp::Lte,
            2,
            Datum::Decimal(DecimalData::try_new(500, 10, 2).unwrap()),
        ))
    );
}

#[test]
fn test_custom_coercion_is_consulted_for_widening() {
    use crate::cast::TypeCoercion;

    // a type system that permits no implicit casts at all
    struct NoCoercion;
    impl TypeCoercion for NoCoercion {
        fn supports_implicit_cast(&self, _from: &DataType, _to: &DataType) -> bool {
            false
        }
        fn cast_from_text(&self, _text: &str, _to: &DataType) -> Option<Datum> {
            None
        }
    }

    let schema = RowType::new([DataField::new("id", DataType::BIGINT)]);
    let filter = Expression::field(0, DataType::BIGINT).eq(int_lit(42));
    assert!(convert(&schema, &filter).is_some());
    let strict = PredicateConverter::with_coercion(&schema, &NoCoercion);
    assert_eq!(strict.convert(&filter), None);
    // an exact type match never needs the coercion capability
    let exact = Expression::field(0, DataType::BIGINT)
        .eq(Expression::literal(DataType::BIGINT, 42i64));
    assert!(strict.convert(&exact).is_some());
}

#[test]
fn test_null_literal_extracts_as_typed_null() {
    let schema = person_schema();
    let filter = age().eq(Expression::null_literal(DataType::INT));
    let predicate = convert(&schema, &filter).unwrap();
    assert_eq!(
        predicate,
        compare(CompareOp::Eq, 1, Datum::Null(DataType::INT))
    );
    // a comparison against a null operand never holds
    assert!(!predicate.test(&[Datum::Text("alice".into()), Datum::Int(1)]));
    assert!(!predicate.test(&[Datum::Text("bob".into()), Datum::Null(DataType::INT)]));
}

#[test]
fn test_nested_container_types_never_push_down() {
    let schema = RowType::new([DataField::new(
        "tags",
        DataType::Array(Box::new(DataType::STRING)),
    )]);
    let tags = Expression::field(0, DataType::Array(Box::new(DataType::STRING)));
    assert_eq!(convert(&schema, &tags.eq(str_lit("x"))), None);
}

/// Row-level agreement between the converted predicate and the filter's SQL
/// semantics, over rows with nulls in play.
#[test]
fn test_converted_predicates_agree_with_rows() {
    let schema = person_schema();
    let rows: [&[Datum]; 3] = [
        &[
            Datum::Text("alice".into()),
            Datum::Int(30),
            Datum::Text("alice@example.com".into()),
        ],
        &[
            Datum::Text("bob".into()),
            Datum::Int(17),
            Datum::Null(DataType::STRING),
        ],
        &[
            Datum::Text("carol".into()),
            Datum::Null(DataType::INT),
            Datum::Text("carol@example.com".into()),
        ],
    ];
    let cases: [(Expression, [bool; 3]); 6] = [
        (age().ge(int_lit(18)), [true, false, false]),
        (
            Expression::or(age().lt(int_lit(18)), name().eq(str_lit("carol"))),
            [false, true, true],
        ),
        (email().is_null(), [false, true, false]),
        (name().like(str_lit("a%")), [true, false, false]),
        (age().in_list([int_lit(17), int_lit(30)]), [true, true, false]),
        (name().ne(str_lit("bob")), [true, false, true]),
    ];
    for (filter, expected) in cases {
        let predicate = convert(&schema, &filter).unwrap();
        for (row, expect) in rows.iter().zip(expected) {
            assert_eq!(predicate.test(row), expect, "{filter} over {row:?}");
        }
    }
}

#[test]
fn test_builder_in_list_empty_is_always_false() {
    let schema = person_schema();
    let builder = PredicateBuilder::new(&schema);
    let predicate = builder.in_list(1, []);
    assert_eq!(
        predicate,
        Predicate::In {
            field: 1,
            literals: vec![],
        }
    );
    assert!(!predicate.test(&[Datum::Text("a".into()), Datum::Int(1)]));
    assert!(!predicate.test(&[Datum::Text("a".into()), Datum::Null(DataType::INT)]));
}

#[test]
fn test_builder_in_list_dedupes_in_first_seen_order() {
    let schema = person_schema();
    let builder = PredicateBuilder::new(&schema);
    let predicate = builder.in_list(
        1,
        [Datum::Int(3), Datum::Int(1), Datum::Int(3), Datum::Int(1)],
    );
    assert_eq!(
        predicate,
        Predicate::In {
            field: 1,
            literals: vec![Datum::Int(3), Datum::Int(1)],
        }
    );
}

#[test]
#[should_panic(expected = "out of range")]
fn test_builder_rejects_out_of_range_field() {
    let schema = person_schema();
    PredicateBuilder::new(&schema).equal(3, Datum::Int(1));
}

#[test]
fn test_from_map_empty_yields_no_predicate() {
    let schema = person_schema();
    assert!(matches!(from_map(&schema, &HashMap::new()), Ok(None)));
}

#[test]
fn test_from_map_single_entry() {
    let schema = person_schema();
    let map = HashMap::from([("age".to_string(), "30".to_string())]);
    assert_eq!(
        from_map(&schema, &map).unwrap(),
        Some(compare(CompareOp::Eq, 1, Datum::Int(30)))
    );
}

#[test]
fn test_from_map_two_entries_build_a_conjunction() {
    let schema = person_schema();
    let map = HashMap::from([
        ("age".to_string(), "30".to_string()),
        ("name".to_string(), "alice".to_string()),
    ]);
    let predicate = from_map(&schema, &map).unwrap().unwrap();
    assert!(matches!(predicate, Predicate::And(_, _)), "{predicate}");
    // map iteration order is unspecified, so check the leaves as a set
    let mut leaves = Vec::new();
    collect_leaves(&predicate, &mut leaves);
    assert_eq!(leaves.len(), 2);
    assert!(leaves.contains(&compare(CompareOp::Eq, 1, Datum::Int(30))));
    assert!(leaves.contains(&compare(CompareOp::Eq, 0, Datum::Text("alice".into()))));
    assert!(predicate.test(&[
        Datum::Text("alice".into()),
        Datum::Int(30),
        Datum::Null(DataType::STRING),
    ]));
}

#[test]
fn test_from_map_errors() {
    use crate::error::Error;
    let schema = person_schema();

    let unknown = HashMap::from([("missing".to_string(), "1".to_string())]);
    assert!(matches!(
        from_map(&schema, &unknown),
        Err(Error::UnknownField(name)) if name == "missing"
    ));

    let unparseable = HashMap::from([("age".to_string(), "not a number".to_string())]);
    assert!(matches!(
        from_map(&schema, &unparseable),
        Err(Error::InvalidLiteral { .. })
    ));
}

fn collect_leaves(predicate: &Predicate, out: &mut Vec<Predicate>) {
    match predicate {
        Predicate::And(left, right) | Predicate::Or(left, right) => {
            collect_leaves(left, out);
            collect_leaves(right, out);
        }
        leaf => out.push(leaf.clone()),
    }
}

#[test]
fn test_predicate_display() {
    let schema = person_schema();
    let filter = Expression::and(age().ge(int_lit(18)), name().like(str_lit("ab%")));
    let predicate = convert(&schema, &filter).unwrap();
    assert_eq!(
        predicate.to_string(),
        "AND(field#1 >= 18, field#0 STARTS WITH 'ab')"
    );
}
