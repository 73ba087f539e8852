use std::sync::Arc;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use crate::meta::{Field, ObjectMeta};
use crate::parser::SourcePosition;
use crate::{
    execute, parse_document_source, ExecuteParams, ExecutionError, FieldError, PathSegment,
    Resolved, Response, SchemaType, Type, Value,
};

/// Runs `{ nest { test } }` against a schema where `DataType.test` has the
/// type under test and `DataType.nest` resolves back to the data map.
fn check_list(test_type: Type, test_data: Resolved, expected: Response) {
    let mut map = IndexMap::new();
    map.insert("test".to_owned(), test_data);
    let data = Resolved::Map(map);

    let nest_data = data.clone();
    let schema = Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "DataType",
                vec![
                    Field::new("test", test_type),
                    Field::new("nest", Type::named("DataType"))
                        .resolve(move |_| Ok(nest_data.clone())),
                ],
            ))
            .finish()
            .expect("invalid test schema"),
    );

    let document = Arc::new(parse_document_source("{ nest { test } }").expect("parse error"));

    let mut params = ExecuteParams::new(schema, document);
    params.root = data;

    assert_eq!(execute(params), expected);
}

/// The non-null violation every failing case reports: located at the `test`
/// field of `{ nest { test } }`.
fn non_null_error(path: Vec<PathSegment>) -> ExecutionError {
    ExecutionError::new(
        SourcePosition::new(9, 0, 9),
        path,
        FieldError::from("Cannot return null for non-nullable field DataType.test."),
    )
}

fn field_path() -> Vec<PathSegment> {
    vec![
        PathSegment::Field("nest".into()),
        PathSegment::Field("test".into()),
    ]
}

fn element_path(index: usize) -> Vec<PathSegment> {
    let mut path = field_path();
    path.push(PathSegment::Index(index));
    path
}

fn ints(values: &[Option<i32>]) -> Resolved {
    Resolved::List(values.iter().map(|v| Resolved::from(*v)).collect())
}

// [T]

#[test]
fn list_of_nullable_contains_values() {
    check_list(
        Type::list(Type::named("Int")),
        ints(&[Some(1), Some(2)]),
        Response {
            data: graphql_value!({"nest": {"test": [1, 2]}}),
            errors: vec![],
        },
    );
}

#[test]
fn list_of_nullable_contains_null() {
    check_list(
        Type::list(Type::named("Int")),
        ints(&[Some(1), None, Some(2)]),
        Response {
            data: graphql_value!({"nest": {"test": [1, null, 2]}}),
            errors: vec![],
        },
    );
}

#[test]
fn list_of_nullable_returns_null() {
    check_list(
        Type::list(Type::named("Int")),
        Resolved::Null,
        Response {
            data: graphql_value!({"nest": {"test": null}}),
            errors: vec![],
        },
    );
}

#[test]
fn list_of_nullable_from_thunk() {
    check_list(
        Type::list(Type::named("Int")),
        Resolved::defer(|| ints(&[Some(1), Some(2)])),
        Response {
            data: graphql_value!({"nest": {"test": [1, 2]}}),
            errors: vec![],
        },
    );
}

#[test]
fn list_of_nullable_thunk_elements() {
    check_list(
        Type::list(Type::named("Int")),
        Resolved::List(vec![
            Resolved::defer(|| Resolved::Int(1)),
            Resolved::defer(|| Resolved::Null),
            Resolved::defer(|| Resolved::Int(2)),
        ]),
        Response {
            data: graphql_value!({"nest": {"test": [1, null, 2]}}),
            errors: vec![],
        },
    );
}

// [T]!

#[test]
fn non_null_list_of_nullable_contains_null() {
    check_list(
        Type::non_null_list(Type::named("Int")),
        ints(&[Some(1), None, Some(2)]),
        Response {
            data: graphql_value!({"nest": {"test": [1, null, 2]}}),
            errors: vec![],
        },
    );
}

#[test]
fn non_null_list_of_nullable_returns_null() {
    check_list(
        Type::non_null_list(Type::named("Int")),
        Resolved::Null,
        Response {
            data: graphql_value!({"nest": null}),
            errors: vec![non_null_error(field_path())],
        },
    );
}

#[test]
fn non_null_list_of_nullable_from_thunk_returns_null() {
    check_list(
        Type::non_null_list(Type::named("Int")),
        Resolved::defer(|| Resolved::Null),
        Response {
            data: graphql_value!({"nest": null}),
            errors: vec![non_null_error(field_path())],
        },
    );
}

// [T!]

#[test]
fn list_of_non_null_contains_values() {
    check_list(
        Type::list(Type::non_null("Int")),
        ints(&[Some(1), Some(2)]),
        Response {
            data: graphql_value!({"nest": {"test": [1, 2]}}),
            errors: vec![],
        },
    );
}

#[test]
fn list_of_non_null_contains_null() {
    check_list(
        Type::list(Type::non_null("Int")),
        ints(&[Some(1), None, Some(2)]),
        Response {
            data: graphql_value!({"nest": {"test": null}}),
            errors: vec![non_null_error(element_path(1))],
        },
    );
}

#[test]
fn list_of_non_null_returns_null() {
    check_list(
        Type::list(Type::non_null("Int")),
        Resolved::Null,
        Response {
            data: graphql_value!({"nest": {"test": null}}),
            errors: vec![],
        },
    );
}

#[test]
fn list_of_non_null_from_thunk_contains_null() {
    check_list(
        Type::list(Type::non_null("Int")),
        Resolved::defer(|| ints(&[Some(1), None, Some(2)])),
        Response {
            data: graphql_value!({"nest": {"test": null}}),
            errors: vec![non_null_error(element_path(1))],
        },
    );
}

// [T!]!

#[test]
fn non_null_list_of_non_null_contains_values() {
    check_list(
        Type::non_null_list(Type::non_null("Int")),
        ints(&[Some(1), Some(2)]),
        Response {
            data: graphql_value!({"nest": {"test": [1, 2]}}),
            errors: vec![],
        },
    );
}

#[test]
fn non_null_list_of_non_null_contains_null() {
    check_list(
        Type::non_null_list(Type::non_null("Int")),
        ints(&[Some(1), None, Some(2)]),
        Response {
            data: graphql_value!({"nest": null}),
            errors: vec![non_null_error(element_path(1))],
        },
    );
}

#[test]
fn non_null_list_of_non_null_returns_null() {
    check_list(
        Type::non_null_list(Type::non_null("Int")),
        Resolved::Null,
        Response {
            data: graphql_value!({"nest": null}),
            errors: vec![non_null_error(field_path())],
        },
    );
}

// Deferred elements of a non-null item type fail after their surrounding
// containers have been materialized; the violation cannot bubble into them
// anymore, so the whole data payload becomes null.

#[test]
fn list_of_non_null_thunk_elements_contains_null() {
    check_list(
        Type::list(Type::non_null("Int")),
        Resolved::List(vec![
            Resolved::defer(|| Resolved::Int(1)),
            Resolved::defer(|| Resolved::Null),
            Resolved::defer(|| Resolved::Int(2)),
        ]),
        Response {
            data: Value::Null,
            errors: vec![non_null_error(element_path(1))],
        },
    );
}

#[test]
fn non_iterable_value_for_list_field() {
    check_list(
        Type::list(Type::named("Int")),
        Resolved::Int(3),
        Response {
            data: graphql_value!({"nest": {"test": null}}),
            errors: vec![ExecutionError::new(
                SourcePosition::new(9, 0, 9),
                field_path(),
                FieldError::from(
                    "User Error: expected iterable, but did not find one for field DataType.test.",
                ),
            )],
        },
    );
}
