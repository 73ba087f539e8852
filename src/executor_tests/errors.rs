use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::meta::{Field, ObjectMeta};
use crate::parser::SourcePosition;
use crate::{
    execute, parse_document_source, ExecuteParams, ExecutionError, FieldError, PathSegment,
    Resolved, SchemaType, Type, Value,
};

fn test_schema() -> Arc<SchemaType> {
    Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "Query",
                vec![
                    Field::new("inner", Type::named("Inner"))
                        .resolve(|_| Ok(Resolved::Map(Default::default()))),
                    Field::new("innerNonNull", Type::non_null("Inner"))
                        .resolve(|_| Ok(Resolved::Map(Default::default()))),
                ],
            ))
            .register(
                ObjectMeta::new(
                    "Inner",
                    vec![
                        Field::new("ok", Type::named("Int")).resolve(|_| Ok(Resolved::Int(1))),
                        Field::new("fails", Type::named("Int"))
                            .resolve(|_| Err(FieldError::from("deliberate error"))),
                        Field::new("failsNonNull", Type::non_null("Int"))
                            .resolve(|_| Err(FieldError::from("deliberate error"))),
                        Field::new("nullNonNull", Type::non_null("Int"))
                            .resolve(|_| Ok(Resolved::Null)),
                        Field::new("panics", Type::named("Int"))
                            .resolve(|_| panic!("resolver blew up")),
                    ],
                )
                .into_meta(),
            )
            .finish()
            .expect("invalid test schema"),
    )
}

fn run(query: &str) -> crate::Response {
    let document = Arc::new(parse_document_source(query).expect("parse error"));
    execute(ExecuteParams::new(test_schema(), document))
}

#[test]
fn error_on_nullable_field_yields_null_and_one_error() {
    let response = run("{ inner { ok fails } }");

    assert_eq!(
        response.data,
        graphql_value!({"inner": {"ok": 1, "fails": null}}),
    );
    assert_eq!(
        response.errors,
        vec![ExecutionError::new(
            SourcePosition::new(13, 0, 13),
            vec![
                PathSegment::Field("inner".into()),
                PathSegment::Field("fails".into()),
            ],
            FieldError::from("deliberate error"),
        )],
    );
}

#[test]
fn error_on_non_null_field_nulls_the_enclosing_nullable_object() {
    let response = run("{ inner { ok failsNonNull } }");

    assert_eq!(response.data, graphql_value!({"inner": null}));
    assert_eq!(
        response.errors,
        vec![ExecutionError::new(
            SourcePosition::new(13, 0, 13),
            vec![
                PathSegment::Field("inner".into()),
                PathSegment::Field("failsNonNull".into()),
            ],
            FieldError::from("deliberate error"),
        )],
    );
}

#[test]
fn null_on_non_null_field_bubbles_to_nullable_ancestor() {
    let response = run("{ inner { nullNonNull } }");

    assert_eq!(response.data, graphql_value!({"inner": null}));
    assert_eq!(
        response.errors,
        vec![ExecutionError::new(
            SourcePosition::new(10, 0, 10),
            vec![
                PathSegment::Field("inner".into()),
                PathSegment::Field("nullNonNull".into()),
            ],
            FieldError::from("Cannot return null for non-nullable field Inner.nullNonNull."),
        )],
    );
}

#[test]
fn violation_reaching_a_non_null_root_field_nulls_the_data() {
    let response = run("{ innerNonNull { nullNonNull } }");

    assert_eq!(response.data, Value::Null);
    // One error per originating violation, regardless of propagation depth.
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Cannot return null for non-nullable field Inner.nullNonNull.",
    );
    assert_eq!(
        response.errors[0].path(),
        &[
            PathSegment::Field("innerNonNull".into()),
            PathSegment::Field("nullNonNull".into()),
        ],
    );
}

#[test]
fn sibling_fields_survive_a_nullable_failure() {
    let response = run("{ inner { fails } innerNonNull { ok } }");

    assert_eq!(
        response.data,
        graphql_value!({"inner": {"fails": null}, "innerNonNull": {"ok": 1}}),
    );
    assert_eq!(response.errors.len(), 1);
}

#[test]
fn resolver_panic_becomes_a_field_error() {
    let response = run("{ inner { panics ok } }");

    assert_eq!(
        response.data,
        graphql_value!({"inner": {"panics": null, "ok": 1}}),
    );
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error().message(), "resolver blew up");
}

#[test]
fn unknown_top_level_field_is_omitted() {
    let response = run("{ doesNotExist inner { ok } }");

    assert_eq!(response.data, graphql_value!({"inner": {"ok": 1}}));
    assert_eq!(response.errors, vec![]);
}

#[test]
fn operation_selection_errors() {
    let document =
        Arc::new(parse_document_source("query A { inner { ok } } query B { inner { ok } }").expect("parse error"));

    let response = execute(ExecuteParams::new(test_schema(), document.clone()));
    assert_eq!(response.data, Value::Null);
    assert_eq!(
        response.errors[0].error().message(),
        "Must provide operation name if query contains multiple operations.",
    );

    let mut params = ExecuteParams::new(test_schema(), document);
    params.operation_name = Some("C".into());
    let response = execute(params);
    assert_eq!(
        response.errors[0].error().message(),
        "Unknown operation named \"C\".",
    );

    let document = Arc::new(
        parse_document_source("fragment F on Query { inner { ok } }").expect("parse error"),
    );
    let response = execute(ExecuteParams::new(test_schema(), document));
    assert_eq!(
        response.errors[0].error().message(),
        "Must provide an operation.",
    );
}

#[test]
fn named_operation_is_selected() {
    let document = Arc::new(
        parse_document_source("query A { inner { ok } } query B { inner { fails } }")
            .expect("parse error"),
    );

    let mut params = ExecuteParams::new(test_schema(), document);
    params.operation_name = Some("A".into());
    let response = execute(params);

    assert_eq!(response.data, graphql_value!({"inner": {"ok": 1}}));
    assert_eq!(response.errors, vec![]);
}
