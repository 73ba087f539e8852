use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::meta::{Argument, EnumMeta, EnumValue, Field, ObjectMeta};
use crate::{execute, parse_document_source, ExecuteParams, Resolved, SchemaType, Type, Value};

fn test_schema() -> Arc<SchemaType> {
    Arc::new(
        SchemaType::build()
            .register(
                EnumMeta::new(
                    "Episode",
                    &[
                        EnumValue::new("NEW_HOPE"),
                        EnumValue::new("EMPIRE"),
                        EnumValue::new("JEDI").deprecated(Some("out of print")),
                    ],
                )
                .into_meta(),
            )
            .register(
                ObjectMeta::new(
                    "Droid",
                    vec![
                        Field::new("id", Type::non_null("ID")),
                        Field::new("name", Type::named("String")),
                    ],
                )
                .into_meta(),
            )
            .query(ObjectMeta::new(
                "Query",
                vec![Field::new("droid", Type::named("Droid"))
                    .argument(Argument::new("id", Type::non_null("ID")))
                    .resolve(|_| Ok(Resolved::Null))],
            ))
            .finish()
            .expect("invalid test schema"),
    )
}

fn run(query: &str) -> crate::Response {
    let document = Arc::new(parse_document_source(query).expect("parse error"));
    execute(ExecuteParams::new(test_schema(), document))
}

#[test]
fn typename_on_the_query_root() {
    let response = run("{ __typename }");

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"__typename": "Query"}));
}

#[test]
fn schema_root_types() {
    let response = run(
        "{ __schema { queryType { name kind } mutationType { name } } }",
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"__schema": {
            "queryType": {"name": "Query", "kind": "OBJECT"},
            "mutationType": null,
        }}),
    );
}

#[test]
fn schema_types_include_builtins_and_user_types() {
    let response = run("{ __schema { types { name } } }");

    assert_eq!(response.errors, vec![]);

    let names = response
        .data
        .as_object_value()
        .and_then(|o| o.get_field_value("__schema"))
        .and_then(Value::as_object_value)
        .and_then(|o| o.get_field_value("types"))
        .and_then(Value::as_list_value)
        .expect("types should be a list")
        .iter()
        .map(|t| {
            t.as_object_value()
                .and_then(|o| o.get_field_value("name"))
                .and_then(Value::as_string_value)
                .expect("every type has a name")
                .to_owned()
        })
        .collect::<Vec<_>>();

    for expected in ["Query", "Droid", "Episode", "Int", "String", "__Schema"] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }
}

#[test]
fn type_by_name_with_fields_and_wrappers() {
    let response = run(
        r#"{ __type(name: "Droid") { name kind fields { name type { kind name ofType { name } } } } }"#,
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"__type": {
            "name": "Droid",
            "kind": "OBJECT",
            "fields": [
                {"name": "id", "type": {"kind": "NON_NULL", "name": null, "ofType": {"name": "ID"}}},
                {"name": "name", "type": {"kind": "SCALAR", "name": "String", "ofType": null}},
            ],
        }}),
    );
}

#[test]
fn unknown_type_resolves_to_null() {
    let response = run(r#"{ __type(name: "Missing") { name } }"#);

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"__type": null}));
}

#[test]
fn enum_values_filter_deprecated_by_default() {
    let response = run(r#"{ __type(name: "Episode") { enumValues { name } } }"#);

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"__type": {"enumValues": [
            {"name": "NEW_HOPE"},
            {"name": "EMPIRE"},
        ]}}),
    );

    let response = run(
        r#"{ __type(name: "Episode") { enumValues(includeDeprecated: true) { name isDeprecated } } }"#,
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"__type": {"enumValues": [
            {"name": "NEW_HOPE", "isDeprecated": false},
            {"name": "EMPIRE", "isDeprecated": false},
            {"name": "JEDI", "isDeprecated": true},
        ]}}),
    );
}

#[test]
fn typename_inside_nested_objects() {
    let schema = Arc::new(
        SchemaType::build()
            .register(
                ObjectMeta::new(
                    "Inner",
                    vec![Field::new("ok", Type::named("Boolean"))],
                )
                .into_meta(),
            )
            .query(ObjectMeta::new(
                "Query",
                vec![Field::new("inner", Type::named("Inner"))
                    .resolve(|_| Ok(Resolved::Map(Default::default())))],
            ))
            .finish()
            .expect("invalid test schema"),
    );

    let document =
        Arc::new(parse_document_source("{ inner { __typename } }").expect("parse error"));
    let response = execute(ExecuteParams::new(schema, document));

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"inner": {"__typename": "Inner"}}),
    );
}
