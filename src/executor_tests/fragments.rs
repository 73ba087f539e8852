use std::sync::Arc;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use crate::meta::{Field, InterfaceMeta, ObjectMeta};
use crate::{execute, parse_document_source, ExecuteParams, Resolved, SchemaType, Type};

fn dog() -> Resolved {
    let mut map = IndexMap::new();
    map.insert("name".to_owned(), Resolved::string("Rex"));
    map.insert("barks".to_owned(), Resolved::Boolean(true));
    map.insert("nickname".to_owned(), Resolved::string("R"));
    Resolved::Map(map)
}

fn test_schema() -> Arc<SchemaType> {
    Arc::new(
        SchemaType::build()
            .register(
                InterfaceMeta::new(
                    "Named",
                    vec![Field::new("name", Type::named("String"))],
                )
                .into_meta(),
            )
            .register(
                ObjectMeta::new(
                    "Dog",
                    vec![
                        Field::new("name", Type::named("String")),
                        Field::new("barks", Type::named("Boolean")),
                        Field::new("nickname", Type::named("String")),
                    ],
                )
                .interfaces(&["Named"])
                .into_meta(),
            )
            .query(ObjectMeta::new(
                "Query",
                vec![Field::new("dog", Type::named("Dog")).resolve(|_| Ok(dog()))],
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
fn named_fragment_spreads_merge_into_the_selection() {
    let response = run(
        "{ dog { name ...DogDetails } } fragment DogDetails on Dog { barks nickname }",
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"dog": {"name": "Rex", "barks": true, "nickname": "R"}}),
    );
}

#[test]
fn fragment_spread_is_traversed_once_per_collection() {
    let response = run(
        "{ dog { ...DogDetails ...DogDetails } } fragment DogDetails on Dog { name }",
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"dog": {"name": "Rex"}}));
}

#[test]
fn unknown_fragment_spread_is_ignored_at_execution_time() {
    let response = run("{ dog { name ...Missing } }");

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"dog": {"name": "Rex"}}));
}

#[test]
fn inline_fragment_with_matching_type_condition() {
    let response = run("{ dog { ... on Dog { barks } name } }");

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"dog": {"barks": true, "name": "Rex"}}),
    );
}

#[test]
fn inline_fragment_with_interface_type_condition() {
    let response = run("{ dog { ... on Named { name } barks } }");

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"dog": {"name": "Rex", "barks": true}}),
    );
}

#[test]
fn inline_fragment_with_mismatching_type_condition_is_skipped() {
    let response = run("{ dog { ... on Query { dog { name } } barks } }");

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"dog": {"barks": true}}));
}

#[test]
fn merged_field_nodes_share_one_sub_selection() {
    // Both `dog` nodes contribute to a single response entry; their
    // sub-selections are collected together.
    let response = run("{ dog { name } dog { barks } }");

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"dog": {"name": "Rex", "barks": true}}),
    );
}

#[test]
fn aliases_produce_separate_response_entries() {
    let response = run("{ pup: dog { name } dog { barks } }");

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"pup": {"name": "Rex"}, "dog": {"barks": true}}),
    );
}
