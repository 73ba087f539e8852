use std::sync::Arc;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde::Serialize;

use crate::meta::{Field, ObjectMeta};
use crate::{execute, parse_document_source, ExecuteParams, Resolved, SchemaType, Type};

fn profile_schema() -> Arc<SchemaType> {
    Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "Query",
                vec![
                    Field::new("name", Type::named("String")),
                    Field::new("fullName", Type::named("String")),
                    Field::new("age", Type::named("Int")),
                ],
            ))
            .finish()
            .expect("invalid test schema"),
    )
}

fn run_with_root(root: Resolved) -> crate::Response {
    let document =
        Arc::new(parse_document_source("{ name fullName age }").expect("parse error"));
    let mut params = ExecuteParams::new(profile_schema(), document);
    params.root = root;
    execute(params)
}

#[test]
fn map_members_resolve_under_their_exact_name() {
    let mut map = IndexMap::new();
    map.insert("name".to_owned(), Resolved::string("exact"));
    map.insert("age".to_owned(), Resolved::Int(7));

    let response = run_with_root(Resolved::Map(map));

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"name": "exact", "fullName": null, "age": 7}),
    );
}

/// A plain map is indexed by exactly the field name; a differently cased
/// member does not answer for it.
#[test]
fn map_members_do_not_match_case_insensitively() {
    let mut map = IndexMap::new();
    map.insert("Name".to_owned(), Resolved::string("cased"));

    let response = run_with_root(Resolved::Map(map));

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"name": null, "fullName": null, "age": null}),
    );
}

/// Serialized records keep the looser lookup: serde rename tags line up
/// exactly, and leftover casing differences are tolerated.
#[test]
fn record_members_match_tags_and_case_insensitive_names() {
    #[derive(Serialize)]
    struct Profile {
        #[serde(rename = "fullName")]
        full_name: String,
        #[serde(rename = "Age")]
        age: i32,
    }

    let root = Resolved::from_serialize(&Profile {
        full_name: "R2-D2".into(),
        age: 42,
    })
    .expect("serialization failed");

    let response = run_with_root(root);

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"name": null, "fullName": "R2-D2", "age": 42}),
    );
}

#[test]
fn map_member_thunks_are_invoked_in_place() {
    let mut map = IndexMap::new();
    map.insert("age".to_owned(), Resolved::defer(|| Resolved::Int(3)));

    let response = run_with_root(Resolved::Map(map));

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"name": null, "fullName": null, "age": 3}),
    );
}

#[test]
fn scalar_sources_resolve_every_field_to_null() {
    let response = run_with_root(Resolved::Int(1));

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"name": null, "fullName": null, "age": null}),
    );
}
