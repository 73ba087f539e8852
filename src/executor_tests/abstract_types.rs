use std::sync::Arc;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use crate::meta::{Field, InterfaceMeta, ObjectMeta, UnionMeta};
use crate::{
    execute, parse_document_source, ExecuteParams, Resolved, ResolveTypeParams, SchemaType, Type,
};

fn pet(kind: &str, name: &str) -> Resolved {
    let mut map = IndexMap::new();
    map.insert("kind".to_owned(), Resolved::string(kind));
    map.insert("name".to_owned(), Resolved::string(name));
    map.insert(
        if kind == "dog" { "barks" } else { "meows" }.to_owned(),
        Resolved::Boolean(true),
    );
    Resolved::Map(map)
}

/// `Pet` resolves through `is_type_of` probing; `CatOrDog` resolves through
/// an explicit `resolve_type` delegate.
fn test_schema() -> Arc<SchemaType> {
    Arc::new(
        SchemaType::build()
            .register(
                InterfaceMeta::new(
                    "Pet",
                    vec![Field::new("name", Type::named("String"))],
                )
                .into_meta(),
            )
            .register(
                ObjectMeta::new(
                    "Cat",
                    vec![
                        Field::new("name", Type::named("String")),
                        Field::new("meows", Type::named("Boolean")),
                    ],
                )
                .interfaces(&["Pet"])
                .is_type_of(|p: crate::IsTypeOfParams<'_>| {
                    matches!(p.value.as_map(), Some(m) if m.contains_key("meows"))
                })
                .into_meta(),
            )
            .register(
                ObjectMeta::new(
                    "Dog",
                    vec![
                        Field::new("name", Type::named("String")),
                        Field::new("barks", Type::named("Boolean")),
                    ],
                )
                .interfaces(&["Pet"])
                .is_type_of(|p: crate::IsTypeOfParams<'_>| {
                    matches!(p.value.as_map(), Some(m) if m.contains_key("barks"))
                })
                .into_meta(),
            )
            .register(
                UnionMeta::new("CatOrDog", &["Cat", "Dog"])
                    .resolve_type(|p: ResolveTypeParams<'_>| {
                        p.value.as_map().and_then(|m| m.get("kind")).and_then(|kind| {
                            match kind {
                                Resolved::String(s) if s == "cat" => Some("Cat".to_owned()),
                                Resolved::String(s) if s == "dog" => Some("Dog".to_owned()),
                                _ => None,
                            }
                        })
                    })
                    .into_meta(),
            )
            .register(
                UnionMeta::new("CatOnly", &["Cat"])
                    .resolve_type(|_| Some("Dog".to_owned()))
                    .into_meta(),
            )
            .query(ObjectMeta::new(
                "Query",
                vec![
                    Field::new("pets", Type::list(Type::named("Pet"))).resolve(|_| {
                        Ok(Resolved::List(vec![
                            pet("dog", "Rex"),
                            pet("cat", "Whiskers"),
                        ]))
                    }),
                    Field::new("catOrDog", Type::named("CatOrDog"))
                        .resolve(|_| Ok(pet("cat", "Whiskers"))),
                    Field::new("mystery", Type::named("CatOrDog"))
                        .resolve(|_| Ok(pet("axolotl", "Bubbles"))),
                    Field::new("impossible", Type::named("CatOnly"))
                        .resolve(|_| Ok(pet("dog", "Rex"))),
                ],
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
fn interface_dispatches_through_is_type_of() {
    let response = run(
        "{ pets { name __typename ... on Dog { barks } ... on Cat { meows } } }",
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"pets": [
            {"name": "Rex", "__typename": "Dog", "barks": true},
            {"name": "Whiskers", "__typename": "Cat", "meows": true},
        ]}),
    );
}

#[test]
fn union_dispatches_through_resolve_type() {
    let response = run("{ catOrDog { __typename ... on Cat { name meows } } }");

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"catOrDog": {"__typename": "Cat", "name": "Whiskers", "meows": true}}),
    );
}

#[test]
fn unresolvable_runtime_type_fails_the_field() {
    let response = run("{ mystery { __typename } }");

    assert_eq!(response.data, graphql_value!({"mystery": null}));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Abstract type CatOrDog must resolve to an Object type at runtime for field Query.mystery.",
    );
}

#[test]
fn impossible_runtime_type_fails_the_field() {
    let response = run("{ impossible { __typename } }");

    assert_eq!(response.data, graphql_value!({"impossible": null}));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Runtime Object type \"Dog\" is not a possible type for \"CatOnly\".",
    );
}
