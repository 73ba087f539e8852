use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use crate::meta::{Field, ObjectMeta};
use crate::{execute, parse_document_source, ExecuteParams, Resolved, SchemaType, Type};

#[test]
fn thunked_and_immediate_results_are_equivalent() {
    let schema = Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "Query",
                vec![
                    Field::new("immediate", Type::named("Int"))
                        .resolve(|_| Ok(Resolved::Int(42))),
                    Field::new("deferred", Type::named("Int"))
                        .resolve(|_| Ok(Resolved::defer(|| Resolved::Int(42)))),
                ],
            ))
            .finish()
            .expect("invalid test schema"),
    );

    let document =
        Arc::new(parse_document_source("{ immediate deferred }").expect("parse error"));
    let response = execute(ExecuteParams::new(schema, document));

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({"immediate": 42, "deferred": 42}),
    );
}

/// Every resolver defers; the recorded invocation order must be level by
/// level, not depth first.
#[test]
fn thunks_flush_breadth_first() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let deferred_int = |log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str, value: i32| {
        let log = Arc::clone(log);
        Field::new(name, Type::named("Int")).resolve(move |_| {
            let log = Arc::clone(&log);
            Ok(Resolved::defer(move || {
                log.lock().unwrap().push(name);
                Resolved::Int(value)
            }))
        })
    };

    let deferred_nested = |log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str| {
        let log = Arc::clone(log);
        Field::new(name, Type::named("Nested")).resolve(move |_| {
            let log = Arc::clone(&log);
            Ok(Resolved::defer(move || {
                log.lock().unwrap().push(name);
                Resolved::Map(IndexMap::new())
            }))
        })
    };

    let schema = Arc::new(
        SchemaType::build()
            .register(
                ObjectMeta::new(
                    "Nested",
                    vec![
                        deferred_int(&log, "leaf", 1),
                        deferred_nested(&log, "deeper"),
                    ],
                )
                .into_meta(),
            )
            .query(ObjectMeta::new(
                "Query",
                vec![
                    deferred_nested(&log, "left"),
                    deferred_nested(&log, "right"),
                ],
            ))
            .finish()
            .expect("invalid test schema"),
    );

    let document = Arc::new(
        parse_document_source(
            "{ left { leaf deeper { leaf } } right { leaf } }",
        )
        .expect("parse error"),
    );
    let response = execute(ExecuteParams::new(schema, document));

    assert_eq!(response.errors, vec![]);
    assert_eq!(
        response.data,
        graphql_value!({
            "left": {"leaf": 1, "deeper": {"leaf": 1}},
            "right": {"leaf": 1},
        }),
    );

    // Depth 1 producers run before any depth 2 producer, which run before
    // the depth 3 producer.
    assert_eq!(
        *log.lock().unwrap(),
        vec!["left", "right", "leaf", "deeper", "leaf", "leaf"],
    );
}

#[test]
fn thunk_panic_is_contained_at_the_field() {
    let schema = Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "Query",
                vec![
                    Field::new("bad", Type::named("Int"))
                        .resolve(|_| Ok(Resolved::defer(|| panic!("thunk blew up")))),
                    Field::new("good", Type::named("Int")).resolve(|_| Ok(Resolved::Int(1))),
                ],
            ))
            .finish()
            .expect("invalid test schema"),
    );

    let document = Arc::new(parse_document_source("{ bad good }").expect("parse error"));
    let response = execute(ExecuteParams::new(schema, document));

    assert_eq!(response.data, graphql_value!({"bad": null, "good": 1}));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error().message(), "thunk blew up");
}

/// Map sources invoke member thunks through the default resolver, outside
/// the deferral machinery.
#[test]
fn map_member_thunks_resolve_eagerly() {
    let mut map = IndexMap::new();
    map.insert(
        "value".to_owned(),
        Resolved::defer(|| Resolved::Int(7)),
    );

    let root = Resolved::Map(map);
    let schema = Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "Query",
                vec![Field::new("value", Type::named("Int"))],
            ))
            .finish()
            .expect("invalid test schema"),
    );

    let document = Arc::new(parse_document_source("{ value }").expect("parse error"));
    let mut params = ExecuteParams::new(schema, document);
    params.root = root;
    let response = execute(params);

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"value": 7}));
}
