use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use crate::meta::{Field, ObjectMeta};
use crate::{execute, parse_document_source, ExecuteParams, Resolved, SchemaType, Type};

fn schema_with_log(log: Arc<Mutex<Vec<&'static str>>>) -> Arc<SchemaType> {
    let first_log = Arc::clone(&log);
    let second_log = Arc::clone(&log);
    let third_log = Arc::clone(&log);

    Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "Query",
                vec![Field::new("ok", Type::named("Boolean"))],
            ))
            .mutation(ObjectMeta::new(
                "Mutation",
                vec![
                    Field::new("first", Type::named("Int")).resolve(move |_| {
                        first_log.lock().unwrap().push("A");
                        Ok(Resolved::Int(1))
                    }),
                    Field::new("second", Type::list(Type::named("String"))).resolve(
                        move |_| {
                            let entries = second_log.lock().unwrap();
                            Ok(Resolved::List(
                                entries.iter().map(|e| Resolved::string(*e)).collect(),
                            ))
                        },
                    ),
                    Field::new("third", Type::named("Int")).resolve(move |_| {
                        third_log.lock().unwrap().push("C");
                        Ok(Resolved::Int(3))
                    }),
                ],
            ))
            .finish()
            .expect("invalid test schema"),
    )
}

#[test]
fn top_level_fields_run_in_document_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let schema = schema_with_log(Arc::clone(&log));

    let document =
        Arc::new(parse_document_source("mutation { first second third }").expect("parse error"));
    let response = execute(ExecuteParams::new(schema, document));

    assert_eq!(response.errors, vec![]);
    // The second field's resolver observes the first one's side effect, and
    // not the third one's.
    assert_eq!(
        response.data,
        graphql_value!({"first": 1, "second": ["A"], "third": 3}),
    );
    assert_eq!(*log.lock().unwrap(), vec!["A", "C"]);
}

#[test]
fn schema_without_mutation_root_rejects_mutations() {
    let schema = Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "Query",
                vec![Field::new("ok", Type::named("Boolean"))],
            ))
            .finish()
            .expect("invalid test schema"),
    );

    let document = Arc::new(parse_document_source("mutation { anything }").expect("parse error"));
    let response = execute(ExecuteParams::new(schema, document));

    assert_eq!(response.data, crate::Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Schema is not configured for mutations",
    );
}

#[test]
fn schema_without_subscription_root_rejects_subscriptions() {
    let schema = Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "Query",
                vec![Field::new("ok", Type::named("Boolean"))],
            ))
            .finish()
            .expect("invalid test schema"),
    );

    let document =
        Arc::new(parse_document_source("subscription { anything }").expect("parse error"));
    let response = execute(ExecuteParams::new(schema, document));

    assert_eq!(
        response.errors[0].error().message(),
        "Schema is not configured for subscriptions",
    );
}

#[test]
fn subscription_executes_against_its_root_type() {
    let schema = Arc::new(
        SchemaType::build()
            .query(ObjectMeta::new(
                "Query",
                vec![Field::new("ok", Type::named("Boolean"))],
            ))
            .subscription(ObjectMeta::new(
                "Subscription",
                vec![Field::new("ticks", Type::named("Int"))
                    .resolve(|_| Ok(Resolved::Int(7)))],
            ))
            .finish()
            .expect("invalid test schema"),
    );

    let document = Arc::new(parse_document_source("subscription { ticks }").expect("parse error"));
    let response = execute(ExecuteParams::new(schema, document));

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"ticks": 7}));
}
