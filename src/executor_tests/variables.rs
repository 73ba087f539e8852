use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::ast::InputValue;
use crate::meta::{Argument, Field, InputObjectMeta, ObjectMeta};
use crate::{
    execute, parse_document_source, ExecuteParams, Resolved, ResolveParams, SchemaType, Type,
    Value, Variables,
};

fn test_schema() -> Arc<SchemaType> {
    Arc::new(
        SchemaType::build()
            .register(
                InputObjectMeta::new(
                    "Point",
                    vec![
                        Argument::new("x", Type::non_null("Int")),
                        Argument::new("y", Type::named("Int")).default_value(InputValue::Int(0)),
                    ],
                )
                .into_meta(),
            )
            .query(ObjectMeta::new(
                "Query",
                vec![
                    Field::new("echo", Type::named("Int"))
                        .argument(Argument::new("value", Type::named("Int")))
                        .resolve(|p: ResolveParams<'_>| {
                            Ok(match p.args.get_int("value") {
                                Some(value) => Resolved::Int(value),
                                None => Resolved::Null,
                            })
                        }),
                    Field::new("echoWithDefault", Type::named("Int"))
                        .argument(
                            Argument::new("value", Type::named("Int"))
                                .default_value(InputValue::Int(42)),
                        )
                        .resolve(|p: ResolveParams<'_>| {
                            Ok(match p.args.get_int("value") {
                                Some(value) => Resolved::Int(value),
                                None => Resolved::Null,
                            })
                        }),
                    Field::new("norm", Type::named("Int"))
                        .argument(Argument::new("point", Type::named("Point")))
                        .resolve(|p: ResolveParams<'_>| {
                            let point = match p.args.get("point") {
                                Some(Value::Object(o)) => o,
                                _ => return Ok(Resolved::Null),
                            };
                            let x = point.get_field_value("x").and_then(Value::as_int_value);
                            let y = point.get_field_value("y").and_then(Value::as_int_value);
                            Ok(Resolved::Int(x.unwrap_or(0).abs() + y.unwrap_or(0).abs()))
                        }),
                ],
            ))
            .finish()
            .expect("invalid test schema"),
    )
}

fn run_with_variables(query: &str, variables: Variables) -> crate::Response {
    let document = Arc::new(parse_document_source(query).expect("parse error"));
    let mut params = ExecuteParams::new(test_schema(), document);
    params.variables = variables;
    execute(params)
}

#[test]
fn literal_arguments_are_coerced() {
    let response = run_with_variables("{ echo(value: 5) }", Variables::new());

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"echo": 5}));
}

#[test]
fn variable_arguments_are_substituted() {
    let mut variables = Variables::new();
    variables.insert("v".into(), Value::Int(9));

    let response =
        run_with_variables("query Q($v: Int) { echo(value: $v) }", variables);

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"echo": 9}));
}

#[test]
fn absent_argument_falls_back_to_default() {
    let response = run_with_variables("{ echoWithDefault }", Variables::new());

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"echoWithDefault": 42}));
}

#[test]
fn absent_variable_falls_back_to_declaration_default() {
    let response = run_with_variables(
        "query Q($v: Int = 33) { echo(value: $v) }",
        Variables::new(),
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"echo": 33}));
}

#[test]
fn missing_required_variable_is_a_context_error() {
    let response = run_with_variables("query Q($v: Int!) { echo(value: $v) }", Variables::new());

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Variable \"$v\" of required type \"Int!\" was not provided.",
    );
}

#[test]
fn mistyped_variable_is_a_context_error() {
    let mut variables = Variables::new();
    variables.insert("v".into(), Value::String("nope".into()));

    let response = run_with_variables("query Q($v: Int) { echo(value: $v) }", variables);

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].error().message(),
        "Variable \"$v\" expected value of type \"Int\" but got: \"nope\".",
    );
}

#[test]
fn input_object_variable_with_defaulted_field() {
    let mut variables = Variables::new();
    variables.insert("p".into(), graphql_value!({"x": (-3)}));

    let response = run_with_variables("query Q($p: Point) { norm(point: $p) }", variables);

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"norm": 3}));
}

#[test]
fn input_object_literal_with_variable_member() {
    let mut variables = Variables::new();
    variables.insert("x".into(), Value::Int(2));

    let response = run_with_variables(
        "query Q($x: Int!) { norm(point: { x: $x, y: 4 }) }",
        variables,
    );

    assert_eq!(response.errors, vec![]);
    assert_eq!(response.data, graphql_value!({"norm": 6}));
}
