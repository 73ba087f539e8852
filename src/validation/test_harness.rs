use crate::ast::{Document, InputValue, Type};
use crate::parser::parse_document_source;
use crate::schema::meta::{Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, ObjectMeta, UnionMeta};
use crate::schema::{DirectiveLocation, DirectiveType, SchemaType};
use crate::validation::{visit, MultiVisitorNil, RuleError, ValidatorContext, Visitor};

fn named_field(name: &str, field_type: Type) -> Field {
    Field::new(name, field_type)
}

fn being_fields() -> Vec<Field> {
    vec![named_field("name", Type::named("String"))
        .argument(Argument::new("surname", Type::named("Boolean")))]
}

fn test_schema() -> SchemaType {
    SchemaType::build()
        .register(InterfaceMeta::new("Being", being_fields()).into_meta())
        .register(InterfaceMeta::new("Pet", being_fields()).into_meta())
        .register(
            EnumMeta::new(
                "DogCommand",
                &[
                    EnumValue::new("SIT"),
                    EnumValue::new("HEEL"),
                    EnumValue::new("DOWN"),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Dog",
                vec![
                    named_field("name", Type::named("String"))
                        .argument(Argument::new("surname", Type::named("Boolean"))),
                    named_field("nickname", Type::named("String")),
                    named_field("barkVolume", Type::named("Int")),
                    named_field("barks", Type::named("Boolean")),
                    named_field("doesKnowCommand", Type::named("Boolean"))
                        .argument(Argument::new("dogCommand", Type::named("DogCommand"))),
                    named_field("isHousetrained", Type::named("Boolean")).argument(
                        Argument::new("atOtherHomes", Type::named("Boolean"))
                            .default_value(InputValue::Boolean(true)),
                    ),
                ],
            )
            .interfaces(&["Being", "Pet"])
            .into_meta(),
        )
        .register(
            EnumMeta::new(
                "FurColor",
                &[
                    EnumValue::new("BROWN"),
                    EnumValue::new("BLACK"),
                    EnumValue::new("TAN"),
                    EnumValue::new("SPOTTED"),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "Cat",
                vec![
                    named_field("name", Type::named("String"))
                        .argument(Argument::new("surname", Type::named("Boolean"))),
                    named_field("nickname", Type::named("String")),
                    named_field("meows", Type::named("Boolean")),
                    named_field("meowVolume", Type::named("Int")),
                    named_field("furColor", Type::named("FurColor")),
                ],
            )
            .interfaces(&["Being", "Pet"])
            .into_meta(),
        )
        .register(UnionMeta::new("CatOrDog", &["Cat", "Dog"]).into_meta())
        .register(
            ObjectMeta::new(
                "Human",
                vec![
                    named_field("name", Type::named("String"))
                        .argument(Argument::new("surname", Type::named("Boolean"))),
                    named_field("pets", Type::list(Type::named("Pet"))),
                    named_field("iq", Type::named("Int")),
                ],
            )
            .interfaces(&["Being"])
            .into_meta(),
        )
        .register(
            InputObjectMeta::new(
                "ComplexInput",
                vec![
                    Argument::new("requiredField", Type::non_null("Boolean")),
                    Argument::new("intField", Type::named("Int")),
                    Argument::new("stringField", Type::named("String")),
                    Argument::new("booleanField", Type::named("Boolean")),
                    Argument::new("stringListField", Type::list(Type::named("String"))),
                ],
            )
            .into_meta(),
        )
        .register(
            ObjectMeta::new(
                "ComplicatedArgs",
                vec![
                    named_field("intArgField", Type::named("String"))
                        .argument(Argument::new("intArg", Type::named("Int"))),
                    named_field("nonNullIntArgField", Type::named("String"))
                        .argument(Argument::new("nonNullIntArg", Type::non_null("Int"))),
                    named_field("stringArgField", Type::named("String"))
                        .argument(Argument::new("stringArg", Type::named("String"))),
                    named_field("booleanArgField", Type::named("String"))
                        .argument(Argument::new("booleanArg", Type::named("Boolean"))),
                    named_field("floatArgField", Type::named("String"))
                        .argument(Argument::new("floatArg", Type::named("Float"))),
                    named_field("idArgField", Type::named("String"))
                        .argument(Argument::new("idArg", Type::named("ID"))),
                    named_field("stringListArgField", Type::named("String")).argument(
                        Argument::new("stringListArg", Type::list(Type::named("String"))),
                    ),
                    named_field("complexArgField", Type::named("String"))
                        .argument(Argument::new("complexArg", Type::named("ComplexInput"))),
                    named_field("multipleReqs", Type::named("String"))
                        .argument(Argument::new("req1", Type::non_null("Int")))
                        .argument(Argument::new("req2", Type::non_null("Int"))),
                    named_field("multipleOpts", Type::named("String"))
                        .argument(
                            Argument::new("opt1", Type::named("Int"))
                                .default_value(InputValue::Int(0)),
                        )
                        .argument(
                            Argument::new("opt2", Type::named("Int"))
                                .default_value(InputValue::Int(0)),
                        ),
                ],
            )
            .into_meta(),
        )
        .query(ObjectMeta::new(
            "QueryRoot",
            vec![
                named_field("dog", Type::named("Dog")),
                named_field("cat", Type::named("Cat")),
                named_field("human", Type::named("Human")),
                named_field("catOrDog", Type::named("CatOrDog")),
                named_field("pet", Type::named("Pet")),
                named_field("complicatedArgs", Type::named("ComplicatedArgs")),
            ],
        ))
        .directive(DirectiveType::new(
            "onQuery",
            &[DirectiveLocation::Query],
            vec![],
        ))
        .directive(DirectiveType::new(
            "onMutation",
            &[DirectiveLocation::Mutation],
            vec![],
        ))
        .directive(DirectiveType::new(
            "onFragment",
            &[
                DirectiveLocation::FragmentDefinition,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![],
        ))
        .finish()
        .expect("invalid test schema")
}

fn validate_against<V, F>(factory: F, query: &str) -> Vec<RuleError>
where
    V: Visitor<'static> + 'static,
    F: FnOnce() -> V,
{
    // Rule visitors borrow the document and the schema for the duration of
    // the traversal; leaking both keeps the harness signature simple.
    let schema: &'static SchemaType = Box::leak(Box::new(test_schema()));
    let document: &'static Document = Box::leak(Box::new(
        parse_document_source(query).expect("parse error in validation test"),
    ));

    let mut ctx = ValidatorContext::new(schema, document);
    let mut visitor = MultiVisitorNil.with(factory());
    visit(&mut visitor, &mut ctx, document);

    ctx.into_errors()
}

pub(crate) fn expect_passes_rule<V, F>(factory: F, query: &str)
where
    V: Visitor<'static> + 'static,
    F: FnOnce() -> V,
{
    let errors = validate_against(factory, query);
    assert!(
        errors.is_empty(),
        "expected rule to pass, but errors found: {errors:?}",
    );
}

pub(crate) fn expect_fails_rule<V, F>(factory: F, query: &str, expected_errors: &[RuleError])
where
    V: Visitor<'static> + 'static,
    F: FnOnce() -> V,
{
    let mut errors = validate_against(factory, query);
    errors.sort();

    let mut expected = expected_errors.to_vec();
    expected.sort();

    assert_eq!(errors, expected, "unexpected rule errors");
}
