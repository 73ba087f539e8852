//! Meta-field registration and the introspection surface.
//!
//! `__typename` is answered inline from the runtime type; `__schema` and
//! `__type` hand out [`Delegate`](Resolved::Delegate) sources over the
//! shared schema, so cyclic type graphs are only expanded as far as the
//! client selects.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast::Type;
use crate::executor::{FieldResult, ResolveParams};
use crate::schema::meta::{
    Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, MetaType, ObjectMeta,
};
use crate::schema::{DirectiveType, SchemaType};
use crate::value::{FieldResolver, Resolved};

/// The three field definitions the executor special-cases during lookup.
#[derive(Debug)]
pub(crate) struct MetaFields {
    pub(crate) schema_field: Field,
    pub(crate) type_field: Field,
    pub(crate) typename_field: Field,
}

pub(crate) fn meta_fields() -> MetaFields {
    MetaFields {
        schema_field: Field::new("__schema", Type::non_null("__Schema"))
            .description("Access the current type schema of this server.")
            .resolve(|p: ResolveParams<'_>| {
                Ok(Resolved::delegate(SchemaSource {
                    schema: Arc::clone(p.info.schema),
                }))
            }),
        type_field: Field::new("__type", Type::named("__Type"))
            .description("Request the type information of a single type.")
            .argument(Argument::new("name", Type::non_null("String")))
            .resolve(|p: ResolveParams<'_>| {
                let requested = p.args.get_string("name").map(str::to_owned);
                Ok(match requested {
                    Some(name) if p.info.schema.concrete_type_by_name(&name).is_some() => {
                        Resolved::delegate(TypeSource {
                            schema: Arc::clone(p.info.schema),
                            tpe: Type::Named(name),
                        })
                    }
                    _ => Resolved::Null,
                })
            }),
        typename_field: Field::new("__typename", Type::non_null("String"))
            .description("The name of the current Object type at runtime.")
            .resolve(|p: ResolveParams<'_>| Ok(Resolved::String(p.info.parent_type.name.clone()))),
    }
}

/// The type definitions backing the introspection selections.
pub(crate) fn types() -> Vec<MetaType> {
    vec![
        ObjectMeta::new(
            "__Schema",
            vec![
                Field::new("types", Type::non_null_list(Type::non_null("__Type"))),
                Field::new("queryType", Type::non_null("__Type")),
                Field::new("mutationType", Type::named("__Type")),
                Field::new("subscriptionType", Type::named("__Type")),
                Field::new(
                    "directives",
                    Type::non_null_list(Type::non_null("__Directive")),
                ),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "__Type",
            vec![
                Field::new("kind", Type::non_null("__TypeKind")),
                Field::new("name", Type::named("String")),
                Field::new("description", Type::named("String")),
                Field::new("fields", Type::list(Type::non_null("__Field"))).argument(
                    Argument::new("includeDeprecated", Type::named("Boolean"))
                        .default_value(crate::ast::InputValue::Boolean(false)),
                ),
                Field::new("interfaces", Type::list(Type::non_null("__Type"))),
                Field::new("possibleTypes", Type::list(Type::non_null("__Type"))),
                Field::new("enumValues", Type::list(Type::non_null("__EnumValue"))).argument(
                    Argument::new("includeDeprecated", Type::named("Boolean"))
                        .default_value(crate::ast::InputValue::Boolean(false)),
                ),
                Field::new("inputFields", Type::list(Type::non_null("__InputValue"))),
                Field::new("ofType", Type::named("__Type")),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "__Field",
            vec![
                Field::new("name", Type::non_null("String")),
                Field::new("description", Type::named("String")),
                Field::new("args", Type::non_null_list(Type::non_null("__InputValue"))),
                Field::new("type", Type::non_null("__Type")),
                Field::new("isDeprecated", Type::non_null("Boolean")),
                Field::new("deprecationReason", Type::named("String")),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "__InputValue",
            vec![
                Field::new("name", Type::non_null("String")),
                Field::new("description", Type::named("String")),
                Field::new("type", Type::non_null("__Type")),
                Field::new("defaultValue", Type::named("String")),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "__EnumValue",
            vec![
                Field::new("name", Type::non_null("String")),
                Field::new("description", Type::named("String")),
                Field::new("isDeprecated", Type::non_null("Boolean")),
                Field::new("deprecationReason", Type::named("String")),
            ],
        )
        .into_meta(),
        ObjectMeta::new(
            "__Directive",
            vec![
                Field::new("name", Type::non_null("String")),
                Field::new("description", Type::named("String")),
                Field::new(
                    "locations",
                    Type::non_null_list(Type::non_null("__DirectiveLocation")),
                ),
                Field::new("args", Type::non_null_list(Type::non_null("__InputValue"))),
            ],
        )
        .into_meta(),
        EnumMeta::new(
            "__TypeKind",
            &[
                EnumValue::new("SCALAR"),
                EnumValue::new("OBJECT"),
                EnumValue::new("INTERFACE"),
                EnumValue::new("UNION"),
                EnumValue::new("ENUM"),
                EnumValue::new("INPUT_OBJECT"),
                EnumValue::new("LIST"),
                EnumValue::new("NON_NULL"),
            ],
        )
        .into_meta(),
        EnumMeta::new(
            "__DirectiveLocation",
            &[
                EnumValue::new("QUERY"),
                EnumValue::new("MUTATION"),
                EnumValue::new("SUBSCRIPTION"),
                EnumValue::new("FIELD"),
                EnumValue::new("FRAGMENT_DEFINITION"),
                EnumValue::new("FRAGMENT_SPREAD"),
                EnumValue::new("INLINE_FRAGMENT"),
            ],
        )
        .into_meta(),
    ]
}

struct SchemaSource {
    schema: Arc<SchemaType>,
}

impl FieldResolver for SchemaSource {
    fn resolve_field(&self, params: ResolveParams<'_>) -> FieldResult<Resolved> {
        Ok(match params.info.field_name {
            "types" => {
                let mut names = self
                    .schema
                    .concrete_type_list()
                    .into_iter()
                    .map(|t| t.name().to_owned())
                    .collect::<Vec<_>>();
                names.sort();
                Resolved::List(
                    names
                        .into_iter()
                        .map(|name| named_type_source(&self.schema, name))
                        .collect(),
                )
            }
            "queryType" => named_type_source(&self.schema, self.schema.query_type_name.clone()),
            "mutationType" => match &self.schema.mutation_type_name {
                Some(name) => named_type_source(&self.schema, name.clone()),
                None => Resolved::Null,
            },
            "subscriptionType" => match &self.schema.subscription_type_name {
                Some(name) => named_type_source(&self.schema, name.clone()),
                None => Resolved::Null,
            },
            "directives" => {
                let mut directives = self.schema.directive_list();
                directives.sort_by(|a, b| a.name.cmp(&b.name));
                Resolved::List(
                    directives
                        .into_iter()
                        .map(|d| directive_source(&self.schema, d))
                        .collect(),
                )
            }
            _ => Resolved::Null,
        })
    }
}

struct TypeSource {
    schema: Arc<SchemaType>,
    tpe: Type,
}

impl FieldResolver for TypeSource {
    fn resolve_field(&self, params: ResolveParams<'_>) -> FieldResult<Resolved> {
        match params.info.field_name {
            "kind" => Ok(Resolved::String(
                match &self.tpe {
                    Type::NonNullNamed(..) | Type::NonNullList(..) => "NON_NULL".to_owned(),
                    Type::List(..) => "LIST".to_owned(),
                    Type::Named(name) => self
                        .concrete()
                        .map(|m| m.type_kind().as_str().to_owned())
                        .ok_or_else(|| format!("Unknown type \"{name}\""))?,
                },
            )),
            "ofType" => Ok(match &self.tpe {
                Type::NonNullNamed(name) => {
                    named_type_source(&self.schema, name.clone())
                }
                Type::NonNullList(inner) => Resolved::delegate(TypeSource {
                    schema: Arc::clone(&self.schema),
                    tpe: Type::List(inner.clone()),
                }),
                Type::List(inner) => Resolved::delegate(TypeSource {
                    schema: Arc::clone(&self.schema),
                    tpe: (**inner).clone(),
                }),
                Type::Named(..) => Resolved::Null,
            }),
            "name" => Ok(match &self.tpe {
                Type::Named(name) => Resolved::String(name.clone()),
                _ => Resolved::Null,
            }),
            "description" => Ok(Resolved::from(
                self.concrete()
                    .and_then(|m| m.description())
                    .map(str::to_owned),
            )),
            "fields" => {
                let include_deprecated =
                    params.args.get_boolean("includeDeprecated").unwrap_or(false);
                let fields = match self.concrete() {
                    Some(MetaType::Object(ObjectMeta { fields, .. }))
                    | Some(MetaType::Interface(InterfaceMeta { fields, .. })) => fields,
                    _ => return Ok(Resolved::Null),
                };
                Ok(Resolved::List(
                    fields
                        .iter()
                        .filter(|f| include_deprecated || !f.deprecation_status.is_deprecated())
                        .map(|f| field_source(&self.schema, f))
                        .collect(),
                ))
            }
            "interfaces" => Ok(match self.concrete() {
                Some(MetaType::Object(ObjectMeta {
                    interface_names, ..
                })) => Resolved::List(
                    interface_names
                        .iter()
                        .map(|name| named_type_source(&self.schema, name.clone()))
                        .collect(),
                ),
                _ => Resolved::Null,
            }),
            "possibleTypes" => Ok(match self.concrete() {
                Some(meta @ (MetaType::Interface(..) | MetaType::Union(..))) => Resolved::List(
                    self.schema
                        .possible_types(meta)
                        .into_iter()
                        .map(|o| named_type_source(&self.schema, o.name.clone()))
                        .collect(),
                ),
                _ => Resolved::Null,
            }),
            "enumValues" => {
                let include_deprecated =
                    params.args.get_boolean("includeDeprecated").unwrap_or(false);
                Ok(match self.concrete() {
                    Some(MetaType::Enum(EnumMeta { values, .. })) => Resolved::List(
                        values
                            .iter()
                            .filter(|v| {
                                include_deprecated || !v.deprecation_status.is_deprecated()
                            })
                            .map(enum_value_source)
                            .collect(),
                    ),
                    _ => Resolved::Null,
                })
            }
            "inputFields" => Ok(match self.concrete() {
                Some(MetaType::InputObject(InputObjectMeta { input_fields, .. })) => {
                    Resolved::List(
                        input_fields
                            .iter()
                            .map(|arg| input_value_source(&self.schema, arg))
                            .collect(),
                    )
                }
                _ => Resolved::Null,
            }),
            _ => Ok(Resolved::Null),
        }
    }
}

impl TypeSource {
    fn concrete(&self) -> Option<&MetaType> {
        match &self.tpe {
            Type::Named(name) => self.schema.concrete_type_by_name(name),
            _ => None,
        }
    }
}

fn named_type_source(schema: &Arc<SchemaType>, name: String) -> Resolved {
    Resolved::delegate(TypeSource {
        schema: Arc::clone(schema),
        tpe: Type::Named(name),
    })
}

fn type_ref_source(schema: &Arc<SchemaType>, tpe: &Type) -> Resolved {
    Resolved::delegate(TypeSource {
        schema: Arc::clone(schema),
        tpe: tpe.clone(),
    })
}

fn field_source(schema: &Arc<SchemaType>, field: &Field) -> Resolved {
    let mut map = IndexMap::new();
    map.insert("name".to_owned(), Resolved::String(field.name.clone()));
    map.insert(
        "description".to_owned(),
        Resolved::from(field.description.clone()),
    );
    map.insert(
        "args".to_owned(),
        Resolved::List(
            field
                .arguments
                .iter()
                .flatten()
                .map(|arg| input_value_source(schema, arg))
                .collect(),
        ),
    );
    map.insert("type".to_owned(), type_ref_source(schema, &field.field_type));
    map.insert(
        "isDeprecated".to_owned(),
        Resolved::Boolean(field.deprecation_status.is_deprecated()),
    );
    map.insert(
        "deprecationReason".to_owned(),
        Resolved::from(field.deprecation_status.reason().map(str::to_owned)),
    );
    Resolved::Map(map)
}

fn input_value_source(schema: &Arc<SchemaType>, argument: &Argument) -> Resolved {
    let mut map = IndexMap::new();
    map.insert("name".to_owned(), Resolved::String(argument.name.clone()));
    map.insert(
        "description".to_owned(),
        Resolved::from(argument.description.clone()),
    );
    map.insert("type".to_owned(), type_ref_source(schema, &argument.arg_type));
    map.insert(
        "defaultValue".to_owned(),
        Resolved::from(argument.default_value.as_ref().map(|v| v.to_string())),
    );
    Resolved::Map(map)
}

fn enum_value_source(value: &EnumValue) -> Resolved {
    let mut map = IndexMap::new();
    map.insert("name".to_owned(), Resolved::String(value.name.clone()));
    map.insert(
        "description".to_owned(),
        Resolved::from(value.description.clone()),
    );
    map.insert(
        "isDeprecated".to_owned(),
        Resolved::Boolean(value.deprecation_status.is_deprecated()),
    );
    map.insert(
        "deprecationReason".to_owned(),
        Resolved::from(value.deprecation_status.reason().map(str::to_owned)),
    );
    Resolved::Map(map)
}

fn directive_source(schema: &Arc<SchemaType>, directive: &DirectiveType) -> Resolved {
    let mut map = IndexMap::new();
    map.insert("name".to_owned(), Resolved::String(directive.name.clone()));
    map.insert(
        "description".to_owned(),
        Resolved::from(directive.description.clone()),
    );
    map.insert(
        "locations".to_owned(),
        Resolved::List(
            directive
                .locations
                .iter()
                .map(|l| Resolved::String(l.as_str().to_owned()))
                .collect(),
        ),
    );
    map.insert(
        "args".to_owned(),
        Resolved::List(
            directive
                .arguments
                .iter()
                .map(|arg| input_value_source(schema, arg))
                .collect(),
        ),
    );
    Resolved::Map(map)
}
