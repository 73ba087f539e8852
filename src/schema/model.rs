use std::fmt;

use derive_more::{Display, Error};
use fnv::FnvHashMap;

use crate::ast::Type;
use crate::introspection::{self, MetaFields};
use crate::schema::meta::{Argument, Field, InputObjectMeta, MetaType, ObjectMeta, UnionMeta};
use crate::schema::scalars;

/// Metadata for a schema: the name-indexed table of all reachable types,
/// the root type names and the registered directives.
///
/// Object types may reference themselves and each other freely; every field
/// and argument type is a name reference that is resolved against the table
/// when needed.
#[derive(Debug)]
pub struct SchemaType {
    pub(crate) types: FnvHashMap<String, MetaType>,
    pub(crate) query_type_name: String,
    pub(crate) mutation_type_name: Option<String>,
    pub(crate) subscription_type_name: Option<String>,
    directives: FnvHashMap<String, DirectiveType>,
    pub(crate) meta_fields: MetaFields,
}

/// A view of a type literal with every name resolved against the schema
#[derive(Clone, Debug)]
pub enum TypeType<'a> {
    /// A named, registered type
    Concrete(&'a MetaType),
    /// A non-null wrapper around another type view
    NonNull(Box<TypeType<'a>>),
    /// A list wrapper around another type view
    List(Box<TypeType<'a>>),
}

/// Metadata of a registered directive
#[derive(Clone, Debug)]
pub struct DirectiveType {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub locations: Vec<DirectiveLocation>,
    #[doc(hidden)]
    pub arguments: Vec<Argument>,
}

/// The positions of a document a directive may legally appear at
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DirectiveLocation::Query => "query",
            DirectiveLocation::Mutation => "mutation",
            DirectiveLocation::Subscription => "subscription",
            DirectiveLocation::Field => "field",
            DirectiveLocation::FragmentDefinition => "fragment definition",
            DirectiveLocation::FragmentSpread => "fragment spread",
            DirectiveLocation::InlineFragment => "inline fragment",
        })
    }
}

impl DirectiveLocation {
    /// The spelling of this location in introspection output.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
        }
    }
}

/// Error constructing a schema
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum SchemaError {
    /// No query root type was provided.
    #[display("Schema must define a query root type")]
    MissingQueryType,

    /// Two types with the same name were registered.
    #[display("Duplicate type registration for \"{_0}\"")]
    DuplicateType(#[error(not(source))] String),

    /// A field, argument, union member or interface referenced a type name
    /// that is not registered.
    #[display("Unknown type \"{name}\" referenced by \"{referenced_by}\"")]
    UnknownType {
        /// The dangling type name.
        name: String,
        /// The type or field holding the dangling reference.
        referenced_by: String,
    },

    /// A root type or union member resolved to something other than an
    /// object type.
    #[display("Type \"{_0}\" must be an object type")]
    NotAnObject(#[error(not(source))] String),
}

/// Incrementally build a [`SchemaType`]
///
/// Register every named type the schema can reach and pick the root types,
/// then call [`finish`](SchemaBuilder::finish). The builtin scalars, the
/// `@skip`/`@include` directives and the introspection types are registered
/// automatically.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<MetaType>,
    directives: Vec<DirectiveType>,
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl SchemaType {
    /// Start building a schema.
    pub fn build() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Get a concrete type by name.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// Get a registered object type by name.
    pub fn object_by_name(&self, name: &str) -> Option<&ObjectMeta> {
        match self.types.get(name) {
            Some(MetaType::Object(o)) => Some(o),
            _ => None,
        }
    }

    /// The root type for query operations.
    pub fn query_type(&self) -> &ObjectMeta {
        self.object_by_name(&self.query_type_name)
            .expect("Query type does not exist in schema")
    }

    /// The root type for mutation operations, if the schema has one.
    pub fn mutation_type(&self) -> Option<&ObjectMeta> {
        self.mutation_type_name
            .as_ref()
            .map(|name| {
                self.object_by_name(name)
                    .expect("Mutation type does not exist in schema")
            })
    }

    /// The root type for subscription operations, if the schema has one.
    pub fn subscription_type(&self) -> Option<&ObjectMeta> {
        self.subscription_type_name
            .as_ref()
            .map(|name| {
                self.object_by_name(name)
                    .expect("Subscription type does not exist in schema")
            })
    }

    /// Get a list of all concrete types, in no particular order.
    pub fn concrete_type_list(&self) -> Vec<&MetaType> {
        self.types.values().collect()
    }

    /// Resolve the innermost name of a type literal to a concrete type.
    pub fn lookup_type(&self, tpe: &Type) -> Option<&MetaType> {
        self.concrete_type_by_name(tpe.innermost_name())
    }

    /// Resolve a type literal into a [`TypeType`] view.
    ///
    /// The referenced name must exist in the schema; building a schema
    /// through [`SchemaBuilder`] validates all reachable references.
    pub fn make_type(&self, t: &Type) -> TypeType {
        match t {
            Type::NonNullNamed(n) => TypeType::NonNull(Box::new(TypeType::Concrete(
                self.concrete_type_by_name(n).expect("Type not found in schema"),
            ))),
            Type::NonNullList(inner) => {
                TypeType::NonNull(Box::new(TypeType::List(Box::new(self.make_type(inner)))))
            }
            Type::Named(n) => {
                TypeType::Concrete(self.concrete_type_by_name(n).expect("Type not found in schema"))
            }
            Type::List(inner) => TypeType::List(Box::new(self.make_type(inner))),
        }
    }

    /// Get a list of registered directives, in no particular order.
    pub fn directive_list(&self) -> Vec<&DirectiveType> {
        self.directives.values().collect()
    }

    /// Get a directive by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.get(name)
    }

    /// The possible object types of an abstract type.
    ///
    /// Union members are listed in declaration order; interface implementors
    /// in no particular order.
    pub fn possible_types(&self, abstract_type: &MetaType) -> Vec<&ObjectMeta> {
        match abstract_type {
            MetaType::Union(UnionMeta { of_type_names, .. }) => of_type_names
                .iter()
                .filter_map(|n| self.object_by_name(n))
                .collect(),
            MetaType::Interface(interface) => {
                let mut implementors = self
                    .types
                    .values()
                    .filter_map(|t| match t {
                        MetaType::Object(o)
                            if o.interface_names.iter().any(|i| *i == interface.name) =>
                        {
                            Some(o)
                        }
                        _ => None,
                    })
                    .collect::<Vec<_>>();
                implementors.sort_by(|a, b| a.name.cmp(&b.name));
                implementors
            }
            _ => vec![],
        }
    }

    /// Whether `possible_type` is one of the possible object types of the
    /// abstract `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: &MetaType, possible_type: &ObjectMeta) -> bool {
        self.possible_types(abstract_type)
            .iter()
            .any(|t| t.name == possible_type.name)
    }
}

impl SchemaBuilder {
    /// Register a named type.
    #[must_use]
    pub fn register(mut self, meta: MetaType) -> SchemaBuilder {
        self.types.push(meta);
        self
    }

    /// Register an object type and select it as the query root.
    #[must_use]
    pub fn query(mut self, object: ObjectMeta) -> SchemaBuilder {
        self.query = Some(object.name.clone());
        self.types.push(MetaType::Object(object));
        self
    }

    /// Register an object type and select it as the mutation root.
    #[must_use]
    pub fn mutation(mut self, object: ObjectMeta) -> SchemaBuilder {
        self.mutation = Some(object.name.clone());
        self.types.push(MetaType::Object(object));
        self
    }

    /// Register an object type and select it as the subscription root.
    #[must_use]
    pub fn subscription(mut self, object: ObjectMeta) -> SchemaBuilder {
        self.subscription = Some(object.name.clone());
        self.types.push(MetaType::Object(object));
        self
    }

    /// Register a directive, e.g. for validation of custom annotations.
    #[must_use]
    pub fn directive(mut self, directive: DirectiveType) -> SchemaBuilder {
        self.directives.push(directive);
        self
    }

    /// Validate the registered types and produce the finished schema.
    pub fn finish(self) -> Result<SchemaType, SchemaError> {
        let query_type_name = self.query.ok_or(SchemaError::MissingQueryType)?;

        let mut types = FnvHashMap::default();
        for meta in builtin_scalars().into_iter().chain(introspection::types()) {
            types.insert(meta.name().to_owned(), meta);
        }
        for meta in self.types {
            let name = meta.name().to_owned();
            if types.insert(name.clone(), meta).is_some() && !is_builtin_name(&name) {
                return Err(SchemaError::DuplicateType(name));
            }
        }

        let mut directives = FnvHashMap::default();
        for directive in [
            DirectiveType::new_skip(),
            DirectiveType::new_include(),
        ]
        .into_iter()
        .chain(self.directives)
        {
            directives.insert(directive.name.clone(), directive);
        }

        let schema = SchemaType {
            types,
            query_type_name,
            mutation_type_name: self.mutation,
            subscription_type_name: self.subscription,
            directives,
            meta_fields: introspection::meta_fields(),
        };

        validate_references(&schema)?;

        Ok(schema)
    }
}

fn builtin_scalars() -> Vec<MetaType> {
    vec![
        scalars::int_meta().into_meta(),
        scalars::float_meta().into_meta(),
        scalars::string_meta().into_meta(),
        scalars::boolean_meta().into_meta(),
        scalars::id_meta().into_meta(),
    ]
}

fn is_builtin_name(name: &str) -> bool {
    name.starts_with("__")
        || matches!(name, "Int" | "Float" | "String" | "Boolean" | "ID")
}

fn validate_references(schema: &SchemaType) -> Result<(), SchemaError> {
    let check = |tpe: &Type, referenced_by: &str| -> Result<(), SchemaError> {
        let name = tpe.innermost_name();
        if schema.concrete_type_by_name(name).is_none() {
            return Err(SchemaError::UnknownType {
                name: name.to_owned(),
                referenced_by: referenced_by.to_owned(),
            });
        }
        Ok(())
    };

    let check_fields = |owner: &str, fields: &[Field]| -> Result<(), SchemaError> {
        for field in fields {
            let referenced_by = format!("{}.{}", owner, field.name);
            check(&field.field_type, &referenced_by)?;
            for arg in field.arguments.iter().flatten() {
                check(&arg.arg_type, &referenced_by)?;
            }
        }
        Ok(())
    };

    for meta in schema.types.values() {
        match meta {
            MetaType::Object(o) => {
                check_fields(&o.name, &o.fields)?;
                for interface in &o.interface_names {
                    if schema.concrete_type_by_name(interface).is_none() {
                        return Err(SchemaError::UnknownType {
                            name: interface.clone(),
                            referenced_by: o.name.clone(),
                        });
                    }
                }
            }
            MetaType::Interface(i) => check_fields(&i.name, &i.fields)?,
            MetaType::Union(u) => {
                for member in &u.of_type_names {
                    if schema.object_by_name(member).is_none() {
                        return Err(match schema.concrete_type_by_name(member) {
                            Some(_) => SchemaError::NotAnObject(member.clone()),
                            None => SchemaError::UnknownType {
                                name: member.clone(),
                                referenced_by: u.name.clone(),
                            },
                        });
                    }
                }
            }
            MetaType::InputObject(InputObjectMeta {
                name, input_fields, ..
            }) => {
                for field in input_fields {
                    check(&field.arg_type, &format!("{}.{}", name, field.name))?;
                }
            }
            MetaType::Scalar(..) | MetaType::Enum(..) => {}
        }
    }

    for directive in schema.directives.values() {
        for arg in &directive.arguments {
            check(&arg.arg_type, &format!("@{}", directive.name))?;
        }
    }

    for root in [Some(&schema.query_type_name), schema.mutation_type_name.as_ref(), schema.subscription_type_name.as_ref()]
        .into_iter()
        .flatten()
    {
        match schema.concrete_type_by_name(root) {
            Some(MetaType::Object(_)) => {}
            Some(_) => return Err(SchemaError::NotAnObject(root.clone())),
            None => {
                return Err(SchemaError::UnknownType {
                    name: root.clone(),
                    referenced_by: "schema".to_owned(),
                })
            }
        }
    }

    Ok(())
}

impl<'a> TypeType<'a> {
    /// The concrete type, if this view is not wrapped.
    #[inline]
    pub fn to_concrete(&self) -> Option<&'a MetaType> {
        match self {
            TypeType::Concrete(t) => Some(t),
            _ => None,
        }
    }

    /// The concrete type behind any list and non-null wrappers.
    #[inline]
    pub fn innermost_concrete(&self) -> &'a MetaType {
        match self {
            TypeType::Concrete(t) => t,
            TypeType::NonNull(n) | TypeType::List(n) => n.innermost_concrete(),
        }
    }

    /// The item type, if this view is a list behind any non-null wrapper.
    #[inline]
    pub fn list_contents(&self) -> Option<&TypeType<'a>> {
        match self {
            TypeType::List(n) => Some(n),
            TypeType::NonNull(n) => n.list_contents(),
            TypeType::Concrete(_) => None,
        }
    }

    /// Whether this view only represents non-null values.
    #[inline]
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeType::NonNull(_))
    }
}

impl<'a> fmt::Display for TypeType<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeType::Concrete(t) => f.write_str(t.name()),
            TypeType::List(i) => write!(f, "[{i}]"),
            TypeType::NonNull(i) => write!(f, "{i}!"),
        }
    }
}

impl DirectiveType {
    /// Build a new directive usable at the given locations.
    pub fn new(
        name: impl Into<String>,
        locations: &[DirectiveLocation],
        arguments: Vec<Argument>,
    ) -> DirectiveType {
        DirectiveType {
            name: name.into(),
            description: None,
            locations: locations.to_vec(),
            arguments,
        }
    }

    fn new_skip() -> DirectiveType {
        Self::new(
            "skip",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new("if", Type::non_null("Boolean"))],
        )
        .description("Directs the executor to skip this field or fragment when the `if` argument is true.")
    }

    fn new_include() -> DirectiveType {
        Self::new(
            "include",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new("if", Type::non_null("Boolean"))],
        )
        .description("Directs the executor to include this field or fragment only when the `if` argument is true.")
    }

    /// Set the description of this directive.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: &str) -> DirectiveType {
        self.description = Some(description.to_owned());
        self
    }
}
