//! Types used to describe a GraphQL schema at runtime

use std::fmt;
use std::sync::Arc;

use crate::ast::{InputValue, Type};
use crate::executor::{FieldResult, IsTypeOfParams, ResolveParams, ResolveTypeParams};
use crate::value::{Resolved, Value};

/// Resolve delegate attached to a field definition
pub type ResolveFn =
    Arc<dyn for<'a> Fn(ResolveParams<'a>) -> FieldResult<Resolved> + Send + Sync>;

/// Serialization delegate of a leaf type: raw resolver output to response
/// value, `None` when the output cannot be represented
pub type SerializeFn = Arc<dyn Fn(&Resolved) -> Option<Value> + Send + Sync>;

/// Coercion delegate for out-of-band input values (variables)
pub type ParseValueFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Coercion delegate for in-band input literals
pub type ParseLiteralFn = Arc<dyn Fn(&InputValue) -> Option<Value> + Send + Sync>;

/// Type discrimination delegate of an object type
pub type IsTypeOfFn = Arc<dyn for<'a> Fn(IsTypeOfParams<'a>) -> bool + Send + Sync>;

/// Runtime type resolution delegate of an abstract type, returning the name
/// of the concrete object type
pub type ResolveTypeFn =
    Arc<dyn for<'a> Fn(ResolveTypeParams<'a>) -> Option<String> + Send + Sync>;

/// Whether an item is deprecated, with context
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    Current,

    /// The field/variant is deprecated, with an optional reason
    Deprecated(Option<String>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            DeprecationStatus::Current => false,
            DeprecationStatus::Deprecated(_) => true,
        }
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            DeprecationStatus::Current => None,
            DeprecationStatus::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// GraphQL type kind
///
/// The GraphQL specification defines a number of type kinds - the meta type
/// of a type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    /// The spelling of this kind in introspection output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "SCALAR",
            TypeKind::Object => "OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::InputObject => "INPUT_OBJECT",
            TypeKind::List => "LIST",
            TypeKind::NonNull => "NON_NULL",
        }
    }
}

/// Scalar type metadata
#[derive(Clone)]
pub struct ScalarMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    pub(crate) serialize: SerializeFn,
    pub(crate) parse_value: ParseValueFn,
    pub(crate) parse_literal: ParseLiteralFn,
}

impl ScalarMeta {
    /// Build a new scalar type with the given name and coercion delegates.
    pub fn new(
        name: impl Into<String>,
        serialize: SerializeFn,
        parse_value: ParseValueFn,
        parse_literal: ParseLiteralFn,
    ) -> ScalarMeta {
        ScalarMeta {
            name: name.into(),
            description: None,
            serialize,
            parse_value,
            parse_literal,
        }
    }

    /// Set the description of this scalar type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> ScalarMeta {
        self.description = Some(description.into());
        self
    }

    /// Wrap this scalar type into a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Scalar(self)
    }
}

impl fmt::Debug for ScalarMeta {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ScalarMeta")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Metadata for a single value in an enum
#[derive(Clone, Debug)]
pub struct EnumValue {
    /// The name of the enum value
    ///
    /// This is the string literal representation of the enum in responses.
    pub name: String,

    /// The internal value resolvers produce for this variant.
    ///
    /// Defaults to the variant name as a string.
    pub value: Value,

    /// The optional description of the enum value.
    ///
    /// Note: this is not the description of the enum itself; it's the
    /// description of this enum _value_.
    pub description: Option<String>,

    /// Whether the value is deprecated or not, with an optional reason.
    pub deprecation_status: DeprecationStatus,
}

impl EnumValue {
    /// Construct a new enum value with the provided name.
    pub fn new(name: impl Into<String>) -> EnumValue {
        let name = name.into();
        EnumValue {
            value: Value::String(name.clone()),
            name,
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Set the internal value of this enum value.
    ///
    /// Overwrites any previously set value.
    #[must_use]
    pub fn value(mut self, value: Value) -> EnumValue {
        self.value = value;
        self
    }

    /// Set the description of this enum value.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> EnumValue {
        self.description = Some(description.into());
        self
    }

    /// Mark this enum value as deprecated with an optional reason.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> EnumValue {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}

/// Enum type metadata
#[derive(Clone, Debug)]
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub values: Vec<EnumValue>,
}

impl EnumMeta {
    /// Build a new enum type with the specified name and possible values.
    pub fn new(name: impl Into<String>, values: &[EnumValue]) -> EnumMeta {
        EnumMeta {
            name: name.into(),
            description: None,
            values: values.to_vec(),
        }
    }

    /// Set the description of this enum type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> EnumMeta {
        self.description = Some(description.into());
        self
    }

    /// Wrap this enum type into a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Enum(self)
    }

    /// Serialize an internal value into the matching variant name.
    pub fn serialize(&self, value: &Resolved) -> Option<Value> {
        // A resolver may return either the internal value or the variant
        // name itself.
        self.values
            .iter()
            .find(|v| {
                value.matches_value(&v.value)
                    || matches!(value, Resolved::String(s) if *s == v.name)
            })
            .map(|v| Value::String(v.name.clone()))
    }

    /// Coerce an enum literal into the matching internal value.
    pub fn parse_literal(&self, literal: &InputValue) -> Option<Value> {
        let name = literal.as_enum_value()?;
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.clone())
    }

    /// Coerce an out-of-band variant name into the matching internal value.
    pub fn parse_value(&self, value: &Value) -> Option<Value> {
        let name = value.as_string_value()?;
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.clone())
    }
}

/// Metadata for a field
#[derive(Clone)]
pub struct Field {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub arguments: Option<Vec<Argument>>,
    #[doc(hidden)]
    pub field_type: Type,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
    #[doc(hidden)]
    pub resolve: Option<ResolveFn>,
}

impl Field {
    /// Build a new field of the given output type.
    pub fn new(name: impl Into<String>, field_type: Type) -> Field {
        Field {
            name: name.into(),
            description: None,
            arguments: None,
            field_type,
            deprecation_status: DeprecationStatus::Current,
            resolve: None,
        }
    }

    /// Set the description of this field.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Field {
        self.description = Some(description.into());
        self
    }

    /// Add an argument to this field.
    ///
    /// Arguments are unordered and can't contain duplicates by name.
    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Field {
        match self.arguments {
            None => {
                self.arguments = Some(vec![argument]);
            }
            Some(ref mut args) => {
                args.push(argument);
            }
        };
        self
    }

    /// Attach the resolve delegate invoked for this field.
    ///
    /// Fields without a delegate fall back to the default resolver.
    #[must_use]
    pub fn resolve<F>(mut self, f: F) -> Field
    where
        F: for<'a> Fn(ResolveParams<'a>) -> FieldResult<Resolved> + Send + Sync + 'static,
    {
        self.resolve = Some(Arc::new(f));
        self
    }

    /// Mark this field as deprecated with an optional reason.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Field {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(Into::into));
        self
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Metadata for an argument to a field
#[derive(Clone, Debug)]
pub struct Argument {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub arg_type: Type,
    #[doc(hidden)]
    pub default_value: Option<InputValue>,
}

impl Argument {
    /// Build a new argument of the given input type.
    pub fn new(name: impl Into<String>, arg_type: Type) -> Argument {
        Argument {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
        }
    }

    /// Set the description of this argument.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Argument {
        self.description = Some(description.into());
        self
    }

    /// Set the default value of this argument.
    ///
    /// Overwrites any previously set default value.
    #[must_use]
    pub fn default_value(mut self, val: InputValue) -> Argument {
        self.default_value = Some(val);
        self
    }
}

/// Object type metadata
#[derive(Clone)]
pub struct ObjectMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    #[doc(hidden)]
    pub interface_names: Vec<String>,
    pub(crate) is_type_of: Option<IsTypeOfFn>,
}

impl ObjectMeta {
    /// Build a new object type with the specified name and fields.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> ObjectMeta {
        ObjectMeta {
            name: name.into(),
            description: None,
            fields,
            interface_names: vec![],
            is_type_of: None,
        }
    }

    /// Set the description of this object type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> ObjectMeta {
        self.description = Some(description.into());
        self
    }

    /// Set the interfaces this object type implements.
    ///
    /// Overwrites any previously set list of interfaces.
    #[must_use]
    pub fn interfaces(mut self, interfaces: &[&str]) -> ObjectMeta {
        self.interface_names = interfaces.iter().map(|s| (*s).to_owned()).collect();
        self
    }

    /// Attach the predicate deciding whether a source value is of this type.
    ///
    /// Consulted by default runtime type resolution for abstract types.
    #[must_use]
    pub fn is_type_of<F>(mut self, f: F) -> ObjectMeta
    where
        F: for<'a> Fn(IsTypeOfParams<'a>) -> bool + Send + Sync + 'static,
    {
        self.is_type_of = Some(Arc::new(f));
        self
    }

    /// Wrap this object type into a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Object(self)
    }

    /// Look up a field definition by name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl fmt::Debug for ObjectMeta {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ObjectMeta")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("interface_names", &self.interface_names)
            .finish_non_exhaustive()
    }
}

/// Interface type metadata
#[derive(Clone)]
pub struct InterfaceMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

impl InterfaceMeta {
    /// Build a new interface type with the specified name and fields.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> InterfaceMeta {
        InterfaceMeta {
            name: name.into(),
            description: None,
            fields,
            resolve_type: None,
        }
    }

    /// Set the description of this interface type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> InterfaceMeta {
        self.description = Some(description.into());
        self
    }

    /// Attach the delegate resolving the runtime object type of a value.
    ///
    /// Without it, the possible types' `is_type_of` predicates are probed in
    /// registration order.
    #[must_use]
    pub fn resolve_type<F>(mut self, f: F) -> InterfaceMeta
    where
        F: for<'a> Fn(ResolveTypeParams<'a>) -> Option<String> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(f));
        self
    }

    /// Wrap this interface type into a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Interface(self)
    }
}

impl fmt::Debug for InterfaceMeta {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("InterfaceMeta")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Union type metadata
#[derive(Clone)]
pub struct UnionMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub of_type_names: Vec<String>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

impl UnionMeta {
    /// Build a new union type of the given member type names.
    pub fn new(name: impl Into<String>, of_types: &[&str]) -> UnionMeta {
        UnionMeta {
            name: name.into(),
            description: None,
            of_type_names: of_types.iter().map(|s| (*s).to_owned()).collect(),
            resolve_type: None,
        }
    }

    /// Set the description of this union type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> UnionMeta {
        self.description = Some(description.into());
        self
    }

    /// Attach the delegate resolving the runtime object type of a value.
    #[must_use]
    pub fn resolve_type<F>(mut self, f: F) -> UnionMeta
    where
        F: for<'a> Fn(ResolveTypeParams<'a>) -> Option<String> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(f));
        self
    }

    /// Wrap this union type into a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::Union(self)
    }
}

impl fmt::Debug for UnionMeta {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UnionMeta")
            .field("name", &self.name)
            .field("of_type_names", &self.of_type_names)
            .finish_non_exhaustive()
    }
}

/// Input object metadata
#[derive(Clone, Debug)]
pub struct InputObjectMeta {
    #[doc(hidden)]
    pub name: String,
    #[doc(hidden)]
    pub description: Option<String>,
    #[doc(hidden)]
    pub input_fields: Vec<Argument>,
}

impl InputObjectMeta {
    /// Build a new input object type with the specified name and fields.
    pub fn new(name: impl Into<String>, input_fields: Vec<Argument>) -> InputObjectMeta {
        InputObjectMeta {
            name: name.into(),
            description: None,
            input_fields,
        }
    }

    /// Set the description of this input object type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> InputObjectMeta {
        self.description = Some(description.into());
        self
    }

    /// Wrap this input object type into a generic meta type.
    pub fn into_meta(self) -> MetaType {
        MetaType::InputObject(self)
    }
}

/// Generic type metadata
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum MetaType {
    Scalar(ScalarMeta),
    Enum(EnumMeta),
    Object(ObjectMeta),
    Interface(InterfaceMeta),
    Union(UnionMeta),
    InputObject(InputObjectMeta),
}

impl MetaType {
    /// The name of the represented type.
    pub fn name(&self) -> &str {
        match self {
            MetaType::Scalar(ScalarMeta { name, .. })
            | MetaType::Enum(EnumMeta { name, .. })
            | MetaType::Object(ObjectMeta { name, .. })
            | MetaType::Interface(InterfaceMeta { name, .. })
            | MetaType::Union(UnionMeta { name, .. })
            | MetaType::InputObject(InputObjectMeta { name, .. }) => name,
        }
    }

    /// The description of the represented type, if any.
    pub fn description(&self) -> Option<&str> {
        match self {
            MetaType::Scalar(ScalarMeta { description, .. })
            | MetaType::Enum(EnumMeta { description, .. })
            | MetaType::Object(ObjectMeta { description, .. })
            | MetaType::Interface(InterfaceMeta { description, .. })
            | MetaType::Union(UnionMeta { description, .. })
            | MetaType::InputObject(InputObjectMeta { description, .. }) => description.as_deref(),
        }
    }

    /// Construct a [`TypeKind`] out of this meta type.
    pub fn type_kind(&self) -> TypeKind {
        match self {
            MetaType::Scalar(..) => TypeKind::Scalar,
            MetaType::Enum(..) => TypeKind::Enum,
            MetaType::Object(..) => TypeKind::Object,
            MetaType::Interface(..) => TypeKind::Interface,
            MetaType::Union(..) => TypeKind::Union,
            MetaType::InputObject(..) => TypeKind::InputObject,
        }
    }

    /// Get a field's metadata by name.
    ///
    /// Only objects and interfaces have fields.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        match self {
            MetaType::Object(ObjectMeta { fields, .. })
            | MetaType::Interface(InterfaceMeta { fields, .. }) => {
                fields.iter().find(|f| f.name == name)
            }
            MetaType::Scalar(..)
            | MetaType::Enum(..)
            | MetaType::Union(..)
            | MetaType::InputObject(..) => None,
        }
    }

    /// Get an input field's metadata by name.
    ///
    /// Only input objects have input fields.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match self {
            MetaType::InputObject(InputObjectMeta { input_fields, .. }) => {
                input_fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// If the represented type is a composite type.
    ///
    /// Objects, interfaces and unions are composite types.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            MetaType::Object(..) | MetaType::Interface(..) | MetaType::Union(..)
        )
    }

    /// If the represented type can occur in leaf positions of queries.
    ///
    /// Only enums and scalars are leaf types.
    pub fn is_leaf(&self) -> bool {
        matches!(self, MetaType::Scalar(..) | MetaType::Enum(..))
    }

    /// If the represented type is abstract.
    ///
    /// Only interfaces and unions are abstract types.
    pub fn is_abstract(&self) -> bool {
        matches!(self, MetaType::Interface(..) | MetaType::Union(..))
    }

    /// If the represented type can be used in input positions.
    ///
    /// Only scalars, enums and input objects are input types.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            MetaType::Scalar(..) | MetaType::Enum(..) | MetaType::InputObject(..)
        )
    }

    /// Coerce an input literal against this leaf or input object type.
    ///
    /// `None` signals an invalid literal. Objects and lists are handled by
    /// the structural rules in the callers; this only covers leaf parsing.
    pub fn parse_literal(&self, literal: &InputValue) -> Option<Value> {
        match self {
            MetaType::Scalar(s) => (s.parse_literal)(literal),
            MetaType::Enum(e) => e.parse_literal(literal),
            _ => None,
        }
    }
}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
