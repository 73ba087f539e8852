//! The abstract syntax tree the executor and validator walk.
//!
//! The AST is fully owned: names are `String`s rather than borrows of the
//! source text, so a parsed [`Document`] can be handed to the background
//! execution worker without tying it to the lifetime of the query string.

use std::fmt;

use crate::parser::Spanning;

/// A type literal in the syntax tree
///
/// This enum carries no semantic information and might refer to types that do
/// not exist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Type {
    /// A nullable named type, e.g. `String`
    Named(String),
    /// A nullable list type, e.g. `[String]`
    ///
    /// The list itself is what's nullable, the containing type might be
    /// non-null.
    List(Box<Type>),
    /// A non-null named type, e.g. `String!`
    NonNullNamed(String),
    /// A non-null list type, e.g. `[String]!`
    NonNullList(Box<Type>),
}

impl Type {
    /// Shorthand for a nullable named type.
    pub fn named(name: impl Into<String>) -> Type {
        Type::Named(name.into())
    }

    /// Shorthand for a non-null named type.
    pub fn non_null(name: impl Into<String>) -> Type {
        Type::NonNullNamed(name.into())
    }

    /// Shorthand for a nullable list of `inner`.
    pub fn list(inner: Type) -> Type {
        Type::List(Box::new(inner))
    }

    /// Shorthand for a non-null list of `inner`.
    pub fn non_null_list(inner: Type) -> Type {
        Type::NonNullList(Box::new(inner))
    }

    /// Get the name of a named type.
    ///
    /// Only applies to named types; lists will return `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => Some(n),
            Type::List(_) | Type::NonNullList(_) => None,
        }
    }

    /// Get the innermost name by unpacking lists
    ///
    /// All type literals contain exactly one named type.
    pub fn innermost_name(&self) -> &str {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => n,
            Type::List(l) | Type::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Determines if a type only can represent non-null values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }

    /// The same type with the outermost non-null marker stripped.
    pub fn nullable(&self) -> Type {
        match self {
            Type::NonNullNamed(n) => Type::Named(n.clone()),
            Type::NonNullList(l) => Type::List(l.clone()),
            t => t.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Named(n) => write!(f, "{n}"),
            Type::NonNullNamed(n) => write!(f, "{n}!"),
            Type::List(t) => write!(f, "[{t}]"),
            Type::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

/// A JSON-like value that can been read from a query
///
/// Lists and objects variants are _spanned_: they contain a reference to
/// their position in the source file, if available.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum InputValue {
    Null,
    Int(i32),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    Variable(String),
    List(Vec<Spanning<InputValue>>),
    Object(Vec<(Spanning<String>, Spanning<InputValue>)>),
}

impl InputValue {
    /// Construct a null value.
    pub fn null() -> InputValue {
        InputValue::Null
    }

    /// Construct an enum value.
    pub fn enum_value(s: impl Into<String>) -> InputValue {
        InputValue::Enum(s.into())
    }

    /// Construct a variable value.
    pub fn variable(v: impl Into<String>) -> InputValue {
        InputValue::Variable(v.into())
    }

    /// Construct an unlocated list.
    pub fn list(l: Vec<InputValue>) -> InputValue {
        InputValue::List(l.into_iter().map(Spanning::unlocated).collect())
    }

    /// Construct an unlocated object.
    pub fn object(o: Vec<(&str, InputValue)>) -> InputValue {
        InputValue::Object(
            o.into_iter()
                .map(|(k, v)| (Spanning::unlocated(k.into()), Spanning::unlocated(v)))
                .collect(),
        )
    }

    /// Does the value represent null?
    pub fn is_null(&self) -> bool {
        matches!(self, InputValue::Null)
    }

    /// Does the value represent a variable?
    pub fn is_variable(&self) -> bool {
        matches!(self, InputValue::Variable(_))
    }

    /// View the underlying enum value, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            InputValue::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        match self {
            InputValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Recursively find all variables this value references.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            InputValue::Variable(name) => vec![name.as_str()],
            InputValue::List(l) => l
                .iter()
                .flat_map(|v| v.item.referenced_variables())
                .collect(),
            InputValue::Object(o) => o
                .iter()
                .flat_map(|(_, v)| v.item.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputValue::Null => write!(f, "null"),
            InputValue::Int(v) => write!(f, "{v}"),
            InputValue::Float(v) => write!(f, "{v}"),
            InputValue::String(v) => write!(f, "\"{v}\""),
            InputValue::Boolean(v) => write!(f, "{v}"),
            InputValue::Enum(v) => write!(f, "{v}"),
            InputValue::Variable(v) => write!(f, "${v}"),
            InputValue::List(v) => {
                write!(f, "[")?;
                for (i, spanning) in v.iter().enumerate() {
                    spanning.item.fmt(f)?;
                    if i < v.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            InputValue::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    write!(f, "{}: ", k.item)?;
                    v.item.fmt(f)?;
                    if i < o.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Directive {
    pub name: Spanning<String>,
    pub arguments: Option<Spanning<Arguments>>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Arguments {
    pub items: Vec<(Spanning<String>, Spanning<InputValue>)>,
}

impl Arguments {
    #[allow(missing_docs)]
    pub fn iter(&self) -> impl Iterator<Item = &(Spanning<String>, Spanning<InputValue>)> {
        self.items.iter()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The value provided for the named argument, if any.
    pub fn get(&self, key: &str) -> Option<&Spanning<InputValue>> {
        self.items
            .iter()
            .find(|(k, _)| k.item == key)
            .map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Field {
    pub alias: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub arguments: Option<Spanning<Arguments>>,
    pub directives: Option<Vec<Spanning<Directive>>>,
    pub selection_set: Option<Vec<Selection>>,
}

impl Field {
    /// The key under which this field is placed in the response map: the
    /// alias if present, the field name otherwise.
    pub fn response_name(&self) -> &str {
        self.alias
            .as_ref()
            .map(|a| a.item.as_str())
            .unwrap_or(&self.name.item)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct FragmentSpread {
    pub name: Spanning<String>,
    pub directives: Option<Vec<Spanning<Directive>>>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct InlineFragment {
    pub type_condition: Option<Spanning<String>>,
    pub directives: Option<Vec<Spanning<Directive>>>,
    pub selection_set: Vec<Selection>,
}

/// Entry in a GraphQL selection set
///
/// This enum represents one of the three variants of a selection that exists
/// in GraphQL: a field, a fragment spread, or an inline fragment. Each of the
/// variants references their location in the query source.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Selection {
    Field(Spanning<Field>),
    FragmentSpread(Spanning<FragmentSpread>),
    InlineFragment(Spanning<InlineFragment>),
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct VariableDefinition {
    pub var_type: Spanning<Type>,
    pub default_value: Option<Spanning<InputValue>>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct VariableDefinitions {
    pub items: Vec<(Spanning<String>, VariableDefinition)>,
}

impl VariableDefinitions {
    #[allow(missing_docs)]
    pub fn iter(&self) -> impl Iterator<Item = &(Spanning<String>, VariableDefinition)> {
        self.items.iter()
    }
}

/// The operation kind of an executable definition
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: Option<Spanning<String>>,
    pub variable_definitions: Option<Spanning<VariableDefinitions>>,
    pub directives: Option<Vec<Spanning<Directive>>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Fragment {
    pub name: Spanning<String>,
    pub type_condition: Spanning<String>,
    pub directives: Option<Vec<Spanning<Directive>>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Definition {
    Operation(Spanning<Operation>),
    Fragment(Spanning<Fragment>),
}

/// A parsed executable document: the input to validation and execution
pub type Document = Vec<Definition>;
