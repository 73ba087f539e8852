//! Coercion of variable and argument values against input types.

use indexmap::IndexMap;

use crate::ast::{self, InputValue};
use crate::executor::{ExecutionError, FieldError, Variables};
use crate::parser::Spanning;
use crate::schema::meta::{Argument, MetaType};
use crate::schema::{SchemaType, TypeType};
use crate::value::{Object, Value};

use super::resolve::Arguments;

/// Coerce the caller-provided variable values against the operation's
/// variable declarations.
///
/// A declared variable that is missing or null falls back to its default
/// value; a non-null declaration without either fails the request before any
/// field runs.
pub(crate) fn get_variable_values(
    schema: &SchemaType,
    definitions: Option<&Spanning<ast::VariableDefinitions>>,
    inputs: &Variables,
) -> Result<Variables, ExecutionError> {
    let mut coerced = Variables::new();

    let Some(definitions) = definitions else {
        return Ok(coerced);
    };

    for (name, definition) in definitions.item.iter() {
        let var_type = &definition.var_type.item;

        match schema.concrete_type_by_name(var_type.innermost_name()) {
            Some(t) if t.is_input() => {}
            _ => {
                return Err(ExecutionError::new(
                    name.start,
                    Vec::new(),
                    FieldError::from(format!(
                        "Variable \"${}\" expected value of type \"{}\" which cannot be used as an input type.",
                        name.item, var_type,
                    )),
                ));
            }
        }

        let ttype = schema.make_type(var_type);
        let input = inputs.get(&name.item);

        if input.is_none() || input.is_some_and(Value::is_null) {
            if let Some(default) = &definition.default_value {
                if let Some(value) = value_from_ast(schema, &ttype, &default.item, None) {
                    coerced.insert(name.item.clone(), value);
                    continue;
                }
            }
            if var_type.is_non_null() {
                return Err(ExecutionError::new(
                    name.start,
                    Vec::new(),
                    FieldError::from(format!(
                        "Variable \"${}\" of required type \"{}\" was not provided.",
                        name.item, var_type,
                    )),
                ));
            }
            if input.is_some() {
                coerced.insert(name.item.clone(), Value::Null);
            }
            continue;
        }

        let input = input.expect("checked for presence above");
        match coerce_value(schema, &ttype, input) {
            Some(value) => {
                coerced.insert(name.item.clone(), value);
            }
            None => {
                return Err(ExecutionError::new(
                    name.start,
                    Vec::new(),
                    FieldError::from(format!(
                        "Variable \"${}\" expected value of type \"{}\" but got: {}.",
                        name.item,
                        var_type,
                        serde_json::to_string(input).unwrap_or_default(),
                    )),
                ));
            }
        }
    }

    Ok(coerced)
}

/// Assemble the coerced argument map for one field or directive invocation
/// from the argument definitions, the literal values in the document and the
/// request's variable values.
pub(crate) fn get_argument_values(
    schema: &SchemaType,
    definitions: Option<&[Argument]>,
    asts: Option<&Spanning<ast::Arguments>>,
    variables: &Variables,
) -> Arguments {
    let mut values = IndexMap::new();

    let Some(definitions) = definitions else {
        return Arguments::new(values);
    };

    for definition in definitions {
        let ttype = schema.make_type(&definition.arg_type);

        let mut value = asts
            .and_then(|args| args.item.get(&definition.name))
            .and_then(|v| value_from_ast(schema, &ttype, &v.item, Some(variables)));

        if value.is_none() {
            if let Some(default) = &definition.default_value {
                value = value_from_ast(schema, &ttype, default, None);
            }
        }

        if let Some(value) = value {
            values.insert(definition.name.clone(), value);
        }
    }

    Arguments::new(values)
}

/// Convert an input literal into a plain value, substituting variables.
///
/// Returns `None` when the literal has no usable value for the given type;
/// the caller treats that as an absent argument. Variables are trusted to
/// have been coerced already.
pub(crate) fn value_from_ast(
    schema: &SchemaType,
    ttype: &TypeType,
    value: &InputValue,
    variables: Option<&Variables>,
) -> Option<Value> {
    if let TypeType::NonNull(inner) = ttype {
        if value.is_null() {
            return None;
        }
        return value_from_ast(schema, inner, value, variables);
    }

    if let InputValue::Variable(name) = value {
        return variables.and_then(|vars| vars.get(name)).cloned();
    }

    match ttype {
        TypeType::List(inner) => match value {
            InputValue::Null => Some(Value::Null),
            InputValue::List(items) => Some(Value::List(
                items
                    .iter()
                    .map(|item| {
                        value_from_ast(schema, inner, &item.item, variables)
                            .unwrap_or(Value::Null)
                    })
                    .collect(),
            )),
            // A single value is accepted as a list of one.
            single => {
                value_from_ast(schema, inner, single, variables).map(|v| Value::List(vec![v]))
            }
        },
        TypeType::Concrete(meta) => match meta {
            MetaType::InputObject(input_object) => {
                if value.is_null() {
                    return Some(Value::Null);
                }
                let InputValue::Object(field_asts) = value else {
                    return None;
                };
                let mut object = Object::with_capacity(input_object.input_fields.len());
                for field in &input_object.input_fields {
                    let field_type = schema.make_type(&field.arg_type);
                    let ast = field_asts.iter().find(|(k, _)| k.item == field.name);
                    let mut field_value = ast
                        .and_then(|(_, v)| value_from_ast(schema, &field_type, &v.item, variables));
                    if field_value.is_none() {
                        if let Some(default) = &field.default_value {
                            field_value = value_from_ast(schema, &field_type, default, None);
                        }
                    }
                    if let Some(field_value) = field_value {
                        object.add_field(field.name.clone(), field_value);
                    }
                }
                Some(Value::Object(object))
            }
            leaf => {
                if value.is_null() {
                    Some(Value::Null)
                } else {
                    leaf.parse_literal(value)
                }
            }
        },
        TypeType::NonNull(_) => unreachable!("unwrapped above"),
    }
}

/// Coerce an out-of-band value (a variable) against an input type.
///
/// Returns `None` when the value does not fit the type.
pub(crate) fn coerce_value(schema: &SchemaType, ttype: &TypeType, value: &Value) -> Option<Value> {
    if let TypeType::NonNull(inner) = ttype {
        if value.is_null() {
            return None;
        }
        return coerce_value(schema, inner, value);
    }

    if value.is_null() {
        return Some(Value::Null);
    }

    match ttype {
        TypeType::List(inner) => match value {
            Value::List(items) => items
                .iter()
                .map(|item| coerce_value(schema, inner, item))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            // A single value coerces to a list of one.
            single => coerce_value(schema, inner, single).map(|v| Value::List(vec![v])),
        },
        TypeType::Concrete(meta) => match meta {
            MetaType::Scalar(s) => (s.parse_value)(value),
            MetaType::Enum(e) => e.parse_value(value),
            MetaType::InputObject(input_object) => {
                let object = value.as_object_value()?;
                let mut coerced = Object::with_capacity(input_object.input_fields.len());
                for field in &input_object.input_fields {
                    let field_type = schema.make_type(&field.arg_type);
                    match object.get_field_value(&field.name) {
                        Some(provided) => {
                            coerced.add_field(
                                field.name.clone(),
                                coerce_value(schema, &field_type, provided)?,
                            );
                        }
                        None => {
                            if let Some(default) = &field.default_value {
                                if let Some(value) =
                                    value_from_ast(schema, &field_type, default, None)
                                {
                                    coerced.add_field(field.name.clone(), value);
                                    continue;
                                }
                            }
                            if field.arg_type.is_non_null() {
                                return None;
                            }
                        }
                    }
                }
                Some(Value::Object(coerced))
            }
            MetaType::Object(..) | MetaType::Interface(..) | MetaType::Union(..) => None,
        },
        TypeType::NonNull(_) => unreachable!("unwrapped above"),
    }
}
