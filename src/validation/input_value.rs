//! Validity of input literals against input types.

use crate::ast::InputValue;
use crate::schema::meta::MetaType;
use crate::schema::{SchemaType, TypeType};

/// Whether a value literal is valid for the given input type.
///
/// Only literals are checked; variable references are assumed to provide
/// values of the correct type. Non-null wrappers require a present, non-null
/// literal. Lists accept a single value as a list of one. Input objects
/// require every defined field to validate (missing fields count as absent
/// literals) and reject unknown fields.
pub fn is_valid_literal_value(
    schema: &SchemaType,
    arg_type: &TypeType,
    value: Option<&InputValue>,
) -> bool {
    if let TypeType::NonNull(inner) = arg_type {
        return match value {
            None | Some(InputValue::Null) => false,
            Some(v) => is_valid_literal_value(schema, inner, Some(v)),
        };
    }

    let Some(value) = value else {
        return true;
    };

    if value.is_null() || value.is_variable() {
        return true;
    }

    match arg_type {
        TypeType::List(item_type) => match value {
            InputValue::List(items) => items
                .iter()
                .all(|item| is_valid_literal_value(schema, item_type, Some(&item.item))),
            single => is_valid_literal_value(schema, item_type, Some(single)),
        },
        TypeType::Concrete(meta) => match meta {
            MetaType::InputObject(input_object) => {
                let InputValue::Object(fields) = value else {
                    return false;
                };

                let all_known = fields
                    .iter()
                    .all(|(name, _)| meta.input_field_by_name(&name.item).is_some());
                if !all_known {
                    return false;
                }

                input_object.input_fields.iter().all(|input_field| {
                    let field_type = schema.make_type(&input_field.arg_type);
                    let provided = fields
                        .iter()
                        .find(|(name, _)| name.item == input_field.name)
                        .map(|(_, value)| &value.item);
                    is_valid_literal_value(schema, &field_type, provided)
                })
            }
            leaf @ (MetaType::Scalar(..) | MetaType::Enum(..)) => {
                leaf.parse_literal(value).is_some()
            }
            // Output-only types are never valid input positions.
            _ => false,
        },
        TypeType::NonNull(..) => unreachable!("handled above"),
    }
}
