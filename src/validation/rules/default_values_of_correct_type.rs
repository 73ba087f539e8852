use crate::ast::VariableDefinition;
use crate::parser::Spanning;
use crate::validation::input_value::is_valid_literal_value;
use crate::validation::{ValidatorContext, Visitor};

pub struct DefaultValuesOfCorrectType;

pub fn factory() -> DefaultValuesOfCorrectType {
    DefaultValuesOfCorrectType
}

impl<'a> Visitor<'a> for DefaultValuesOfCorrectType {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (name, definition): &'a (Spanning<String>, VariableDefinition),
    ) {
        let Some(default_value) = &definition.default_value else {
            return;
        };

        let var_type = &definition.var_type.item;

        if var_type.is_non_null() {
            ctx.report_error(
                &non_null_error_message(&name.item, var_type, &var_type.nullable()),
                &[default_value.start],
            );
            return;
        }

        if ctx
            .schema
            .concrete_type_by_name(var_type.innermost_name())
            .is_none()
        {
            // The dangling type name is KnownTypeNames' to report.
            return;
        }

        let meta_type = ctx.schema.make_type(var_type);

        if !is_valid_literal_value(ctx.schema, &meta_type, Some(&default_value.item)) {
            ctx.report_error(
                &type_error_message(&name.item, var_type, &default_value.item),
                &[default_value.start],
            );
        }
    }
}

fn non_null_error_message(
    name: &str,
    var_type: impl std::fmt::Display,
    inner_type: impl std::fmt::Display,
) -> String {
    format!(
        "Variable \"${name}\" of type \"{var_type}\" is required and will not use the default value. Perhaps you meant to use type \"{inner_type}\".",
    )
}

fn type_error_message(
    name: &str,
    var_type: impl std::fmt::Display,
    value: impl std::fmt::Display,
) -> String {
    format!("Variable \"${name}\" of type \"{var_type}\" has invalid default value: {value}.")
}
