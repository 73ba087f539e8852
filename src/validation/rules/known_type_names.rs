use crate::ast::{Fragment, InlineFragment, VariableDefinition};
use crate::parser::{SourcePosition, Spanning};
use crate::validation::{ValidatorContext, Visitor};

pub struct KnownTypeNames;

pub fn factory() -> KnownTypeNames {
    KnownTypeNames
}

impl<'a> Visitor<'a> for KnownTypeNames {
    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<InlineFragment>,
    ) {
        if let Some(type_condition) = &fragment.item.type_condition {
            validate_type(ctx, &type_condition.item, &type_condition.start);
        }
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment>,
    ) {
        let type_condition = &fragment.item.type_condition;
        validate_type(ctx, &type_condition.item, &type_condition.start);
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (_, definition): &'a (Spanning<String>, VariableDefinition),
    ) {
        let var_type = &definition.var_type;
        validate_type(ctx, var_type.item.innermost_name(), &var_type.start);
    }
}

fn validate_type(ctx: &mut ValidatorContext<'_>, type_name: &str, location: &SourcePosition) {
    if ctx.schema.concrete_type_by_name(type_name).is_none() {
        ctx.report_error(&error_message(type_name), &[*location]);
    }
}

fn error_message(type_name: &str) -> String {
    format!("Unknown type \"{type_name}\".")
}
