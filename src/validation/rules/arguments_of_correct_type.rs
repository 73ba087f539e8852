use crate::ast::{Directive, Field, InputValue};
use crate::parser::Spanning;
use crate::schema::meta::Argument;
use crate::validation::input_value::is_valid_literal_value;
use crate::validation::{ValidatorContext, Visitor};

pub struct ArgumentsOfCorrectType<'a> {
    current_args: Option<&'a Vec<Argument>>,
}

pub fn factory<'a>() -> ArgumentsOfCorrectType<'a> {
    ArgumentsOfCorrectType { current_args: None }
}

impl<'a> Visitor<'a> for ArgumentsOfCorrectType<'a> {
    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive>,
    ) {
        self.current_args = ctx
            .schema
            .directive_by_name(&directive.item.name.item)
            .map(|d| &d.arguments);
    }

    fn exit_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive>) {
        self.current_args = None;
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        self.current_args = ctx
            .parent_type()
            .and_then(|t| t.field_by_name(&field.item.name.item))
            .and_then(|f| f.arguments.as_ref());
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field>) {
        self.current_args = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, arg_value): &'a (Spanning<String>, Spanning<InputValue>),
    ) {
        let Some(argument_meta) = self
            .current_args
            .and_then(|args| args.iter().find(|a| a.name == arg_name.item))
        else {
            return;
        };

        if ctx
            .schema
            .concrete_type_by_name(argument_meta.arg_type.innermost_name())
            .is_none()
        {
            // The dangling type name is KnownTypeNames' to report.
            return;
        }

        let meta_type = ctx.schema.make_type(&argument_meta.arg_type);

        if !is_valid_literal_value(ctx.schema, &meta_type, Some(&arg_value.item)) {
            ctx.report_error(
                &error_message(&arg_name.item, &argument_meta.arg_type, &arg_value.item),
                &[arg_value.start],
            );
        }
    }
}

fn error_message(
    arg_name: &str,
    arg_type: impl std::fmt::Display,
    value: impl std::fmt::Display,
) -> String {
    format!("Argument \"{arg_name}\" expected type \"{arg_type}\" but got: {value}.")
}
