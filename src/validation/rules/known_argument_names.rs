use crate::ast::{Directive, Field, InputValue};
use crate::parser::Spanning;
use crate::schema::meta::Argument;
use crate::validation::{ValidatorContext, Visitor};

enum ArgumentPosition<'a> {
    Directive(&'a str),
    Field(&'a str, &'a str),
}

pub struct KnownArgumentNames<'a> {
    current_args: Option<(ArgumentPosition<'a>, &'a Vec<Argument>)>,
}

pub fn factory<'a>() -> KnownArgumentNames<'a> {
    KnownArgumentNames { current_args: None }
}

impl<'a> Visitor<'a> for KnownArgumentNames<'a> {
    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive>,
    ) {
        self.current_args = ctx
            .schema
            .directive_by_name(&directive.item.name.item)
            .map(|d| {
                (
                    ArgumentPosition::Directive(directive.item.name.item.as_str()),
                    &d.arguments,
                )
            });
    }

    fn exit_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive>) {
        self.current_args = None;
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        self.current_args = ctx
            .parent_type()
            .and_then(|t| {
                t.field_by_name(&field.item.name.item)
                    .and_then(|f| f.arguments.as_ref())
                    .map(|args| {
                        (
                            ArgumentPosition::Field(
                                field.item.name.item.as_str(),
                                t.name(),
                            ),
                            args,
                        )
                    })
            });
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field>) {
        self.current_args = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, _): &'a (Spanning<String>, Spanning<InputValue>),
    ) {
        if let Some((pos, args)) = &self.current_args {
            if !args.iter().any(|a| a.name == arg_name.item) {
                let message = match pos {
                    ArgumentPosition::Field(field_name, type_name) => {
                        field_error_message(&arg_name.item, field_name, type_name)
                    }
                    ArgumentPosition::Directive(directive_name) => {
                        directive_error_message(&arg_name.item, directive_name)
                    }
                };

                ctx.report_error(&message, &[arg_name.start]);
            }
        }
    }
}

fn field_error_message(arg_name: &str, field_name: &str, type_name: &str) -> String {
    format!("Unknown argument \"{arg_name}\" on field \"{field_name}\" of type \"{type_name}\".")
}

fn directive_error_message(arg_name: &str, directive_name: &str) -> String {
    format!("Unknown argument \"{arg_name}\" on directive \"@{directive_name}\".")
}
