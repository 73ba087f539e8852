use crate::ast::{Fragment, InlineFragment};
use crate::parser::Spanning;
use crate::validation::{ValidatorContext, Visitor};

pub struct FragmentsOnCompositeTypes;

pub fn factory() -> FragmentsOnCompositeTypes {
    FragmentsOnCompositeTypes
}

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment>,
    ) {
        if let Some(current_type) = ctx.current_type() {
            if !current_type.is_composite() {
                ctx.report_error(
                    &named_error_message(&f.item.name.item, current_type.name()),
                    &[f.item.type_condition.start],
                );
            }
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<InlineFragment>,
    ) {
        let Some(type_condition) = &f.item.type_condition else {
            return;
        };

        if let Some(current_type) = ctx.current_type() {
            if !current_type.is_composite() {
                ctx.report_error(
                    &inline_error_message(current_type.name()),
                    &[type_condition.start],
                );
            }
        }
    }
}

fn named_error_message(fragment_name: &str, type_name: &str) -> String {
    format!(
        "Fragment \"{fragment_name}\" cannot condition on non composite type \"{type_name}\".",
    )
}

fn inline_error_message(type_name: &str) -> String {
    format!("Fragment cannot condition on non composite type \"{type_name}\".")
}
