use crate::ast::FragmentSpread;
use crate::parser::Spanning;
use crate::validation::{ValidatorContext, Visitor};

pub struct KnownFragmentNames;

pub fn factory() -> KnownFragmentNames {
    KnownFragmentNames
}

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread>,
    ) {
        let name = &spread.item.name.item;

        if !ctx.is_known_fragment(name) {
            ctx.report_error(&error_message(name), &[spread.item.name.start]);
        }
    }
}

fn error_message(fragment_name: &str) -> String {
    format!("Unknown fragment \"{fragment_name}\".")
}
