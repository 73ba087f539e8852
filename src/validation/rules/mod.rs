//! The default validation rule set.

mod arguments_of_correct_type;
mod default_values_of_correct_type;
mod fields_on_correct_type;
mod fragments_on_composite_types;
mod known_argument_names;
mod known_directives;
mod known_fragment_names;
mod known_type_names;

use crate::ast::Document;
use crate::validation::{visit, MultiVisitorNil, ValidatorContext};

/// Run every default rule over the document, accumulating errors into the
/// context.
#[doc(hidden)]
pub fn visit_all_rules<'a>(ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
    let mut all_rules = MultiVisitorNil
        .with(self::arguments_of_correct_type::factory())
        .with(self::default_values_of_correct_type::factory())
        .with(self::fields_on_correct_type::factory())
        .with(self::fragments_on_composite_types::factory())
        .with(self::known_argument_names::factory())
        .with(self::known_directives::factory())
        .with(self::known_fragment_names::factory())
        .with(self::known_type_names::factory());
    visit(&mut all_rules, ctx, doc);
}
