use crate::ast::Field;
use crate::parser::Spanning;
use crate::schema::meta::MetaType;
use crate::validation::{ValidatorContext, Visitor};

pub struct FieldsOnCorrectType;

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };

        let field_name = &field.item.name.item;

        if is_meta_field(ctx, parent_type, field_name) {
            return;
        }

        if parent_type.field_by_name(field_name).is_none() {
            ctx.report_error(
                &error_message(field_name, parent_type.name()),
                &[field.item.name.start],
            );
        }
    }
}

/// `__typename` can always be queried as a field, even on unions where no
/// other field is allowed; `__schema` and `__type` only exist on the query
/// root.
fn is_meta_field(ctx: &ValidatorContext<'_>, parent_type: &MetaType, field_name: &str) -> bool {
    match field_name {
        "__typename" => parent_type.is_composite(),
        "__schema" | "__type" => parent_type.name() == ctx.schema.query_type_name,
        _ => false,
    }
}

fn error_message(field_name: &str, type_name: &str) -> String {
    format!("Cannot query field \"{field_name}\" on \"{type_name}\".")
}
