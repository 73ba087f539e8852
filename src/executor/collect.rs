//! Field collection: flattening a selection set into an ordered map of
//! response names.

use fnv::FnvHashSet;
use indexmap::IndexMap;

use crate::ast::{self, Selection};
use crate::executor::{get_argument_values, ExecutionContext};
use crate::parser::Spanning;
use crate::schema::meta::{MetaType, ObjectMeta};
use crate::value::Value;

/// The ordered result of collecting a selection set: response name to the
/// list of field nodes sharing it. The lists are merged during sub-selection.
pub(crate) type CollectedFields<'a> = IndexMap<String, Vec<&'a Spanning<ast::Field>>>;

/// Add all fields of a selection set to `fields`, honoring `@skip` and
/// `@include` and fragment type conditions.
///
/// Collection requires the runtime type of the surrounding object: for a
/// field returning an interface or union, that is the concrete object type
/// determined at resolve time.
pub(crate) fn collect_fields<'a>(
    ctx: &ExecutionContext<'a>,
    runtime_type: &ObjectMeta,
    selection_set: &'a [Selection],
    fields: &mut CollectedFields<'a>,
    visited_fragment_names: &mut FnvHashSet<&'a str>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(field) => {
                if !should_include_node(ctx, &field.item.directives) {
                    continue;
                }
                fields
                    .entry(field.item.response_name().to_owned())
                    .or_default()
                    .push(field);
            }
            Selection::InlineFragment(fragment) => {
                if !should_include_node(ctx, &fragment.item.directives)
                    || !does_fragment_condition_match(
                        ctx,
                        fragment.item.type_condition.as_ref().map(|c| c.item.as_str()),
                        runtime_type,
                    )
                {
                    continue;
                }
                collect_fields(
                    ctx,
                    runtime_type,
                    &fragment.item.selection_set,
                    fields,
                    visited_fragment_names,
                );
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.item.name.item.as_str();
                if visited_fragment_names.contains(name)
                    || !should_include_node(ctx, &spread.item.directives)
                {
                    continue;
                }
                visited_fragment_names.insert(name);

                let Some(fragment) = ctx.fragments.get(name).copied() else {
                    continue;
                };
                if !does_fragment_condition_match(
                    ctx,
                    Some(&fragment.item.type_condition.item),
                    runtime_type,
                ) {
                    continue;
                }
                collect_fields(
                    ctx,
                    runtime_type,
                    &fragment.item.selection_set,
                    fields,
                    visited_fragment_names,
                );
            }
        }
    }
}

/// Determines if a selection should be included based on the `@skip` and
/// `@include` directives, where `@skip` has higher precedence.
pub(crate) fn should_include_node(
    ctx: &ExecutionContext<'_>,
    directives: &Option<Vec<Spanning<ast::Directive>>>,
) -> bool {
    let Some(directives) = directives else {
        return true;
    };

    let mut skip_ast = None;
    let mut include_ast = None;
    for directive in directives {
        match directive.item.name.item.as_str() {
            "skip" => skip_ast = Some(directive),
            "include" => include_ast = Some(directive),
            _ => {}
        }
    }

    if let (Some(directive), Some(definition)) = (skip_ast, ctx.schema.directive_by_name("skip")) {
        let args = get_argument_values(
            ctx.schema,
            Some(definition.arguments.as_slice()),
            directive.item.arguments.as_ref(),
            &ctx.variables,
        );
        if matches!(args.get("if"), Some(Value::Boolean(true))) {
            return false;
        }
    }

    if let (Some(directive), Some(definition)) =
        (include_ast, ctx.schema.directive_by_name("include"))
    {
        let args = get_argument_values(
            ctx.schema,
            Some(definition.arguments.as_slice()),
            directive.item.arguments.as_ref(),
            &ctx.variables,
        );
        if matches!(args.get("if"), Some(Value::Boolean(false))) {
            return false;
        }
    }

    true
}

/// Determines if a fragment condition applies to the given runtime type.
///
/// A fragment matches when it has no condition, when the condition names the
/// runtime type itself, or when it names an abstract type the runtime type
/// is a possible type of.
fn does_fragment_condition_match(
    ctx: &ExecutionContext<'_>,
    type_condition: Option<&str>,
    runtime_type: &ObjectMeta,
) -> bool {
    let Some(condition) = type_condition else {
        return true;
    };

    if condition == runtime_type.name {
        return true;
    }

    match ctx.schema.concrete_type_by_name(condition) {
        Some(conditional @ (MetaType::Interface(..) | MetaType::Union(..))) => {
            ctx.schema.is_possible_type(conditional, runtime_type)
        }
        _ => false,
    }
}
