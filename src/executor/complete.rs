//! Type-directed completion of resolver output into the response shape.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast;
use crate::executor::resolve::{IsTypeOfParams, ResolveInfo, ResolveTypeParams};
use crate::executor::{
    collect_fields, execute_sub_fields, panic_message, ExecutionContext, ExecutionError,
    FieldError, FieldPath,
};
use crate::parser::Spanning;
use crate::schema::meta::{EnumMeta, MetaType, ObjectMeta, ScalarMeta};
use crate::schema::TypeType;
use crate::value::{Object, Resolved, ThunkFn, Value};

use super::collect::CollectedFields;

/// The merged field nodes backing one response name, shared between the
/// resolver frame and any deferred completions it spawns.
pub(crate) type FieldAsts<'a> = Arc<Vec<&'a Spanning<ast::Field>>>;

/// A node of the in-progress response tree.
///
/// Completion produces this instead of a plain [`Value`] because thunked
/// resolver output leaves deferred slots behind; the dethunk scheduler
/// flushes them before the tree is turned into the final response value.
pub(crate) enum PartialValue<'a> {
    /// A fully completed subtree.
    Done(Value),
    /// A list whose elements may still contain deferred slots.
    List(Vec<PartialValue<'a>>),
    /// An object whose members may still contain deferred slots.
    Object(IndexMap<String, PartialValue<'a>>),
    /// A deferred completion, run when the dethunk scheduler reaches it.
    Deferred(DeferredValue<'a>),
}

/// A queued completion; an error return is a non-null violation that could
/// not be absorbed inside the deferred subtree.
pub(crate) type DeferredValue<'a> =
    Box<dyn FnOnce() -> Result<PartialValue<'a>, ExecutionError> + 'a>;

impl<'a> PartialValue<'a> {
    pub(crate) fn is_null(&self) -> bool {
        matches!(self, PartialValue::Done(Value::Null))
    }

    /// Convert the completed tree into a response value.
    ///
    /// All deferred slots have been flushed by the dethunk scheduler by the
    /// time this runs.
    pub(crate) fn into_value(self) -> Value {
        match self {
            PartialValue::Done(value) => value,
            PartialValue::List(items) => {
                Value::List(items.into_iter().map(PartialValue::into_value).collect())
            }
            PartialValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, v.into_value()))
                    .collect::<Object>(),
            ),
            PartialValue::Deferred(_) => Value::Null,
        }
    }
}

pub(crate) fn partial_map_into_value(map: IndexMap<String, PartialValue<'_>>) -> Value {
    Value::Object(
        map.into_iter()
            .map(|(k, v)| (k, v.into_value()))
            .collect::<Object>(),
    )
}

/// Locate a field error at the field's first node and the current path.
pub(crate) fn located_error(
    error: FieldError,
    field_asts: &FieldAsts<'_>,
    path: &Arc<FieldPath>,
) -> ExecutionError {
    ExecutionError::new(field_asts[0].start, path.to_segments(), error)
}

/// The shared error boundary of field resolution and value completion.
///
/// A located error reaching a non-null position is re-raised so the null can
/// bubble further; a nullable position absorbs it, records it once and
/// produces null.
pub(crate) fn handle_field_error<'a>(
    ctx: &'a ExecutionContext<'a>,
    error: ExecutionError,
    return_type: &TypeType<'a>,
) -> Result<PartialValue<'a>, ExecutionError> {
    if return_type.is_non_null() {
        return Err(error);
    }
    ctx.push_error(error);
    Ok(PartialValue::Done(Value::Null))
}

/// Complete a value, absorbing any error the completion produced unless the
/// field's type requires the null to bubble further.
pub(crate) fn complete_value_catching_error<'a>(
    ctx: &'a ExecutionContext<'a>,
    return_type: &TypeType<'a>,
    field_asts: &FieldAsts<'a>,
    info: &ResolveInfo<'a>,
    path: &Arc<FieldPath>,
    result: Resolved,
) -> Result<PartialValue<'a>, ExecutionError> {
    match complete_value(ctx, return_type, field_asts, info, path, result) {
        Ok(completed) => Ok(completed),
        Err(error) => handle_field_error(ctx, error, return_type),
    }
}

fn complete_value<'a>(
    ctx: &'a ExecutionContext<'a>,
    return_type: &TypeType<'a>,
    field_asts: &FieldAsts<'a>,
    info: &ResolveInfo<'a>,
    path: &Arc<FieldPath>,
    result: Resolved,
) -> Result<PartialValue<'a>, ExecutionError> {
    // A thunk defers the whole completion, including any non-null handling:
    // the produced value is completed against the same return type when the
    // dethunk scheduler invokes the slot.
    let result = match result {
        Resolved::Thunk(producer) => {
            let return_type = return_type.clone();
            let field_asts = Arc::clone(field_asts);
            let info = info.clone();
            let path = Arc::clone(path);
            return Ok(PartialValue::Deferred(Box::new(move || {
                complete_thunk_value(ctx, &return_type, &field_asts, &info, &path, producer)
            })));
        }
        other => other,
    };

    if let TypeType::NonNull(inner) = return_type {
        let completed = complete_value(ctx, inner, field_asts, info, path, result)?;
        if completed.is_null() {
            return Err(located_error(
                FieldError::from(format!(
                    "Cannot return null for non-nullable field {}.{}.",
                    info.parent_type.name, info.field_name,
                )),
                field_asts,
                path,
            ));
        }
        return Ok(completed);
    }

    if result.is_nullish() {
        return Ok(PartialValue::Done(Value::Null));
    }

    match return_type {
        TypeType::List(inner) => {
            complete_list_value(ctx, inner, field_asts, info, path, result)
        }
        TypeType::Concrete(meta) => {
            let meta: &'a MetaType = *meta;
            match meta {
                MetaType::Scalar(scalar) => Ok(complete_leaf_value(scalar, &result)),
                MetaType::Enum(enum_meta) => Ok(complete_enum_value(enum_meta, &result)),
                MetaType::Union(..) | MetaType::Interface(..) => {
                    complete_abstract_value(ctx, meta, field_asts, info, path, result)
                }
                MetaType::Object(object) => {
                    complete_object_value(ctx, object, field_asts, info, path, result)
                }
                MetaType::InputObject(..) => Err(located_error(
                    FieldError::from(format!(
                        "Cannot complete value of unexpected type \"{}\".",
                        meta.name(),
                    )),
                    field_asts,
                    path,
                )),
            }
        }
        TypeType::NonNull(_) => unreachable!("handled above"),
    }
}

/// Invoke a deferred producer and complete what it yields, with the same
/// error boundary a regular completion has.
fn complete_thunk_value<'a>(
    ctx: &'a ExecutionContext<'a>,
    return_type: &TypeType<'a>,
    field_asts: &FieldAsts<'a>,
    info: &ResolveInfo<'a>,
    path: &Arc<FieldPath>,
    producer: Arc<ThunkFn>,
) -> Result<PartialValue<'a>, ExecutionError> {
    let produced = match panic::catch_unwind(AssertUnwindSafe(|| producer())) {
        Ok(produced) => produced,
        Err(payload) => {
            let error = located_error(
                FieldError::from(panic_message(payload.as_ref())),
                field_asts,
                path,
            );
            return handle_field_error(ctx, error, return_type);
        }
    };

    match complete_value(ctx, return_type, field_asts, info, path, produced) {
        Ok(completed) => Ok(completed),
        Err(error) => handle_field_error(ctx, error, return_type),
    }
}

/// Complete a leaf value by serializing it, producing null when the value
/// cannot be represented.
fn complete_leaf_value<'a>(scalar: &ScalarMeta, result: &Resolved) -> PartialValue<'a> {
    PartialValue::Done((scalar.serialize)(result).unwrap_or(Value::Null))
}

fn complete_enum_value<'a>(enum_meta: &EnumMeta, result: &Resolved) -> PartialValue<'a> {
    PartialValue::Done(enum_meta.serialize(result).unwrap_or(Value::Null))
}

/// Complete a list value by completing each element against the item type,
/// extending the path with the element index.
fn complete_list_value<'a>(
    ctx: &'a ExecutionContext<'a>,
    item_type: &TypeType<'a>,
    field_asts: &FieldAsts<'a>,
    info: &ResolveInfo<'a>,
    path: &Arc<FieldPath>,
    result: Resolved,
) -> Result<PartialValue<'a>, ExecutionError> {
    let items = match result {
        Resolved::List(items) => items,
        _ => {
            return Err(located_error(
                FieldError::from(format!(
                    "User Error: expected iterable, but did not find one for field {}.{}.",
                    info.parent_type.name, info.field_name,
                )),
                field_asts,
                path,
            ))
        }
    };

    let mut completed = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let item_path = Arc::new(FieldPath::Index(index, Arc::clone(path)));
        completed.push(complete_value_catching_error(
            ctx, item_type, field_asts, info, &item_path, item,
        )?);
    }

    Ok(PartialValue::List(completed))
}

/// Complete a value of an abstract type by determining the runtime object
/// type of the value, then completing for that type.
fn complete_abstract_value<'a>(
    ctx: &'a ExecutionContext<'a>,
    abstract_type: &'a MetaType,
    field_asts: &FieldAsts<'a>,
    info: &ResolveInfo<'a>,
    path: &Arc<FieldPath>,
    result: Resolved,
) -> Result<PartialValue<'a>, ExecutionError> {
    let resolve_type = match abstract_type {
        MetaType::Union(union) => union.resolve_type.clone(),
        MetaType::Interface(interface) => interface.resolve_type.clone(),
        _ => None,
    };

    let runtime_type_name = match resolve_type {
        Some(f) => f(ResolveTypeParams {
            value: &result,
            info,
            context: ctx.request,
        }),
        None => default_resolve_type(ctx, abstract_type, &result, info),
    };

    let runtime_type = runtime_type_name
        .as_deref()
        .and_then(|name| ctx.schema.object_by_name(name));

    let Some(runtime_type) = runtime_type else {
        return Err(located_error(
            FieldError::from(format!(
                "Abstract type {} must resolve to an Object type at runtime for field {}.{}.",
                abstract_type.name(),
                info.parent_type.name,
                info.field_name,
            )),
            field_asts,
            path,
        ));
    };

    if !ctx.schema.is_possible_type(abstract_type, runtime_type) {
        return Err(located_error(
            FieldError::from(format!(
                "Runtime Object type \"{}\" is not a possible type for \"{}\".",
                runtime_type.name,
                abstract_type.name(),
            )),
            field_asts,
            path,
        ));
    }

    complete_object_value(ctx, runtime_type, field_asts, info, path, result)
}

/// The default runtime type resolution: the first possible type whose
/// `is_type_of` predicate accepts the value.
fn default_resolve_type<'a>(
    ctx: &'a ExecutionContext<'a>,
    abstract_type: &MetaType,
    value: &Resolved,
    info: &ResolveInfo<'a>,
) -> Option<String> {
    ctx.schema
        .possible_types(abstract_type)
        .into_iter()
        .find(|possible| {
            possible.is_type_of.as_ref().is_some_and(|pred| {
                pred(IsTypeOfParams {
                    value,
                    info,
                    context: ctx.request,
                })
            })
        })
        .map(|possible| possible.name.clone())
}

/// Complete an object value by collecting and executing its sub-selections.
pub(crate) fn complete_object_value<'a>(
    ctx: &'a ExecutionContext<'a>,
    return_type: &'a ObjectMeta,
    field_asts: &FieldAsts<'a>,
    info: &ResolveInfo<'a>,
    path: &Arc<FieldPath>,
    result: Resolved,
) -> Result<PartialValue<'a>, ExecutionError> {
    if let Some(predicate) = &return_type.is_type_of {
        let accepted = predicate(IsTypeOfParams {
            value: &result,
            info,
            context: ctx.request,
        });
        if !accepted {
            return Err(located_error(
                FieldError::from(format!(
                    "Expected value of type \"{}\" but got: {:?}.",
                    return_type.name, result,
                )),
                field_asts,
                path,
            ));
        }
    }

    // All merged field nodes contribute sub-selections into one shared
    // accumulator, with one shared visited set for fragment spreads.
    let mut sub_fields = CollectedFields::default();
    let mut visited_fragment_names = fnv::FnvHashSet::default();
    for &field_ast in field_asts.iter() {
        if let Some(selection_set) = &field_ast.item.selection_set {
            collect_fields(
                ctx,
                return_type,
                selection_set,
                &mut sub_fields,
                &mut visited_fragment_names,
            );
        }
    }

    execute_sub_fields(ctx, return_type, &result, sub_fields, path).map(PartialValue::Object)
}
