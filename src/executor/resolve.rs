//! Per-field resolution: definition lookup, argument assembly and delegate
//! invocation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use fnv::FnvHashMap;
use indexmap::IndexMap;

use crate::ast::{self, Type};
use crate::executor::complete::{
    complete_value_catching_error, handle_field_error, located_error, FieldAsts, PartialValue,
};
use crate::executor::{
    get_argument_values, panic_message, ExecutionContext, ExecutionError, FieldError, FieldPath,
    FieldResult, RequestContext, Variables,
};
use crate::parser::Spanning;
use crate::schema::meta::{Field, ObjectMeta};
use crate::schema::SchemaType;
use crate::value::{Resolved, Value};

use super::collect::CollectedFields;

/// Coerced argument values for one field or directive invocation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    values: IndexMap<String, Value>,
}

impl Arguments {
    pub(crate) fn new(values: IndexMap<String, Value>) -> Arguments {
        Arguments { values }
    }

    /// The coerced value of the named argument, if provided or defaulted.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The named argument as a boolean, if it is one.
    pub fn get_boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_boolean_value)
    }

    /// The named argument as an integer, if it is one.
    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(Value::as_int_value)
    }

    /// The named argument as a string slice, if it is one.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_string_value)
    }

    /// Iterate over all provided arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Whether no argument value was provided or defaulted.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Static information about the field currently being resolved
#[derive(Clone)]
pub struct ResolveInfo<'a> {
    /// The name of the field in the schema (not its response name).
    pub field_name: &'a str,
    /// The merged field nodes sharing this response name.
    pub field_asts: FieldAsts<'a>,
    /// The declared output type of the field.
    pub return_type: &'a Type,
    /// The object type the field was selected on.
    pub parent_type: &'a ObjectMeta,
    /// The schema being executed.
    pub schema: &'a Arc<SchemaType>,
    /// The fragments of the executed document, by name.
    pub fragments: &'a FnvHashMap<&'a str, &'a Spanning<ast::Fragment>>,
    /// The root value of the execution.
    pub root_value: &'a Resolved,
    /// The operation being executed.
    pub operation: &'a Spanning<ast::Operation>,
    /// The coerced variable values of the request.
    pub variable_values: &'a Variables,
}

/// Everything a resolve delegate receives
pub struct ResolveParams<'a> {
    /// The value of the surrounding object.
    pub source: &'a Resolved,
    /// Coerced argument values, with defaults substituted.
    pub args: Arguments,
    /// Static information about the resolved field.
    pub info: &'a ResolveInfo<'a>,
    /// Ambient request state.
    pub context: &'a RequestContext,
}

/// Input to an object type's `is_type_of` predicate
pub struct IsTypeOfParams<'a> {
    /// The value being tested.
    pub value: &'a Resolved,
    /// Static information about the field that produced the value.
    pub info: &'a ResolveInfo<'a>,
    /// Ambient request state.
    pub context: &'a RequestContext,
}

/// Input to an abstract type's `resolve_type` delegate
pub struct ResolveTypeParams<'a> {
    /// The value whose runtime type is being determined.
    pub value: &'a Resolved,
    /// Static information about the field that produced the value.
    pub info: &'a ResolveInfo<'a>,
    /// Ambient request state.
    pub context: &'a RequestContext,
}

/// Resolve every collected field of one selection set against `source`,
/// producing the (possibly deferred) response map.
///
/// Fields without a definition are omitted from the map. An error return is
/// a non-null violation on its way to the nearest nullable ancestor.
pub(crate) fn execute_sub_fields<'a>(
    ctx: &'a ExecutionContext<'a>,
    parent_type: &'a ObjectMeta,
    source: &Resolved,
    fields: CollectedFields<'a>,
    path: &Arc<FieldPath>,
) -> Result<IndexMap<String, PartialValue<'a>>, ExecutionError> {
    let mut results = IndexMap::with_capacity(fields.len());

    for (response_name, field_asts) in fields {
        let field_path = Arc::new(FieldPath::Key(response_name.clone(), Arc::clone(path)));
        if let Some(value) =
            resolve_field(ctx, parent_type, source, Arc::new(field_asts), &field_path)?
        {
            results.insert(response_name, value);
        }
    }

    Ok(results)
}

/// Resolve one field on the given source value: look up its definition,
/// assemble arguments, invoke the resolve delegate and drive completion.
///
/// Returns `Ok(None)` when the field has no definition, in which case the
/// caller omits the response key entirely.
pub(crate) fn resolve_field<'a>(
    ctx: &'a ExecutionContext<'a>,
    parent_type: &'a ObjectMeta,
    source: &Resolved,
    field_asts: FieldAsts<'a>,
    path: &Arc<FieldPath>,
) -> Result<Option<PartialValue<'a>>, ExecutionError> {
    let field_ast = field_asts[0];
    let field_name = field_ast.item.name.item.as_str();

    let Some(field_def) = get_field_def(ctx.schema, parent_type, field_name) else {
        return Ok(None);
    };

    let return_type = ctx.schema.make_type(&field_def.field_type);
    let resolve_fn = field_def.resolve.clone();

    // TODO: memoize per field node and variable set; fields inside lists
    // re-coerce identical arguments for every element.
    let args = get_argument_values(
        ctx.schema,
        field_def.arguments.as_deref(),
        field_ast.item.arguments.as_ref(),
        &ctx.variables,
    );

    let info = ResolveInfo {
        field_name,
        field_asts: Arc::clone(&field_asts),
        return_type: &field_def.field_type,
        parent_type,
        schema: ctx.schema,
        fragments: &ctx.fragments,
        root_value: ctx.root,
        operation: ctx.operation,
        variable_values: &ctx.variables,
    };

    let params = ResolveParams {
        source,
        args,
        info: &info,
        context: ctx.request,
    };

    let result = match resolve_fn {
        Some(f) => invoke_resolver(move || f(params)),
        None => invoke_resolver(move || default_resolve(params)),
    };

    let resolved = match result {
        Ok(resolved) => resolved,
        Err(error) => {
            let located = located_error(error, &field_asts, path);
            return handle_field_error(ctx, located, &return_type).map(Some);
        }
    };

    complete_value_catching_error(ctx, &return_type, &field_asts, &info, path, resolved).map(Some)
}

/// Run a resolve delegate with the field-boundary abort catcher: a panic in
/// user code becomes an ordinary field error.
pub(crate) fn invoke_resolver<F>(f: F) -> FieldResult<Resolved>
where
    F: FnOnce() -> FieldResult<Resolved>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(FieldError::from(panic_message(payload.as_ref()))),
    }
}

/// Look up a field definition on the given type.
///
/// `__schema` and `__type` only exist on the query root; `__typename` can be
/// queried on any object. Everything else comes from the type itself.
pub(crate) fn get_field_def<'s>(
    schema: &'s SchemaType,
    parent_type: &ObjectMeta,
    field_name: &str,
) -> Option<&'s Field> {
    let meta = &schema.meta_fields;

    if field_name == meta.schema_field.name && schema.query_type_name == parent_type.name {
        return Some(&meta.schema_field);
    }
    if field_name == meta.type_field.name && schema.query_type_name == parent_type.name {
        return Some(&meta.type_field);
    }
    if field_name == meta.typename_field.name {
        return Some(&meta.typename_field);
    }

    schema
        .object_by_name(&parent_type.name)
        .and_then(|t| t.field_by_name(field_name))
}

/// The resolver used for fields without a resolve delegate.
///
/// Sources with a custom [`FieldResolver`](crate::FieldResolver) capability
/// resolve through it. A plain map resolves to the member stored under
/// exactly the field name; a serialized record additionally accepts a
/// case-insensitive member name match, so serde rename tags and differing
/// casings line up. Member thunks are invoked in place. Everything else
/// resolves to null.
pub fn default_resolve(params: ResolveParams<'_>) -> FieldResult<Resolved> {
    match params.source {
        Resolved::Delegate(delegate) => delegate.resolve_field(params),
        Resolved::Map(map) => Ok(member_value(map.get(params.info.field_name))),
        Resolved::Record(record) => {
            let field_name = params.info.field_name;
            let member = record.get(field_name).or_else(|| {
                record
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(field_name))
                    .map(|(_, value)| value)
            });
            Ok(member_value(member))
        }
        _ => Ok(Resolved::Null),
    }
}

fn member_value(member: Option<&Resolved>) -> Resolved {
    match member {
        Some(Resolved::Thunk(producer)) => producer(),
        Some(value) => value.clone(),
        None => Resolved::Null,
    }
}
