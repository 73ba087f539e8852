//! Resolve parsed documents against a runtime schema.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, RwLock};
use std::thread;

use crossbeam_channel::{bounded, never, Receiver, Sender, TryRecvError};
use fnv::FnvHashMap;
use indexmap::IndexMap;

use crate::ast::{self, Definition, Document, OperationType};
use crate::parser::{SourcePosition, Spanning};
use crate::schema::meta::ObjectMeta;
use crate::schema::SchemaType;
use crate::value::{Resolved, Value};

mod collect;
mod complete;
mod dethunk;
mod input;
mod resolve;

pub use self::resolve::{
    default_resolve, Arguments, IsTypeOfParams, ResolveInfo, ResolveParams, ResolveTypeParams,
};

pub(crate) use self::collect::{collect_fields, CollectedFields};
pub(crate) use self::complete::PartialValue;
pub(crate) use self::dethunk::dethunk_with_breadth_first_search;
pub(crate) use self::input::{get_argument_values, get_variable_values};
pub(crate) use self::resolve::execute_sub_fields;

/// The map of variables used for substitution during query execution
pub type Variables = IndexMap<String, Value>;

/// Error type for errors that occur during field resolution
///
/// Field errors are represented by a human-readable error message and an
/// optional `Value` structure containing additional information.
///
/// They can be converted to from any type that implements `std::fmt::Display`,
/// which makes error chaining with the `?` operator a breeze:
///
/// ```rust
/// # use larch::FieldError;
/// fn get_string(data: Vec<u8>) -> Result<String, FieldError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Value,
}

impl<T: fmt::Display> From<T> for FieldError {
    fn from(e: T) -> FieldError {
        FieldError {
            message: e.to_string(),
            extensions: Value::Null,
        }
    }
}

impl FieldError {
    /// Construct a new error with additional data
    ///
    /// The `extensions` value is carried into the `"extensions"` field of the
    /// serialized error. Pass [`Value::Null`] to attach nothing.
    pub fn new<T: fmt::Display>(e: T, extensions: Value) -> FieldError {
        FieldError {
            message: e.to_string(),
            extensions,
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The additional data attached to the error, or [`Value::Null`].
    pub fn extensions(&self) -> &Value {
        &self.extensions
    }
}

/// The result of resolving the value of a field of type `T`
pub type FieldResult<T> = Result<T, FieldError>;

/// A single segment of the response path leading to a failed field
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    /// The response name of a field
    Field(String),
    /// An index into a list value
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Error type for errors that occur during query execution
///
/// All execution errors contain the source position in the query of the field
/// that failed to resolve, as well as the response path leading to it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl ExecutionError {
    #[doc(hidden)]
    pub fn new(
        location: SourcePosition,
        path: Vec<PathSegment>,
        error: FieldError,
    ) -> ExecutionError {
        ExecutionError {
            location,
            path,
            error,
        }
    }

    /// Construct a new execution error occurring at the beginning of the
    /// query
    pub fn at_origin(error: FieldError) -> ExecutionError {
        ExecutionError {
            location: SourcePosition::new_origin(),
            path: Vec::new(),
            error,
        }
    }

    /// The wrapped field error.
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The source location _in the query_ of the field that failed to resolve.
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The path of response keys leading to the field that generated this
    /// error.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

/// The response path under construction during execution
///
/// An immutable cons list; children share their ancestors. Only used for
/// locating errors, so keys are rendered to a plain vector on demand.
#[derive(Clone, Debug)]
pub(crate) enum FieldPath {
    Root,
    Key(String, Arc<FieldPath>),
    Index(usize, Arc<FieldPath>),
}

impl FieldPath {
    pub(crate) fn to_segments(&self) -> Vec<PathSegment> {
        let mut acc = Vec::new();
        self.construct_path(&mut acc);
        acc
    }

    fn construct_path(&self, acc: &mut Vec<PathSegment>) {
        match self {
            FieldPath::Root => (),
            FieldPath::Key(name, parent) => {
                parent.construct_path(acc);
                acc.push(PathSegment::Field(name.clone()));
            }
            FieldPath::Index(index, parent) => {
                parent.construct_path(acc);
                acc.push(PathSegment::Index(*index));
            }
        }
    }
}

/// Cancels the [`CancellationToken`] it was created together with
///
/// The token fires when [`cancel`](Canceller::cancel) is called or when the
/// canceller is dropped; dropping without a call leaves the token without a
/// reason.
#[derive(Debug)]
pub struct Canceller {
    _tx: Sender<std::convert::Infallible>,
    reason: Arc<OnceLock<String>>,
}

impl Canceller {
    /// Fire the paired token, recording the reason reported to clients.
    pub fn cancel(self, reason: impl Into<String>) {
        let _ = self.reason.set(reason.into());
        // Dropping the sender disconnects the channel, which is the signal
        // the token side observes.
    }
}

/// An ambient signal that the current request should be abandoned
///
/// Cloned tokens observe the same underlying signal. Resolvers and thunks
/// should observe the token cooperatively via
/// [`is_cancelled`](CancellationToken::is_cancelled); the execution driver
/// races it against the background worker and returns as soon as it fires.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    rx: Receiver<std::convert::Infallible>,
    reason: Arc<OnceLock<String>>,
}

impl CancellationToken {
    /// Create a token together with the canceller that fires it.
    pub fn new() -> (Canceller, CancellationToken) {
        let (tx, rx) = bounded(0);
        let reason = Arc::new(OnceLock::new());
        (
            Canceller {
                _tx: tx,
                reason: Arc::clone(&reason),
            },
            CancellationToken { rx, reason },
        )
    }

    /// A token that never fires.
    pub fn inert() -> CancellationToken {
        CancellationToken {
            rx: never(),
            reason: Arc::new(OnceLock::new()),
        }
    }

    /// Whether the token has fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// The reason the token fired with, if any.
    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }

    pub(crate) fn done(&self) -> &Receiver<std::convert::Infallible> {
        &self.rx
    }
}

impl Default for CancellationToken {
    fn default() -> CancellationToken {
        CancellationToken::inert()
    }
}

/// Per-request ambient state handed to every resolve delegate
///
/// Carries the cancellation token and an optional blob of opaque
/// application data.
#[derive(Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// A context with an inert token and no data.
    pub fn new() -> RequestContext {
        RequestContext::default()
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_token(mut self, token: CancellationToken) -> RequestContext {
        self.token = token;
        self
    }

    /// Attach application data resolvers can downcast to.
    #[must_use]
    pub fn with_data<T: Any + Send + Sync>(mut self, data: T) -> RequestContext {
        self.data = Some(Arc::new(data));
        self
    }

    /// The cancellation token of this request.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The attached application data, if it is of type `T`.
    pub fn data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|d| d.downcast_ref())
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Everything needed to execute one operation
pub struct ExecuteParams {
    /// The schema to execute against.
    pub schema: Arc<SchemaType>,
    /// The parsed, validated document containing the operation.
    pub document: Arc<Document>,
    /// The root value handed to top-level resolvers.
    pub root: Resolved,
    /// Which operation of the document to run; required when the document
    /// contains more than one.
    pub operation_name: Option<String>,
    /// Raw variable values, coerced against the operation's declarations
    /// before any field runs.
    pub variables: Variables,
    /// Ambient request state (cancellation, application data).
    pub context: RequestContext,
}

impl ExecuteParams {
    /// Parameters with a null root, no variables and an inert context.
    pub fn new(schema: Arc<SchemaType>, document: Arc<Document>) -> ExecuteParams {
        ExecuteParams {
            schema,
            document,
            root: Resolved::Null,
            operation_name: None,
            variables: Variables::new(),
            context: RequestContext::new(),
        }
    }
}

/// The outcome of executing an operation: the response data shaped by the
/// selection set, plus every field error captured along the way
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    /// The data produced by the operation. Null when execution failed before
    /// any field ran, was cancelled, or a non-null violation reached the
    /// root.
    pub data: Value,
    /// Captured errors, in the order completion discovered them.
    pub errors: Vec<ExecutionError>,
}

impl Response {
    /// Whether execution produced no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub(crate) struct ExecutionContext<'a> {
    pub(crate) schema: &'a Arc<SchemaType>,
    pub(crate) fragments: FnvHashMap<&'a str, &'a Spanning<ast::Fragment>>,
    pub(crate) root: &'a Resolved,
    pub(crate) operation: &'a Spanning<ast::Operation>,
    pub(crate) variables: Variables,
    pub(crate) errors: RwLock<Vec<ExecutionError>>,
    pub(crate) request: &'a RequestContext,
}

impl<'a> ExecutionContext<'a> {
    /// Append an error to the execution's error list.
    pub(crate) fn push_error(&self, error: ExecutionError) {
        self.errors
            .write()
            .expect("error sink lock poisoned")
            .push(error);
    }
}

/// Execute an operation of a parsed document against a schema.
///
/// The request runs on a background worker; if the context's cancellation
/// token fires before the worker finishes, the call returns promptly with a
/// single error carrying the cancellation reason and any in-flight resolver
/// output is discarded.
///
/// This function always produces a [`Response`]: parse-level problems are
/// not its concern and every execution-level failure is reported through the
/// response's error list.
pub fn execute(params: ExecuteParams) -> Response {
    let token = params.context.token().clone();

    let (tx, rx) = bounded::<Response>(1);
    let worker = thread::Builder::new()
        .name("larch-executor".into())
        .spawn(move || {
            let response = match panic::catch_unwind(AssertUnwindSafe(|| execute_request(&params)))
            {
                Ok(response) => response,
                Err(payload) => Response {
                    data: Value::Null,
                    errors: vec![ExecutionError::at_origin(FieldError::from(panic_message(
                        &payload,
                    )))],
                },
            };
            let _ = tx.send(response);
        });

    if worker.is_err() {
        return Response {
            data: Value::Null,
            errors: vec![ExecutionError::at_origin(FieldError::from(
                "failed to spawn execution worker",
            ))],
        };
    }

    crossbeam_channel::select! {
        recv(rx) -> response => response.unwrap_or_else(|_| Response {
            data: Value::Null,
            errors: vec![ExecutionError::at_origin(FieldError::from(
                "execution worker disappeared",
            ))],
        }),
        recv(token.done()) -> _ => {
            let reason = token.reason().unwrap_or("execution cancelled").to_owned();
            tracing::debug!(%reason, "request cancelled before completion");
            Response {
                data: Value::Null,
                errors: vec![ExecutionError::at_origin(FieldError::from(reason))],
            }
        }
    }
}

fn execute_request(params: &ExecuteParams) -> Response {
    let ctx = match build_execution_context(params) {
        Ok(ctx) => ctx,
        Err(error) => {
            return Response {
                data: Value::Null,
                errors: vec![error],
            }
        }
    };

    tracing::debug!(
        operation = %ctx.operation.item.operation_type,
        name = ctx.operation.item.name.as_ref().map(|n| n.item.as_str()),
        "executing operation"
    );

    let data = execute_operation(&ctx);

    let mut errors = ctx
        .errors
        .into_inner()
        .expect("error sink lock poisoned");

    match data {
        Ok(data) => Response { data, errors },
        Err(error) => {
            errors.push(error);
            Response {
                data: Value::Null,
                errors,
            }
        }
    }
}

fn build_execution_context(params: &ExecuteParams) -> Result<ExecutionContext<'_>, ExecutionError> {
    let mut operation = None;
    let mut fragments = FnvHashMap::default();

    for definition in params.document.iter() {
        match definition {
            Definition::Operation(op) => {
                if params.operation_name.is_none() && operation.is_some() {
                    return Err(ExecutionError::at_origin(FieldError::from(
                        "Must provide operation name if query contains multiple operations.",
                    )));
                }
                let matches = match &params.operation_name {
                    None => true,
                    Some(name) => op
                        .item
                        .name
                        .as_ref()
                        .is_some_and(|n| n.item == *name),
                };
                if matches {
                    operation = Some(op);
                }
            }
            Definition::Fragment(fragment) => {
                fragments.insert(fragment.item.name.item.as_str(), fragment);
            }
        }
    }

    let operation = match operation {
        Some(op) => op,
        None => {
            return Err(ExecutionError::at_origin(FieldError::from(
                match &params.operation_name {
                    Some(name) => format!("Unknown operation named \"{name}\"."),
                    None => "Must provide an operation.".to_owned(),
                },
            )))
        }
    };

    let variables = get_variable_values(
        &params.schema,
        operation.item.variable_definitions.as_ref(),
        &params.variables,
    )?;

    Ok(ExecutionContext {
        schema: &params.schema,
        fragments,
        root: &params.root,
        operation,
        variables,
        errors: RwLock::new(Vec::new()),
        request: &params.context,
    })
}

fn execute_operation<'a>(ctx: &'a ExecutionContext<'a>) -> Result<Value, ExecutionError> {
    let operation = &ctx.operation.item;
    let root_type = get_operation_root_type(ctx)?;

    let mut fields = CollectedFields::default();
    let mut visited_fragment_names = fnv::FnvHashSet::default();
    collect_fields(
        ctx,
        root_type,
        &operation.selection_set,
        &mut fields,
        &mut visited_fragment_names,
    );

    let path = Arc::new(FieldPath::Root);

    match operation.operation_type {
        OperationType::Mutation => execute_fields_serially(ctx, root_type, fields, &path),
        _ => execute_fields(ctx, root_type, fields, &path),
    }
}

fn get_operation_root_type<'a>(
    ctx: &'a ExecutionContext<'a>,
) -> Result<&'a ObjectMeta, ExecutionError> {
    let at_operation = |message: &str| {
        ExecutionError::new(
            ctx.operation.start,
            Vec::new(),
            FieldError::from(message),
        )
    };

    match ctx.operation.item.operation_type {
        OperationType::Query => Ok(ctx.schema.query_type()),
        OperationType::Mutation => ctx
            .schema
            .mutation_type()
            .ok_or_else(|| at_operation("Schema is not configured for mutations")),
        OperationType::Subscription => ctx
            .schema
            .subscription_type()
            .ok_or_else(|| at_operation("Schema is not configured for subscriptions")),
    }
}

/// Evaluates the top-level selection set of a mutation: fields strictly in
/// document order, each field's resolver finishing before the next starts.
/// Deferred values accumulate and are flushed once at the end.
fn execute_fields_serially<'a>(
    ctx: &'a ExecutionContext<'a>,
    parent_type: &'a ObjectMeta,
    fields: CollectedFields<'a>,
    path: &Arc<FieldPath>,
) -> Result<Value, ExecutionError> {
    let mut results = execute_sub_fields(ctx, parent_type, ctx.root, fields, path)?;
    dethunk_with_breadth_first_search(&mut results)?;
    Ok(complete::partial_map_into_value(results))
}

/// Evaluates the top-level selection set of a query or subscription. Fields
/// may be evaluated in any order; this implementation keeps document order
/// and leaves concurrency to the thunk layer.
fn execute_fields<'a>(
    ctx: &'a ExecutionContext<'a>,
    parent_type: &'a ObjectMeta,
    fields: CollectedFields<'a>,
    path: &Arc<FieldPath>,
) -> Result<Value, ExecutionError> {
    let mut results = execute_sub_fields(ctx, parent_type, ctx.root, fields, path)?;
    dethunk_with_breadth_first_search(&mut results)?;
    Ok(complete::partial_map_into_value(results))
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "resolver panicked".to_owned()
    }
}
