/*!

# larch

`larch` is a schema-driven GraphQL execution engine for Rust. Unlike
compile-time schema libraries, the schema here is plain runtime data: object
types are built as values, resolvers are closures attached to field
definitions, and the executor walks a parsed operation document against the
resulting type table.

The engine covers the execution core of a GraphQL server:

* a parser for executable documents,
* a validation pass built from composable rule visitors,
* a tree-directed executor with `@skip`/`@include` handling, fragment
  merging, abstract-type dispatch and per-type value completion,
* null propagation for non-null positions,
* a deferred-evaluation layer: resolvers may return a thunk instead of a
  value, and all thunks are flushed in breadth-first order after the rest of
  the selection set has been resolved,
* request-level cancellation through an ambient token.

`larch` does not include a transport; it provides the building blocks to put
behind whatever server the application already runs.

## Getting started

```rust
use std::sync::Arc;

use larch::meta::{Field, ObjectMeta};
use larch::{
    execute, parse_document_source, validate, ExecuteParams, Resolved, SchemaType, Type,
};

let schema = Arc::new(
    SchemaType::build()
        .query(ObjectMeta::new(
            "Query",
            vec![Field::new("hello", Type::named("String"))
                .resolve(|_| Ok(Resolved::string("world")))],
        ))
        .finish()
        .expect("schema is consistent"),
);

let document = Arc::new(parse_document_source("{ hello }").expect("query parses"));
assert!(validate(&schema, &document).is_empty());

let response = execute(ExecuteParams::new(Arc::clone(&schema), document));
assert!(response.is_ok());
assert_eq!(response.data, larch::graphql_value!({"hello": "world"}));
```

*/
#![warn(missing_docs)]

use std::fmt;
use std::sync::Arc;

#[macro_use]
mod value;

mod ast;
mod executor;
mod introspection;
pub mod parser;
pub mod schema;
mod validation;
// This needs to be public until docs have support for private modules:
// https://github.com/rust-lang/cargo/issues/1520
pub mod integrations;

#[cfg(test)]
mod executor_tests;

use crate::parser::{ParseError, Spanning};

pub use crate::ast::{Document, InputValue, OperationType, Selection, Type};
pub use crate::executor::{
    default_resolve, execute, Arguments, CancellationToken, Canceller, ExecuteParams,
    ExecutionError, FieldError, FieldResult, IsTypeOfParams, PathSegment, RequestContext,
    ResolveInfo, ResolveParams, ResolveTypeParams, Response, Variables,
};
pub use crate::parser::parse_document_source;
pub use crate::schema::{
    meta, DirectiveLocation, DirectiveType, SchemaBuilder, SchemaError, SchemaType, TypeType,
};
pub use crate::validation::{
    visit, visit_all_rules, MultiVisitorCons, MultiVisitorNil, RuleError, ValidatorContext,
    Visitor,
};
pub use crate::value::{FieldResolver, Object, Resolved, ThunkFn, Value};

/// An error that prevented query execution from starting
#[derive(Debug, PartialEq)]
#[allow(missing_docs)]
pub enum GraphQLError {
    ParseError(Spanning<ParseError>),
    ValidationError(Vec<RuleError>),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GraphQLError::ParseError(error) => write!(f, "{error}"),
            GraphQLError::ValidationError(errors) => {
                for error in errors {
                    writeln!(f, "{error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl From<Spanning<ParseError>> for GraphQLError {
    fn from(f: Spanning<ParseError>) -> GraphQLError {
        GraphQLError::ParseError(f)
    }
}

/// Validate a parsed document against a schema with the default rule set.
///
/// An empty error list means the document is valid.
pub fn validate(schema: &SchemaType, document: &Document) -> Vec<RuleError> {
    tracing::trace!("validating document");

    let mut ctx = ValidatorContext::new(schema, document);
    visit_all_rules(&mut ctx, document);
    ctx.into_errors()
}

/// Parse, validate and execute a query from its source text.
///
/// This is the all-in-one entry point; the individual phases are available
/// as [`parse_document_source`], [`validate`] and [`execute`] when a server
/// wants to cache or inspect the intermediate results.
pub fn execute_source(
    schema: &Arc<SchemaType>,
    source: &str,
    root: Resolved,
    operation_name: Option<&str>,
    variables: Variables,
    context: RequestContext,
) -> Result<Response, GraphQLError> {
    let document = parse_document_source(source)?;

    let errors = validate(schema, &document);
    if !errors.is_empty() {
        return Err(GraphQLError::ValidationError(errors));
    }

    Ok(execute(ExecuteParams {
        schema: Arc::clone(schema),
        document: Arc::new(document),
        root,
        operation_name: operation_name.map(str::to_owned),
        variables,
        context,
    }))
}
