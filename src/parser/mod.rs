//! Lexing and parsing of executable GraphQL documents.
//!
//! The parser is deliberately schema-independent: it produces the owned
//! syntax tree in [`crate::ast`] from source text alone, so documents can be
//! parsed once and executed against any schema. Lexing is pull-based — the
//! grammar drives a [`tokens`] scanner through a one-token-lookahead cursor
//! and nothing is buffered beyond that.

mod parse;
mod pos;
mod tokens;

pub use self::parse::{parse_document_source, ParseError};
pub use self::pos::{SourcePosition, Spanning};
