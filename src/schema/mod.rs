//! The runtime type system the executor and validator consume.

pub mod meta;
pub mod model;
pub mod scalars;

pub use self::model::{
    DirectiveLocation, DirectiveType, SchemaBuilder, SchemaError, SchemaType, TypeType,
};
