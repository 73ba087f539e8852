//! The built-in scalar types every schema carries.

use std::sync::Arc;

use crate::ast::InputValue;
use crate::schema::meta::ScalarMeta;
use crate::value::{Resolved, Value};

/// The `Int` scalar type.
pub fn int_meta() -> ScalarMeta {
    ScalarMeta::new(
        "Int",
        Arc::new(|v| match v {
            Resolved::Int(i) => Some(Value::Int(*i)),
            Resolved::Float(f) if f.fract() == 0.0 && in_int_range(*f) => {
                Some(Value::Int(*f as i32))
            }
            Resolved::Boolean(b) => Some(Value::Int(i32::from(*b))),
            _ => None,
        }),
        Arc::new(|v| match v {
            Value::Int(i) => Some(Value::Int(*i)),
            Value::Float(f) if f.fract() == 0.0 && in_int_range(*f) => Some(Value::Int(*f as i32)),
            _ => None,
        }),
        Arc::new(|v| match v {
            InputValue::Int(i) => Some(Value::Int(*i)),
            _ => None,
        }),
    )
    .description("The `Int` scalar type represents non-fractional signed whole numeric values.")
}

/// The `Float` scalar type.
pub fn float_meta() -> ScalarMeta {
    ScalarMeta::new(
        "Float",
        Arc::new(|v| match v {
            Resolved::Float(f) if !f.is_nan() => Some(Value::Float(*f)),
            Resolved::Int(i) => Some(Value::Float(f64::from(*i))),
            Resolved::Boolean(b) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
            _ => None,
        }),
        Arc::new(|v| match v {
            Value::Float(f) if !f.is_nan() => Some(Value::Float(*f)),
            Value::Int(i) => Some(Value::Float(f64::from(*i))),
            _ => None,
        }),
        Arc::new(|v| match v {
            InputValue::Int(i) => Some(Value::Float(f64::from(*i))),
            InputValue::Float(f) => Some(Value::Float(*f)),
            _ => None,
        }),
    )
    .description("The `Float` scalar type represents signed double-precision fractional values.")
}

/// The `String` scalar type.
pub fn string_meta() -> ScalarMeta {
    ScalarMeta::new(
        "String",
        Arc::new(|v| match v {
            Resolved::String(s) => Some(Value::String(s.clone())),
            Resolved::Int(i) => Some(Value::String(i.to_string())),
            Resolved::Float(f) if !f.is_nan() => Some(Value::String(f.to_string())),
            Resolved::Boolean(b) => Some(Value::String(b.to_string())),
            _ => None,
        }),
        Arc::new(|v| match v {
            Value::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }),
        Arc::new(|v| match v {
            InputValue::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }),
    )
    .description("The `String` scalar type represents textual data as UTF-8 character sequences.")
}

/// The `Boolean` scalar type.
pub fn boolean_meta() -> ScalarMeta {
    ScalarMeta::new(
        "Boolean",
        Arc::new(|v| match v {
            Resolved::Boolean(b) => Some(Value::Boolean(*b)),
            Resolved::Int(i) => Some(Value::Boolean(*i != 0)),
            Resolved::Float(f) if !f.is_nan() => Some(Value::Boolean(*f != 0.0)),
            _ => None,
        }),
        Arc::new(|v| match v {
            Value::Boolean(b) => Some(Value::Boolean(*b)),
            _ => None,
        }),
        Arc::new(|v| match v {
            InputValue::Boolean(b) => Some(Value::Boolean(*b)),
            _ => None,
        }),
    )
    .description("The `Boolean` scalar type represents `true` or `false`.")
}

/// The `ID` scalar type.
///
/// Serialized as a string, but accepts both string and integer input.
pub fn id_meta() -> ScalarMeta {
    ScalarMeta::new(
        "ID",
        Arc::new(|v| match v {
            Resolved::String(s) => Some(Value::String(s.clone())),
            Resolved::Int(i) => Some(Value::String(i.to_string())),
            _ => None,
        }),
        Arc::new(|v| match v {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Int(i) => Some(Value::String(i.to_string())),
            _ => None,
        }),
        Arc::new(|v| match v {
            InputValue::String(s) => Some(Value::String(s.clone())),
            InputValue::Int(i) => Some(Value::String(i.to_string())),
            _ => None,
        }),
    )
    .description("The `ID` scalar type represents a unique identifier.")
}

fn in_int_range(f: f64) -> bool {
    f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX)
}
