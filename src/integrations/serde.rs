//! Serialization of response values and errors into the standard GraphQL
//! JSON shapes.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::executor::{ExecutionError, PathSegment, Response};
use crate::parser::SourcePosition;
use crate::validation::RuleError;
use crate::value::{Object, Value};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Boolean(v) => serializer.serialize_bool(*v),
            Value::List(v) => v.serialize(serializer),
            Value::Object(v) => v.serialize(serializer),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.field_count()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PathSegment::Field(name) => serializer.serialize_str(name),
            PathSegment::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

/// Locations are reported one-based, per the response format.
struct SerializableLocation<'a>(&'a SourcePosition);

impl Serialize for SerializableLocation<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("line", &(self.0.line() + 1))?;
        map.serialize_entry("column", &(self.0.column() + 1))?;
        map.end()
    }
}

impl Serialize for ExecutionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("message", self.error().message())?;
        map.serialize_entry("locations", &[SerializableLocation(self.location())])?;

        if !self.path().is_empty() {
            map.serialize_entry("path", self.path())?;
        }

        if !self.error().extensions().is_null() {
            map.serialize_entry("extensions", self.error().extensions())?;
        }

        map.end()
    }
}

impl Serialize for RuleError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;

        map.serialize_entry("message", self.message())?;

        let locations = self
            .locations()
            .iter()
            .map(SerializableLocation)
            .collect::<Vec<_>>();
        map.serialize_entry("locations", &locations)?;

        map.end()
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("data", &self.data)?;

        if !self.errors.is_empty() {
            map.serialize_entry("errors", &self.errors)?;
        }

        map.end()
    }
}
