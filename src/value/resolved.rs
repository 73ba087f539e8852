use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde::Serialize;

use crate::executor::{FieldResult, ResolveParams};
use crate::value::{Object, Value};

/// The signature of a deferred value producer
///
/// A thunk is a zero-argument producer of another [`Resolved`] value. The
/// executor does not invoke it at resolve time; instead the in-progress
/// response tree keeps a deferred slot which the dethunk scheduler flushes
/// breadth-first after the rest of the selection set has been resolved.
pub type ThunkFn = dyn Fn() -> Resolved + Send + Sync;

/// Custom per-field resolution for a source value
///
/// Source values carrying this capability take precedence over the default
/// resolver's map lookup: every field selected on such a source is routed
/// through [`FieldResolver::resolve_field`].
pub trait FieldResolver: Send + Sync {
    /// Resolve the field described by `params` against this source value.
    fn resolve_field(&self, params: ResolveParams<'_>) -> FieldResult<Resolved>;
}

/// A dynamically typed value flowing between resolvers and the completer
///
/// `Resolved` is what resolve delegates return and what field sources are
/// made of: plain scalars, lists, string-keyed maps, deferred producers
/// ([thunks](ThunkFn)) and sources with a custom [`FieldResolver`].
///
/// [`Map`](Resolved::Map) and [`Record`](Resolved::Record) carry the same
/// payload but resolve differently: a map is looked up under exactly the
/// field name, while a record — the shape of a serialized struct, as
/// produced by [`from_serialize`](Resolved::from_serialize) — also accepts a
/// case-insensitive member name match.
#[derive(Clone)]
#[allow(missing_docs)]
pub enum Resolved {
    Null,
    Int(i32),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<Resolved>),
    Map(IndexMap<String, Resolved>),
    Record(IndexMap<String, Resolved>),
    Thunk(Arc<ThunkFn>),
    Delegate(Arc<dyn FieldResolver>),
}

impl Resolved {
    /// Construct a null value.
    pub fn null() -> Resolved {
        Resolved::Null
    }

    /// Construct a string value.
    pub fn string(s: impl Into<String>) -> Resolved {
        Resolved::String(s.into())
    }

    /// Defer production of a value until the dethunk scheduler reaches it.
    pub fn defer<F>(f: F) -> Resolved
    where
        F: Fn() -> Resolved + Send + Sync + 'static,
    {
        Resolved::Thunk(Arc::new(f))
    }

    /// Wrap a source value with custom per-field resolution.
    pub fn delegate<R>(resolver: R) -> Resolved
    where
        R: FieldResolver + 'static,
    {
        Resolved::Delegate(Arc::new(resolver))
    }

    /// Convert any serializable Rust value into a `Resolved` tree.
    ///
    /// Struct fields become [`Record`](Resolved::Record) entries under their
    /// serialized names, so serde rename attributes control the names the
    /// default resolver sees and remaining casing differences are tolerated.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Resolved, serde_json::Error> {
        serde_json::to_value(value).map(Resolved::from)
    }

    /// A value counts as nullish if it is null or a floating point NaN.
    pub fn is_nullish(&self) -> bool {
        match self {
            Resolved::Null => true,
            Resolved::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// View the underlying members, if this value is a map or a record.
    pub fn as_map(&self) -> Option<&IndexMap<String, Resolved>> {
        match self {
            Resolved::Map(m) | Resolved::Record(m) => Some(m),
            _ => None,
        }
    }

    /// Compare this value against a finished response [`Value`].
    ///
    /// Thunks and delegates never compare equal. Used by enum serialization
    /// to find the variant matching a resolver-provided internal value.
    pub fn matches_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Resolved::Null, Value::Null) => true,
            (Resolved::Int(a), Value::Int(b)) => a == b,
            (Resolved::Float(a), Value::Float(b)) => a == b,
            (Resolved::String(a), Value::String(b)) => a == b,
            (Resolved::Boolean(a), Value::Boolean(b)) => a == b,
            (Resolved::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches_value(y))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Resolved::Null => write!(f, "Null"),
            Resolved::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Resolved::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Resolved::String(v) => f.debug_tuple("String").field(v).finish(),
            Resolved::Boolean(v) => f.debug_tuple("Boolean").field(v).finish(),
            Resolved::List(v) => f.debug_tuple("List").field(v).finish(),
            Resolved::Map(v) => f.debug_tuple("Map").field(v).finish(),
            Resolved::Record(v) => f.debug_tuple("Record").field(v).finish(),
            Resolved::Thunk(_) => write!(f, "Thunk(..)"),
            Resolved::Delegate(_) => write!(f, "Delegate(..)"),
        }
    }
}

impl From<Value> for Resolved {
    fn from(v: Value) -> Resolved {
        match v {
            Value::Null => Resolved::Null,
            Value::Int(i) => Resolved::Int(i),
            Value::Float(f) => Resolved::Float(f),
            Value::String(s) => Resolved::String(s),
            Value::Boolean(b) => Resolved::Boolean(b),
            Value::List(l) => Resolved::List(l.into_iter().map(Resolved::from).collect()),
            Value::Object(o) => Resolved::Record(
                o.into_iter()
                    .map(|(k, v)| (k, Resolved::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Resolved {
    fn from(v: serde_json::Value) -> Resolved {
        match v {
            serde_json::Value::Null => Resolved::Null,
            serde_json::Value::Bool(b) => Resolved::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                    Resolved::Int(i)
                } else {
                    Resolved::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Resolved::String(s),
            serde_json::Value::Array(l) => {
                Resolved::List(l.into_iter().map(Resolved::from).collect())
            }
            serde_json::Value::Object(o) => Resolved::Record(
                o.into_iter()
                    .map(|(k, v)| (k, Resolved::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<i32> for Resolved {
    fn from(i: i32) -> Resolved {
        Resolved::Int(i)
    }
}

impl From<f64> for Resolved {
    fn from(f: f64) -> Resolved {
        Resolved::Float(f)
    }
}

impl From<bool> for Resolved {
    fn from(b: bool) -> Resolved {
        Resolved::Boolean(b)
    }
}

impl From<&str> for Resolved {
    fn from(s: &str) -> Resolved {
        Resolved::String(s.into())
    }
}

impl From<String> for Resolved {
    fn from(s: String) -> Resolved {
        Resolved::String(s)
    }
}

impl<T> From<Option<T>> for Resolved
where
    Resolved: From<T>,
{
    fn from(v: Option<T>) -> Resolved {
        match v {
            Some(v) => v.into(),
            None => Resolved::Null,
        }
    }
}

impl From<Vec<Resolved>> for Resolved {
    fn from(l: Vec<Resolved>) -> Resolved {
        Resolved::List(l)
    }
}

impl From<IndexMap<String, Resolved>> for Resolved {
    fn from(m: IndexMap<String, Resolved>) -> Resolved {
        Resolved::Map(m)
    }
}

impl From<Object> for Resolved {
    fn from(o: Object) -> Resolved {
        Resolved::from(Value::Object(o))
    }
}
