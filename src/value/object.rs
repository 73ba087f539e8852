use indexmap::map::{IndexMap, IntoIter};

use super::Value;

/// An insertion-order preserving object value
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Object {
    key_value_list: IndexMap<String, Value>,
}

impl Object {
    /// Create a new object value with a fixed number of preallocated slots
    /// for field-value pairs
    pub fn with_capacity(size: usize) -> Object {
        Object {
            key_value_list: IndexMap::with_capacity(size),
        }
    }

    /// Add a new field with a value
    ///
    /// If there is already a field with the given key, the old value is
    /// replaced and returned.
    pub fn add_field<K>(&mut self, k: K, value: Value) -> Option<Value>
    where
        K: Into<String>,
    {
        self.key_value_list.insert(k.into(), value)
    }

    /// Check if the object already contains a field with the given name
    pub fn contains_field(&self, k: &str) -> bool {
        self.key_value_list.contains_key(k)
    }

    /// Get an iterator over all field-value pairs, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.key_value_list.iter()
    }

    /// Get an iterator over all mutable field-value pairs, in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.key_value_list.iter_mut()
    }

    /// Get the current number of fields
    pub fn field_count(&self) -> usize {
        self.key_value_list.len()
    }

    /// Get the value of the given field, if present
    pub fn get_field_value(&self, key: &str) -> Option<&Value> {
        self.key_value_list.get(key)
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.key_value_list.into_iter()
    }
}

impl<K> FromIterator<(K, Value)> for Object
where
    K: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
    {
        let iter = iter.into_iter();
        let mut ret = Object {
            key_value_list: IndexMap::with_capacity(iter.size_hint().0),
        };
        for (k, v) in iter {
            ret.add_field(k, v);
        }
        ret
    }
}
