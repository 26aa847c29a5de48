//! Dynamic values
//!
//! [`Value`] is the instance model the engine produces. Composite instances
//! are [`Object`]s carrying their type name and named fields.

use crate::member::InvokeError;
use crate::name::TypeName;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use std::time::Duration;
use uuid::Uuid;

/// A populated value
///
/// Equality is structural. Field order of objects does not matter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value (cycle nulling, empty optional)
    Null,
    Bool(bool),
    Char(char),
    /// Any signed integer width
    Int(i64),
    /// Any unsigned integer width
    UInt(u64),
    /// `f32` or `f64`
    Float(f64),
    Str(String),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Duration(Duration),
    /// Enum variant
    Enum {
        /// Enum type
        ty: TypeName,
        /// Variant name
        variant: String,
    },
    Seq(Vec<Value>),
    /// Set with unique elements
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Pair(Box<Value>, Box<Value>),
    Array(Vec<Value>),
    Object(Object),
}

impl Value {
    /// Whether this is [`Value::Null`]
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow as object
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Mutably borrow as object
    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Field of an object value
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|object| object.get(name))
    }

    /// Assign a field on an object value
    ///
    /// # Errors
    /// Returns [`InvokeError::NotAnObject`] if this is not an object.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<(), InvokeError> {
        match self {
            Self::Object(object) => {
                object.set(name, value);
                Ok(())
            }
            _ => Err(InvokeError::NotAnObject {
                member: name.to_string(),
            }),
        }
    }

    /// Insert one element into a sequence, set or array value
    ///
    /// Sets keep their elements unique.
    ///
    /// # Errors
    /// Returns [`InvokeError::NotACollection`] for other values.
    pub fn insert(&mut self, element: Value) -> Result<(), InvokeError> {
        match self {
            Self::Seq(items) | Self::Array(items) => {
                items.push(element);
                Ok(())
            }
            Self::Set(items) => {
                if !items.contains(&element) {
                    items.push(element);
                }
                Ok(())
            }
            _ => Err(InvokeError::NotACollection),
        }
    }

    /// Insert one key/value pair into a map value
    ///
    /// # Errors
    /// Returns [`InvokeError::NotACollection`] for non-map values.
    pub fn insert_entry(&mut self, key: Value, value: Value) -> Result<(), InvokeError> {
        match self {
            Self::Map(entries) => {
                if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                } else {
                    entries.push((key, value));
                }
                Ok(())
            }
            _ => Err(InvokeError::NotACollection),
        }
    }

    /// Number of elements for collection-like values
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Seq(items) | Self::Set(items) | Self::Array(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            Self::Pair(..) => Some(2),
            _ => None,
        }
    }

    /// Whether a collection-like value is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Whether any field reachable from this value is [`Value::Null`]
    #[must_use]
    pub fn contains_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Seq(items) | Self::Set(items) | Self::Array(items) => {
                items.iter().any(Value::contains_null)
            }
            Self::Map(entries) => entries
                .iter()
                .any(|(k, v)| k.contains_null() || v.contains_null()),
            Self::Pair(k, v) => k.contains_null() || v.contains_null(),
            Self::Object(object) => object.fields.values().any(Value::contains_null),
            _ => false,
        }
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

/// A composite instance
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Type of this instance
    pub ty: TypeName,

    /// Assigned fields in assignment order
    pub fields: IndexMap<String, Value>,
}

impl Object {
    /// Empty instance of `ty`
    #[inline]
    #[must_use]
    pub fn new(ty: impl Into<TypeName>) -> Self {
        Self {
            ty: ty.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field assignment
    #[inline]
    #[must_use]
    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Assign a field
    #[inline]
    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    /// Read a field
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_equality_ignores_field_order() {
        let a = Object::new("T")
            .with("x", Value::Int(1))
            .with("y", Value::Bool(true));
        let b = Object::new("T")
            .with("y", Value::Bool(true))
            .with("x", Value::Int(1));
        assert_eq!(Value::from(a), Value::from(b));
    }

    #[test]
    fn set_insert_keeps_unique() {
        let mut set = Value::Set(vec![]);
        set.insert(Value::Int(1)).unwrap();
        set.insert(Value::Int(1)).unwrap();
        assert_eq!(set.len(), Some(1));
    }

    #[test]
    fn map_insert_replaces_existing_key() {
        let mut map = Value::Map(vec![]);
        map.insert_entry(Value::Str("k".into()), Value::Int(1)).unwrap();
        map.insert_entry(Value::Str("k".into()), Value::Int(2)).unwrap();
        assert_eq!(map, Value::Map(vec![(Value::Str("k".into()), Value::Int(2))]));
    }

    #[test]
    fn set_field_on_non_object_fails() {
        let mut value = Value::Int(3);
        assert!(matches!(
            value.set_field("x", Value::Null),
            Err(InvokeError::NotAnObject { .. })
        ));
    }

    #[test]
    fn contains_null_walks_nested_values() {
        let inner = Object::new("B").with("a", Value::Null);
        let outer = Object::new("A").with("b", Value::Object(inner));
        assert!(Value::Object(outer).contains_null());
        assert!(!Value::Seq(vec![Value::Int(1)]).contains_null());
    }

    #[test]
    fn insert_into_leaf_fails() {
        let mut value = Value::Bool(true);
        assert!(value.insert(Value::Null).is_err());
        assert!(value.len().is_none());
    }
}
