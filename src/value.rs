use std::{
    collections::HashMap,
    ops::{Index, IndexMut},
    str::FromStr,
};

use crate::error::{Error, ErrorKind, Result};

pub type Array = Vec<Value>;
pub type Object = HashMap<String, Value>;

static NULL: Value = Value::Null;

/// A parsed JSON node. Containers own their children.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Array),
    Object(Object),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(Error::type_mismatch("boolean", other.type_name())),
        }
    }

    pub fn as_number(&self) -> Result<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(Error::type_mismatch("number", other.type_name())),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(Error::type_mismatch("string", other.type_name())),
        }
    }

    pub fn as_array(&self) -> Result<&Array> {
        match self {
            Value::Array(arr) => Ok(arr),
            other => Err(Error::type_mismatch("array", other.type_name())),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Array> {
        match self {
            Value::Array(arr) => Ok(arr),
            other => Err(Error::type_mismatch("array", other.type_name())),
        }
    }

    pub fn as_object(&self) -> Result<&Object> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(Error::type_mismatch("object", other.type_name())),
        }
    }

    pub fn as_object_mut(&mut self) -> Result<&mut Object> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(Error::type_mismatch("object", other.type_name())),
        }
    }

    /// Looks up `key` without inserting. A missing key yields a shared null.
    pub fn get(&self, key: &str) -> Result<&Value> {
        let obj = self.as_object()?;
        Ok(obj.get(key).unwrap_or(&NULL))
    }

    pub fn get_index(&self, index: usize) -> Result<&Value> {
        let arr = self.as_array()?;
        arr.get(index).ok_or_else(|| {
            Error::new(ErrorKind::OutOfBounds).with_message(format!(
                "index {index} out of bounds for array of length {}",
                arr.len()
            ))
        })
    }

    /// Returns the slot for `key`, inserting null if absent.
    ///
    /// A value that is not an object is replaced by an empty object first and
    /// its previous payload is dropped. This lets callers build documents
    /// incrementally, e.g. `v["a"]["b"] = Value::from(1.0)` on a null `v`.
    pub fn entry_mut(&mut self, key: &str) -> &mut Value {
        match self {
            Value::Object(obj) => obj.entry(key.to_owned()).or_default(),
            other => {
                tracing::trace!(from = other.type_name(), "converting value to object");
                *other = Value::Object(Object::new());
                other.entry_mut(key)
            }
        }
    }

    /// Returns the slot at `index`, padding the array with nulls up to it.
    ///
    /// A value that is not an array is replaced by an empty array first and
    /// its previous payload is dropped.
    pub fn slot_mut(&mut self, index: usize) -> &mut Value {
        match self {
            Value::Array(arr) => {
                if index >= arr.len() {
                    arr.resize_with(index + 1, Value::default);
                }
                &mut arr[index]
            }
            other => {
                tracing::trace!(from = other.type_name(), "converting value to array");
                *other = Value::Array(Array::new());
                other.slot_mut(index)
            }
        }
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Self::Output {
        match self.get(key) {
            Ok(v) => v,
            Err(e) => panic!("cannot index {} with key {key:?}: {e}", self.type_name()),
        }
    }
}

impl IndexMut<&str> for Value {
    fn index_mut(&mut self, key: &str) -> &mut Self::Output {
        self.entry_mut(key)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get_index(index) {
            Ok(v) => v,
            Err(e) => panic!("cannot index {} with {index}: {e}", self.type_name()),
        }
    }
}

impl IndexMut<usize> for Value {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.slot_mut(index)
    }
}

impl FromStr for Value {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::parse(s)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}
