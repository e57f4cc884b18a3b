//! Runtime attribute values.

use super::spec::AttributeType;
use rkyv::{Archive, Deserialize, Serialize};

/// A stored attribute value. Each variant corresponds to one [`AttributeType`].
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 16-bit signed integer.
    Int16(i16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// URI string.
    Url(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Timestamp as microseconds since Unix epoch.
    Date(i64),
    /// UUID as 16 bytes.
    Uuid([u8; 16]),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check whether this value can be stored in an attribute of the given type.
    ///
    /// `Null` is accepted by every type; optionality is checked separately.
    pub fn fits(&self, attribute_type: AttributeType) -> bool {
        match (self, attribute_type) {
            (Value::Null, _) => true,
            (Value::Bool(_), AttributeType::Boolean)
            | (Value::Int16(_), AttributeType::Integer16)
            | (Value::Int32(_), AttributeType::Integer32)
            | (Value::Int64(_), AttributeType::Integer64)
            | (Value::Float32(_), AttributeType::Float)
            | (Value::Float64(_), AttributeType::Double)
            | (Value::String(_), AttributeType::String)
            | (Value::Url(_), AttributeType::Uri)
            | (Value::Bytes(_), AttributeType::BinaryData)
            | (Value::Date(_), AttributeType::Date)
            | (Value::Uuid(_), AttributeType::Uuid) => true,
            _ => false,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as a widened integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a widened float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(f64::from(*v)),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a string slice (strings and URLs).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Url(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a date in microseconds.
    pub fn as_date(&self) -> Option<i64> {
        match self {
            Value::Date(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Try to get as UUID bytes.
    pub fn as_uuid(&self) -> Option<&[u8; 16]> {
        match self {
            Value::Uuid(id) => Some(id),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
