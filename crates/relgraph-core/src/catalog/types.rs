//! Core type definitions for the catalog.

use crate::storage::AttributeType;
use serde::{Deserialize, Serialize};

/// Scalar attribute types an entity field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Point in time.
    Date,
    /// UUID (128-bit identifier).
    Uuid,
    /// URL stored as text.
    Url,
    /// Binary data.
    Bytes,
    /// Boolean value.
    Bool,
    /// UTF-8 string.
    String,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
}

impl ScalarType {
    /// Every scalar type, in declaration order.
    pub const ALL: [ScalarType; 11] = [
        ScalarType::Date,
        ScalarType::Uuid,
        ScalarType::Url,
        ScalarType::Bytes,
        ScalarType::Bool,
        ScalarType::String,
        ScalarType::Float32,
        ScalarType::Float64,
        ScalarType::Int16,
        ScalarType::Int32,
        ScalarType::Int64,
    ];

    /// The storage engine attribute type this scalar is stored as.
    pub fn storage_type(self) -> AttributeType {
        match self {
            ScalarType::Date => AttributeType::Date,
            ScalarType::Uuid => AttributeType::Uuid,
            ScalarType::Url => AttributeType::Uri,
            ScalarType::Bytes => AttributeType::BinaryData,
            ScalarType::Bool => AttributeType::Boolean,
            ScalarType::String => AttributeType::String,
            ScalarType::Float32 => AttributeType::Float,
            ScalarType::Float64 => AttributeType::Double,
            ScalarType::Int16 => AttributeType::Integer16,
            ScalarType::Int32 => AttributeType::Integer32,
            ScalarType::Int64 => AttributeType::Integer64,
        }
    }

    /// Check if this type is numeric.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ScalarType::Int16
                | ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::Float32
                | ScalarType::Float64
        )
    }

    /// Check if this type is a string-like type.
    pub fn is_string_like(self) -> bool {
        matches!(self, ScalarType::String | ScalarType::Url)
    }
}
