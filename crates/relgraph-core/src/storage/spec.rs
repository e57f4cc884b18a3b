//! Engine-facing schema description.
//!
//! These are the shapes a store is opened against. They are produced by
//! [`SchemaGraph::to_storage_model`](crate::schema::SchemaGraph::to_storage_model)
//! and persisted alongside the records.

use crate::catalog::Cardinality;
use crate::error::Error;
use rkyv::{Archive, Deserialize, Serialize};

/// Attribute types understood by the storage engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Archive,
    Serialize,
    Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum AttributeType {
    /// Timestamp.
    Date,
    /// 128-bit identifier.
    Uuid,
    /// URI string.
    Uri,
    /// Opaque bytes.
    BinaryData,
    /// Boolean.
    Boolean,
    /// UTF-8 string.
    String,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// 16-bit integer.
    Integer16,
    /// 32-bit integer.
    Integer32,
    /// 64-bit integer.
    Integer64,
}

/// A stored attribute.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, serde::Serialize, serde::Deserialize,
)]
pub struct AttributeSpec {
    /// Attribute name.
    pub name: String,
    /// Attribute type.
    pub attribute_type: AttributeType,
    /// Whether the attribute may be absent.
    pub optional: bool,
}

impl AttributeSpec {
    /// Create an attribute description.
    pub fn new(name: impl Into<String>, attribute_type: AttributeType, optional: bool) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            optional,
        }
    }
}

/// A stored relationship.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, serde::Serialize, serde::Deserialize,
)]
pub struct RelationshipSpec {
    /// Relationship name.
    pub name: String,
    /// Whether the relationship may be empty.
    pub optional: bool,
    /// Minimum number of targets.
    pub min_count: u32,
    /// Maximum number of targets, `None` for unbounded.
    pub max_count: Option<u32>,
    /// Destination entity name.
    pub destination: String,
    /// Entity declaring the inverse.
    pub inverse_entity: Option<String>,
    /// Inverse relationship name.
    pub inverse_name: Option<String>,
}

impl RelationshipSpec {
    /// Create a relationship description without an inverse.
    pub fn new(
        name: impl Into<String>,
        optional: bool,
        cardinality: Cardinality,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            optional,
            min_count: cardinality.min_count(),
            max_count: cardinality.max_count(),
            destination: destination.into(),
            inverse_entity: None,
            inverse_name: None,
        }
    }

    /// Set the inverse relationship.
    pub fn with_inverse(mut self, entity: impl Into<String>, name: impl Into<String>) -> Self {
        self.inverse_entity = Some(entity.into());
        self.inverse_name = Some(name.into());
        self
    }

    /// Check if the relationship holds at most one target.
    pub fn is_to_one(&self) -> bool {
        self.max_count == Some(1)
    }
}

/// A stored entity.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, serde::Serialize, serde::Deserialize,
)]
pub struct EntitySpec {
    /// Entity name.
    pub name: String,
    /// Scalar attributes.
    pub attributes: Vec<AttributeSpec>,
    /// Relationships owned by this entity.
    pub relationships: Vec<RelationshipSpec>,
}

impl EntitySpec {
    /// Get an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Get a relationship by name.
    pub fn relationship(&self, name: &str) -> Option<&RelationshipSpec> {
        self.relationships.iter().find(|r| r.name == name)
    }
}

/// The full description a store is opened against.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Archive,
    Serialize,
    Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct StorageModel {
    /// Entities in schema order.
    pub entities: Vec<EntitySpec>,
}

impl StorageModel {
    /// Get an entity by name.
    pub fn entity(&self, name: &str) -> Option<&EntitySpec> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Serialize the model to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a model from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// BLAKE3 hash of the serialized model.
    pub fn fingerprint(&self) -> Result<[u8; 32], Error> {
        let bytes = self.to_bytes()?;
        Ok(*blake3::hash(&bytes).as_bytes())
    }

    /// Pretty-printed JSON rendering of the model.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}
