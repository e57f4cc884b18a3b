//! Record type for stored entities.

use super::key::{generate_id, RecordId};
use super::value::Value;
use crate::error::Error;
use rkyv::{Archive, Deserialize, Serialize};
use std::collections::BTreeMap;

/// One stored instance of an entity.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct Record {
    /// Record identifier.
    pub id: RecordId,
    /// Name of the entity this record belongs to.
    pub entity: String,
    /// Attribute values by name.
    pub values: BTreeMap<String, Value>,
    /// Relationship targets by relationship name.
    pub links: BTreeMap<String, Vec<RecordId>>,
    /// Creation timestamp in microseconds since Unix epoch.
    pub created_at: u64,
}

impl Record {
    /// Create an empty record with a fresh ID.
    pub fn new(entity: impl Into<String>) -> Self {
        Self::with_id(entity, generate_id())
    }

    /// Create an empty record with a specific ID.
    pub fn with_id(entity: impl Into<String>, id: RecordId) -> Self {
        Self {
            id,
            entity: entity.into(),
            values: BTreeMap::new(),
            links: BTreeMap::new(),
            created_at: super::key::current_timestamp(),
        }
    }

    /// Set an attribute value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Add a relationship target.
    pub fn link(mut self, relationship: impl Into<String>, target: RecordId) -> Self {
        self.links.entry(relationship.into()).or_default().push(target);
        self
    }

    /// Get an attribute value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Targets of a relationship.
    pub fn targets(&self, relationship: &str) -> &[RecordId] {
        self.links
            .get(relationship)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
