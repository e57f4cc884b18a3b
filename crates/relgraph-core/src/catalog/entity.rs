//! Entity definitions.

use super::field::{EntityField, FieldDef};
use super::relation::RelationshipDef;
use crate::storage::AttributeSpec;
use serde::{Deserialize, Serialize};

/// An entity definition: a named record type with scalar fields and the
/// relationships it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity name (unique within schema).
    pub name: String,
    /// Scalar field definitions, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Owned relationship declarations, in declaration order.
    #[serde(default)]
    pub relationships: Vec<RelationshipDef>,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Create an entity from a mixed property list.
    pub fn from_fields(
        name: impl Into<String>,
        properties: impl IntoIterator<Item = EntityField>,
    ) -> Self {
        properties
            .into_iter()
            .fold(Self::new(name), |entity, property| match property {
                EntityField::Scalar(field) => entity.with_field(field),
                EntityField::Relationship(rel) => entity.with_relationship(rel),
            })
    }

    /// Add a field to the entity.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Add an owned relationship. An empty owner is filled with this entity's name.
    pub fn with_relationship(mut self, mut rel: RelationshipDef) -> Self {
        if rel.owner_entity.is_empty() {
            rel.owner_entity = self.name.clone();
        }
        self.relationships.push(rel);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get an owned relationship by name.
    pub fn get_relationship(&self, name: &str) -> Option<&RelationshipDef> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Storage attribute descriptions for every scalar field.
    pub fn storage_attributes(&self) -> Vec<AttributeSpec> {
        self.fields.iter().map(FieldDef::to_storage_attribute).collect()
    }
}
