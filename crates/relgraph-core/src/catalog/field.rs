//! Field definitions for entities.

use super::relation::RelationshipDef;
use super::types::ScalarType;
use crate::storage::AttributeSpec;
use serde::{Deserialize, Serialize};

/// A scalar field definition within an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field data type.
    #[serde(rename = "type")]
    pub scalar_type: ScalarType,
    /// Whether the field may be absent.
    #[serde(default)]
    pub optional: bool,
}

impl FieldDef {
    /// Create a new required field.
    pub fn new(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar_type,
            optional: false,
        }
    }

    /// Create an optional field.
    pub fn optional(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar_type,
            optional: true,
        }
    }

    /// Translate into the attribute description a storage engine expects.
    pub fn to_storage_attribute(&self) -> AttributeSpec {
        AttributeSpec::new(
            self.name.clone(),
            self.scalar_type.storage_type(),
            self.optional,
        )
    }
}

/// One entry of an entity's property list: either a scalar or a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityField {
    /// A scalar attribute.
    Scalar(FieldDef),
    /// A relationship to another entity.
    Relationship(RelationshipDef),
}

impl EntityField {
    /// Name of the underlying field or relationship.
    pub fn name(&self) -> &str {
        match self {
            EntityField::Scalar(field) => &field.name,
            EntityField::Relationship(rel) => &rel.name,
        }
    }

    /// Check if this is a relationship entry.
    pub fn is_relationship(&self) -> bool {
        matches!(self, EntityField::Relationship(_))
    }
}

impl From<FieldDef> for EntityField {
    fn from(field: FieldDef) -> Self {
        EntityField::Scalar(field)
    }
}

impl From<RelationshipDef> for EntityField {
    fn from(rel: RelationshipDef) -> Self {
        EntityField::Relationship(rel)
    }
}
