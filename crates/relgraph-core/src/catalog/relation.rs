//! Relationship declarations between entities.

use serde::{Deserialize, Serialize};

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one target.
    ToOne,
    /// Any number of targets.
    ToMany,
}

impl Cardinality {
    /// Minimum number of targets.
    pub fn min_count(self) -> u32 {
        0
    }

    /// Maximum number of targets; `None` means unbounded.
    pub fn max_count(self) -> Option<u32> {
        match self {
            Cardinality::ToOne => Some(1),
            Cardinality::ToMany => None,
        }
    }

    /// Check if this is a to-many relationship.
    pub fn is_to_many(self) -> bool {
        self == Cardinality::ToMany
    }
}

/// A relationship as declared by its owning entity.
///
/// Declarations only carry names. Resolving them against a set of entities
/// is the job of [`SchemaBuilder`](crate::schema::SchemaBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDef {
    /// Relationship name (unique within the owner).
    pub name: String,
    /// Entity declaring the relationship. Left empty in nested
    /// declarations, where the carrying entity is the owner.
    #[serde(default, rename = "owner", skip_serializing_if = "String::is_empty")]
    pub owner_entity: String,
    /// Entity the relationship points to.
    #[serde(rename = "destination")]
    pub destination_entity: String,
    /// Name of the relationship that points back.
    #[serde(rename = "inverse")]
    pub inverse_name: String,
    /// Entity declaring the inverse, when it is not the destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_entity: Option<String>,
    /// Whether the relationship may be empty.
    #[serde(default = "default_optional")]
    pub optional: bool,
    /// Relationship cardinality.
    pub cardinality: Cardinality,
}

fn default_optional() -> bool {
    true
}

impl RelationshipDef {
    /// Create an optional relationship.
    pub fn new(
        name: impl Into<String>,
        owner_entity: impl Into<String>,
        destination_entity: impl Into<String>,
        inverse_name: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            owner_entity: owner_entity.into(),
            destination_entity: destination_entity.into(),
            inverse_name: inverse_name.into(),
            inverse_entity: None,
            optional: true,
            cardinality,
        }
    }

    /// Create a to-one relationship.
    pub fn to_one(
        name: impl Into<String>,
        owner_entity: impl Into<String>,
        destination_entity: impl Into<String>,
        inverse_name: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            owner_entity,
            destination_entity,
            inverse_name,
            Cardinality::ToOne,
        )
    }

    /// Create a to-many relationship.
    pub fn to_many(
        name: impl Into<String>,
        owner_entity: impl Into<String>,
        destination_entity: impl Into<String>,
        inverse_name: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            owner_entity,
            destination_entity,
            inverse_name,
            Cardinality::ToMany,
        )
    }

    /// Declare the inverse on an entity other than the destination.
    pub fn with_inverse_entity(mut self, entity: impl Into<String>) -> Self {
        self.inverse_entity = Some(entity.into());
        self
    }

    /// Mark the relationship as required.
    pub fn required(mut self) -> Self {
        self.optional = false;
        self
    }

    /// Set whether the relationship is optional.
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Entity on which the inverse relationship is declared.
    pub fn inverse_entity(&self) -> &str {
        self.inverse_entity
            .as_deref()
            .unwrap_or(&self.destination_entity)
    }
}
