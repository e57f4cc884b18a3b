//! Resolved schema graph.
//!
//! Entities and relationships are stored in two arenas and refer to each
//! other through [`EntityId`] and [`RelationshipId`] handles. A relationship
//! and its inverse point at each other by handle, so both directions share
//! the same resolved pair.

use crate::catalog::{Cardinality, FieldDef};
use crate::storage::{EntitySpec, RelationshipSpec, StorageModel};
use std::collections::BTreeMap;
use std::fmt;

/// Handle of an entity within a [`SchemaGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

/// Handle of a relationship within a [`SchemaGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipId(usize);

impl EntityId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the entity in the graph's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl RelationshipId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the relationship in the graph's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// An entity after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    /// Handle of this entity.
    pub id: EntityId,
    /// Entity name.
    pub name: String,
    /// Scalar fields, in declaration order.
    pub fields: Vec<FieldDef>,
    /// Relationships this entity declared.
    pub declared: Vec<RelationshipId>,
    /// Relationships declared elsewhere that name this entity as their inverse side.
    pub attached: Vec<RelationshipId>,
}

impl ResolvedEntity {
    /// Every relationship navigable from this entity: declared first, then attached.
    pub fn relationships(&self) -> impl Iterator<Item = RelationshipId> + '_ {
        self.declared.iter().chain(self.attached.iter()).copied()
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A relationship whose destination and inverse side have been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelationship {
    /// Handle of this relationship.
    pub id: RelationshipId,
    /// Relationship name.
    pub name: String,
    /// Declaring entity.
    pub owner: EntityId,
    /// Entity the relationship points to.
    pub destination: EntityId,
    /// Entity on which the inverse is declared.
    pub inverse_entity: EntityId,
    /// Declared name of the inverse relationship.
    pub inverse_name: String,
    /// Bound inverse, if one was found.
    pub inverse: Option<RelationshipId>,
    /// Whether the relationship may be empty.
    pub optional: bool,
    /// Relationship cardinality.
    pub cardinality: Cardinality,
}

impl ResolvedRelationship {
    /// Check if an inverse has been bound.
    pub fn is_bidirectional(&self) -> bool {
        self.inverse.is_some()
    }
}

/// The output of a schema build: resolved entities keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaGraph {
    pub(crate) entities: Vec<ResolvedEntity>,
    pub(crate) relationships: Vec<ResolvedRelationship>,
    pub(crate) by_name: BTreeMap<String, EntityId>,
}

impl SchemaGraph {
    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the graph has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of resolved relationships.
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Look up an entity handle by name.
    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    /// Get an entity by name.
    pub fn entity(&self, name: &str) -> Option<&ResolvedEntity> {
        self.entity_id(name).and_then(|id| self.entity_by_id(id))
    }

    /// Get an entity by handle.
    pub fn entity_by_id(&self, id: EntityId) -> Option<&ResolvedEntity> {
        self.entities.get(id.index())
    }

    /// Get a relationship by handle.
    pub fn relationship(&self, id: RelationshipId) -> Option<&ResolvedRelationship> {
        self.relationships.get(id.index())
    }

    /// Get the bound inverse of a relationship.
    pub fn inverse_of(&self, id: RelationshipId) -> Option<&ResolvedRelationship> {
        self.relationship(id)
            .and_then(|rel| rel.inverse)
            .and_then(|inverse| self.relationship(inverse))
    }

    /// Every relationship navigable from the named entity.
    pub fn relationships_of(&self, entity: &str) -> Vec<&ResolvedRelationship> {
        self.entity(entity)
            .map(|e| {
                e.relationships()
                    .filter_map(|id| self.relationship(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Find a navigable relationship by name, preferring the entity's own declarations.
    pub fn find_relationship(&self, entity: &str, name: &str) -> Option<&ResolvedRelationship> {
        self.relationships_of(entity)
            .into_iter()
            .find(|rel| rel.name == name)
    }

    /// Entity names in sorted order.
    pub fn entity_names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    /// Iterate over entities in input order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedEntity> {
        self.entities.iter()
    }

    /// Iterate over resolved relationships in resolution order.
    pub fn iter_relationships(&self) -> impl Iterator<Item = &ResolvedRelationship> {
        self.relationships.iter()
    }

    /// Name of an entity by handle.
    pub fn entity_name(&self, id: EntityId) -> Option<&str> {
        self.entity_by_id(id).map(|e| e.name.as_str())
    }

    /// Lower the graph into the description a storage engine opens against.
    ///
    /// Each relationship is materialized once, on its declaring entity.
    pub fn to_storage_model(&self) -> StorageModel {
        let entities = self
            .entities
            .iter()
            .map(|entity| {
                let attributes = entity
                    .fields
                    .iter()
                    .map(FieldDef::to_storage_attribute)
                    .collect();
                let relationships = entity
                    .declared
                    .iter()
                    .filter_map(|id| self.relationship(*id))
                    .filter_map(|rel| self.relationship_spec(rel))
                    .collect();
                EntitySpec {
                    name: entity.name.clone(),
                    attributes,
                    relationships,
                }
            })
            .collect();

        StorageModel { entities }
    }

    fn relationship_spec(&self, rel: &ResolvedRelationship) -> Option<RelationshipSpec> {
        let spec = RelationshipSpec::new(
            rel.name.clone(),
            rel.optional,
            rel.cardinality,
            self.entity_name(rel.destination)?,
        );
        let inverse = rel
            .inverse
            .and_then(|id| self.relationship(id))
            .and_then(|inv| Some((self.entity_name(inv.owner)?, inv.name.as_str())));
        Some(match inverse {
            Some((owner, name)) => spec.with_inverse(owner, name),
            None => spec,
        })
    }
}
