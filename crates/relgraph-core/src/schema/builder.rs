//! Schema builder: resolves name-addressed declarations into a [`SchemaGraph`].

use super::graph::{EntityId, RelationshipId, ResolvedEntity, ResolvedRelationship, SchemaGraph};
use crate::catalog::{EntityDef, RelationshipDef};
use crate::error::SchemaError;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Collects entity definitions and relationship declarations and resolves
/// them into a cross-linked [`SchemaGraph`].
///
/// The relationship set is every entity's owned declarations followed by
/// the extra declarations added with [`with_relationship`](Self::with_relationship).
/// Building does not consume the builder and always yields the same graph
/// for the same input.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    entities: Vec<EntityDef>,
    relationships: Vec<RelationshipDef>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.push(entity);
        self
    }

    /// Add multiple entities.
    pub fn with_entities(mut self, entities: impl IntoIterator<Item = EntityDef>) -> Self {
        self.entities.extend(entities);
        self
    }

    /// Add a relationship declaration not carried by an entity.
    pub fn with_relationship(mut self, rel: RelationshipDef) -> Self {
        self.relationships.push(rel);
        self
    }

    /// Add multiple free-standing relationship declarations.
    pub fn with_relationships(mut self, rels: impl IntoIterator<Item = RelationshipDef>) -> Self {
        self.relationships.extend(rels);
        self
    }

    /// Entities added so far.
    pub fn entities(&self) -> &[EntityDef] {
        &self.entities
    }

    /// Free-standing relationship declarations added so far.
    pub fn relationships(&self) -> &[RelationshipDef] {
        &self.relationships
    }

    /// Resolve every declaration and produce the schema graph.
    ///
    /// Declarations whose destination or inverse entity is unknown are
    /// dropped, and relationships without a matching inverse stay
    /// one-directional. Only malformed input is an error.
    pub fn build(&self) -> Result<SchemaGraph, SchemaError> {
        let mut graph = SchemaGraph::default();

        self.index_entities(&mut graph)?;
        let declarations = self.collect_declarations(&graph)?;
        resolve_destinations(&mut graph, &declarations);
        bind_inverses(&mut graph);
        attach_relationships(&mut graph);

        debug!(
            entities = graph.len(),
            declared = declarations.len(),
            resolved = graph.relationship_count(),
            "schema graph built"
        );

        Ok(graph)
    }

    fn index_entities(&self, graph: &mut SchemaGraph) -> Result<(), SchemaError> {
        for entity in &self.entities {
            if entity.name.is_empty() {
                return Err(SchemaError::EmptyEntityName);
            }
            if graph.by_name.contains_key(&entity.name) {
                return Err(SchemaError::DuplicateEntity(entity.name.clone()));
            }

            let mut seen = HashSet::new();
            for field in &entity.fields {
                if field.name.is_empty() {
                    return Err(SchemaError::EmptyFieldName {
                        entity: entity.name.clone(),
                    });
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateProperty {
                        entity: entity.name.clone(),
                        name: field.name.clone(),
                    });
                }
            }

            let id = EntityId::new(graph.entities.len());
            graph.entities.push(ResolvedEntity {
                id,
                name: entity.name.clone(),
                fields: entity.fields.clone(),
                declared: Vec::new(),
                attached: Vec::new(),
            });
            graph.by_name.insert(entity.name.clone(), id);
        }

        Ok(())
    }

    fn collect_declarations<'a>(
        &'a self,
        graph: &SchemaGraph,
    ) -> Result<Vec<(EntityId, &'a RelationshipDef)>, SchemaError> {
        let carried = self.entities.iter().flat_map(|entity| {
            entity
                .relationships
                .iter()
                .map(move |rel| (Some(entity.name.as_str()), rel))
        });
        let free = self.relationships.iter().map(|rel| (None, rel));

        let mut seen: HashSet<(EntityId, &str)> = HashSet::new();
        let mut declarations = Vec::new();

        for (carrier, rel) in carried.chain(free) {
            let owner_name = match carrier {
                Some(carrier) => {
                    if !rel.owner_entity.is_empty() && rel.owner_entity != carrier {
                        return Err(SchemaError::OwnerMismatch {
                            entity: carrier.to_string(),
                            relationship: rel.name.clone(),
                            owner: rel.owner_entity.clone(),
                        });
                    }
                    carrier
                }
                None => rel.owner_entity.as_str(),
            };

            if rel.name.is_empty() {
                return Err(SchemaError::EmptyRelationshipName {
                    entity: owner_name.to_string(),
                });
            }

            let Some(owner) = graph.entity_id(owner_name) else {
                debug!(
                    relationship = %rel.name,
                    owner = %owner_name,
                    "dropping relationship with unknown owner"
                );
                continue;
            };

            let clashes_with_field = graph.entities[owner.index()]
                .get_field(&rel.name)
                .is_some();
            if clashes_with_field || !seen.insert((owner, rel.name.as_str())) {
                return Err(SchemaError::DuplicateProperty {
                    entity: owner_name.to_string(),
                    name: rel.name.clone(),
                });
            }

            declarations.push((owner, rel));
        }

        Ok(declarations)
    }
}

fn resolve_destinations(graph: &mut SchemaGraph, declarations: &[(EntityId, &RelationshipDef)]) {
    for (owner, rel) in declarations {
        let Some(destination) = graph.entity_id(&rel.destination_entity) else {
            debug!(
                relationship = %rel.name,
                destination = %rel.destination_entity,
                "dropping relationship with unknown destination"
            );
            continue;
        };
        let Some(inverse_entity) = graph.entity_id(rel.inverse_entity()) else {
            debug!(
                relationship = %rel.name,
                inverse_entity = %rel.inverse_entity(),
                "dropping relationship with unknown inverse entity"
            );
            continue;
        };

        let id = RelationshipId::new(graph.relationships.len());
        graph.relationships.push(ResolvedRelationship {
            id,
            name: rel.name.clone(),
            owner: *owner,
            destination,
            inverse_entity,
            inverse_name: rel.inverse_name.clone(),
            inverse: None,
            optional: rel.optional,
            cardinality: rel.cardinality,
        });
    }
}

// A relationship's candidate inverse is the one declared on its inverse
// entity under its inverse name. Two relationships are bound when each is
// the other's candidate, or when the candidate names no inverse of its own
// and is claimed by exactly one relationship.
fn bind_inverses(graph: &mut SchemaGraph) {
    let candidates: Vec<Option<RelationshipId>> = {
        let by_key: HashMap<(EntityId, &str), RelationshipId> = graph
            .relationships
            .iter()
            .map(|rel| ((rel.owner, rel.name.as_str()), rel.id))
            .collect();
        graph
            .relationships
            .iter()
            .map(|rel| {
                by_key
                    .get(&(rel.inverse_entity, rel.inverse_name.as_str()))
                    .copied()
            })
            .collect()
    };

    let mut claimants = vec![0usize; candidates.len()];
    for candidate in candidates.iter().flatten() {
        claimants[candidate.index()] += 1;
    }

    for (index, candidate) in candidates.iter().enumerate() {
        let Some(other) = *candidate else {
            continue;
        };
        let bound = match candidates[other.index()] {
            Some(back) => back.index() == index,
            None => claimants[other.index()] == 1,
        };
        if bound {
            graph.relationships[index].inverse = Some(other);
            graph.relationships[other.index()].inverse = Some(RelationshipId::new(index));
        }
    }

    for rel in graph.relationships.iter().filter(|rel| rel.inverse.is_none()) {
        debug!(
            relationship = %rel.name,
            inverse = %rel.inverse_name,
            "relationship left one-directional"
        );
    }
}

fn attach_relationships(graph: &mut SchemaGraph) {
    for rel in &graph.relationships {
        graph.entities[rel.owner.index()].declared.push(rel.id);
        if rel.inverse_entity != rel.owner {
            graph.entities[rel.inverse_entity.index()].attached.push(rel.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Cardinality, FieldDef, ScalarType};

    fn parent_child() -> SchemaBuilder {
        let parent = EntityDef::new("Parent")
            .with_field(FieldDef::new("id", ScalarType::Uuid))
            .with_relationship(
                RelationshipDef::to_many("children", "Parent", "Child", "parent")
                    .with_inverse_entity("Child"),
            );
        let child = EntityDef::new("Child")
            .with_field(FieldDef::new("id", ScalarType::Uuid))
            .with_relationship(
                RelationshipDef::to_one("parent", "Child", "Parent", "children")
                    .with_inverse_entity("Parent"),
            );

        SchemaBuilder::new().with_entity(parent).with_entity(child)
    }

    #[test]
    fn test_parent_child_bound_both_ways() {
        let graph = parent_child().build().unwrap();

        let children = graph.find_relationship("Parent", "children").unwrap();
        let parent = graph.find_relationship("Child", "parent").unwrap();

        assert_eq!(children.cardinality, Cardinality::ToMany);
        assert_eq!(parent.cardinality, Cardinality::ToOne);
        assert_eq!(children.inverse, Some(parent.id));
        assert_eq!(parent.inverse, Some(children.id));
        assert_eq!(graph.inverse_of(children.id).unwrap().name, "parent");
    }

    #[test]
    fn test_relationships_attach_to_inverse_entity() {
        let graph = parent_child().build().unwrap();
        let parent = graph.entity("Parent").unwrap();

        let declared: Vec<_> = parent
            .declared
            .iter()
            .map(|id| graph.relationship(*id).unwrap().name.as_str())
            .collect();
        let attached: Vec<_> = parent
            .attached
            .iter()
            .map(|id| graph.relationship(*id).unwrap().name.as_str())
            .collect();

        assert_eq!(declared, ["children"]);
        assert_eq!(attached, ["parent"]);
    }

    #[test]
    fn test_inverse_on_third_entity() {
        // `A.r` points at B, but its inverse `back` lives on C.
        let a = EntityDef::new("A").with_relationship(
            RelationshipDef::to_one("r", "A", "B", "back").with_inverse_entity("C"),
        );
        let c = EntityDef::new("C")
            .with_relationship(RelationshipDef::to_many("back", "C", "A", "r"));
        let graph = SchemaBuilder::new()
            .with_entities([a, EntityDef::new("B"), c])
            .build()
            .unwrap();

        let r = graph.entity("A").unwrap().declared[0];
        let back = graph.entity("C").unwrap().declared[0];

        assert_eq!(graph.relationship(r).unwrap().inverse, Some(back));
        assert_eq!(graph.relationship(back).unwrap().inverse, Some(r));
        assert_eq!(graph.entity("C").unwrap().attached, vec![r]);
        assert!(graph.entity("B").unwrap().attached.is_empty());
        assert_eq!(graph.entity("A").unwrap().attached, vec![back]);
        assert_eq!(
            graph.relationship(r).unwrap().destination,
            graph.entity_id("B").unwrap()
        );
    }

    #[test]
    fn test_unknown_destination_is_dropped() {
        let orphan = EntityDef::new("Orphan")
            .with_relationship(RelationshipDef::to_one("owner", "Orphan", "Ghost", "orphans"));
        let graph = SchemaBuilder::new().with_entity(orphan).build().unwrap();

        assert_eq!(graph.relationship_count(), 0);
        assert!(graph.find_relationship("Orphan", "owner").is_none());
    }

    #[test]
    fn test_unknown_inverse_entity_is_dropped() {
        let a = EntityDef::new("A").with_relationship(
            RelationshipDef::to_one("link", "A", "B", "back").with_inverse_entity("Nowhere"),
        );
        let graph = SchemaBuilder::new()
            .with_entity(a)
            .with_entity(EntityDef::new("B"))
            .build()
            .unwrap();

        assert_eq!(graph.relationship_count(), 0);
    }

    #[test]
    fn test_missing_inverse_stays_one_directional() {
        let a = EntityDef::new("A")
            .with_relationship(RelationshipDef::to_one("linkedTo", "A", "B", "backLink"));
        let graph = SchemaBuilder::new()
            .with_entity(a)
            .with_entity(EntityDef::new("B"))
            .build()
            .unwrap();

        let linked = graph.find_relationship("B", "linkedTo").unwrap();
        assert!(linked.inverse.is_none());
        assert_eq!(graph.entity_name(linked.owner), Some("A"));
    }

    #[test]
    fn test_one_sided_declaration_binds_single_claimant() {
        // `tags` names `owner` as its inverse; `owner` names an inverse that does not exist.
        let post = EntityDef::new("Post")
            .with_relationship(RelationshipDef::to_many("tags", "Post", "Tag", "owner"));
        let tag = EntityDef::new("Tag")
            .with_relationship(RelationshipDef::to_one("owner", "Tag", "Post", "missing"));
        let graph = SchemaBuilder::new()
            .with_entities([post, tag])
            .build()
            .unwrap();

        let tags = graph.find_relationship("Post", "tags").unwrap();
        let owner = graph.find_relationship("Tag", "owner").unwrap();
        assert_eq!(tags.inverse, Some(owner.id));
        assert_eq!(owner.inverse, Some(tags.id));
    }

    #[test]
    fn test_contested_inverse_is_not_bound() {
        // A.x and B.y both claim C.target, which names no inverse of its own.
        let a = EntityDef::new("A")
            .with_relationship(RelationshipDef::to_one("x", "A", "C", "target"));
        let b = EntityDef::new("B")
            .with_relationship(RelationshipDef::to_one("y", "B", "C", "target"));
        let c = EntityDef::new("C")
            .with_relationship(RelationshipDef::to_many("target", "C", "A", "unknown"));
        let graph = SchemaBuilder::new()
            .with_entities([a, b, c])
            .build()
            .unwrap();

        assert!(graph.iter_relationships().all(|rel| rel.inverse.is_none()));
    }

    #[test]
    fn test_same_name_on_different_entities_does_not_collide() {
        let author = EntityDef::new("Author")
            .with_relationship(RelationshipDef::to_many("items", "Author", "Book", "author"));
        let book = EntityDef::new("Book")
            .with_relationship(RelationshipDef::to_one("author", "Book", "Author", "items"));
        let shelf = EntityDef::new("Shelf")
            .with_relationship(RelationshipDef::to_many("items", "Shelf", "Book", "shelf"));
        let graph = SchemaBuilder::new()
            .with_entities([author, book, shelf])
            .build()
            .unwrap();

        let author_items = graph.find_relationship("Author", "items").unwrap();
        let book_author = graph.find_relationship("Book", "author").unwrap();
        let shelf_items = graph.find_relationship("Shelf", "items").unwrap();

        assert_eq!(book_author.inverse, Some(author_items.id));
        assert_eq!(author_items.inverse, Some(book_author.id));
        assert!(shelf_items.inverse.is_none());
    }

    #[test]
    fn test_self_inverse_relationship() {
        let person = EntityDef::new("Person")
            .with_relationship(RelationshipDef::to_many("friends", "Person", "Person", "friends"));
        let graph = SchemaBuilder::new().with_entity(person).build().unwrap();

        let friends = graph.find_relationship("Person", "friends").unwrap();
        assert_eq!(friends.inverse, Some(friends.id));
        assert!(graph.entity("Person").unwrap().attached.is_empty());
    }

    #[test]
    fn test_free_standing_declarations() {
        let graph = SchemaBuilder::new()
            .with_entities([EntityDef::new("Item"), EntityDef::new("Child")])
            .with_relationships([
                RelationshipDef::to_many("children", "Item", "Child", "parent"),
                RelationshipDef::to_one("parent", "Child", "Item", "children"),
                RelationshipDef::to_one("stray", "Unknown", "Item", "children"),
            ])
            .build()
            .unwrap();

        assert_eq!(graph.relationship_count(), 2);
        let children = graph.find_relationship("Item", "children").unwrap();
        assert!(children.is_bidirectional());
    }

    #[test]
    fn test_empty_input_builds_empty_graph() {
        let graph = SchemaBuilder::new().build().unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.relationship_count(), 0);
    }

    #[test]
    fn test_build_is_repeatable() {
        let builder = parent_child();
        assert_eq!(builder.build().unwrap(), builder.build().unwrap());
    }

    #[test]
    fn test_empty_entity_name_rejected() {
        let err = SchemaBuilder::new()
            .with_entity(EntityDef::new(""))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyEntityName);
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let err = SchemaBuilder::new()
            .with_entities([EntityDef::new("Item"), EntityDef::new("Item")])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateEntity("Item".into()));
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let item = EntityDef::new("Item")
            .with_field(FieldDef::new("children", ScalarType::Int32))
            .with_relationship(RelationshipDef::to_many("children", "Item", "Item", "parent"));
        let err = SchemaBuilder::new().with_entity(item).build().unwrap_err();

        assert_eq!(
            err,
            SchemaError::DuplicateProperty {
                entity: "Item".into(),
                name: "children".into(),
            }
        );
    }

    #[test]
    fn test_owner_mismatch_rejected() {
        let item = EntityDef::new("Item")
            .with_relationship(RelationshipDef::to_many("children", "Other", "Item", "parent"));
        let err = SchemaBuilder::new().with_entity(item).build().unwrap_err();

        assert!(matches!(err, SchemaError::OwnerMismatch { .. }));
    }

    #[test]
    fn test_empty_names_rejected() {
        let err = SchemaBuilder::new()
            .with_entity(EntityDef::new("Item").with_field(FieldDef::new("", ScalarType::Bool)))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyFieldName { .. }));

        let err = SchemaBuilder::new()
            .with_entity(
                EntityDef::new("Item")
                    .with_relationship(RelationshipDef::to_one("", "Item", "Item", "x")),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyRelationshipName { .. }));
    }
}
