//! relgraph core - entity catalog, relationship resolution, and record storage.
//!
//! Entities are declared with [`EntityDef`], resolved into a cross-linked
//! [`SchemaGraph`] by [`SchemaBuilder`], and handed to a [`Store`].

pub mod catalog;
pub mod error;
pub mod schema;
pub mod storage;

pub use catalog::{Cardinality, EntityDef, EntityField, FieldDef, RelationshipDef, ScalarType};
pub use error::{Error, SchemaError};
pub use schema::{
    EntityId, RelationshipId, ResolvedEntity, ResolvedRelationship, SchemaBuilder, SchemaGraph,
};
pub use storage::{
    AttributeSpec, AttributeType, EntitySpec, Record, RecordId, RelationshipSpec, StorageModel,
    Store, StoreConfig, Value,
};
