//! Field catalog for relgraph.
//!
//! The catalog holds the static shape of each entity: scalar fields and
//! relationship declarations addressed by entity name. It performs no
//! resolution; see [`crate::schema`] for that.

mod entity;
mod field;
mod relation;
mod types;

pub use entity::EntityDef;
pub use field::{EntityField, FieldDef};
pub use relation::{Cardinality, RelationshipDef};
pub use types::ScalarType;
