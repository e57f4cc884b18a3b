//! Schema resolution.
//!
//! [`SchemaBuilder`] turns entity definitions and name-addressed relationship
//! declarations into a [`SchemaGraph`] in two passes: index everything by
//! name, then link destinations and inverses through arena handles.

mod builder;
mod graph;

pub use builder::SchemaBuilder;
pub use graph::{EntityId, RelationshipId, ResolvedEntity, ResolvedRelationship, SchemaGraph};
