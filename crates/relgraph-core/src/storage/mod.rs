//! Storage layer for relgraph.
//!
//! This module holds the engine-facing schema description and a sled-based
//! record store that is opened against it.

mod config;
mod record;
mod spec;
mod store;
mod value;

pub mod key;

pub use config::StoreConfig;
pub use key::RecordId;
pub use record::Record;
pub use spec::{AttributeSpec, AttributeType, EntitySpec, RelationshipSpec, StorageModel};
pub use store::Store;
pub use value::Value;
