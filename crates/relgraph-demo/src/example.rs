//! The example schema and the steps the demo runs against it.

use crate::config::DemoConfig;
use crate::error::Error;
use relgraph_core::storage::key::{current_timestamp, generate_id};
use relgraph_core::{
    AttributeType, EntityDef, EntitySpec, FieldDef, Record, RecordId, RelationshipDef, ScalarType,
    SchemaBuilder, SchemaGraph, Store, Value,
};
use std::path::Path;
use tracing::info;

/// The built-in `Item`/`Child` schema.
pub fn example_entities() -> Vec<EntityDef> {
    let item = EntityDef::new("Item")
        .with_field(FieldDef::new("id", ScalarType::Uuid))
        .with_field(FieldDef::new("timestamp", ScalarType::Date))
        .with_relationship(RelationshipDef::to_many("children", "Item", "Child", "parent"));

    let child = EntityDef::new("Child")
        .with_field(FieldDef::new("id", ScalarType::Uuid))
        .with_field(FieldDef::new("timestamp", ScalarType::Date))
        .with_relationship(
            RelationshipDef::to_one("parent", "Child", "Item", "children").required(),
        );

    vec![item, child]
}

/// Read entity declarations from a JSON file.
pub fn load_entities(path: &Path) -> Result<Vec<EntityDef>, Error> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Build the schema graph the demo opens its store against.
pub fn build_graph(config: &DemoConfig) -> Result<SchemaGraph, Error> {
    let entities = match &config.schema_path {
        Some(path) => load_entities(path)?,
        None => example_entities(),
    };
    Ok(SchemaBuilder::new().with_entities(entities).build()?)
}

/// Insert `count` records of the first entity that needs no relationships.
///
/// Required attributes get placeholder values; returns the seeded IDs.
pub fn seed(store: &Store, count: usize) -> Result<Vec<RecordId>, Error> {
    let Some(spec) = store
        .model()
        .entities
        .iter()
        .find(|e| e.relationships.iter().all(|r| r.optional))
    else {
        return Ok(Vec::new());
    };

    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(store.insert(placeholder_record(spec))?);
    }
    store.flush()?;

    info!(entity = %spec.name, count, "seeded preview records");
    Ok(ids)
}

fn placeholder_record(spec: &EntitySpec) -> Record {
    let id = generate_id();
    spec.attributes
        .iter()
        .filter(|attr| !attr.optional)
        .fold(Record::with_id(spec.name.as_str(), id), |record, attr| {
            record.set(attr.name.as_str(), placeholder(attr.attribute_type, id))
        })
}

fn placeholder(attribute_type: AttributeType, id: RecordId) -> Value {
    match attribute_type {
        AttributeType::Date => Value::Date(current_timestamp() as i64),
        AttributeType::Uuid => Value::Uuid(id),
        AttributeType::Uri => Value::Url(String::new()),
        AttributeType::BinaryData => Value::Bytes(Vec::new()),
        AttributeType::Boolean => Value::Bool(false),
        AttributeType::String => Value::String(String::new()),
        AttributeType::Float => Value::Float32(0.0),
        AttributeType::Double => Value::Float64(0.0),
        AttributeType::Integer16 => Value::Int16(0),
        AttributeType::Integer32 => Value::Int32(0),
        AttributeType::Integer64 => Value::Int64(0),
    }
}

/// Describe every entity and its navigable relationships, one line each.
pub fn describe(graph: &SchemaGraph) -> Vec<String> {
    graph
        .iter()
        .map(|entity| {
            let relationships: Vec<String> = entity
                .relationships()
                .filter_map(|id| graph.relationship(id))
                .map(|rel| {
                    let inverse = graph
                        .inverse_of(rel.id)
                        .map(|inv| inv.name.as_str())
                        .unwrap_or("-");
                    format!(
                        "{} -> {} ({:?}, inverse {})",
                        rel.name,
                        graph.entity_name(rel.destination).unwrap_or("?"),
                        rel.cardinality,
                        inverse
                    )
                })
                .collect();
            format!(
                "{}: {} field(s); {}",
                entity.name,
                entity.fields.len(),
                relationships.join(", ")
            )
        })
        .collect()
}

/// Build the graph, open the store, seed it, and return the record count per entity.
pub fn run(config: &DemoConfig) -> Result<Vec<(String, usize)>, Error> {
    let graph = build_graph(config)?;
    for line in describe(&graph) {
        info!("{line}");
    }

    let store = Store::open(config.store_name.as_str(), &graph, config.store.clone())?;
    seed(&store, config.seed)?;

    store
        .model()
        .entities
        .iter()
        .map(|entity| -> Result<_, Error> {
            Ok((entity.name.clone(), store.count(&entity.name)?))
        })
        .collect()
}
