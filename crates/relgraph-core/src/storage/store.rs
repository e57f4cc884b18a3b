//! Embedded record store opened against a resolved schema.

use super::key::{decode_record_id, entity_prefix, format_id, record_key, RecordId};
use super::{EntitySpec, Record, StorageModel, StoreConfig, Value};
use crate::error::Error;
use crate::schema::SchemaGraph;
use sled::{Batch, Db, Tree};
use tracing::{debug, info, warn};

/// Meta key holding the serialized storage model.
const MODEL_KEY: &[u8] = b"model";

/// Meta key holding the model fingerprint.
const FINGERPRINT_KEY: &[u8] = b"fingerprint";

/// A named record store backed by sled.
///
/// The store is an ordinary owned handle: open one per session and pass it
/// to whatever needs it.
pub struct Store {
    /// Store name, used to namespace its trees.
    name: String,
    /// The underlying sled database.
    db: Db,
    /// Records keyed by entity name and record ID.
    records: Tree,
    /// Persisted model and fingerprint.
    meta: Tree,
    /// Model records are validated against.
    model: StorageModel,
    /// BLAKE3 fingerprint of `model`.
    fingerprint: [u8; 32],
}

impl Store {
    /// Open (or create) the store named `name` using the given schema.
    pub fn open(
        name: impl Into<String>,
        graph: &SchemaGraph,
        config: StoreConfig,
    ) -> Result<Self, Error> {
        Self::open_model(name, graph.to_storage_model(), config)
    }

    /// Open (or create) the store named `name` using an already lowered model.
    ///
    /// When the persisted model differs from `model` the new one replaces it.
    /// Existing records are left as they are.
    pub fn open_model(
        name: impl Into<String>,
        model: StorageModel,
        config: StoreConfig,
    ) -> Result<Self, Error> {
        let name = name.into();
        let db = config.to_sled_config().open()?;
        let records = db.open_tree(format!("{name}:records"))?;
        let meta = db.open_tree(format!("{name}:meta"))?;

        let fingerprint = model.fingerprint()?;
        match meta.get(FINGERPRINT_KEY)? {
            Some(stored) if stored.as_ref() == fingerprint.as_slice() => {}
            Some(stored) => {
                warn!(
                    store = %name,
                    previous = %hex::encode(&stored),
                    current = %hex::encode(fingerprint),
                    "schema changed since last open, replacing stored model"
                );
                persist_model(&meta, &model, &fingerprint)?;
            }
            None => persist_model(&meta, &model, &fingerprint)?,
        }

        info!(
            store = %name,
            entities = model.entities.len(),
            temporary = config.temporary,
            fingerprint = %hex::encode(fingerprint),
            "store opened"
        );

        Ok(Self {
            name,
            db,
            records,
            meta,
            model,
            fingerprint,
        })
    }

    /// Store name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model the store validates against.
    pub fn model(&self) -> &StorageModel {
        &self.model
    }

    /// Fingerprint of the current model.
    pub fn fingerprint(&self) -> [u8; 32] {
        self.fingerprint
    }

    /// Read the model persisted in the store's metadata.
    pub fn stored_model(&self) -> Result<Option<StorageModel>, Error> {
        match self.meta.get(MODEL_KEY)? {
            Some(bytes) => Ok(Some(StorageModel::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Insert a new record. Fails if a record with the same ID exists.
    pub fn insert(&self, record: Record) -> Result<RecordId, Error> {
        self.validate(&record)?;
        let key = record_key(&record.entity, &record.id);
        if self.records.contains_key(&key)? {
            return Err(Error::InvalidRecord(format!(
                "{} {} already exists",
                record.entity,
                format_id(&record.id)
            )));
        }
        self.records.insert(key, record.to_bytes()?)?;
        Ok(record.id)
    }

    /// Insert or replace a record.
    pub fn save(&self, record: &Record) -> Result<(), Error> {
        self.validate(record)?;
        let key = record_key(&record.entity, &record.id);
        self.records.insert(key, record.to_bytes()?)?;
        Ok(())
    }

    /// Get a record by ID.
    pub fn get(&self, entity: &str, id: &RecordId) -> Result<Option<Record>, Error> {
        self.entity_spec(entity)?;
        match self.records.get(record_key(entity, id))? {
            Some(bytes) => Ok(Some(Record::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// List every record of an entity.
    pub fn list(&self, entity: &str) -> Result<Vec<Record>, Error> {
        self.filter(entity, |_| true, None)
    }

    /// Records of an entity matching `predicate`, up to `limit` of them.
    pub fn filter<P>(
        &self,
        entity: &str,
        predicate: P,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, Error>
    where
        P: Fn(&Record) -> bool,
    {
        self.entity_spec(entity)?;

        let mut matched = Vec::new();
        if limit == Some(0) {
            return Ok(matched);
        }

        for result in self.records.scan_prefix(entity_prefix(entity)) {
            let (_, bytes) = result?;
            let record = Record::from_bytes(&bytes)?;
            if predicate(&record) {
                matched.push(record);
                if limit.is_some_and(|limit| matched.len() >= limit) {
                    break;
                }
            }
        }

        Ok(matched)
    }

    /// First record of an entity matching `predicate`.
    pub fn find<P>(&self, entity: &str, predicate: P) -> Result<Option<Record>, Error>
    where
        P: Fn(&Record) -> bool,
    {
        Ok(self.filter(entity, predicate, Some(1))?.into_iter().next())
    }

    /// Number of records of an entity.
    pub fn count(&self, entity: &str) -> Result<usize, Error> {
        self.entity_spec(entity)?;
        let mut count = 0;
        for result in self.records.scan_prefix(entity_prefix(entity)) {
            result?;
            count += 1;
        }
        Ok(count)
    }

    /// IDs of every record of an entity.
    pub fn ids(&self, entity: &str) -> Result<Vec<RecordId>, Error> {
        self.entity_spec(entity)?;
        self.records
            .scan_prefix(entity_prefix(entity))
            .map(|result| {
                let (key, _) = result?;
                decode_record_id(entity, &key).ok_or(Error::InvalidKey)
            })
            .collect()
    }

    /// Delete a record, flushing afterwards when `save` is set.
    ///
    /// Returns whether a record was removed.
    pub fn delete(&self, entity: &str, id: &RecordId, save: bool) -> Result<bool, Error> {
        self.entity_spec(entity)?;
        let removed = self.records.remove(record_key(entity, id))?.is_some();
        debug!(store = %self.name, entity, id = %format_id(id), removed, "delete");
        if save {
            self.flush()?;
        }
        Ok(removed)
    }

    /// Delete every record of an entity and flush. Returns the number removed.
    pub fn clear(&self, entity: &str) -> Result<usize, Error> {
        self.entity_spec(entity)?;

        let mut batch = Batch::default();
        let mut removed = 0;
        for result in self.records.scan_prefix(entity_prefix(entity)) {
            let (key, _) = result?;
            batch.remove(key);
            removed += 1;
        }
        self.records.apply_batch(batch)?;
        self.flush()?;

        debug!(store = %self.name, entity, removed, "cleared entity");
        Ok(removed)
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    fn entity_spec(&self, entity: &str) -> Result<&EntitySpec, Error> {
        self.model
            .entity(entity)
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))
    }

    fn validate(&self, record: &Record) -> Result<(), Error> {
        let spec = self.entity_spec(&record.entity)?;

        if let Some(name) = record.values.keys().find(|name| spec.attribute(name).is_none()) {
            return Err(Error::InvalidRecord(format!(
                "{} has no attribute '{}'",
                spec.name, name
            )));
        }
        for attr in &spec.attributes {
            match record.values.get(&attr.name) {
                None | Some(Value::Null) if !attr.optional => {
                    return Err(Error::InvalidRecord(format!(
                        "{}.{} is required",
                        spec.name, attr.name
                    )));
                }
                Some(value) if !value.fits(attr.attribute_type) => {
                    return Err(Error::InvalidRecord(format!(
                        "{}.{} expects {:?}",
                        spec.name, attr.name, attr.attribute_type
                    )));
                }
                _ => {}
            }
        }

        if let Some(name) = record.links.keys().find(|name| spec.relationship(name).is_none()) {
            return Err(Error::InvalidRecord(format!(
                "{} has no relationship '{}'",
                spec.name, name
            )));
        }
        for rel in &spec.relationships {
            let count = record.targets(&rel.name).len();
            if rel.max_count.is_some_and(|max| count > max as usize) {
                return Err(Error::InvalidRecord(format!(
                    "{}.{} holds at most {} target(s)",
                    spec.name,
                    rel.name,
                    rel.max_count.unwrap_or_default()
                )));
            }
            if !rel.optional && count == 0 {
                return Err(Error::InvalidRecord(format!(
                    "{}.{} is required",
                    spec.name, rel.name
                )));
            }
        }

        Ok(())
    }
}

fn persist_model(meta: &Tree, model: &StorageModel, fingerprint: &[u8; 32]) -> Result<(), Error> {
    let mut batch = Batch::default();
    batch.insert(MODEL_KEY, model.to_bytes()?);
    batch.insert(FINGERPRINT_KEY, fingerprint.as_slice());
    meta.apply_batch(batch)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, FieldDef, RelationshipDef, ScalarType};
    use crate::schema::SchemaBuilder;
    use crate::storage::key::generate_id;

    fn item_child_graph() -> SchemaGraph {
        let item = EntityDef::new("Item")
            .with_field(FieldDef::new("id", ScalarType::Uuid))
            .with_field(FieldDef::new("timestamp", ScalarType::Date))
            .with_field(FieldDef::optional("label", ScalarType::String))
            .with_relationship(RelationshipDef::to_many("children", "Item", "Child", "parent"));
        let child = EntityDef::new("Child")
            .with_field(FieldDef::new("id", ScalarType::Uuid))
            .with_relationship(
                RelationshipDef::to_one("parent", "Child", "Item", "children").required(),
            );

        SchemaBuilder::new()
            .with_entities([item, child])
            .build()
            .unwrap()
    }

    fn test_store() -> Store {
        Store::open("Test", &item_child_graph(), StoreConfig::temporary()).unwrap()
    }

    fn item(label: &str) -> Record {
        let id = generate_id();
        Record::with_id("Item", id)
            .set("id", id)
            .set("timestamp", Value::Date(1_700_000_000_000_000))
            .set("label", label)
    }

    #[test]
    fn test_insert_and_get() {
        let store = test_store();
        let record = item("first");
        let id = store.insert(record.clone()).unwrap();

        assert_eq!(store.get("Item", &id).unwrap(), Some(record));
        assert_eq!(store.count("Item").unwrap(), 1);
        assert_eq!(store.ids("Item").unwrap(), vec![id]);
    }

    #[test]
    fn test_insert_twice_fails() {
        let store = test_store();
        let record = item("first");
        store.insert(record.clone()).unwrap();

        assert!(matches!(store.insert(record), Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_save_replaces() {
        let store = test_store();
        let record = item("first");
        store.insert(record.clone()).unwrap();

        let updated = record.clone().set("label", "second");
        store.save(&updated).unwrap();

        let stored = store.get("Item", &record.id).unwrap().unwrap();
        assert_eq!(stored.get("label").and_then(Value::as_str), Some("second"));
        assert_eq!(store.count("Item").unwrap(), 1);
    }

    #[test]
    fn test_validation() {
        let store = test_store();

        let missing = Record::new("Item").set("id", generate_id());
        assert!(matches!(store.insert(missing), Err(Error::InvalidRecord(_))));

        let wrong_type = item("x").set("timestamp", 5i64);
        assert!(matches!(store.insert(wrong_type), Err(Error::InvalidRecord(_))));

        let unknown_attr = item("x").set("color", "red");
        assert!(matches!(store.insert(unknown_attr), Err(Error::InvalidRecord(_))));

        let unknown_entity = Record::new("Ghost");
        assert!(matches!(store.insert(unknown_entity), Err(Error::UnknownEntity(_))));

        let optional_null = item("x").set("label", Value::Null);
        assert!(store.insert(optional_null).is_ok());
    }

    #[test]
    fn test_relationship_validation() {
        let store = test_store();
        let parent = store.insert(item("parent")).unwrap();

        let orphan = Record::new("Child").set("id", generate_id());
        assert!(matches!(store.insert(orphan), Err(Error::InvalidRecord(_))));

        let two_parents = Record::new("Child")
            .set("id", generate_id())
            .link("parent", parent)
            .link("parent", generate_id());
        assert!(matches!(store.insert(two_parents), Err(Error::InvalidRecord(_))));

        let child = Record::new("Child").set("id", generate_id()).link("parent", parent);
        assert!(store.insert(child).is_ok());
    }

    #[test]
    fn test_filter_find_and_limit() {
        let store = test_store();
        for label in ["a", "b", "c", "b"] {
            store.insert(item(label)).unwrap();
        }

        let is_b = |r: &Record| r.get("label").and_then(Value::as_str) == Some("b");
        assert_eq!(store.list("Item").unwrap().len(), 4);
        assert_eq!(store.filter("Item", is_b, None).unwrap().len(), 2);
        assert_eq!(store.filter("Item", is_b, Some(1)).unwrap().len(), 1);
        assert!(store.filter("Item", |_| true, Some(0)).unwrap().is_empty());
        assert!(store.find("Item", is_b).unwrap().is_some());
        assert!(store.find("Item", |_| false).unwrap().is_none());
        assert!(store.list("Child").unwrap().is_empty());
    }

    #[test]
    fn test_delete_and_clear() {
        let store = test_store();
        let id = store.insert(item("a")).unwrap();
        store.insert(item("b")).unwrap();

        assert!(store.delete("Item", &id, true).unwrap());
        assert!(!store.delete("Item", &id, false).unwrap());
        assert_eq!(store.count("Item").unwrap(), 1);

        assert_eq!(store.clear("Item").unwrap(), 1);
        assert!(store.list("Item").unwrap().is_empty());
    }

    #[test]
    fn test_entity_names_sharing_a_prefix_stay_isolated() {
        let graph = SchemaBuilder::new()
            .with_entities([EntityDef::new("A"), EntityDef::new("A\0B")])
            .build()
            .unwrap();
        let store = Store::open("Prefix", &graph, StoreConfig::temporary()).unwrap();
        let id = store.insert(Record::new("A\0B")).unwrap();

        assert!(store.list("A").unwrap().is_empty());
        assert!(store.ids("A").unwrap().is_empty());
        assert_eq!(store.count("A").unwrap(), 0);
        assert_eq!(store.clear("A").unwrap(), 0);
        assert_eq!(store.ids("A\0B").unwrap(), vec![id]);
        assert_eq!(store.count("A\0B").unwrap(), 1);
    }

    #[test]
    fn test_unknown_entity_queries() {
        let store = test_store();
        assert!(matches!(store.list("Ghost"), Err(Error::UnknownEntity(_))));
        assert!(matches!(store.clear("Ghost"), Err(Error::UnknownEntity(_))));
    }

    #[test]
    fn test_model_is_persisted() {
        let store = test_store();
        assert_eq!(store.stored_model().unwrap().as_ref(), Some(store.model()));
        assert_eq!(store.name(), "Test");
    }
}
