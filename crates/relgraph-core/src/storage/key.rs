//! Record key encoding.
//!
//! Key format: `[name length (8 bytes, BE)][entity name][record id (16 bytes)]`.
//! The length prefix keeps one entity's records contiguous, so a prefix scan
//! lists exactly that entity whatever bytes the name contains.

/// Size of a record ID in bytes (UUID).
pub const RECORD_ID_SIZE: usize = 16;

/// Size of the entity name length prefix.
const NAME_LEN_SIZE: usize = 8;

/// Identifier of a stored record.
pub type RecordId = [u8; RECORD_ID_SIZE];

/// Encode the key for a record.
pub fn record_key(entity: &str, id: &RecordId) -> Vec<u8> {
    let mut key = entity_prefix(entity);
    key.extend_from_slice(id);
    key
}

/// Prefix shared by every record of an entity.
pub fn entity_prefix(entity: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(NAME_LEN_SIZE + entity.len() + RECORD_ID_SIZE);
    prefix.extend_from_slice(&(entity.len() as u64).to_be_bytes());
    prefix.extend_from_slice(entity.as_bytes());
    prefix
}

/// Extract the record ID from an encoded key.
pub fn decode_record_id(entity: &str, key: &[u8]) -> Option<RecordId> {
    let rest = key.strip_prefix(entity_prefix(entity).as_slice())?;
    rest.try_into().ok()
}

/// Generate a new record ID (UUID v4 layout).
pub fn generate_id() -> RecordId {
    use std::sync::atomic::{AtomicU64, Ordering};

    // Counter to ensure uniqueness even with same timestamp
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let now = current_timestamp();
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

    let mut id = [0u8; RECORD_ID_SIZE];
    id[..8].copy_from_slice(&now.to_le_bytes());
    id[8..].copy_from_slice(&counter.to_le_bytes());

    id[6] = (id[6] & 0x0f) | 0x40;
    id[8] = (id[8] & 0x3f) | 0x80;

    id
}

/// Hex rendering of a record ID.
pub fn format_id(id: &RecordId) -> String {
    hex::encode(id)
}

/// Get current timestamp in microseconds since Unix epoch.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_decodes_back_to_id() {
        let id = generate_id();
        let key = record_key("Item", &id);

        assert!(key.starts_with(&entity_prefix("Item")));
        assert_eq!(decode_record_id("Item", &key), Some(id));
        assert_eq!(decode_record_id("Items", &key), None);
    }

    #[test]
    fn test_prefix_separates_entities() {
        let id = [0xffu8; RECORD_ID_SIZE];
        // "Item" records must not fall under the "It" prefix.
        assert!(!record_key("Item", &id).starts_with(&entity_prefix("It")));
        assert!(!record_key("A\0B", &id).starts_with(&entity_prefix("A")));
        assert_eq!(decode_record_id("A", &record_key("A\0B", &id)), None);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a[6] & 0xf0, 0x40);
        assert_eq!(format_id(&a).len(), 32);
    }
}
