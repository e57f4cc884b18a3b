//! Core error types.

use thiserror::Error;

/// Malformed schema input. Aborts a build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An entity was declared without a name.
    #[error("entity name must not be empty")]
    EmptyEntityName,

    /// Two entities share a name.
    #[error("duplicate entity '{0}'")]
    DuplicateEntity(String),

    /// A field was declared without a name.
    #[error("entity '{entity}' declares a field with an empty name")]
    EmptyFieldName {
        /// Declaring entity.
        entity: String,
    },

    /// A relationship was declared without a name.
    #[error("entity '{entity}' declares a relationship with an empty name")]
    EmptyRelationshipName {
        /// Declaring entity.
        entity: String,
    },

    /// A field or relationship name is used twice within one entity.
    #[error("entity '{entity}' declares '{name}' more than once")]
    DuplicateProperty {
        /// Declaring entity.
        entity: String,
        /// Repeated property name.
        name: String,
    },

    /// A relationship carried by an entity names a different owner.
    #[error("relationship '{relationship}' is carried by '{entity}' but owned by '{owner}'")]
    OwnerMismatch {
        /// Entity carrying the declaration.
        entity: String,
        /// Relationship name.
        relationship: String,
        /// Owner named in the declaration.
        owner: String,
    },
}

/// Store-level errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Schema could not be built.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key decoding error.
    #[error("invalid key format")]
    InvalidKey,

    /// Entity is not part of the store's model.
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    /// Record does not satisfy the store's model.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
