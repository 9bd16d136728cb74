//! Error types and result types for table construction and queries.
//!
//! Construction errors abort the whole table: no partially built table is ever returned.
//! Query-time "not found" outcomes are expressed as `None` or empty results, so every
//! variant here is either a broken source or a caller mistake.
//! Use [`TableResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when building or querying a table.
#[derive(Error, Debug)]
pub enum TableError {
    /// The declarative source could not be located.
    #[error("Record source not found: {0}")]
    SourceNotFound(String),
    /// The declarative source exists but could not be read or parsed.
    #[error("Record source error: {0}")]
    Source(String),
    /// Serialization/deserialization error when converting between BSON and JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Two records share the same primary key value.
    #[error("Duplicate primary key {key} in table {table}")]
    DuplicateKey {
        /// The table being built.
        table: String,
        /// The repeated key value.
        key: String,
    },
    /// A record has no value for the primary key property.
    #[error("Record {position} in table {table} has no value for primary key {property}")]
    MissingKey {
        /// The table being built.
        table: String,
        /// The primary key property.
        property: String,
        /// Position of the offending record in the source.
        position: usize,
    },
    /// A record's primary key value cannot be used as a key (null, array, document, NaN).
    #[error("Record {position} in table {table} has an unusable primary key value {value}")]
    InvalidKey {
        /// The table being built.
        table: String,
        /// Position of the offending record in the source.
        position: usize,
        /// The rejected value, rendered for diagnostics.
        value: String,
    },
    /// The object factory rejected a record.
    #[error("Invalid record {position} in table {table}: {reason}")]
    InvalidRecord {
        /// The table being built.
        table: String,
        /// Position of the offending record in the source.
        position: usize,
        /// Why the factory failed.
        reason: String,
    },
    /// A query referenced an index that was never registered.
    #[error("Unknown index {index} on table {table}")]
    UnknownIndex {
        /// The queried table.
        table: String,
        /// The requested index name.
        index: String,
    },
    /// A query referenced a relationship that was never registered.
    #[error("Unknown relationship {relationship} on table {table}")]
    UnknownRelationship {
        /// The queried table.
        table: String,
        /// The requested relationship name.
        relationship: String,
    },
    /// A predicate, sort key or join key names a property the record type does not expose.
    #[error("Unknown property {property} on table {table}")]
    UnknownProperty {
        /// The table whose record type was checked.
        table: String,
        /// The offending property name.
        property: String,
    },
    /// An index cannot order the values found under one of its sort keys.
    #[error("Index {index} cannot order values of property {property}: {reason}")]
    IncomparableValues {
        /// The index being built.
        index: String,
        /// The sort key property.
        property: String,
        /// Which values clashed.
        reason: String,
    },
    /// An index was registered with an unusable sort specification.
    #[error("Invalid sort specification for index {0}")]
    InvalidSort(String),
    /// A relationship was resolved with a different target type than it was registered with.
    #[error("Relationship {relationship} targets table {target}, which does not hold the requested type")]
    RelationshipTypeMismatch {
        /// The relationship name.
        relationship: String,
        /// The registered target table.
        target: String,
    },
}

/// A specialized `Result` type for table operations.
pub type TableResult<T> = Result<T, TableError>;

impl From<BsonError> for TableError {
    fn from(err: BsonError) -> Self {
        TableError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for TableError {
    fn from(err: SerdeJsonError) -> Self {
        TableError::Source(err.to_string())
    }
}
