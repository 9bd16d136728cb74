//! The immutable, keyed, in-memory table.
//!
//! A [`Table`] is built once from a [`RecordSource`] and never changes afterwards, apart
//! from registering indexes and relationships before it is shared. Once built it can be
//! wrapped in an `Arc` and queried from any number of threads without locking.

use std::{
    any::Any,
    collections::{HashMap, hash_map::Entry},
    marker::PhantomData,
    path::Path,
    sync::Arc,
};

use bson::Bson;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use tablelayer_core::{
    error::{TableError, TableResult},
    factory::{DeserializeFactory, RecordFactory},
    options::{DuplicateKeyPolicy, TableOptions},
    query::{Expr, SortKey, SortSpec},
    record::Record,
    source::{FileSource, RecordSource, ResourceBundle},
};

use crate::{
    evaluator::{RecordEvaluator, values_equal},
    index::Index,
    key::KeyValue,
    relationship::Relationship,
};


/// An immutable table of records keyed by a primary key property.
///
/// Records keep the order of the source they were read from. Every query that does not
/// name an index returns records in that order.
///
/// # Example
///
/// ```ignore
/// use tablelayer::prelude::*;
///
/// let mut ranks = Table::<Rank>::from_file("resources/ranks.json", "id")?;
/// ranks.add_index("by_grade", "grade", true)?;
///
/// let officers = ranks.find_all_using_predicate_sorted_by(
///     &Filter::gte("grade", 5),
///     "by_grade",
/// )?;
/// ```
#[derive(Debug)]
pub struct Table<T: Record> {
    name: String,
    primary_key: String,
    records: Vec<T>,
    keys: HashMap<KeyValue, usize>,
    indexes: HashMap<String, Index>,
    relationships: HashMap<String, Relationship>,
}

impl<T: Record> Table<T> {
    /// Creates a builder for a table keyed by `primary_key`.
    pub fn builder(primary_key: impl Into<String>) -> TableBuilder<T> {
        TableBuilder::new(primary_key)
    }

    /// Builds a table from a record source, deserializing every record with serde.
    ///
    /// # Errors
    ///
    /// See [`TableBuilder::build_with`].
    pub fn from_source<S: RecordSource>(source: S, primary_key: &str) -> TableResult<Self>
    where
        T: DeserializeOwned,
    {
        TableBuilder::new(primary_key).build(source)
    }

    /// Builds a table from a record source using a caller supplied factory.
    pub fn with_factory<S, F>(source: S, factory: F, primary_key: &str) -> TableResult<Self>
    where
        S: RecordSource,
        F: RecordFactory<T>,
    {
        TableBuilder::new(primary_key).build_with(source, factory)
    }

    /// Builds a table from a JSON or BSON file.
    pub fn from_file(path: impl AsRef<Path>, primary_key: &str) -> TableResult<Self>
    where
        T: DeserializeOwned,
    {
        Self::from_source(FileSource::open(path.as_ref()), primary_key)
    }

    /// Builds a table from the file named after [`Record::table_name`] inside a resource bundle.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::SourceNotFound`] if the bundle holds no file for this type.
    pub fn from_bundle(bundle: &ResourceBundle, primary_key: &str) -> TableResult<Self>
    where
        T: DeserializeOwned,
    {
        Self::from_source(bundle.locate(T::table_name())?, primary_key)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record, in insertion order.
    pub fn all(&self) -> &[T] {
        &self.records
    }

    /// Whether a record with this primary key value exists.
    pub fn contains_key(&self, value: impl Into<Bson>) -> bool {
        self.find_by_primary_key_value(value).is_some()
    }

    /// Names of the registered indexes, sorted.
    pub fn index_names(&self) -> Vec<&str> {
        let mut names = self.indexes.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Names of the registered relationships, sorted.
    pub fn relationship_names(&self) -> Vec<&str> {
        let mut names = self.relationships.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Returns a registered index.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownIndex`] if no index was registered under `name`.
    pub fn index(&self, name: &str) -> TableResult<&Index> {
        self.indexes
            .get(name)
            .ok_or_else(|| TableError::UnknownIndex {
                table: self.name.clone(),
                index: name.to_string(),
            })
    }

    /// Returns a registered relationship.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownRelationship`] if no relationship was registered under `name`.
    pub fn relationship(&self, name: &str) -> TableResult<&Relationship> {
        self.relationships
            .get(name)
            .ok_or_else(|| TableError::UnknownRelationship {
                table: self.name.clone(),
                relationship: name.to_string(),
            })
    }

    /// Registers an index ordering every record by one property.
    ///
    /// Ties keep insertion order. Registering a name twice replaces the earlier index.
    ///
    /// # Errors
    ///
    /// - [`TableError::UnknownProperty`] if `T` does not expose `property`
    /// - [`TableError::IncomparableValues`] if the property holds values without a common order
    pub fn add_index(&mut self, name: &str, property: &str, ascending: bool) -> TableResult<()> {
        self.add_sorted_index(name, vec![SortKey::new(property, ascending.into())])
    }

    /// Registers an index ordering every record by several `(property, direction)` pairs.
    ///
    /// The first pair is the primary sort key; later pairs break ties, and records tied on
    /// every pair keep insertion order.
    ///
    /// # Errors
    ///
    /// As [`Table::add_index`], plus [`TableError::InvalidSort`] for an empty specification.
    pub fn add_sorted_index(&mut self, name: &str, spec: SortSpec) -> TableResult<()> {
        let index = Index::build(&self.name, name, spec, &self.records)?;

        if self.indexes.insert(name.to_string(), index).is_some() {
            warn!(table = %self.name, index = name, "replaced existing index");
        }

        Ok(())
    }

    /// Registers a relationship joining `source_key` on this table to `target_key` on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownProperty`] if either key is not exposed by its record type.
    pub fn add_relationship<U: Record>(
        &mut self,
        name: &str,
        target: Arc<Table<U>>,
        source_key: &str,
        target_key: &str,
    ) -> TableResult<()> {
        self.check_property(source_key)?;

        let relationship = Relationship::new(name, target, source_key, target_key)?;

        if self.relationships.insert(name.to_string(), relationship).is_some() {
            warn!(table = %self.name, relationship = name, "replaced existing relationship");
        }

        Ok(())
    }

    /// Every record, in insertion order.
    pub fn find_all(&self) -> Vec<&T> {
        self.records.iter().collect()
    }

    /// Records matching `predicate`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownProperty`] if the predicate names a property `T` does not expose.
    pub fn find_all_using_predicate(&self, predicate: &Expr) -> TableResult<Vec<&T>> {
        self.check_predicate(predicate)?;

        RecordEvaluator::filter_records(&self.records, predicate)
    }

    /// Records matching `predicate`, in the order of the index `index_name`.
    ///
    /// # Errors
    ///
    /// - [`TableError::UnknownIndex`] if `index_name` was never registered
    /// - [`TableError::UnknownProperty`] if the predicate names a property `T` does not expose
    pub fn find_all_using_predicate_sorted_by(
        &self,
        predicate: &Expr,
        index_name: &str,
    ) -> TableResult<Vec<&T>> {
        let index = self.index(index_name)?;
        self.check_predicate(predicate)?;

        RecordEvaluator::filter_records(
            index.positions().iter().map(|&position| &self.records[position]),
            predicate,
        )
    }

    /// Every record, in the order of the index `index_name`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownIndex`] if `index_name` was never registered.
    pub fn find_all_using_index_name(&self, index_name: &str) -> TableResult<Vec<&T>> {
        Ok(self
            .index(index_name)?
            .positions()
            .iter()
            .map(|&position| &self.records[position])
            .collect())
    }

    /// The record whose primary key equals `value`, if any.
    pub fn find_by_primary_key_value(&self, value: impl Into<Bson>) -> Option<&T> {
        KeyValue::from_bson(&value.into())
            .and_then(|key| self.keys.get(&key))
            .map(|&position| &self.records[position])
    }

    /// Records whose `property` equals `value`, in insertion order.
    ///
    /// Unknown properties match nothing.
    pub fn find_all_by_value(&self, value: impl Into<Bson>, property: &str) -> Vec<&T> {
        let value = value.into();

        self.records
            .iter()
            .filter(|record| {
                record
                    .get(property)
                    .is_some_and(|field_value| values_equal(&field_value, &value))
            })
            .collect()
    }

    /// Target records related to `object` through the relationship `name`.
    ///
    /// # Errors
    ///
    /// - [`TableError::UnknownRelationship`] if `name` was never registered
    /// - [`TableError::RelationshipTypeMismatch`] if the target table does not hold `U`
    pub fn find_all_related_objects_for<U: Record>(&self, object: &T, name: &str) -> TableResult<Vec<&U>> {
        let relationship = self.relationship(name)?;

        relationship.resolve(object.get(relationship.source_key()))
    }

    fn check_property(&self, property: &str) -> TableResult<()> {
        if T::properties().contains(&property) {
            Ok(())
        } else {
            Err(TableError::UnknownProperty {
                table: self.name.clone(),
                property: property.to_string(),
            })
        }
    }

    fn check_predicate(&self, predicate: &Expr) -> TableResult<()> {
        predicate
            .referenced_fields()
            .iter()
            .try_for_each(|field| self.check_property(field))
    }
}

/// Type-erased view of a table, letting relationships hold targets of any record type.
pub trait AnyTable: Send + Sync {
    /// Returns the table's name.
    fn table_name(&self) -> &str;

    /// Returns the table as `Any` for downcasting to `Table<T>`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Record> AnyTable for Table<T> {
    fn table_name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}


/// Builder for constructing [`Table`] instances.
///
/// # Example
///
/// ```ignore
/// let colors = Table::<Color>::builder("id")
///     .duplicate_keys(DuplicateKeyPolicy::LastWriteWins)
///     .build(JsonFileSource::new("colors.json"))?;
/// ```
#[derive(Debug, Clone)]
pub struct TableBuilder<T> {
    primary_key: String,
    options: TableOptions,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> TableBuilder<T> {
    pub fn new(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
            options: TableOptions::default(),
            _record: PhantomData,
        }
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the duplicate primary key policy.
    pub fn duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.options.duplicate_keys = policy;
        self
    }

    /// Overrides the table name used in logs and errors.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    /// Builds the table, deserializing every record with serde.
    pub fn build<S: RecordSource>(self, source: S) -> TableResult<Table<T>>
    where
        T: DeserializeOwned,
    {
        self.build_with(source, DeserializeFactory)
    }

    /// Builds the table, creating every record with `factory`.
    ///
    /// Records are inserted in source order. Nothing is returned unless every record
    /// was inserted.
    ///
    /// # Errors
    ///
    /// - [`TableError::UnknownProperty`] if `T` does not expose the primary key property
    /// - [`TableError::SourceNotFound`] / [`TableError::Source`] if the source cannot be read
    /// - [`TableError::InvalidRecord`] if the factory rejects a record
    /// - [`TableError::MissingKey`] if a record has no primary key value
    /// - [`TableError::InvalidKey`] if a primary key value is not a scalar
    /// - [`TableError::DuplicateKey`] if a key repeats under [`DuplicateKeyPolicy::Reject`]
    pub fn build_with<S, F>(self, source: S, factory: F) -> TableResult<Table<T>>
    where
        S: RecordSource,
        F: RecordFactory<T>,
    {
        let name = self.options.name.unwrap_or_else(|| T::table_name().to_string());
        let primary_key = self.primary_key;

        if !T::properties().contains(&primary_key.as_str()) {
            return Err(TableError::UnknownProperty { table: name, property: primary_key });
        }

        let documents = source.records()?;
        let mut records = Vec::with_capacity(documents.len());
        let mut keys = HashMap::with_capacity(documents.len());

        for (position, fields) in documents.iter().enumerate() {
            let record = factory
                .create(fields)
                .map_err(|err| TableError::InvalidRecord {
                    table: name.clone(),
                    position,
                    reason: err.to_string(),
                })?;

            let key = match record.get(&primary_key) {
                None | Some(Bson::Null) => {
                    return Err(TableError::MissingKey {
                        table: name,
                        property: primary_key,
                        position,
                    });
                }
                Some(value) => KeyValue::from_bson(&value).ok_or_else(|| TableError::InvalidKey {
                    table: name.clone(),
                    position,
                    value: value.to_string(),
                })?,
            };

            match keys.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(records.len());
                    records.push(record);
                }
                Entry::Occupied(entry) => match self.options.duplicate_keys {
                    DuplicateKeyPolicy::Reject => {
                        return Err(TableError::DuplicateKey {
                            table: name,
                            key: entry.key().to_string(),
                        });
                    }
                    DuplicateKeyPolicy::LastWriteWins => {
                        warn!(table = %name, key = %entry.key(), position, "duplicate primary key, keeping the later record");
                        records[*entry.get()] = record;
                    }
                },
            }
        }

        debug!(table = %name, primary_key = %primary_key, records = records.len(), "built table");

        Ok(Table {
            name,
            primary_key,
            records,
            keys,
            indexes: HashMap::new(),
            relationships: HashMap::new(),
        })
    }
}
