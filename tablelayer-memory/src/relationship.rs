//! Named joins from one table to another.
//!
//! A [`Relationship`] links a source key property on the owning table's records to a
//! target key property on another table's records. Resolving it for a source record
//! returns every target record whose target key equals the source record's source key.

use std::{collections::HashMap, fmt, sync::Arc};

use bson::Bson;
use tracing::debug;

use tablelayer_core::{
    error::{TableError, TableResult},
    record::Record,
};

use crate::{
    evaluator::Comparable,
    key::KeyValue,
    table::{AnyTable, Table},
};

/// A directed join definition to a target table.
///
/// The target table is shared through an `Arc`. A hash lookup over the target key is built
/// when the relationship is registered, so scalar keys resolve without scanning.
pub struct Relationship {
    name: String,
    source_key: String,
    target_key: String,
    target: Arc<dyn AnyTable>,
    lookup: HashMap<KeyValue, Vec<usize>>,
}

impl Relationship {
    /// # Errors
    ///
    /// Returns [`TableError::UnknownProperty`] if `U` does not expose `target_key`.
    pub(crate) fn new<U: Record>(
        name: &str,
        target: Arc<Table<U>>,
        source_key: &str,
        target_key: &str,
    ) -> TableResult<Self> {
        if !U::properties().contains(&target_key) {
            return Err(TableError::UnknownProperty {
                table: target.name().to_string(),
                property: target_key.to_string(),
            });
        }

        let mut lookup: HashMap<KeyValue, Vec<usize>> = HashMap::new();
        for (position, record) in target.all().iter().enumerate() {
            if let Some(key) = record.get(target_key).as_ref().and_then(KeyValue::from_bson) {
                lookup.entry(key).or_default().push(position);
            }
        }

        debug!(
            relationship = name,
            target = target.name(),
            source_key,
            target_key,
            keys = lookup.len(),
            "registered relationship"
        );

        Ok(Self {
            name: name.to_string(),
            source_key: source_key.to_string(),
            target_key: target_key.to_string(),
            target,
            lookup,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    pub fn target_key(&self) -> &str {
        &self.target_key
    }

    /// Name of the target table.
    pub fn target_name(&self) -> &str {
        self.target.table_name()
    }

    /// Returns the target records matching `source_value`, in target insertion order.
    ///
    /// A missing, null or undefined source value matches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::RelationshipTypeMismatch`] if the target table does not hold `U`.
    pub(crate) fn resolve<'a, U: Record>(&'a self, source_value: Option<Bson>) -> TableResult<Vec<&'a U>> {
        let target = self.target
            .as_any()
            .downcast_ref::<Table<U>>()
            .ok_or_else(|| TableError::RelationshipTypeMismatch {
                relationship: self.name.clone(),
                target: self.target.table_name().to_string(),
            })?;

        let Some(value) = source_value else {
            return Ok(Vec::new());
        };
        if matches!(Comparable::from(&value), Comparable::Null) {
            return Ok(Vec::new());
        }

        match KeyValue::from_bson(&value) {
            Some(key) => Ok(
                self.lookup
                    .get(&key)
                    .map(|positions| {
                        positions
                            .iter()
                            .map(|&position| &target.all()[position])
                            .collect()
                    })
                    .unwrap_or_default()
            ),
            // arrays and documents are not hashed; compare them one by one
            None => Ok(target.find_all_by_value(value, &self.target_key)),
        }
    }
}

impl fmt::Debug for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("name", &self.name)
            .field("target", &self.target.table_name())
            .field("source_key", &self.source_key)
            .field("target_key", &self.target_key)
            .finish()
    }
}
