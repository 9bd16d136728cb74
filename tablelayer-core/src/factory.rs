//! Object factories turning field mappings into typed records.
//!
//! A table never instantiates records on its own. It hands every field mapping read from
//! the record source to a [`RecordFactory`], which is either a closure supplied by the
//! caller or [`DeserializeFactory`] for types implementing `serde::Deserialize`.

use bson::{Document, deserialize_from_document};
use serde::de::DeserializeOwned;

use crate::error::TableResult;

/// Creates one record from one field mapping.
///
/// Implemented for any `Fn(&Document) -> TableResult<T>`:
///
/// ```ignore
/// let factory = |fields: &Document| -> TableResult<Rank> {
///     Ok(Rank {
///         id: fields.get_i32("id").map_err(|e| TableError::Serialization(e.to_string()))?,
///         title: fields.get_str("title").unwrap_or_default().to_string(),
///     })
/// };
/// ```
pub trait RecordFactory<T> {
    /// Builds a record from its field mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the mapping cannot be turned into a `T`.
    fn create(&self, fields: &Document) -> TableResult<T>;
}

impl<T, F> RecordFactory<T> for F
where
    F: Fn(&Document) -> TableResult<T>,
{
    fn create(&self, fields: &Document) -> TableResult<T> {
        self(fields)
    }
}

/// Factory deserializing records with serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeserializeFactory;

impl<T: DeserializeOwned> RecordFactory<T> for DeserializeFactory {
    fn create(&self, fields: &Document) -> TableResult<T> {
        Ok(deserialize_from_document(fields.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use bson::doc;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Rank {
        id: i32,
        title: String,
    }

    #[test]
    fn deserialize_factory_builds_records() {
        let rank: Rank = DeserializeFactory
            .create(&doc! { "id": 4, "title": "Captain" })
            .unwrap();

        assert_eq!(rank, Rank { id: 4, title: "Captain".to_string() });
    }

    #[test]
    fn deserialize_factory_reports_shape_errors() {
        let result: TableResult<Rank> = DeserializeFactory.create(&doc! { "id": "four" });
        assert!(matches!(result, Err(TableError::Serialization(_))));
    }

    #[test]
    fn closures_are_factories() {
        let factory = |fields: &Document| -> TableResult<Rank> {
            Ok(Rank {
                id: fields
                    .get_i32("id")
                    .map_err(|err| TableError::Serialization(err.to_string()))?,
                title: fields.get_str("title").unwrap_or("unknown").to_string(),
            })
        };

        let rank = factory.create(&doc! { "id": 9 }).unwrap();
        assert_eq!(rank, Rank { id: 9, title: "unknown".to_string() });
    }
}
