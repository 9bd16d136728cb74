//! The trait every type stored in a table must implement.
//!
//! Tables never inspect a record's fields directly. Every lookup, index and predicate
//! goes through [`Record::get`], which exposes one property by name as a [`Bson`] value.

use bson::{Bson, Document};

/// Core trait that all records stored in a table must implement.
///
/// A record exposes a fixed set of named properties. [`Record::properties`] lists them so
/// that unknown names can be rejected up front, and [`Record::get`] reads one of them.
/// Properties without a value (for example an empty `Option`) return `None`.
///
/// # Deriving
///
/// `#[derive(Record)]` from the `tablelayer` crate generates this trait for structs with
/// named fields.
///
/// # Example
///
/// ```ignore
/// use tablelayer_core::record::Record;
/// use bson::Bson;
///
/// pub struct Rank {
///     pub id: i32,
///     pub title: String,
/// }
///
/// impl Record for Rank {
///     fn table_name() -> &'static str {
///         "ranks"
///     }
///
///     fn properties() -> &'static [&'static str] {
///         &["id", "title"]
///     }
///
///     fn get(&self, property: &str) -> Option<Bson> {
///         match property {
///             "id" => Some(Bson::from(self.id)),
///             "title" => Some(Bson::from(self.title.clone())),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record: Send + Sync + 'static {
    /// Returns the name of the table this type is stored in.
    ///
    /// Resource bundles use this name to locate the record file for the type.
    fn table_name() -> &'static str;

    /// Returns every property name this type exposes.
    fn properties() -> &'static [&'static str];

    /// Reads one property by name.
    ///
    /// Returns `None` for unknown properties and for properties without a value.
    fn get(&self, property: &str) -> Option<Bson>;
}

/// Extension trait with helpers derived from [`Record`].
///
/// This trait is automatically implemented for all types that implement [`Record`].
pub trait RecordExt: Record + Sized {
    /// Returns whether the type exposes a property with this name.
    fn has_property(property: &str) -> bool {
        Self::properties().contains(&property)
    }

    /// Collects every present property into a field mapping.
    fn to_document(&self) -> Document {
        Self::properties()
            .iter()
            .filter_map(|property| {
                self.get(property)
                    .map(|value| (property.to_string(), value))
            })
            .collect()
    }
}

impl<R: Record> RecordExt for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    struct Station {
        code: String,
        zone: Option<i32>,
    }

    impl Record for Station {
        fn table_name() -> &'static str {
            "stations"
        }

        fn properties() -> &'static [&'static str] {
            &["code", "zone"]
        }

        fn get(&self, property: &str) -> Option<Bson> {
            match property {
                "code" => Some(Bson::from(self.code.clone())),
                "zone" => self.zone.map(Bson::from),
                _ => None,
            }
        }
    }

    #[test]
    fn has_property_checks_declared_names() {
        assert!(Station::has_property("code"));
        assert!(Station::has_property("zone"));
        assert!(!Station::has_property("name"));
    }

    #[test]
    fn to_document_skips_missing_values() {
        let station = Station { code: "KX".to_string(), zone: None };
        assert_eq!(station.to_document(), doc! { "code": "KX" });

        let station = Station { code: "BR".to_string(), zone: Some(2) };
        assert_eq!(station.to_document(), doc! { "code": "BR", "zone": 2 });
    }
}
