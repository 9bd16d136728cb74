//! Named orderings over a table's records.
//!
//! An [`Index`] stores positions into the owning table's record list, sorted by a
//! [`SortSpec`]. Sorting is stable, so records that tie on every sort key keep their
//! insertion order.

use std::cmp::Ordering;

use bson::Bson;
use tracing::debug;

use tablelayer_core::{
    error::{TableError, TableResult},
    query::{SortDirection, SortSpec},
    record::Record,
};

use crate::evaluator::{Comparable, ValueKind};

/// A named, precomputed ordering of a table's records.
#[derive(Debug, Clone)]
pub struct Index {
    name: String,
    spec: SortSpec,
    positions: Vec<usize>,
}

impl Index {
    /// Sorts `records` by `spec`.
    ///
    /// # Errors
    ///
    /// - [`TableError::InvalidSort`] if `spec` is empty
    /// - [`TableError::UnknownProperty`] if a sort key names a property `R` does not expose
    /// - [`TableError::IncomparableValues`] if a sort key holds values of different kinds,
    ///   or values without a natural order
    pub(crate) fn build<R: Record>(
        table: &str,
        name: &str,
        spec: SortSpec,
        records: &[R],
    ) -> TableResult<Self> {
        if spec.is_empty() {
            return Err(TableError::InvalidSort(name.to_string()));
        }

        if let Some(key) = spec.iter().find(|key| !R::properties().contains(&key.property.as_str())) {
            return Err(TableError::UnknownProperty {
                table: table.to_string(),
                property: key.property.clone(),
            });
        }

        // one column of extracted values per sort key
        let columns = spec
            .iter()
            .map(|key| {
                records
                    .iter()
                    .map(|record| record.get(&key.property).unwrap_or(Bson::Null))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        for (key, column) in spec.iter().zip(&columns) {
            check_orderable(name, &key.property, column)?;
        }

        let mut positions = (0..records.len()).collect::<Vec<_>>();
        positions.sort_by(|&a, &b| {
            for (key, column) in spec.iter().zip(&columns) {
                let ordering = Comparable::from(&column[a]).sort_cmp(&Comparable::from(&column[b]));
                let ordering = match key.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };

                if ordering != Ordering::Equal {
                    return ordering;
                }
            }

            Ordering::Equal
        });

        debug!(table, index = name, keys = spec.len(), records = positions.len(), "built index");

        Ok(Self {
            name: name.to_string(),
            spec,
            positions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sort keys this index was built from.
    pub fn spec(&self) -> &SortSpec {
        &self.spec
    }

    /// Positions into the table's record list, in index order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Every non-null value under one sort key must share one orderable kind.
fn check_orderable(index: &str, property: &str, column: &[Bson]) -> TableResult<()> {
    let mut seen: Option<ValueKind> = None;

    for value in column {
        let kind = Comparable::from(value)
            .kind()
            .map_err(|reason| TableError::IncomparableValues {
                index: index.to_string(),
                property: property.to_string(),
                reason: reason.to_string(),
            })?;

        match (seen, kind) {
            (_, None) => {}
            (None, Some(kind)) => seen = Some(kind),
            (Some(expected), Some(kind)) if expected != kind => {
                return Err(TableError::IncomparableValues {
                    index: index.to_string(),
                    property: property.to_string(),
                    reason: format!("mixes {expected} and {kind} values"),
                });
            }
            _ => {}
        }
    }

    Ok(())
}
