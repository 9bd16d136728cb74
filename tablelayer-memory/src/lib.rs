//! In-memory table engine for tablelayer.
//!
//! This crate materializes records from a record source into an immutable [`Table`] and
//! serves lookups against it: by primary key, by property value, by predicate, through
//! named indexes and through relationships to other tables.
//!
//! # Features
//!
//! - **Primary key lookups** - Hash lookups with numeric key normalization
//! - **Indexes** - Stable single or multi-key orderings, built eagerly on registration
//! - **Predicates** - Typed filter expressions, optionally returned in index order
//! - **Relationships** - One-to-many joins to other tables, resolved through a hash lookup
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tablelayer::prelude::*;
//!
//! let mut items = Table::<Item>::from_file("resources/items.json", "id")?;
//! items.add_index("by_rank", "rank", true)?;
//!
//! let tags = Arc::new(Table::<Tag>::from_file("resources/tags.json", "label")?);
//! items.add_relationship("tags", tags, "id", "item_id")?;
//!
//! let items = Arc::new(items);
//! let ranked = items.find_all_using_predicate_sorted_by(&Filter::gt("rank", 1), "by_rank")?;
//! let item = items.find_by_primary_key_value(2).unwrap();
//! let item_tags = items.find_all_related_objects_for::<Tag>(item, "tags")?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as tablelayer_memory;

mod evaluator;
pub mod index;
pub mod key;
pub mod relationship;
pub mod table;

pub use index::Index;
pub use key::KeyValue;
pub use relationship::Relationship;
pub use table::{AnyTable, Table, TableBuilder};
