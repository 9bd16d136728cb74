//! Immutable, in-memory lookup tables built from declarative record files.
//!
//! This crate is the primary entry point for users of tablelayer. It re-exports the core
//! types and the in-memory table engine from the sub-crates.
//!
//! # Features
//!
//! - **Typed records** - Derive [`Record`] on a serde struct and load it from JSON or BSON
//! - **Primary key lookups** - Unique keys, checked while the table is built
//! - **Indexes** - Named, stable orderings by one or several properties
//! - **Predicates** - Composable filter expressions, optionally returned in index order
//! - **Relationships** - Named joins from one table to another
//!
//! Tables are built once and never modified afterwards, so a finished table can be put in an
//! `Arc` and read from any number of threads.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use serde::Deserialize;
//! use tablelayer::prelude::*;
//!
//! #[derive(Debug, Clone, Deserialize, Record)]
//! #[record(table = "items")]
//! pub struct Item {
//!     pub id: i32,
//!     pub name: String,
//!     pub rank: i32,
//! }
//!
//! #[derive(Debug, Clone, Deserialize, Record)]
//! #[record(table = "tags")]
//! pub struct Tag {
//!     pub label: String,
//!     pub item_id: i32,
//! }
//!
//! fn main() -> TableResult<()> {
//!     let bundle = ResourceBundle::new("resources");
//!
//!     // items.json: [{"id": 1, "name": "a", "rank": 3}, ...]
//!     let mut items = Table::<Item>::from_bundle(&bundle, "id")?;
//!     items.add_index("by_rank", "rank", true)?;
//!
//!     let tags = Arc::new(Table::<Tag>::from_bundle(&bundle, "label")?);
//!     items.add_relationship("tags", tags, "id", "item_id")?;
//!
//!     let items = Arc::new(items);
//!
//!     // Lookup by primary key
//!     let item = items.find_by_primary_key_value(2).expect("item 2");
//!
//!     // Predicate, in index order
//!     let ranked = items.find_all_using_predicate_sorted_by(&Filter::gt("rank", 1), "by_rank")?;
//!
//!     // Relationship traversal
//!     let item_tags = items.find_all_related_objects_for::<Tag>(item, "tags")?;
//!
//!     println!("{ranked:?} {item_tags:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Custom factories
//!
//! Types that do not implement `Deserialize`, or that need to be built differently from
//! their field mapping, can be created with a closure:
//!
//! ```ignore
//! let factory = |fields: &Document| -> TableResult<Item> { /* ... */ };
//! let items = Table::with_factory(JsonFileSource::new("items.json"), factory, "id")?;
//! ```

pub mod prelude;

pub use tablelayer_core::{error, factory, options, query, record, source};
pub use tablelayer_memory::{index, key, relationship, table};
pub use tablelayer_macros::Record;

// Re-export BSON types for convenience
pub use bson;
