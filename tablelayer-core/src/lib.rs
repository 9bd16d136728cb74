//! Core types for building immutable, in-memory lookup tables from declarative record files.
//!
//! This crate is the core of the tablelayer project and provides:
//!
//! - **Record trait** ([`record`]) - Named property access for every storable type
//! - **Predicate API** ([`query`]) - Typed filter expressions, sort specifications and a visitor
//! - **Record sources** ([`source`]) - Loading field mappings from JSON or BSON resources
//! - **Object factories** ([`factory`]) - Turning field mappings into typed records
//! - **Table options** ([`options`]) - Construction-time configuration
//! - **Error handling** ([`error`]) - The error taxonomy shared by every table operation
//!
//! The table engine itself lives in `tablelayer-memory`.
//!
//! # Example
//!
//! ```ignore
//! use tablelayer::{Record, bson::Bson};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, Deserialize, Record)]
//! #[record(table = "countries")]
//! pub struct Country {
//!     pub code: String,
//!     pub name: String,
//!     pub population: i64,
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as tablelayer_core;

pub mod error;
pub mod factory;
pub mod options;
pub mod query;
pub mod record;
pub mod source;
