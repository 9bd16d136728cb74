//! Convenient re-exports of commonly used types from tablelayer.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use tablelayer::prelude::*;
//! ```

pub use tablelayer_macros::Record;
pub use tablelayer_core::{
    record::{Record, RecordExt},
    query::{Expr, Filter, FieldOp, QueryVisitor, SortDirection, SortKey, SortSpec},
    source::{BsonFileSource, FileSource, JsonFileSource, RecordSource, ResourceBundle},
    factory::{DeserializeFactory, RecordFactory},
    options::{DuplicateKeyPolicy, TableOptions},
    error::{TableError, TableResult},
};
pub use tablelayer_memory::{Table, TableBuilder};
