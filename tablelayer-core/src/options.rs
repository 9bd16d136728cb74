//! Construction-time configuration for tables.

use serde::{Deserialize, Serialize};

/// What to do when two records share a primary key value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Abort construction with [`TableError::DuplicateKey`](crate::error::TableError::DuplicateKey).
    #[default]
    Reject,
    /// The later record replaces the earlier one, keeping the earlier one's position.
    LastWriteWins,
}

/// Options applied while a table is built.
///
/// Options can be constructed in code or deserialized from a configuration file:
///
/// ```ignore
/// let options: TableOptions = serde_json::from_str(r#"{ "duplicate_keys": "last_write_wins" }"#)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Conflict policy for repeated primary key values.
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Overrides the table name used in logs and errors. Defaults to the record type's table name.
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reject_duplicates() {
        let options = TableOptions::default();
        assert_eq!(options.duplicate_keys, DuplicateKeyPolicy::Reject);
        assert_eq!(options.name, None);
    }

    #[test]
    fn deserializes_partial_configuration() {
        let options: TableOptions =
            serde_json::from_str(r#"{ "duplicate_keys": "last_write_wins" }"#).unwrap();
        assert_eq!(options.duplicate_keys, DuplicateKeyPolicy::LastWriteWins);
        assert_eq!(options.name, None);

        let options: TableOptions = serde_json::from_str(r#"{ "name": "colors" }"#).unwrap();
        assert_eq!(options.duplicate_keys, DuplicateKeyPolicy::Reject);
        assert_eq!(options.name.as_deref(), Some("colors"));
    }
}
