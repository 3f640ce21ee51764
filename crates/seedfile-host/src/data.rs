//! Row data handed to value adapters during resolution.
//!
//! # Design
//! - Field values are `serde_json::Value` so fixtures stay format-agnostic.
//! - `ResolvedData` only grows; rows are appended as the pipeline resolves them.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Identifier of the table owning a fixture row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    /// Build a table identifier from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Table name as written in the fixtures.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TableId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Mutable field-value bag of the row being resolved.
pub trait ValuesMutable {
    /// Current value of `field`, if any.
    fn get(&self, field: &str) -> Option<&JsonValue>;

    /// Set or replace the value of `field`.
    fn set(&mut self, field: &str, value: JsonValue);

    /// Whether `field` currently holds a value.
    fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }
}

/// Ordered map implementation of [`ValuesMutable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapValues(BTreeMap<String, JsonValue>);

impl MapValues {
    /// Create an empty value bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ValuesMutable for MapValues {
    fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    fn set(&mut self, field: &str, value: JsonValue) {
        self.0.insert(field.to_string(), value);
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for MapValues {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Rows resolved so far, grouped by table.
#[derive(Debug, Clone, Default)]
pub struct ResolvedData {
    tables: BTreeMap<TableId, Vec<MapValues>>,
}

impl ResolvedData {
    /// Create an empty resolved-data graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fully resolved row for `table`.
    pub fn add_row(&mut self, table: TableId, row: MapValues) {
        self.tables.entry(table).or_default().push(row);
    }

    /// Rows resolved for `table`, in resolution order.
    #[must_use]
    pub fn rows(&self, table: &TableId) -> &[MapValues] {
        self.tables.get(table).map_or(&[], Vec::as_slice)
    }

    /// First row of `table` whose `key_field` equals `key`.
    #[must_use]
    pub fn find_row(
        &self,
        table: &TableId,
        key_field: &str,
        key: &JsonValue,
    ) -> Option<&MapValues> {
        self.rows(table)
            .iter()
            .find(|row| row.get(key_field) == Some(key))
    }
}
