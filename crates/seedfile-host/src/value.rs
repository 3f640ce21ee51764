//! Value adapter contracts and the stock deferred values.
//!
//! # Design
//! - Retrying is not an error: adapters answer `Ok(Readiness::Later)` and the pipeline re-queues the row.
//! - Dependencies are reported separately so the pipeline can plan resolution order up front.

use serde_json::Value as JsonValue;

use crate::context::ResolveContext;
use crate::data::{ResolvedData, TableId, ValuesMutable};
use crate::error::{HostError, HostResult};

/// Outcome of a resolution attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness<T> {
    /// The input was available and produced a result.
    Ready(T),
    /// An input is not known yet; retry on a later pass.
    Later,
}

impl<T> Readiness<T> {
    /// Whether this outcome asks for a later retry.
    #[must_use]
    pub const fn is_later(&self) -> bool {
        matches!(self, Self::Later)
    }
}

/// Sentinel returned by [`Value::resolve`] when the row must be resolved again later.
pub const RESOLVE_LATER: Readiness<()> = Readiness::Later;

/// A field payload that computes itself, and possibly sibling fields, during resolution.
pub trait Value: Send + Sync {
    /// Resolve the value stored in `field_name` of a row of `table_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be resolved now or ever.
    fn resolve(
        &self,
        ctx: &ResolveContext,
        resolved_data: &ResolvedData,
        table_id: &TableId,
        field_name: &str,
        values: &mut dyn ValuesMutable,
    ) -> HostResult<Readiness<()>>;
}

/// Capability reporting which tables must be resolved before a value.
pub trait ValueDependencies {
    /// Tables this value reads from.
    fn table_dependencies(&self) -> Vec<TableId>;
}

/// A value computed from other rows, used inside format strings and filenames.
pub trait DeferredValue: Send + Sync {
    /// Compute the value from the data resolved so far.
    ///
    /// # Errors
    ///
    /// Returns an error when the inputs exist but cannot produce a value.
    fn resolve_value(
        &self,
        ctx: &ResolveContext,
        resolved_data: &ResolvedData,
        values: &dyn ValuesMutable,
    ) -> HostResult<Readiness<JsonValue>>;

    /// Tables read by this value.
    fn table_dependencies(&self) -> Vec<TableId> {
        Vec::new()
    }
}

/// Lifecycle hook wrapped around a pipeline run.
pub trait Process: Send + Sync {
    /// Prepare for a run, returning the context the run must use.
    ///
    /// # Errors
    ///
    /// Returns an error when the process cannot be started.
    fn start(&self, ctx: ResolveContext) -> HostResult<ResolveContext>;

    /// Complete a run started with [`Process::start`].
    ///
    /// # Errors
    ///
    /// Returns an error when pending work cannot be committed.
    fn finish(&self, ctx: &ResolveContext) -> HostResult<()>;
}

/// A deferred value that is always ready.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueStatic(pub JsonValue);

impl DeferredValue for ValueStatic {
    fn resolve_value(
        &self,
        _ctx: &ResolveContext,
        _resolved_data: &ResolvedData,
        _values: &dyn ValuesMutable,
    ) -> HostResult<Readiness<JsonValue>> {
        Ok(Readiness::Ready(self.0.clone()))
    }
}

/// A field of the row currently being resolved; not ready until the field is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFieldRef(pub String);

impl ValueFieldRef {
    /// Reference `field` of the current row.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self(field.into())
    }
}

impl DeferredValue for ValueFieldRef {
    fn resolve_value(
        &self,
        _ctx: &ResolveContext,
        _resolved_data: &ResolvedData,
        values: &dyn ValuesMutable,
    ) -> HostResult<Readiness<JsonValue>> {
        Ok(values
            .get(&self.0)
            .cloned()
            .map_or(Readiness::Later, Readiness::Ready))
    }
}

/// A field of a row in another table, located by a key field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTableRef {
    /// Table holding the referenced row.
    pub table: TableId,
    /// Field used to locate the row.
    pub key_field: String,
    /// Key value to match.
    pub key: JsonValue,
    /// Field read from the located row.
    pub field: String,
}

impl ValueTableRef {
    /// Reference `field` of the `table` row whose `key_field` equals `key`.
    #[must_use]
    pub fn new(
        table: TableId,
        key_field: impl Into<String>,
        key: JsonValue,
        field: impl Into<String>,
    ) -> Self {
        Self {
            table,
            key_field: key_field.into(),
            key,
            field: field.into(),
        }
    }
}

impl DeferredValue for ValueTableRef {
    fn resolve_value(
        &self,
        _ctx: &ResolveContext,
        resolved_data: &ResolvedData,
        _values: &dyn ValuesMutable,
    ) -> HostResult<Readiness<JsonValue>> {
        let Some(row) = resolved_data.find_row(&self.table, &self.key_field, &self.key) else {
            return Ok(Readiness::Later);
        };
        row.get(&self.field)
            .cloned()
            .map(Readiness::Ready)
            .ok_or_else(|| HostError::MissingField {
                table: self.table.clone(),
                field: self.field.clone(),
            })
    }

    fn table_dependencies(&self) -> Vec<TableId> {
        vec![self.table.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MapValues;
    use serde_json::json;

    #[test]
    fn field_ref_waits_for_the_field() -> HostResult<()> {
        let ctx = ResolveContext::new();
        let data = ResolvedData::new();
        let mut values = MapValues::new();
        let reference = ValueFieldRef::new("name");

        assert!(reference.resolve_value(&ctx, &data, &values)?.is_later());

        values.set("name", json!("avatar.png"));
        assert_eq!(
            reference.resolve_value(&ctx, &data, &values)?,
            Readiness::Ready(json!("avatar.png"))
        );
        Ok(())
    }

    #[test]
    fn table_ref_reports_dependency_and_missing_field() -> HostResult<()> {
        let ctx = ResolveContext::new();
        let users = TableId::new("users");
        let mut data = ResolvedData::new();
        let values = MapValues::new();
        let reference = ValueTableRef::new(users.clone(), "id", json!(7), "avatar");

        assert_eq!(reference.table_dependencies(), vec![users.clone()]);
        assert!(reference.resolve_value(&ctx, &data, &values)?.is_later());

        data.add_row(users, [("id", json!(7))].into_iter().collect());
        let err = reference.resolve_value(&ctx, &data, &values);
        assert!(matches!(err, Err(HostError::MissingField { .. })));
        Ok(())
    }

    #[test]
    fn resolve_later_sentinel_is_later() {
        assert!(RESOLVE_LATER.is_later());
        assert!(!Readiness::Ready(()).is_later());
    }
}
