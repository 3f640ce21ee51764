//! Deferred values with fixed behaviour.

use seedfile_host::{
    BoxError, DeferredValue, HostError, HostResult, Readiness, ResolveContext, ResolvedData,
    TableId, ValuesMutable,
};
use serde_json::Value as JsonValue;

/// Never ready; reports `dependencies` as its tables.
#[derive(Debug, Clone, Default)]
pub struct PendingValue {
    dependencies: Vec<TableId>,
}

impl PendingValue {
    /// Pending value without dependencies.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dependencies: Vec::new(),
        }
    }

    /// Pending value waiting on `tables`.
    #[must_use]
    pub fn waiting_on(tables: impl IntoIterator<Item = TableId>) -> Self {
        Self {
            dependencies: tables.into_iter().collect(),
        }
    }
}

impl DeferredValue for PendingValue {
    fn resolve_value(
        &self,
        _ctx: &ResolveContext,
        _resolved_data: &ResolvedData,
        _values: &dyn ValuesMutable,
    ) -> HostResult<Readiness<JsonValue>> {
        Ok(Readiness::Later)
    }

    fn table_dependencies(&self) -> Vec<TableId> {
        self.dependencies.clone()
    }
}

/// Always fails with `message` attributed to `table`.`field`.
#[derive(Debug, Clone)]
pub struct FailingValue {
    table: TableId,
    field: String,
    message: String,
}

impl FailingValue {
    /// Failing value reporting `message`.
    #[must_use]
    pub fn new(table: TableId, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            table,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl DeferredValue for FailingValue {
    fn resolve_value(
        &self,
        _ctx: &ResolveContext,
        _resolved_data: &ResolvedData,
        _values: &dyn ValuesMutable,
    ) -> HostResult<Readiness<JsonValue>> {
        Err(HostError::value(
            &self.table,
            &self.field,
            BoxError::from(self.message.clone()),
        ))
    }
}
