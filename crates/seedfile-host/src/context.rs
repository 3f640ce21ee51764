//! Per-resolution context threaded through every value adapter.
//!
//! # Design
//! - Entries are keyed by a key *type*; a crate-private key type cannot collide with anyone else's.
//! - Deriving a context never mutates the parent, so concurrent pipelines keep independent state.
//! - Cancellation is carried alongside so long-running adapters can stop between work units.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Key type used to publish a value on a [`ResolveContext`].
pub trait ContextKey: 'static {
    /// Type stored under this key.
    type Value: Send + Sync + 'static;
}

type Entry = Arc<dyn Any + Send + Sync>;

/// Immutable context for a single pipeline run.
#[derive(Clone, Default)]
pub struct ResolveContext {
    entries: Arc<HashMap<TypeId, Entry>>,
    cancellation: CancellationToken,
}

impl ResolveContext {
    /// Create an empty context with a fresh cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context that observes `token` for cancellation.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            cancellation: token,
        }
    }

    /// Derive a context exposing `value` under key `K`.
    ///
    /// A value already published under `K` is shadowed in the derived context only.
    #[must_use]
    pub fn with_value<K: ContextKey>(&self, value: Arc<K::Value>) -> Self {
        let mut entries = HashMap::clone(&self.entries);
        entries.insert(TypeId::of::<K>(), value as Entry);
        Self {
            entries: Arc::new(entries),
            cancellation: self.cancellation.clone(),
        }
    }

    /// Value published under key `K`, if any.
    #[must_use]
    pub fn value<K: ContextKey>(&self) -> Option<Arc<K::Value>> {
        self.entries
            .get(&TypeId::of::<K>())
            .and_then(|entry| Arc::clone(entry).downcast::<K::Value>().ok())
    }

    /// Cancellation token observed by this context.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Whether the run this context belongs to was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Debug for ResolveContext {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResolveContext")
            .field("entries", &self.entries.len())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
