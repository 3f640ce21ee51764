//! Publication of the copy process on the resolution context.

use std::sync::Arc;

use seedfile_host::{ContextKey, ResolveContext};

use crate::error::{CopyError, CopyResult};
use crate::process::CopyProcess;

enum ProcessKey {}

impl ContextKey for ProcessKey {
    type Value = CopyProcess;
}

/// Derive a context exposing `process` to copy declarations.
#[must_use]
pub fn to_context(ctx: &ResolveContext, process: Arc<CopyProcess>) -> ResolveContext {
    ctx.with_value::<ProcessKey>(process)
}

/// Copy process published on `ctx`, if any.
#[must_use]
pub fn from_context(ctx: &ResolveContext) -> Option<Arc<CopyProcess>> {
    ctx.value::<ProcessKey>()
}

/// Copy process published on `ctx`.
///
/// # Errors
///
/// Returns [`CopyError::ProcessNotInitialized`] when no process was started on `ctx`.
pub fn from_context_check(ctx: &ResolveContext) -> CopyResult<Arc<CopyProcess>> {
    from_context(ctx).ok_or(CopyError::ProcessNotInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_requires_publication() {
        let ctx = ResolveContext::new();
        assert!(from_context(&ctx).is_none());
        assert!(matches!(
            from_context_check(&ctx),
            Err(CopyError::ProcessNotInitialized)
        ));

        let started = to_context(&ctx, Arc::new(CopyProcess::new()));
        assert!(from_context(&started).is_some());
        assert!(from_context_check(&started).is_ok());
    }
}
