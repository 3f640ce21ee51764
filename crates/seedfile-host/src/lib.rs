#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Resolution contracts of the fixture pipeline.
//!
//! The pipeline resolves fixture rows in passes. Each field payload implements
//! [`Value`]; a payload whose inputs are not known yet answers
//! [`Readiness::Later`] and the row is retried on a later pass.
//!
//! Layout: `context.rs` (per-run context), `data.rs` (tables, rows, value bags),
//! `value.rs` (adapter traits and stock deferred values), `format.rs` (deferred
//! interpolation), `error.rs` (`HostError`).

pub mod context;
pub mod data;
pub mod error;
pub mod format;
pub mod value;

pub use context::{ContextKey, ResolveContext};
pub use data::{MapValues, ResolvedData, TableId, ValuesMutable};
pub use error::{BoxError, HostError, HostResult};
pub use format::{FormatArg, ValueFormat, ValueFormatTemplate};
pub use value::{
    DeferredValue, Process, RESOLVE_LATER, Readiness, Value, ValueDependencies, ValueFieldRef,
    ValueStatic, ValueTableRef,
};
pub use tokio_util::sync::CancellationToken;
