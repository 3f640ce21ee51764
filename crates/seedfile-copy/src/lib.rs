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
#![allow(clippy::multiple_crate_versions)]

//! File-copy field values for the fixture resolution pipeline.
//!
//! A [`CopyValue`] sits in a field of a fixture row and names a source and a
//! destination. When the pipeline resolves the row, both endpoints are
//! resolved (possibly from other rows) and handed to a callback; the stock
//! callback [`resolve_copy_file`] streams the bytes across.
//!
//! Relative filenames need a [`CopyProcess`] started on the context so they
//! can be mapped to paths by its filename provider.
//!
//! Layout: `value.rs` (the declaration), `filename.rs` (literal and computed
//! filenames), `endpoint.rs` (source/destination contracts), `reader.rs` and
//! `writer.rs` (endpoints), `process.rs` and `context.rs` (pipeline-wide
//! settings), `provider.rs` (filename providers), `resolve.rs` (callbacks and
//! the byte copy), `error.rs` (`CopyError`).

pub mod context;
pub mod endpoint;
pub mod error;
pub mod filename;
pub mod process;
pub mod provider;
pub mod reader;
pub mod resolve;
pub mod value;
pub mod writer;

pub use context::{from_context, from_context_check, to_context};
pub use endpoint::{
    FileDestination, FileField, FileInfo, FileReader, FileSource, FileWriter, ReadStream,
    ResolveScope, WriteStream,
};
pub use error::{CopyError, CopyResult, copy_error};
pub use filename::{
    Filename, FilenameOptions, FilenameValue, filename_format, filename_format_opt,
    filename_format_template, filename_format_template_opt,
};
pub use process::{CopyProcess, ProcessOptions};
pub use provider::{FilenameProvider, FilenameRequest, RootedFilenameError, RootedFilenameProvider};
pub use reader::{BytesReader, CachedReader, FsFileReader};
pub use resolve::{
    ResolveCallback, ResolveRequest, copy_file, copy_file_with_buffer, resolve_copy_file,
};
pub use value::{CopyValue, ValueOptions};
pub use writer::FsFileWriter;
